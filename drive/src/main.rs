mod cli;
mod commands;
mod config;
mod effects;
mod error;
mod files;
mod session;
mod ui;
mod view;

use std::fs::OpenOptions;
use std::sync::Mutex;

use clap::Parser;
use cli::{Cli, Command};
use config::DriveConfig;
use error::DriveError;
use tokio_util::sync::CancellationToken;
use tracing::info;
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Command::Ui);
    let is_ui = matches!(command, Command::Ui);

    // Before tracing, so RUST_LOG from .env applies.
    let _ = dotenvy::dotenv();

    if let Err(e) = init_tracing(&cli.log_level, cli.log_file.as_deref(), is_ui) {
        eprintln!("failed to initialize logging: {e}");
        std::process::exit(1);
    }

    let mut config = DriveConfig::from_env();
    if let Some(endpoint) = cli.endpoint {
        config.endpoint = endpoint;
    }
    if let Some(cluster) = cli.cluster {
        config.cluster = cluster;
    }
    config.version = cli.shdw_version;

    // Shared cancellation token + signal handlers.
    let cancel = setup_signal_handlers();

    let result = match command {
        Command::Ui => ui::run_ui(config, cancel).await,
        command => {
            tokio::select! {
                result = commands::run(&config, command) => result,
                _ = cancel.cancelled() => Ok(()),
            }
        }
    };

    if let Err(e) = result {
        tracing::error!(error = %e, "drive error");
        if is_ui {
            eprintln!("error: {e}");
        }
        std::process::exit(1);
    }
}

/// Log to stderr for one-shot commands. The UI owns the terminal, so it logs
/// to `log_file` or nowhere.
fn init_tracing(
    level: &str,
    log_file: Option<&std::path::Path>,
    is_ui: bool,
) -> Result<(), DriveError> {
    let level = level
        .parse::<LevelFilter>()
        .unwrap_or(LevelFilter::INFO);
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false);

    match (log_file, is_ui) {
        (Some(path), _) => {
            let file = OpenOptions::new().create(true).append(true).open(path)?;
            builder
                .with_ansi(false)
                .with_writer(Mutex::new(file))
                .init();
        }
        (None, true) => builder.with_writer(std::io::sink).init(),
        (None, false) => builder.with_writer(std::io::stderr).init(),
    }
    Ok(())
}

/// Register SIGINT and SIGTERM handlers that trigger the returned token.
fn setup_signal_handlers() -> CancellationToken {
    let cancel = CancellationToken::new();

    let cancel_clone = cancel.clone();
    tokio::spawn(async move {
        let _ = tokio::signal::ctrl_c().await;
        info!("received SIGINT, shutting down");
        cancel_clone.cancel();
    });

    #[cfg(unix)]
    {
        let cancel_clone = cancel.clone();
        tokio::spawn(async move {
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(mut sig) => {
                    sig.recv().await;
                    info!("received SIGTERM, shutting down");
                    cancel_clone.cancel();
                }
                Err(e) => tracing::warn!(error = %e, "failed to register SIGTERM handler"),
            }
        });
    }

    cancel
}
