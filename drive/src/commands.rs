//! One-shot CLI commands. Output is TSV by default, one JSON document with `--json`.

use std::io::Write;

use serde::Serialize;
use shdw::utils::{bytes_to_human, explorer_tx_url};
use shdw::{Pubkey, ShdwError, StorageAccountResponse};
use tracing::info;

use crate::cli::Command;
use crate::config::DriveConfig;
use crate::error::DriveError;
use crate::files::read_upload_files;
use crate::session::{DriveSession, ShdwFactory};
use crate::view::FileId;

/// Connect the configured wallet and run `command`, writing to stdout.
pub async fn run(config: &DriveConfig, command: Command) -> Result<(), DriveError> {
    let wallet = config.load_wallet()?;
    let mut session = DriveSession::new(config.version);
    session
        .connect(&wallet, &ShdwFactory {
            config: config.shdw_config(),
        })
        .await?;
    info!(wallet = %wallet.pubkey(), "connected");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    execute(&session, &config.cluster, command, &mut out).await
}

/// Run `command` against a connected session.
pub async fn execute<W: Write>(
    session: &DriveSession,
    cluster: &str,
    command: Command,
    out: &mut W,
) -> Result<(), DriveError> {
    match command {
        Command::Ui => Ok(()),

        Command::Accounts(args) => {
            let accounts = session.get_storage_accounts().await?;
            if args.json {
                return write_json(out, &accounts);
            }
            for account in &accounts {
                write_account(out, account)?;
            }
            Ok(())
        }

        Command::CreateAccount(args) => {
            let handle = session.handle().ok_or(ShdwError::NotConnected)?;
            let resp = handle
                .create_storage_account(&args.name, args.size, session.version())
                .await?;
            let link = explorer_tx_url(&resp.transaction_signature, cluster);
            if args.output.json {
                return write_json(out, &serde_json::json!({
                    "shdw_bucket": resp.shdw_bucket,
                    "transaction_signature": resp.transaction_signature,
                    "explorer": link,
                }));
            }
            writeln!(out, "{}\t{}\t{link}", resp.shdw_bucket, resp.transaction_signature)?;
            Ok(())
        }

        Command::DeleteAccount(args) => {
            let handle = session.handle().ok_or(ShdwError::NotConnected)?;
            let account: Pubkey = args.account.parse()?;
            let resp = handle.delete_storage_account(&account).await?;
            if args.output.json {
                return write_json(out, &resp);
            }
            writeln!(out, "{}", resp.txid)?;
            Ok(())
        }

        Command::Files(args) => {
            let account: Pubkey = args.account.parse()?;
            let files = session.get_all_files(&account).await?;
            if args.output.json {
                return write_json(out, &files);
            }
            for url in &files {
                writeln!(out, "{url}")?;
            }
            Ok(())
        }

        Command::Upload(args) => {
            let handle = session.handle().ok_or(ShdwError::NotConnected)?;
            let account: Pubkey = args.account.parse()?;
            let files = read_upload_files(&args.paths).await?;
            let batch = files
                .into_iter()
                .enumerate()
                .map(|(i, file)| (FileId(i as u64), file))
                .collect();
            let results: Vec<_> = handle
                .upload_batch(&account, batch)
                .await?
                .into_iter()
                .map(|(_, result)| result)
                .collect();

            if args.output.json {
                write_json(out, &results)?;
            } else {
                for r in &results {
                    writeln!(
                        out,
                        "{}\t{}\t{}",
                        r.file_name,
                        r.location.as_deref().unwrap_or("-"),
                        r.error.as_deref().unwrap_or("-"),
                    )?;
                }
            }

            match results.into_iter().find(|r| r.error.is_some()) {
                Some(failed) => Err(ShdwError::Upload {
                    file: failed.file_name,
                    message: failed.error.unwrap_or_default(),
                }
                .into()),
                None => Ok(()),
            }
        }

        Command::DeleteFile(args) => {
            let handle = session.handle().ok_or(ShdwError::NotConnected)?;
            let account: Pubkey = args.account.parse()?;
            let resp = handle.delete_file(&account, &args.url).await?;
            if args.output.json {
                return write_json(out, &resp);
            }
            writeln!(out, "{}", resp.message)?;
            Ok(())
        }

        Command::Find(args) => {
            match session
                .find_url_by_file_name(&args.file_name, &args.account)
                .await?
            {
                Some(url) => {
                    writeln!(out, "{url}")?;
                    Ok(())
                }
                None => Err(DriveError::FileNotFound(args.file_name)),
            }
        }

        Command::GetOrCreate(args) => {
            let account = session
                .get_or_create_storage_account_by_name(&args.name)
                .await?;
            if args.output.json {
                return write_json(out, &account);
            }
            write_account(out, &account)
        }
    }
}

fn write_account<W: Write>(out: &mut W, account: &StorageAccountResponse) -> Result<(), DriveError> {
    writeln!(
        out,
        "{}\t{}\t{}\t{}",
        account.public_key,
        account.account.identifier,
        account.account.storage,
        bytes_to_human(account.account.storage, false, 1),
    )?;
    Ok(())
}

fn write_json<W: Write, T: Serialize + ?Sized>(out: &mut W, value: &T) -> Result<(), DriveError> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    Ok(())
}
