use std::path::PathBuf;

use clap::{Parser, Subcommand};
use shdw::{ShadowDriveVersion, StorageSize};

/// Manage Shadow Drive storage accounts and files.
#[derive(Parser, Debug)]
#[command(name = "drive", version)]
pub struct Cli {
    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info", global = true)]
    pub log_level: String,

    /// Write logs to this file (the UI discards logs otherwise)
    #[arg(long, global = true)]
    pub log_file: Option<PathBuf>,

    /// Storage gateway URL (overrides SHDW_ENDPOINT)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Explorer cluster for transaction links (overrides SHDW_CLUSTER)
    #[arg(long, global = true)]
    pub cluster: Option<String>,

    /// Default protocol version for new accounts
    #[arg(long, default_value = "v2", global = true)]
    pub shdw_version: ShadowDriveVersion,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Launch the interactive drive UI (default)
    Ui,

    /// List storage accounts owned by the wallet
    Accounts(OutputArgs),

    /// Create a storage account
    CreateAccount(CreateAccountArgs),

    /// Delete a storage account
    DeleteAccount(AccountArgs),

    /// List the files of a storage account
    Files(FilesArgs),

    /// Upload local files to a storage account
    Upload(UploadArgs),

    /// Delete a file by URL
    DeleteFile(DeleteFileArgs),

    /// Resolve a file name to its URL
    Find(FindArgs),

    /// Return the account with this name, creating a 1GB account if missing
    GetOrCreate(GetOrCreateArgs),
}

#[derive(Parser, Debug)]
pub struct OutputArgs {
    /// Output as JSON instead of TSV
    #[arg(long)]
    pub json: bool,
}

#[derive(Parser, Debug)]
pub struct CreateAccountArgs {
    /// Account name
    pub name: String,

    /// Reserved capacity (e.g. 1GB, 10GB, 50GB)
    #[arg(long, default_value = "1GB")]
    pub size: StorageSize,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct AccountArgs {
    /// Storage account public key
    pub account: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct FilesArgs {
    /// Storage account public key
    pub account: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct UploadArgs {
    /// Storage account public key
    pub account: String,

    /// Files to upload
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct DeleteFileArgs {
    /// Storage account public key
    pub account: String,

    /// File URL as returned by `files`
    pub url: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[derive(Parser, Debug)]
pub struct FindArgs {
    /// Storage account public key
    pub account: String,

    /// Exact file name
    pub file_name: String,
}

#[derive(Parser, Debug)]
pub struct GetOrCreateArgs {
    /// Account name
    pub name: String,

    #[command(flatten)]
    pub output: OutputArgs,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_ui() {
        let cli = Cli::try_parse_from(["drive"]).unwrap();
        assert!(cli.command.is_none());
        assert_eq!(cli.shdw_version, ShadowDriveVersion::V2);
    }

    #[test]
    fn test_parses_create_account() {
        let cli = Cli::try_parse_from([
            "drive",
            "create-account",
            "mydrive",
            "--size",
            "10GB",
            "--json",
            "--shdw-version",
            "v1",
        ])
        .unwrap();
        assert_eq!(cli.shdw_version, ShadowDriveVersion::V1);
        match cli.command {
            Some(Command::CreateAccount(args)) => {
                assert_eq!(args.name, "mydrive");
                assert_eq!(args.size, StorageSize::TEN_GB);
                assert!(args.output.json);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_size() {
        assert!(Cli::try_parse_from(["drive", "create-account", "x", "--size", "lots"]).is_err());
    }
}
