//! Drive view state and its reconciliation rules.
//!
//! [`DriveView`] is a plain state machine: user actions mutate it and return
//! the [`Effect`]s to run, and every finished effect comes back as an
//! [`Outcome`] through [`DriveView::apply`]. Fetch results carry the
//! generation they were requested under, so a slow response for an old
//! selection or an old wallet is dropped instead of overwriting newer state.

use std::collections::{HashMap, VecDeque};
use std::path::PathBuf;

use shdw::utils::{bytes_to_human, explorer_tx_url, file_name_from_url};
use shdw::{
    CreateStorageResponse, DeleteFileResponse, Pubkey, ShadowDriveResponse, ShadowDriveVersion,
    StorageAccountResponse, StorageSize, UploadFile, UploadResult, Wallet,
};
use tracing::{debug, info, warn};

use crate::session::{DriveSession, SharedClient};

/// Maximum notices retained.
const MAX_NOTICES: usize = 200;

/// Stable identity of a selected local file, independent of its name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FileId(pub u64);

/// A local file chosen for upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocalFile {
    pub id: FileId,
    pub name: String,
    pub data: Vec<u8>,
}

/// Upload state of one local file row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FileStatus {
    Pending,
    Uploading,
    Uploaded(String),
    Failed(String),
}

/// A local file row as rendered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRow {
    pub index: usize,
    pub name: String,
    pub status: FileStatus,
}

/// Account creation form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountForm {
    pub name: String,
    pub size: StorageSize,
    pub version: ShadowDriveVersion,
}

impl Default for AccountForm {
    fn default() -> Self {
        Self {
            name: String::new(),
            size: StorageSize::ONE_GB,
            version: ShadowDriveVersion::V2,
        }
    }
}

impl AccountForm {
    /// Advance to the next size preset, wrapping around.
    pub fn cycle_size(&mut self) {
        let presets = StorageSize::PRESETS;
        let next = presets
            .iter()
            .position(|s| *s == self.size)
            .map_or(0, |i| (i + 1) % presets.len());
        self.size = presets[next];
    }

    pub fn cycle_version(&mut self) {
        let all = ShadowDriveVersion::ALL;
        let next = all
            .iter()
            .position(|v| *v == self.version)
            .map_or(0, |i| (i + 1) % all.len());
        self.version = all[next];
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A user-visible message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

/// Work requested by the view.
#[derive(Debug, Clone)]
pub enum Effect {
    Connect {
        generation: u64,
        wallet: Wallet,
    },
    FetchAccounts {
        generation: u64,
    },
    FetchFiles {
        generation: u64,
        account: Pubkey,
    },
    CreateAccount {
        name: String,
        size: StorageSize,
        version: ShadowDriveVersion,
    },
    DeleteAccount {
        account: Pubkey,
    },
    ReadFiles {
        paths: Vec<PathBuf>,
    },
    Upload {
        generation: u64,
        account: Pubkey,
        batch: Vec<(FileId, UploadFile)>,
    },
    DeleteFile {
        account: Pubkey,
        url: String,
    },
}

/// Result of a finished [`Effect`].
pub enum Outcome {
    Connected {
        generation: u64,
        result: shdw::Result<SharedClient>,
    },
    Accounts {
        generation: u64,
        result: shdw::Result<Vec<StorageAccountResponse>>,
    },
    Files {
        generation: u64,
        account: Pubkey,
        result: shdw::Result<Vec<String>>,
    },
    AccountCreated(shdw::Result<CreateStorageResponse>),
    AccountDeleted {
        account: Pubkey,
        result: shdw::Result<ShadowDriveResponse>,
    },
    FilesRead(Result<Vec<UploadFile>, String>),
    Uploaded {
        generation: u64,
        result: shdw::Result<Vec<(FileId, UploadResult)>>,
    },
    FileDeleted {
        url: String,
        result: shdw::Result<DeleteFileResponse>,
    },
}

/// An [`Outcome`] tagged with the session generation its effect ran under.
pub struct Completion {
    pub session: u64,
    pub outcome: Outcome,
}

/// Everything the drive screen shows.
pub struct DriveView {
    session: DriveSession,
    cluster: String,

    pub form: AccountForm,
    loading: bool,
    last_tx: Option<String>,

    accounts: Vec<StorageAccountResponse>,
    selected: Option<Pubkey>,
    remote_files: Vec<String>,

    local_files: Vec<LocalFile>,
    uploads: HashMap<FileId, UploadResult>,
    uploading: bool,
    next_file_id: u64,

    notices: VecDeque<Notice>,

    accounts_gen: u64,
    files_gen: u64,
    upload_gen: u64,
}

impl DriveView {
    pub fn new(version: ShadowDriveVersion, cluster: impl Into<String>) -> Self {
        Self {
            session: DriveSession::new(version),
            cluster: cluster.into(),
            form: AccountForm {
                version,
                ..AccountForm::default()
            },
            loading: false,
            last_tx: None,
            accounts: Vec::new(),
            selected: None,
            remote_files: Vec::new(),
            local_files: Vec::new(),
            uploads: HashMap::new(),
            uploading: false,
            next_file_id: 0,
            notices: VecDeque::with_capacity(MAX_NOTICES),
            accounts_gen: 0,
            files_gen: 0,
            upload_gen: 0,
        }
    }

    // ---- accessors ----

    pub fn session(&self) -> &DriveSession {
        &self.session
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    pub fn last_tx(&self) -> Option<&str> {
        self.last_tx.as_deref()
    }

    /// Last transaction signature cut to 8 characters for display.
    pub fn last_tx_short(&self) -> Option<String> {
        self.last_tx().map(|sig| match sig.char_indices().nth(8) {
            Some((end, _)) => format!("{}...", &sig[..end]),
            None => sig.to_string(),
        })
    }

    /// Explorer link for the last account-creation transaction.
    pub fn last_tx_url(&self) -> Option<String> {
        self.last_tx()
            .map(|sig| explorer_tx_url(sig, &self.cluster))
    }

    pub fn accounts(&self) -> &[StorageAccountResponse] {
        &self.accounts
    }

    pub fn selected(&self) -> Option<Pubkey> {
        self.selected
    }

    pub fn remote_files(&self) -> &[String] {
        &self.remote_files
    }

    pub fn local_files(&self) -> &[LocalFile] {
        &self.local_files
    }

    pub fn notices(&self) -> &VecDeque<Notice> {
        &self.notices
    }

    /// Local file rows with their upload status.
    pub fn file_rows(&self) -> Vec<FileRow> {
        self.local_files
            .iter()
            .enumerate()
            .map(|(index, file)| FileRow {
                index,
                name: file.name.clone(),
                status: self.file_status(file.id),
            })
            .collect()
    }

    fn file_status(&self, id: FileId) -> FileStatus {
        match self.uploads.get(&id) {
            Some(UploadResult {
                location: Some(location),
                ..
            }) => FileStatus::Uploaded(location.clone()),
            // Failed files are part of the batch being retried.
            _ if self.uploading => FileStatus::Uploading,
            Some(result) => FileStatus::Failed(
                result
                    .error
                    .clone()
                    .unwrap_or_else(|| "upload failed".to_string()),
            ),
            None => FileStatus::Pending,
        }
    }

    /// Display name and URL of each remote file.
    pub fn remote_rows(&self) -> Vec<(&str, &str)> {
        self.remote_files
            .iter()
            .map(|url| (file_name_from_url(url), url.as_str()))
            .collect()
    }

    // ---- wallet ----

    /// Connect `wallet`, resetting everything derived from a previous one.
    pub fn connect(&mut self, wallet: Wallet) -> Vec<Effect> {
        let identity = wallet.pubkey();
        let Some(generation) = self.session.begin_connect(identity) else {
            return Vec::new();
        };
        self.reset_session_state();
        self.info(format!("connecting {}", identity.short()));
        vec![Effect::Connect { generation, wallet }]
    }

    pub fn disconnect(&mut self) {
        self.session.disconnect();
        self.reset_session_state();
        self.info("wallet disconnected");
    }

    fn reset_session_state(&mut self) {
        self.loading = false;
        self.last_tx = None;
        self.accounts.clear();
        self.selected = None;
        self.remote_files.clear();
        self.uploads.clear();
        self.uploading = false;
        self.accounts_gen += 1;
        self.files_gen += 1;
        self.upload_gen += 1;
    }

    // ---- accounts ----

    pub fn refresh_accounts(&mut self) -> Vec<Effect> {
        if !self.session.is_ready() {
            return Vec::new();
        }
        self.accounts_gen += 1;
        vec![Effect::FetchAccounts {
            generation: self.accounts_gen,
        }]
    }

    /// Submit the creation form.
    pub fn create_account(&mut self) -> Vec<Effect> {
        if !self.session.is_ready() {
            self.error("connect a wallet first");
            return Vec::new();
        }
        let name = self.form.name.trim();
        if name.is_empty() {
            self.error("account name is required");
            return Vec::new();
        }
        if self.loading {
            return Vec::new();
        }
        self.loading = true;
        vec![Effect::CreateAccount {
            name: name.to_string(),
            size: self.form.size,
            version: self.form.version,
        }]
    }

    /// Select `account`; a changed selection fetches its files once.
    pub fn select_account(&mut self, account: Pubkey) -> Vec<Effect> {
        if self.selected == Some(account) {
            return Vec::new();
        }
        if !self.accounts.iter().any(|a| a.public_key == account) {
            self.error(format!("unknown storage account {}", account.short()));
            return Vec::new();
        }
        self.selected = Some(account);
        self.remote_files.clear();
        self.files_gen += 1;
        debug!(account = %account, "account selected");
        vec![Effect::FetchFiles {
            generation: self.files_gen,
            account,
        }]
    }

    pub fn delete_account(&mut self) -> Vec<Effect> {
        match self.require_account() {
            Some(account) => vec![Effect::DeleteAccount { account }],
            None => Vec::new(),
        }
    }

    fn clear_selection(&mut self) {
        self.selected = None;
        self.remote_files.clear();
        self.files_gen += 1;
    }

    // ---- files ----

    pub fn refresh_files(&mut self) -> Vec<Effect> {
        match (self.session.is_ready(), self.selected) {
            (true, Some(account)) => {
                self.files_gen += 1;
                vec![Effect::FetchFiles {
                    generation: self.files_gen,
                    account,
                }]
            }
            _ => Vec::new(),
        }
    }

    pub fn open_files(&mut self, paths: Vec<PathBuf>) -> Vec<Effect> {
        if paths.is_empty() {
            return Vec::new();
        }
        vec![Effect::ReadFiles { paths }]
    }

    /// Replace the local file selection.
    ///
    /// Results of an upload still in flight for the previous selection are
    /// dropped when they arrive.
    pub fn select_files(&mut self, files: Vec<UploadFile>) {
        self.local_files = files
            .into_iter()
            .map(|file| {
                self.next_file_id += 1;
                LocalFile {
                    id: FileId(self.next_file_id),
                    name: file.name,
                    data: file.data,
                }
            })
            .collect();
        self.uploads.clear();
        self.uploading = false;
        self.upload_gen += 1;
        self.info(format!("{} file(s) selected", self.local_files.len()));
    }

    /// Upload every selected file not yet uploaded to the selected account.
    pub fn submit_files(&mut self) -> Vec<Effect> {
        let Some(account) = self.require_account() else {
            return Vec::new();
        };
        if self.local_files.is_empty() {
            self.error("no files selected");
            return Vec::new();
        }
        if self.uploading {
            return Vec::new();
        }

        let batch: Vec<(FileId, UploadFile)> = self
            .local_files
            .iter()
            .filter(|f| !matches!(self.file_status(f.id), FileStatus::Uploaded(_)))
            .map(|f| (f.id, UploadFile::new(f.name.clone(), f.data.clone())))
            .collect();
        if batch.is_empty() {
            self.info("all selected files are already uploaded");
            return Vec::new();
        }

        self.uploading = true;
        self.upload_gen += 1;
        info!(account = %account, files = batch.len(), "uploading");
        vec![Effect::Upload {
            generation: self.upload_gen,
            account,
            batch,
        }]
    }

    pub fn delete_file(&mut self, url: &str) -> Vec<Effect> {
        match self.require_account() {
            Some(account) => vec![Effect::DeleteFile {
                account,
                url: url.to_string(),
            }],
            None => Vec::new(),
        }
    }

    /// Selected account of a connected session, or an error notice.
    fn require_account(&mut self) -> Option<Pubkey> {
        match (self.session.is_ready(), self.selected) {
            (true, Some(account)) => Some(account),
            (false, _) => {
                self.error("connect a wallet first");
                None
            }
            (true, None) => {
                self.error("select a storage account first");
                None
            }
        }
    }

    // ---- reconciliation ----

    /// Fold a finished effect into the view, returning any follow-up effects.
    pub fn apply(&mut self, completion: Completion) -> Vec<Effect> {
        if completion.session != self.session.generation() {
            debug!(
                session = completion.session,
                current = self.session.generation(),
                "discarding outcome from previous session"
            );
            return Vec::new();
        }

        match completion.outcome {
            Outcome::Connected { generation, result } => match result {
                Ok(client) => {
                    if self.session.finish_connect(generation, client) {
                        self.info("wallet connected");
                        self.refresh_accounts()
                    } else {
                        Vec::new()
                    }
                }
                Err(e) => {
                    if self.session.fail_connect(generation) {
                        self.error(format!("connection failed: {e}"));
                    }
                    Vec::new()
                }
            },

            Outcome::Accounts { generation, result } => {
                if generation != self.accounts_gen {
                    debug!(generation, current = self.accounts_gen, "stale accounts");
                    return Vec::new();
                }
                match result {
                    Ok(accounts) => {
                        self.accounts = accounts;
                        if let Some(selected) = self.selected {
                            if !self.accounts.iter().any(|a| a.public_key == selected) {
                                self.clear_selection();
                            }
                        }
                    }
                    Err(e) => self.error(format!("failed to load storage accounts: {e}")),
                }
                Vec::new()
            }

            Outcome::Files {
                generation,
                account,
                result,
            } => {
                if generation != self.files_gen || self.selected != Some(account) {
                    debug!(generation, current = self.files_gen, "stale file list");
                    return Vec::new();
                }
                match result {
                    Ok(files) => self.remote_files = files,
                    Err(e) => self.error(format!("failed to list files: {e}")),
                }
                Vec::new()
            }

            Outcome::AccountCreated(result) => {
                self.loading = false;
                match result {
                    Ok(resp) => {
                        self.info(format!(
                            "storage account created: {}",
                            resp.transaction_signature
                        ));
                        self.last_tx = Some(resp.transaction_signature);
                    }
                    Err(e) => self.error(format!("failed to create storage account: {e}")),
                }
                self.refresh_accounts()
            }

            Outcome::AccountDeleted { account, result } => match result {
                Ok(_) => {
                    self.info(format!("storage account {} deleted", account.short()));
                    if self.selected == Some(account) {
                        self.clear_selection();
                    }
                    self.refresh_accounts()
                }
                Err(e) => {
                    self.error(format!("failed to delete storage account: {e}"));
                    Vec::new()
                }
            },

            Outcome::FilesRead(result) => {
                match result {
                    Ok(files) => self.select_files(files),
                    Err(e) => self.error(format!("failed to read files: {e}")),
                }
                Vec::new()
            }

            Outcome::Uploaded { generation, result } => {
                if generation != self.upload_gen {
                    debug!(generation, current = self.upload_gen, "stale upload result");
                    return Vec::new();
                }
                self.uploading = false;
                match result {
                    Ok(results) => {
                        let mut uploaded = 0;
                        for (id, result) in results {
                            match &result.error {
                                Some(err) => {
                                    warn!(file = %result.file_name, error = %err, "upload failed");
                                    self.error(format!("{}: {err}", result.file_name));
                                }
                                None => uploaded += 1,
                            }
                            self.uploads.insert(id, result);
                        }
                        self.info(format!("{uploaded} file(s) uploaded"));
                        self.refresh_files()
                    }
                    Err(e) => {
                        self.error(format!("upload failed: {e}"));
                        Vec::new()
                    }
                }
            }

            Outcome::FileDeleted { url, result } => match result {
                Ok(_) => {
                    self.info(format!("{} deleted", file_name_from_url(&url)));
                    self.refresh_files()
                }
                Err(e) => {
                    self.error(format!("failed to delete {}: {e}", file_name_from_url(&url)));
                    Vec::new()
                }
            },
        }
    }

    // ---- notices ----

    pub fn info(&mut self, message: impl Into<String>) {
        self.push_notice(NoticeLevel::Info, message.into());
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.push_notice(NoticeLevel::Error, message.into());
    }

    fn push_notice(&mut self, level: NoticeLevel, message: String) {
        if self.notices.len() == MAX_NOTICES {
            self.notices.pop_front();
        }
        self.notices.push_back(Notice { level, message });
    }
}

/// `"<identifier> - <size> drive"` label for an account.
pub fn account_label(account: &StorageAccountResponse) -> String {
    format!(
        "{} - {} drive",
        account.account.identifier,
        bytes_to_human(account.account.storage, false, 1)
    )
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use shdw::{MockStorageClient, ShdwError};

    use super::*;

    /// A view connected to a mock client, with the initial account fetch applied.
    fn connected_view(identifiers: &[&str]) -> (DriveView, Arc<MockStorageClient>, Vec<Pubkey>) {
        let wallet = Wallet::generate();
        let (client, keys) = MockStorageClient::with_accounts(wallet.pubkey(), identifiers);
        let client = Arc::new(client);
        let mut view = DriveView::new(ShadowDriveVersion::V2, "devnet");

        let effects = view.connect(wallet);
        let generation = match effects.as_slice() {
            [Effect::Connect { generation, .. }] => *generation,
            other => panic!("expected connect effect, got {other:?}"),
        };
        let effects = view.apply(done(&view, Outcome::Connected {
            generation,
            result: Ok(client.clone()),
        }));
        let accounts_gen = fetch_accounts_gen(&effects);
        let accounts = keys
            .iter()
            .zip(identifiers)
            .map(|(key, id)| account(*key, id))
            .collect();
        view.apply(done(&view, Outcome::Accounts {
            generation: accounts_gen,
            result: Ok(accounts),
        }));
        (view, client, keys)
    }

    fn done(view: &DriveView, outcome: Outcome) -> Completion {
        Completion {
            session: view.session().generation(),
            outcome,
        }
    }

    fn account(key: Pubkey, identifier: &str) -> StorageAccountResponse {
        serde_json::from_value(serde_json::json!({
            "publicKey": key.to_string(),
            "account": {
                "identifier": identifier,
                "storage": 1073741824u64,
                "owner1": Pubkey::new([9u8; 32]).to_string(),
            }
        }))
        .unwrap()
    }

    fn fetch_accounts_gen(effects: &[Effect]) -> u64 {
        match effects {
            [Effect::FetchAccounts { generation }] => *generation,
            other => panic!("expected account fetch, got {other:?}"),
        }
    }

    fn fetch_files_gen(effects: &[Effect]) -> u64 {
        match effects {
            [Effect::FetchFiles { generation, .. }] => *generation,
            other => panic!("expected file fetch, got {other:?}"),
        }
    }

    fn last_notice(view: &DriveView) -> &Notice {
        view.notices().back().unwrap()
    }

    // ---- connection ----

    #[test]
    fn test_connect_fetches_accounts() {
        let (view, _, keys) = connected_view(&["one", "two"]);
        assert!(view.session().is_ready());
        assert_eq!(view.accounts().len(), 2);
        assert_eq!(view.accounts()[1].public_key, keys[1]);
    }

    #[test]
    fn test_reconnect_same_wallet_is_noop() {
        let wallet = Wallet::generate();
        let mut view = DriveView::new(ShadowDriveVersion::V2, "devnet");
        assert_eq!(view.connect(wallet.clone()).len(), 1);
        assert!(view.connect(wallet).is_empty());
    }

    #[test]
    fn test_disconnect_resets_session_state() {
        let (mut view, _, keys) = connected_view(&["one"]);
        view.select_account(keys[0]);
        view.disconnect();

        assert!(!view.session().is_ready());
        assert!(view.accounts().is_empty());
        assert!(view.selected().is_none());
        assert!(view.remote_files().is_empty());
        assert!(view.refresh_accounts().is_empty());
    }

    #[test]
    fn test_outcome_from_previous_session_is_discarded() {
        let (mut view, _, keys) = connected_view(&["one"]);
        let generation = fetch_accounts_gen(&view.refresh_accounts());
        let stale = Completion {
            session: view.session().generation(),
            outcome: Outcome::Accounts {
                generation,
                result: Ok(vec![account(keys[0], "one"), account(Pubkey::new([5u8; 32]), "x")]),
            },
        };
        view.disconnect();
        view.apply(stale);
        assert!(view.accounts().is_empty());
    }

    // ---- accounts ----

    #[test]
    fn test_empty_name_is_rejected_locally() {
        let (mut view, _, _) = connected_view(&[]);
        view.form.name = "   ".into();
        assert!(view.create_account().is_empty());
        assert!(!view.is_loading());
        assert_eq!(last_notice(&view).level, NoticeLevel::Error);
    }

    #[test]
    fn test_create_account_requires_connection() {
        let mut view = DriveView::new(ShadowDriveVersion::V2, "devnet");
        view.form.name = "mydrive".into();
        assert!(view.create_account().is_empty());
        assert_eq!(last_notice(&view).level, NoticeLevel::Error);
    }

    #[test]
    fn test_create_account_success_clears_loading_and_refreshes() {
        let (mut view, _, _) = connected_view(&[]);
        view.form.name = "mydrive".into();
        view.form.cycle_size();

        let effects = view.create_account();
        match effects.as_slice() {
            [Effect::CreateAccount { name, size, version }] => {
                assert_eq!(name, "mydrive");
                assert_eq!(*size, StorageSize::TEN_GB);
                assert_eq!(*version, ShadowDriveVersion::V2);
            }
            other => panic!("unexpected effects {other:?}"),
        }
        assert!(view.is_loading());
        assert!(view.create_account().is_empty());

        let effects = view.apply(done(&view, Outcome::AccountCreated(Ok(CreateStorageResponse {
            shdw_bucket: Pubkey::new([3u8; 32]).to_string(),
            transaction_signature: "5sigABCDEFGH".into(),
        }))));
        assert!(!view.is_loading());
        assert_eq!(view.last_tx(), Some("5sigABCDEFGH"));
        assert_eq!(view.last_tx_short().as_deref(), Some("5sigABCD..."));
        assert_eq!(
            view.last_tx_url().as_deref(),
            Some("https://explorer.solana.com/tx/5sigABCDEFGH?cluster=devnet")
        );
        fetch_accounts_gen(&effects);
    }

    #[test]
    fn test_create_account_failure_clears_loading() {
        let (mut view, _, _) = connected_view(&[]);
        view.form.name = "mydrive".into();
        view.create_account();

        view.apply(done(&view, Outcome::AccountCreated(Err(ShdwError::Http {
            status: 500,
            message: "boom".into(),
        }))));
        assert!(!view.is_loading());
        assert!(view.last_tx().is_none());
        assert_eq!(last_notice(&view).level, NoticeLevel::Error);
    }

    #[test]
    fn test_stale_account_list_is_discarded() {
        let (mut view, _, keys) = connected_view(&["one"]);
        let old = fetch_accounts_gen(&view.refresh_accounts());
        let new = fetch_accounts_gen(&view.refresh_accounts());

        view.apply(done(&view, Outcome::Accounts {
            generation: new,
            result: Ok(vec![account(keys[0], "one")]),
        }));
        view.apply(done(&view, Outcome::Accounts {
            generation: old,
            result: Ok(Vec::new()),
        }));
        assert_eq!(view.accounts().len(), 1);
    }

    // ---- selection ----

    #[test]
    fn test_selection_change_fetches_files_exactly_once() {
        let (mut view, _, keys) = connected_view(&["one", "two"]);
        assert_eq!(view.select_account(keys[0]).len(), 1);
        assert!(view.select_account(keys[0]).is_empty());
        assert_eq!(view.select_account(keys[1]).len(), 1);
    }

    #[test]
    fn test_late_file_list_for_old_selection_is_discarded() {
        let (mut view, _, keys) = connected_view(&["one", "two"]);
        let first = fetch_files_gen(&view.select_account(keys[0]));
        let second = fetch_files_gen(&view.select_account(keys[1]));

        view.apply(done(&view, Outcome::Files {
            generation: second,
            account: keys[1],
            result: Ok(vec!["https://cdn/two/b.json".into()]),
        }));
        view.apply(done(&view, Outcome::Files {
            generation: first,
            account: keys[0],
            result: Ok(vec!["https://cdn/one/a.json".into()]),
        }));
        assert_eq!(view.remote_files().to_vec(), vec!["https://cdn/two/b.json".to_string()]);
        assert_eq!(view.remote_rows(), vec![("b.json", "https://cdn/two/b.json")]);
    }

    #[test]
    fn test_deleting_selected_account_clears_selection() {
        let (mut view, _, keys) = connected_view(&["one"]);
        view.select_account(keys[0]);
        let effects = view.delete_account();
        assert!(matches!(effects.as_slice(), [Effect::DeleteAccount { account }] if *account == keys[0]));

        let effects = view.apply(done(&view, Outcome::AccountDeleted {
            account: keys[0],
            result: Ok(ShadowDriveResponse { txid: "tx".into() }),
        }));
        assert!(view.selected().is_none());
        fetch_accounts_gen(&effects);
    }

    #[test]
    fn test_refresh_without_selected_account_clears_selection() {
        let (mut view, _, keys) = connected_view(&["one", "two"]);
        view.select_account(keys[0]);
        let generation = fetch_accounts_gen(&view.refresh_accounts());
        view.apply(done(&view, Outcome::Accounts {
            generation,
            result: Ok(vec![account(keys[1], "two")]),
        }));
        assert!(view.selected().is_none());
    }

    // ---- uploads ----

    #[test]
    fn test_submit_without_selection_or_files_is_rejected() {
        let (mut view, _, keys) = connected_view(&["one"]);
        view.select_files(vec![UploadFile::new("a.json", b"{}".to_vec())]);
        let notices = view.notices().len();
        assert!(view.submit_files().is_empty());
        assert_eq!(view.notices().len(), notices + 1);
        assert_eq!(last_notice(&view).level, NoticeLevel::Error);
        assert_eq!(last_notice(&view).message, "select a storage account first");

        view.select_account(keys[0]);
        view.select_files(Vec::new());
        assert!(view.submit_files().is_empty());
        assert_eq!(last_notice(&view).message, "no files selected");
        assert!(!view.is_uploading());
    }

    #[test]
    fn test_submit_without_connection_is_rejected() {
        let mut view = DriveView::new(ShadowDriveVersion::V2, "devnet");
        view.select_files(vec![UploadFile::new("a.json", b"{}".to_vec())]);
        assert!(view.submit_files().is_empty());
        assert_eq!(last_notice(&view).level, NoticeLevel::Error);
        assert_eq!(last_notice(&view).message, "connect a wallet first");
    }

    #[test]
    fn test_two_files_upload_and_show_locations() {
        let (mut view, _, keys) = connected_view(&["one"]);
        view.select_account(keys[0]);
        view.select_files(vec![
            UploadFile::new("a.json", b"1".to_vec()),
            UploadFile::new("b.json", b"2".to_vec()),
        ]);

        let (generation, batch) = match view.submit_files().as_slice() {
            [Effect::Upload { generation, batch, .. }] => (*generation, batch.clone()),
            other => panic!("unexpected effects {other:?}"),
        };
        let names: Vec<&str> = batch.iter().map(|(_, f)| f.name.as_str()).collect();
        assert_eq!(names, vec!["a.json", "b.json"]);

        let effects = view.apply(done(&view, Outcome::Uploaded {
            generation,
            result: Ok(vec![
                (batch[0].0, UploadResult::uploaded("a.json", "https://cdn/one/a.json")),
                (batch[1].0, UploadResult::uploaded("b.json", "https://cdn/one/b.json")),
            ]),
        }));
        fetch_files_gen(&effects);

        let rows = view.file_rows();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "a.json");
        assert_eq!(rows[0].status, FileStatus::Uploaded("https://cdn/one/a.json".into()));
        assert_eq!(rows[1].name, "b.json");
        assert_eq!(rows[1].status, FileStatus::Uploaded("https://cdn/one/b.json".into()));
        assert!(!rows
            .iter()
            .any(|r| matches!(r.status, FileStatus::Pending | FileStatus::Uploading)));
        assert!(!view.is_uploading());
        assert_eq!(last_notice(&view).message, "2 file(s) uploaded");
    }

    #[test]
    fn test_upload_results_correlate_by_id() {
        let (mut view, _, keys) = connected_view(&["one"]);
        view.select_account(keys[0]);
        view.select_files(vec![
            UploadFile::new("a.json", b"1".to_vec()),
            UploadFile::new("a.json", b"2".to_vec()),
        ]);

        let effects = view.submit_files();
        let (generation, ids) = match effects.as_slice() {
            [Effect::Upload { generation, batch, .. }] => {
                (*generation, batch.iter().map(|(id, _)| *id).collect::<Vec<_>>())
            }
            other => panic!("unexpected effects {other:?}"),
        };
        assert!(view
            .file_rows()
            .iter()
            .all(|r| r.status == FileStatus::Uploading));

        view.apply(done(&view, Outcome::Uploaded {
            generation,
            result: Ok(vec![
                (ids[1], UploadResult::failed("a.json", "too large")),
                (ids[0], UploadResult::uploaded("a.json", "https://cdn/one/a.json")),
            ]),
        }));

        let rows = view.file_rows();
        assert_eq!(rows[0].status, FileStatus::Uploaded("https://cdn/one/a.json".into()));
        assert_eq!(rows[1].status, FileStatus::Failed("too large".into()));
        assert!(!view.is_uploading());
    }

    #[test]
    fn test_resubmit_retries_only_failed_files() {
        let (mut view, _, keys) = connected_view(&["one"]);
        view.select_account(keys[0]);
        view.select_files(vec![
            UploadFile::new("a.json", b"1".to_vec()),
            UploadFile::new("b.json", b"2".to_vec()),
        ]);
        let ids: Vec<FileId> = view.local_files().iter().map(|f| f.id).collect();
        let generation = match view.submit_files().as_slice() {
            [Effect::Upload { generation, .. }] => *generation,
            other => panic!("unexpected effects {other:?}"),
        };
        view.apply(done(&view, Outcome::Uploaded {
            generation,
            result: Ok(vec![
                (ids[0], UploadResult::uploaded("a.json", "https://cdn/one/a.json")),
                (ids[1], UploadResult::failed("b.json", "timeout")),
            ]),
        }));

        match view.submit_files().as_slice() {
            [Effect::Upload { batch, .. }] => {
                assert_eq!(batch.len(), 1);
                assert_eq!(batch[0].0, ids[1]);
            }
            other => panic!("unexpected effects {other:?}"),
        }
    }

    #[test]
    fn test_upload_result_for_replaced_selection_is_discarded() {
        let (mut view, _, keys) = connected_view(&["one"]);
        view.select_account(keys[0]);
        view.select_files(vec![UploadFile::new("a.json", b"1".to_vec())]);
        let (generation, id) = match view.submit_files().as_slice() {
            [Effect::Upload { generation, batch, .. }] => (*generation, batch[0].0),
            other => panic!("unexpected effects {other:?}"),
        };

        view.select_files(vec![UploadFile::new("b.json", b"2".to_vec())]);
        view.apply(done(&view, Outcome::Uploaded {
            generation,
            result: Ok(vec![(id, UploadResult::uploaded("a.json", "https://cdn/one/a.json"))]),
        }));
        assert_eq!(view.file_rows()[0].status, FileStatus::Pending);
    }

    // ---- remote files ----

    #[test]
    fn test_file_delete_refreshes_listing() {
        let (mut view, _, keys) = connected_view(&["one"]);
        view.select_account(keys[0]);
        let url = "https://cdn/one/a.json";
        let effects = view.delete_file(url);
        assert!(matches!(effects.as_slice(), [Effect::DeleteFile { .. }]));

        let effects = view.apply(done(&view, Outcome::FileDeleted {
            url: url.into(),
            result: Ok(DeleteFileResponse {
                message: "ok".into(),
                error: None,
            }),
        }));
        fetch_files_gen(&effects);
    }

    #[test]
    fn test_delete_file_without_selection_is_rejected() {
        let (mut view, _, _) = connected_view(&["one"]);
        let notices = view.notices().len();
        assert!(view.delete_file("https://cdn/one/a.json").is_empty());
        assert_eq!(view.notices().len(), notices + 1);
        assert_eq!(last_notice(&view).level, NoticeLevel::Error);
        assert_eq!(last_notice(&view).message, "select a storage account first");

        view.disconnect();
        assert!(view.delete_file("https://cdn/one/a.json").is_empty());
        assert_eq!(last_notice(&view).message, "connect a wallet first");
    }

    // ---- rendering helpers ----

    #[test]
    fn test_account_label() {
        let label = account_label(&account(Pubkey::new([1u8; 32]), "mydrive"));
        assert_eq!(label, "mydrive - 1.0 GiB drive");
    }

    #[test]
    fn test_form_cycles_wrap_around() {
        let mut form = AccountForm::default();
        for _ in 0..StorageSize::PRESETS.len() {
            form.cycle_size();
        }
        assert_eq!(form.size, StorageSize::ONE_GB);
        form.cycle_version();
        assert_eq!(form.version, ShadowDriveVersion::V1);
    }

    #[test]
    fn test_notices_are_bounded() {
        let mut view = DriveView::new(ShadowDriveVersion::V2, "devnet");
        for i in 0..(MAX_NOTICES + 10) {
            view.info(format!("n{i}"));
        }
        assert_eq!(view.notices().len(), MAX_NOTICES);
        assert_eq!(view.notices().back().unwrap().message, format!("n{}", MAX_NOTICES + 9));
    }
}
