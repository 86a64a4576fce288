//! In-memory storage client for testing.

use std::collections::{BTreeMap, HashSet};
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{Result, ShdwError};
use crate::storage::StorageClient;
use crate::types::*;
use crate::utils::file_url;

const MOCK_CDN: &str = "https://shdw-drive.genesysgo.net";

/// Operation kinds, used both for recording calls and for injecting failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MockOp {
    ListAccounts,
    CreateAccount,
    DeleteAccount,
    Upload,
    ListObjects,
    DeleteFile,
}

/// A recorded call with its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MockCall {
    ListAccounts(ShadowDriveVersion),
    CreateAccount {
        name: String,
        size: StorageSize,
        version: ShadowDriveVersion,
    },
    DeleteAccount {
        account: Pubkey,
        version: ShadowDriveVersion,
    },
    Upload {
        account: Pubkey,
        files: Vec<String>,
    },
    ListObjects(Pubkey),
    DeleteFile {
        account: Pubkey,
        url: String,
        version: ShadowDriveVersion,
    },
}

impl MockCall {
    pub fn op(&self) -> MockOp {
        match self {
            MockCall::ListAccounts(_) => MockOp::ListAccounts,
            MockCall::CreateAccount { .. } => MockOp::CreateAccount,
            MockCall::DeleteAccount { .. } => MockOp::DeleteAccount,
            MockCall::Upload { .. } => MockOp::Upload,
            MockCall::ListObjects(_) => MockOp::ListObjects,
            MockCall::DeleteFile { .. } => MockOp::DeleteFile,
        }
    }
}

#[derive(Default)]
struct MockState {
    accounts: Vec<StorageAccountResponse>,
    objects: BTreeMap<Pubkey, Vec<String>>,
    calls: Vec<MockCall>,
    failing: HashSet<MockOp>,
    next_seed: u32,
}

/// In-memory [`StorageClient`].
///
/// Accounts and objects live behind a [`Mutex`], so every trait method works
/// on `&self`. Created accounts get deterministic keys derived from a counter.
pub struct MockStorageClient {
    owner: Pubkey,
    state: Mutex<MockState>,
}

impl MockStorageClient {
    pub fn new(owner: Pubkey) -> Self {
        Self {
            owner,
            state: Mutex::new(MockState::default()),
        }
    }

    /// Pre-populate accounts by identifier; returns their keys in order.
    pub fn with_accounts(owner: Pubkey, identifiers: &[&str]) -> (Self, Vec<Pubkey>) {
        let client = Self::new(owner);
        let keys = identifiers
            .iter()
            .map(|id| client.insert_account(id, StorageSize::ONE_GB))
            .collect();
        (client, keys)
    }

    /// Add an account directly, bypassing call recording.
    pub fn insert_account(&self, identifier: &str, size: StorageSize) -> Pubkey {
        let mut state = self.lock();
        state.next_seed += 1;
        let seed = state.next_seed;

        let mut bytes = [0u8; 32];
        bytes[..4].copy_from_slice(&seed.to_le_bytes());
        bytes[4..].copy_from_slice(&self.owner.as_bytes()[4..]);
        let key = Pubkey::new(bytes);

        state.accounts.push(StorageAccountResponse {
            public_key: key,
            account: StorageAccount {
                identifier: identifier.to_string(),
                storage: size.bytes(),
                owner1: self.owner,
                immutable: false,
                to_be_deleted: false,
                delete_request_epoch: 0,
                creation_time: 0,
                creation_epoch: 0,
                last_fee_epoch: 0,
                account_counter_seed: seed,
            },
        });
        state.objects.entry(key).or_default();
        key
    }

    /// Add an object directly, bypassing call recording.
    pub fn insert_object(&self, account: &Pubkey, name: &str) {
        self.lock()
            .objects
            .entry(*account)
            .or_default()
            .push(name.to_string());
    }

    /// Make every subsequent call of `op` fail until [`recover`](Self::recover).
    pub fn fail(&self, op: MockOp) {
        self.lock().failing.insert(op);
    }

    pub fn recover(&self, op: MockOp) {
        self.lock().failing.remove(&op);
    }

    pub fn calls(&self) -> Vec<MockCall> {
        self.lock().calls.clone()
    }

    pub fn count(&self, op: MockOp) -> usize {
        self.lock().calls.iter().filter(|c| c.op() == op).count()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Record `call`, then fail if its op is marked failing.
    fn record(&self, call: MockCall) -> Result<()> {
        let mut state = self.lock();
        let op = call.op();
        state.calls.push(call);
        if state.failing.contains(&op) {
            return Err(ShdwError::Http {
                status: 500,
                message: format!("mock failure: {op:?}"),
            });
        }
        Ok(())
    }
}

#[async_trait]
impl StorageClient for MockStorageClient {
    fn owner(&self) -> Pubkey {
        self.owner
    }

    fn file_url(&self, account: &Pubkey, file_name: &str) -> Result<String> {
        file_url(MOCK_CDN, account, file_name)
    }

    async fn get_storage_accounts(
        &self,
        version: ShadowDriveVersion,
    ) -> Result<Vec<StorageAccountResponse>> {
        self.record(MockCall::ListAccounts(version))?;
        Ok(self.lock().accounts.clone())
    }

    async fn create_storage_account(
        &self,
        name: &str,
        size: StorageSize,
        version: ShadowDriveVersion,
    ) -> Result<CreateStorageResponse> {
        self.record(MockCall::CreateAccount {
            name: name.to_string(),
            size,
            version,
        })?;
        let key = self.insert_account(name, size);
        Ok(CreateStorageResponse {
            shdw_bucket: key.to_string(),
            transaction_signature: format!("tx-create-{key}"),
        })
    }

    async fn delete_storage_account(
        &self,
        account: &Pubkey,
        version: ShadowDriveVersion,
    ) -> Result<ShadowDriveResponse> {
        self.record(MockCall::DeleteAccount {
            account: *account,
            version,
        })?;
        let mut state = self.lock();
        let before = state.accounts.len();
        state.accounts.retain(|a| a.public_key != *account);
        if state.accounts.len() == before {
            return Err(ShdwError::AccountNotFound(account.to_string()));
        }
        state.objects.remove(account);
        Ok(ShadowDriveResponse {
            txid: format!("tx-delete-{account}"),
        })
    }

    async fn upload_files(
        &self,
        account: &Pubkey,
        files: &[UploadFile],
    ) -> Result<Vec<UploadResult>> {
        self.record(MockCall::Upload {
            account: *account,
            files: files.iter().map(|f| f.name.clone()).collect(),
        })?;
        let mut results = Vec::with_capacity(files.len());
        for file in files {
            let location = self.file_url(account, &file.name)?;
            let mut state = self.lock();
            let objects = state.objects.entry(*account).or_default();
            if !objects.contains(&file.name) {
                objects.push(file.name.clone());
            }
            results.push(UploadResult::uploaded(&file.name, location));
        }
        Ok(results)
    }

    async fn list_objects(&self, account: &Pubkey) -> Result<ListObjectsResponse> {
        self.record(MockCall::ListObjects(*account))?;
        let keys = self.lock().objects.get(account).cloned().unwrap_or_default();
        Ok(ListObjectsResponse { keys })
    }

    async fn delete_file(
        &self,
        account: &Pubkey,
        url: &str,
        version: ShadowDriveVersion,
    ) -> Result<DeleteFileResponse> {
        self.record(MockCall::DeleteFile {
            account: *account,
            url: url.to_string(),
            version,
        })?;
        let name = crate::utils::file_name_from_url(url).to_string();
        if let Some(objects) = self.lock().objects.get_mut(account) {
            objects.retain(|o| *o != name);
        }
        Ok(DeleteFileResponse {
            message: format!("deleted {url}"),
            error: None,
        })
    }
}
