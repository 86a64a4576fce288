//! Storage client lifecycle and the read-side drive operations.
//!
//! [`DriveSession`] owns the connection state machine. Every change of wallet
//! identity re-enters `Connecting` under a new generation, so a client built
//! for an older identity can never be installed.

use std::sync::Arc;

use async_trait::async_trait;
use shdw::{
    CreateStorageResponse, DeleteFileResponse, Pubkey, ShadowDriveResponse, ShadowDriveVersion,
    ShdwConfig, ShdwDrive, ShdwError, StorageAccountResponse, StorageClient, StorageSize,
    UploadFile, UploadResult, Wallet,
};
use tracing::{debug, info, warn};

use crate::view::FileId;

/// Protocol version for listing, get-or-create and deletions. Only the
/// creation form picks its own version.
pub const ACCOUNT_VERSION: ShadowDriveVersion = ShadowDriveVersion::V2;

/// Shared handle to a connected storage client.
pub type SharedClient = Arc<dyn StorageClient>;

/// Builds a storage client for a connected wallet.
#[async_trait]
pub trait ClientFactory: Send + Sync {
    async fn connect(&self, wallet: &Wallet) -> shdw::Result<SharedClient>;
}

/// Factory for the REST-backed [`ShdwDrive`] client.
#[derive(Debug, Clone)]
pub struct ShdwFactory {
    pub config: ShdwConfig,
}

#[async_trait]
impl ClientFactory for ShdwFactory {
    async fn connect(&self, wallet: &Wallet) -> shdw::Result<SharedClient> {
        Ok(Arc::new(ShdwDrive::new(self.config.clone(), wallet.clone())))
    }
}

/// Connection state of the drive.
#[derive(Clone)]
pub enum ClientState {
    Disconnected,
    Connecting {
        identity: Pubkey,
        generation: u64,
    },
    Ready {
        identity: Pubkey,
        client: SharedClient,
    },
}

impl ClientState {
    pub fn label(&self) -> &'static str {
        match self {
            ClientState::Disconnected => "disconnected",
            ClientState::Connecting { .. } => "connecting",
            ClientState::Ready { .. } => "ready",
        }
    }
}

/// Single owner of the storage client and its connection lifecycle.
pub struct DriveSession {
    state: ClientState,
    generation: u64,
    version: ShadowDriveVersion,
}

impl DriveSession {
    pub fn new(version: ShadowDriveVersion) -> Self {
        Self {
            state: ClientState::Disconnected,
            generation: 0,
            version,
        }
    }

    pub fn state(&self) -> &ClientState {
        &self.state
    }

    /// Bumped on every connect and disconnect.
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Default version for newly created accounts.
    pub fn version(&self) -> ShadowDriveVersion {
        self.version
    }

    pub fn identity(&self) -> Option<Pubkey> {
        match &self.state {
            ClientState::Disconnected => None,
            ClientState::Connecting { identity, .. } | ClientState::Ready { identity, .. } => {
                Some(*identity)
            }
        }
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ClientState::Ready { .. })
    }

    /// Cheap handle for running client operations off the session.
    pub fn handle(&self) -> Option<DriveHandle> {
        match &self.state {
            ClientState::Ready { client, .. } => Some(DriveHandle {
                client: Arc::clone(client),
            }),
            _ => None,
        }
    }

    /// Start connecting `identity`.
    ///
    /// Returns the generation the resulting client must be installed under,
    /// or `None` if this identity is already connecting or connected.
    pub fn begin_connect(&mut self, identity: Pubkey) -> Option<u64> {
        if self.identity() == Some(identity) {
            return None;
        }
        self.generation += 1;
        self.state = ClientState::Connecting {
            identity,
            generation: self.generation,
        };
        debug!(identity = %identity.short(), generation = self.generation, "connecting");
        Some(self.generation)
    }

    /// Install `client` if `generation` is still the pending connection.
    pub fn finish_connect(&mut self, generation: u64, client: SharedClient) -> bool {
        match &self.state {
            ClientState::Connecting {
                identity,
                generation: pending,
            } if *pending == generation => {
                let identity = *identity;
                info!(identity = %identity.short(), "storage client ready");
                self.state = ClientState::Ready { identity, client };
                true
            }
            _ => {
                debug!(generation, current = self.generation, "discarding stale client");
                false
            }
        }
    }

    /// Abandon the pending connection if `generation` is still current.
    pub fn fail_connect(&mut self, generation: u64) -> bool {
        match self.state {
            ClientState::Connecting {
                generation: pending,
                ..
            } if pending == generation => {
                self.state = ClientState::Disconnected;
                true
            }
            _ => false,
        }
    }

    pub fn disconnect(&mut self) {
        if !matches!(self.state, ClientState::Disconnected) {
            info!("wallet disconnected");
        }
        self.generation += 1;
        self.state = ClientState::Disconnected;
    }

    /// Connect `wallet` and wait for the client.
    pub async fn connect(
        &mut self,
        wallet: &Wallet,
        factory: &dyn ClientFactory,
    ) -> shdw::Result<()> {
        let Some(generation) = self.begin_connect(wallet.pubkey()) else {
            return Ok(());
        };
        match factory.connect(wallet).await {
            Ok(client) => {
                self.finish_connect(generation, client);
                Ok(())
            }
            Err(e) => {
                self.fail_connect(generation);
                Err(e)
            }
        }
    }

    // --- Drive queries ---

    /// Accounts owned by the connected wallet; empty when not connected.
    pub async fn get_storage_accounts(&self) -> shdw::Result<Vec<StorageAccountResponse>> {
        match self.handle() {
            Some(handle) => handle.get_storage_accounts().await,
            None => Ok(Vec::new()),
        }
    }

    /// URL of `file_name` under `account`, or `None` if no object matches.
    ///
    /// # Errors
    ///
    /// [`ShdwError::NotConnected`] without a client, [`ShdwError::InvalidPubkey`]
    /// when `account` is not a valid key.
    pub async fn find_url_by_file_name(
        &self,
        file_name: &str,
        account: &str,
    ) -> shdw::Result<Option<String>> {
        let handle = self.handle().ok_or(ShdwError::NotConnected)?;
        let account: Pubkey = account.parse()?;
        handle.find_url_by_file_name(file_name, &account).await
    }

    pub async fn get_or_create_storage_account_by_name(
        &self,
        name: &str,
    ) -> shdw::Result<StorageAccountResponse> {
        let handle = self.handle().ok_or(ShdwError::NotConnected)?;
        handle.get_or_create_storage_account_by_name(name).await
    }

    /// Every file under `account` as a resolved URL; empty when not connected.
    pub async fn get_all_files(&self, account: &Pubkey) -> shdw::Result<Vec<String>> {
        match self.handle() {
            Some(handle) => handle.get_all_files(account).await,
            None => Ok(Vec::new()),
        }
    }
}

/// Connected client, cloned into spawned tasks.
#[derive(Clone)]
pub struct DriveHandle {
    client: SharedClient,
}

impl DriveHandle {
    pub async fn get_storage_accounts(&self) -> shdw::Result<Vec<StorageAccountResponse>> {
        self.client.get_storage_accounts(ACCOUNT_VERSION).await
    }

    pub async fn find_url_by_file_name(
        &self,
        file_name: &str,
        account: &Pubkey,
    ) -> shdw::Result<Option<String>> {
        let objects = self.client.list_objects(account).await?;
        objects
            .keys
            .iter()
            .find(|key| key.as_str() == file_name)
            .map(|key| self.client.file_url(account, key))
            .transpose()
    }

    /// Find the account named `name`, creating a 1GB account if none exists.
    ///
    /// A freshly created account is looked up again so the caller always
    /// receives the account record, never a placeholder.
    pub async fn get_or_create_storage_account_by_name(
        &self,
        name: &str,
    ) -> shdw::Result<StorageAccountResponse> {
        let accounts = self.get_storage_accounts().await?;
        if let Some(existing) = accounts.into_iter().find(|a| a.account.identifier == name) {
            return Ok(existing);
        }

        let created = self
            .client
            .create_storage_account(name, StorageSize::ONE_GB, ACCOUNT_VERSION)
            .await
            .map_err(|e| {
                warn!(error = %e, account_name = name, "storage account creation failed");
                ShdwError::AccountCreation(e.to_string())
            })?;
        let bucket: Option<Pubkey> = created.shdw_bucket.parse().ok();

        let accounts = self.get_storage_accounts().await?;
        accounts
            .into_iter()
            .find(|a| Some(a.public_key) == bucket || a.account.identifier == name)
            .ok_or_else(|| ShdwError::AccountNotFound(name.to_string()))
    }

    pub async fn get_all_files(&self, account: &Pubkey) -> shdw::Result<Vec<String>> {
        let objects = self.client.list_objects(account).await?;
        objects
            .keys
            .iter()
            .map(|key| self.client.file_url(account, key))
            .collect()
    }

    pub async fn create_storage_account(
        &self,
        name: &str,
        size: StorageSize,
        version: ShadowDriveVersion,
    ) -> shdw::Result<CreateStorageResponse> {
        self.client.create_storage_account(name, size, version).await
    }

    pub async fn delete_storage_account(&self, account: &Pubkey) -> shdw::Result<ShadowDriveResponse> {
        self.client.delete_storage_account(account, ACCOUNT_VERSION).await
    }

    /// Upload a batch, pairing every result with the id it was submitted under.
    pub async fn upload_batch(
        &self,
        account: &Pubkey,
        batch: Vec<(FileId, UploadFile)>,
    ) -> shdw::Result<Vec<(FileId, UploadResult)>> {
        let (ids, files): (Vec<FileId>, Vec<UploadFile>) = batch.into_iter().unzip();
        let mut results = self.client.upload_files(account, &files).await?.into_iter();

        Ok(ids
            .into_iter()
            .zip(files.iter())
            .map(|(id, file)| {
                let result = results
                    .next()
                    .unwrap_or_else(|| UploadResult::failed(&file.name, "no result returned"));
                (id, result)
            })
            .collect())
    }

    pub async fn delete_file(&self, account: &Pubkey, url: &str) -> shdw::Result<DeleteFileResponse> {
        self.client.delete_file(account, url, ACCOUNT_VERSION).await
    }
}
