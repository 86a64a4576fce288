use async_trait::async_trait;

use crate::error::Result;
use crate::types::*;

/// Operations the drive application needs from the storage network.
///
/// [`ShdwDrive`](crate::ShdwDrive) implements this against the REST gateway;
/// the `mock` feature provides an in-memory implementation for tests.
#[async_trait]
pub trait StorageClient: Send + Sync {
    /// Identity the client signs requests with.
    fn owner(&self) -> Pubkey;

    /// Resolved location of `file_name` under `account`.
    fn file_url(&self, account: &Pubkey, file_name: &str) -> Result<String>;

    /// All storage accounts owned by [`owner`](Self::owner).
    async fn get_storage_accounts(
        &self,
        version: ShadowDriveVersion,
    ) -> Result<Vec<StorageAccountResponse>>;

    async fn create_storage_account(
        &self,
        name: &str,
        size: StorageSize,
        version: ShadowDriveVersion,
    ) -> Result<CreateStorageResponse>;

    async fn delete_storage_account(
        &self,
        account: &Pubkey,
        version: ShadowDriveVersion,
    ) -> Result<ShadowDriveResponse>;

    /// Upload a batch. The returned results are index-aligned with `files`.
    async fn upload_files(&self, account: &Pubkey, files: &[UploadFile])
        -> Result<Vec<UploadResult>>;

    async fn list_objects(&self, account: &Pubkey) -> Result<ListObjectsResponse>;

    async fn delete_file(
        &self,
        account: &Pubkey,
        url: &str,
        version: ShadowDriveVersion,
    ) -> Result<DeleteFileResponse>;
}
