use async_trait::async_trait;
use tracing::{debug, info};

use crate::config::ShdwConfig;
use crate::error::{Result, ShdwError};
use crate::rest::endpoints::{
    CreateAccountRequest, DeleteAccountRequest, DeleteFileRequest, ListAccountsRequest,
    UploadRequest,
};
use crate::rest::ShdwHttpClient;
use crate::signing;
use crate::storage::StorageClient;
use crate::types::*;
use crate::utils::{file_name_from_url, file_url};
use crate::wallet::Wallet;

/// Main Shadow Drive client bound to one wallet identity.
#[derive(Debug, Clone)]
pub struct ShdwDrive {
    /// Base URL for resolved file locations.
    pub cdn_url: String,
    /// HTTP client.
    pub http_client: ShdwHttpClient,
    wallet: Wallet,
}

impl ShdwDrive {
    /// Create a client for `wallet`.
    pub fn new(config: ShdwConfig, wallet: Wallet) -> Self {
        info!(
            endpoint = %config.endpoint,
            owner = %wallet.pubkey().short(),
            "shadow drive client ready"
        );
        Self {
            cdn_url: config.cdn_url,
            http_client: ShdwHttpClient::new(&config.endpoint),
            wallet,
        }
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    /// Pair each submitted file with its finalized location or upload error.
    fn correlate_upload(
        &self,
        account: &Pubkey,
        files: &[UploadFile],
        resp: &UploadResponse,
    ) -> Vec<UploadResult> {
        files
            .iter()
            .map(|file| {
                let expected = file_url(&self.cdn_url, account, &file.name).ok();
                let location = resp.finalized_locations.iter().find(|loc| {
                    expected.as_deref() == Some(loc.as_str())
                        || file_name_from_url(loc) == file.name
                });
                if let Some(loc) = location {
                    return UploadResult::uploaded(&file.name, loc);
                }
                let error = resp
                    .upload_errors
                    .iter()
                    .find(|e| e.file == file.name)
                    .map(|e| e.error.clone())
                    .unwrap_or_else(|| "no location returned".to_string());
                UploadResult::failed(&file.name, error)
            })
            .collect()
    }
}

#[async_trait]
impl StorageClient for ShdwDrive {
    fn owner(&self) -> Pubkey {
        self.wallet.pubkey()
    }

    fn file_url(&self, account: &Pubkey, file_name: &str) -> Result<String> {
        file_url(&self.cdn_url, account, file_name)
    }

    async fn get_storage_accounts(
        &self,
        version: ShadowDriveVersion,
    ) -> Result<Vec<StorageAccountResponse>> {
        let owner = self.owner();
        self.http_client
            .list_storage_accounts(&ListAccountsRequest {
                owner: &owner,
                version,
            })
            .await
    }

    async fn create_storage_account(
        &self,
        name: &str,
        size: StorageSize,
        version: ShadowDriveVersion,
    ) -> Result<CreateStorageResponse> {
        if name.trim().is_empty() {
            return Err(ShdwError::Validation("storage account name is empty".into()));
        }
        let owner = self.owner();
        let signature = self
            .wallet
            .sign_message(&signing::create_account_message(&owner, name, &size));

        let resp = self
            .http_client
            .create_storage_account(&CreateAccountRequest {
                name,
                size,
                owner: &owner,
                version,
                signature,
            })
            .await?;
        info!(
            account_name = name,
            %size,
            bucket = %resp.shdw_bucket,
            tx = %resp.transaction_signature,
            "storage account created"
        );
        Ok(resp)
    }

    async fn delete_storage_account(
        &self,
        account: &Pubkey,
        version: ShadowDriveVersion,
    ) -> Result<ShadowDriveResponse> {
        let owner = self.owner();
        let signature = self
            .wallet
            .sign_message(&signing::delete_account_message(account));

        self.http_client
            .delete_storage_account(&DeleteAccountRequest {
                storage_account: account,
                owner: &owner,
                version,
                signature,
            })
            .await
    }

    async fn upload_files(
        &self,
        account: &Pubkey,
        files: &[UploadFile],
    ) -> Result<Vec<UploadResult>> {
        if files.is_empty() {
            return Ok(Vec::new());
        }

        let names: Vec<&str> = files.iter().map(|f| f.name.as_str()).collect();
        let message = self
            .wallet
            .sign_message(&signing::upload_message(account, &names));
        let signer = self.owner();

        let resp = self
            .http_client
            .upload(UploadRequest {
                storage_account: account,
                signer: &signer,
                message,
                files,
            })
            .await?;
        debug!(
            finalized = resp.finalized_locations.len(),
            errors = resp.upload_errors.len(),
            "upload response"
        );

        Ok(self.correlate_upload(account, files, &resp))
    }

    async fn list_objects(&self, account: &Pubkey) -> Result<ListObjectsResponse> {
        self.http_client.list_objects(account).await
    }

    async fn delete_file(
        &self,
        account: &Pubkey,
        url: &str,
        _version: ShadowDriveVersion,
    ) -> Result<DeleteFileResponse> {
        let signer = self.owner();
        let message = self
            .wallet
            .sign_message(&signing::delete_file_message(account, url));

        let resp = self
            .http_client
            .delete_file(&DeleteFileRequest {
                message,
                signer: &signer,
                location: url,
            })
            .await?;

        if let Some(error) = &resp.error {
            return Err(ShdwError::Validation(format!("delete {url}: {error}")));
        }
        Ok(resp)
    }
}
