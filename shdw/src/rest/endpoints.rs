use reqwest::multipart::{Form, Part};
use serde::Serialize;

use crate::error::Result;
use crate::rest::ShdwHttpClient;
use crate::types::*;

#[derive(Debug, Clone, Serialize)]
pub struct ListAccountsRequest<'a> {
    pub owner: &'a Pubkey,
    pub version: ShadowDriveVersion,
}

#[derive(Debug, Clone, Serialize)]
pub struct CreateAccountRequest<'a> {
    pub name: &'a str,
    pub size: StorageSize,
    pub owner: &'a Pubkey,
    pub version: ShadowDriveVersion,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteAccountRequest<'a> {
    pub storage_account: &'a Pubkey,
    pub owner: &'a Pubkey,
    pub version: ShadowDriveVersion,
    pub signature: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct ListObjectsRequest<'a> {
    storage_account: &'a Pubkey,
}

#[derive(Debug, Clone, Serialize)]
pub struct DeleteFileRequest<'a> {
    pub message: String,
    pub signer: &'a Pubkey,
    pub location: &'a str,
}

/// Signed upload batch for one storage account.
#[derive(Debug)]
pub struct UploadRequest<'a> {
    pub storage_account: &'a Pubkey,
    pub signer: &'a Pubkey,
    pub message: String,
    pub files: &'a [UploadFile],
}

impl ShdwHttpClient {
    // --- Storage accounts ---

    /// POST /storage-accounts - Accounts owned by `owner`.
    pub async fn list_storage_accounts(
        &self,
        req: &ListAccountsRequest<'_>,
    ) -> Result<Vec<StorageAccountResponse>> {
        self.post_json("/storage-accounts", req).await
    }

    /// POST /storage-account - Create a storage account.
    pub async fn create_storage_account(
        &self,
        req: &CreateAccountRequest<'_>,
    ) -> Result<CreateStorageResponse> {
        self.post_json("/storage-account", req).await
    }

    /// POST /storage-account/delete - Request deletion of a storage account.
    pub async fn delete_storage_account(
        &self,
        req: &DeleteAccountRequest<'_>,
    ) -> Result<ShadowDriveResponse> {
        self.post_json("/storage-account/delete", req).await
    }

    // --- Objects ---

    /// POST /list-objects - Object names stored under an account.
    pub async fn list_objects(&self, storage_account: &Pubkey) -> Result<ListObjectsResponse> {
        self.post_json("/list-objects", &ListObjectsRequest { storage_account })
            .await
    }

    /// POST /delete-file - Delete one object by its URL.
    pub async fn delete_file(&self, req: &DeleteFileRequest<'_>) -> Result<DeleteFileResponse> {
        self.post_json("/delete-file", req).await
    }

    /// POST /upload - Multipart upload of a batch of files.
    pub async fn upload(&self, req: UploadRequest<'_>) -> Result<UploadResponse> {
        let names: Vec<&str> = req.files.iter().map(|f| f.name.as_str()).collect();

        let mut form = Form::new();
        for file in req.files {
            let part = Part::bytes(file.data.clone())
                .file_name(file.name.clone())
                .mime_str(&file.content_type)?;
            form = form.part("file", part);
        }
        let form = form
            .text("message", req.message)
            .text("signer", req.signer.to_string())
            .text("storage_account", req.storage_account.to_string())
            .text("fileNames", names.join(","));

        self.post_multipart("/upload", form).await
    }
}
