use serde::{Deserialize, Serialize};

/// Result of a storage account creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateStorageResponse {
    /// Public key of the new storage account.
    pub shdw_bucket: String,
    pub transaction_signature: String,
}

/// Generic acknowledgement for account-level mutations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShadowDriveResponse {
    pub txid: String,
}

/// Response of `POST /delete-file`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeleteFileResponse {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
