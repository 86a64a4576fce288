use serde::{Deserialize, Serialize};

use super::pubkey::Pubkey;

/// On-chain storage account record as reported by the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccount {
    pub identifier: String,
    /// Reserved capacity in bytes.
    pub storage: u64,
    pub owner1: Pubkey,
    #[serde(default)]
    pub immutable: bool,
    #[serde(default)]
    pub to_be_deleted: bool,
    #[serde(default)]
    pub delete_request_epoch: u32,
    #[serde(default)]
    pub creation_time: u32,
    #[serde(default)]
    pub creation_epoch: u32,
    #[serde(default)]
    pub last_fee_epoch: u32,
    #[serde(default)]
    pub account_counter_seed: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StorageAccountResponse {
    pub public_key: Pubkey,
    pub account: StorageAccount,
}
