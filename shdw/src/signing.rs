//! Text messages the storage gateway expects to be signed by the owner.
//!
//! Every message starts with the same header line so a wallet prompt makes
//! the origin obvious.

use sha2::{Digest, Sha256};

use crate::types::{Pubkey, StorageSize};

pub const MESSAGE_HEADER: &str = "Shadow Drive Signed Message:";

/// Hex sha256 digest of the comma-joined file names of an upload batch.
pub fn hash_file_names(file_names: &[&str]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(file_names.join(",").as_bytes());
    hex::encode(hasher.finalize())
}

pub fn upload_message(storage_account: &Pubkey, file_names: &[&str]) -> String {
    format!(
        "{MESSAGE_HEADER}\nStorage Account: {storage_account}\nUpload files with hash: {}",
        hash_file_names(file_names)
    )
}

pub fn delete_file_message(storage_account: &Pubkey, url: &str) -> String {
    format!("{MESSAGE_HEADER}\nStorageAccount: {storage_account}\nFile to delete: {url}")
}

pub fn create_account_message(owner: &Pubkey, name: &str, size: &StorageSize) -> String {
    format!("{MESSAGE_HEADER}\nCreate storage account: {name}\nSize: {size}\nOwner: {owner}")
}

pub fn delete_account_message(storage_account: &Pubkey) -> String {
    format!("{MESSAGE_HEADER}\nDelete storage account: {storage_account}")
}
