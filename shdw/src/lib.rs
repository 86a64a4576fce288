pub mod client;
pub mod config;
pub mod error;
pub mod rest;
pub mod signing;
pub mod storage;
pub mod types;
pub mod utils;
pub mod wallet;

#[cfg(feature = "mock")]
pub mod mock;

// ---- Top-level re-exports for ergonomic usage ----

// Client + seam
pub use client::ShdwDrive;
pub use config::{ShdwConfig, SHDW_DRIVE_CDN, SHDW_DRIVE_ENDPOINT};
pub use error::{Result, ShdwError};
pub use storage::StorageClient;
pub use wallet::Wallet;

// REST client
pub use rest::ShdwHttpClient;

// Accounts
pub use types::{Pubkey, ShadowDriveVersion, SizeUnit, StorageAccount, StorageAccountResponse, StorageSize};

// Objects + uploads
pub use types::{ListObjectsResponse, UploadError, UploadFile, UploadResponse, UploadResult};

// Mutation responses
pub use types::{CreateStorageResponse, DeleteFileResponse, ShadowDriveResponse};

#[cfg(feature = "mock")]
pub use mock::{MockCall, MockOp, MockStorageClient};
