mod account;
mod enums;
mod object;
mod pubkey;
mod response;
mod size;
mod upload;

pub use account::{StorageAccount, StorageAccountResponse};
pub use enums::ShadowDriveVersion;
pub use object::ListObjectsResponse;
pub use pubkey::Pubkey;
pub use response::{CreateStorageResponse, DeleteFileResponse, ShadowDriveResponse};
pub use size::{SizeUnit, StorageSize};
pub use upload::{UploadError, UploadFile, UploadResponse, UploadResult};
