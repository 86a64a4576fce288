use thiserror::Error;

#[derive(Error, Debug)]
pub enum ShdwError {
    #[error("HTTP error {status}: {message}")]
    Http { status: u16, message: String },

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("url error: {0}")]
    Url(#[from] url::ParseError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("invalid public key: {0}")]
    InvalidPubkey(String),

    #[error("invalid storage size: {0}")]
    InvalidSize(String),

    #[error("storage client not connected")]
    NotConnected,

    #[error("storage account not found: {0}")]
    AccountNotFound(String),

    #[error("error creating storage account: {0}")]
    AccountCreation(String),

    #[error("upload failed for {file}: {message}")]
    Upload { file: String, message: String },

    #[error("validation error: {0}")]
    Validation(String),
}

pub type Result<T> = std::result::Result<T, ShdwError>;
