use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriveError {
    #[error(transparent)]
    Shdw(#[from] shdw::ShdwError),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("file not found: {0}")]
    FileNotFound(String),

    #[error("terminal error: {0}")]
    Terminal(String),
}
