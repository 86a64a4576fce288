/// Storage gateway used for account and object operations.
pub const SHDW_DRIVE_ENDPOINT: &str = "https://shadow-storage.genesysgo.net";

/// Public CDN that serves uploaded objects.
pub const SHDW_DRIVE_CDN: &str = "https://shdw-drive.genesysgo.net";

/// Configuration for the Shadow Drive client.
#[derive(Debug, Clone)]
pub struct ShdwConfig {
    /// Base URL for the storage gateway.
    pub endpoint: String,
    /// Base URL that resolved file locations are built from.
    pub cdn_url: String,
}

impl Default for ShdwConfig {
    fn default() -> Self {
        Self {
            endpoint: SHDW_DRIVE_ENDPOINT.into(),
            cdn_url: SHDW_DRIVE_CDN.into(),
        }
    }
}
