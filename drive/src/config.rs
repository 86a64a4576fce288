//! Drive application configuration.

use std::path::PathBuf;

use shdw::{ShadowDriveVersion, ShdwConfig, Wallet, SHDW_DRIVE_CDN, SHDW_DRIVE_ENDPOINT};

use crate::error::DriveError;

/// Everything needed to reach the storage gateway and load a wallet.
///
/// Use [`Default::default()`] for mainnet settings, then layer environment
/// variables with [`DriveConfig::with_env`] and CLI flags on top.
#[derive(Debug, Clone)]
pub struct DriveConfig {
    /// Storage gateway base URL.
    pub endpoint: String,
    /// Base URL that file locations resolve against.
    pub cdn_url: String,
    /// Default protocol version for new accounts.
    pub version: ShadowDriveVersion,
    /// Explorer cluster used for transaction links.
    pub cluster: String,
    /// bs58 private key (32-byte secret or 64-byte keypair).
    pub private_key: Option<String>,
    /// JSON byte-array keypair file, used when no private key is set.
    pub keypair_path: Option<PathBuf>,
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            endpoint: SHDW_DRIVE_ENDPOINT.into(),
            cdn_url: SHDW_DRIVE_CDN.into(),
            version: ShadowDriveVersion::V2,
            cluster: "mainnet-beta".into(),
            private_key: None,
            keypair_path: None,
        }
    }
}

impl DriveConfig {
    /// Defaults overridden by the process environment.
    pub fn from_env() -> Self {
        Self::default().with_env(|key| std::env::var(key).ok())
    }

    /// Override fields from `lookup` (`SHDW_ENDPOINT`, `SHDW_CDN_URL`,
    /// `SHDW_CLUSTER`, `PRIVATE_KEY`, `KEYPAIR_PATH`). Empty values are ignored.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("SHDW_ENDPOINT") {
            self.endpoint = v;
        }
        if let Some(v) = get("SHDW_CDN_URL") {
            self.cdn_url = v;
        }
        if let Some(v) = get("SHDW_CLUSTER") {
            self.cluster = v;
        }
        if let Some(v) = get("PRIVATE_KEY") {
            self.private_key = Some(v);
        }
        if let Some(v) = get("KEYPAIR_PATH") {
            self.keypair_path = Some(PathBuf::from(v));
        }
        self
    }

    pub fn shdw_config(&self) -> ShdwConfig {
        ShdwConfig {
            endpoint: self.endpoint.clone(),
            cdn_url: self.cdn_url.clone(),
        }
    }

    /// Load the configured wallet.
    ///
    /// # Errors
    ///
    /// Returns [`DriveError::Config`] when neither a private key nor a keypair
    /// path is configured, or [`DriveError::Shdw`] if the key is malformed.
    pub fn load_wallet(&self) -> Result<Wallet, DriveError> {
        if let Some(key) = &self.private_key {
            return Ok(Wallet::from_private_key(key)?);
        }
        if let Some(path) = &self.keypair_path {
            return Ok(Wallet::from_keypair_file(path)?);
        }
        Err(DriveError::Config(
            "PRIVATE_KEY or KEYPAIR_PATH is required".into(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::io::Write;

    use super::*;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_point_at_mainnet() {
        let config = DriveConfig::default();
        assert_eq!(config.endpoint, SHDW_DRIVE_ENDPOINT);
        assert_eq!(config.cdn_url, SHDW_DRIVE_CDN);
        assert_eq!(config.version, ShadowDriveVersion::V2);
        assert_eq!(config.cluster, "mainnet-beta");
    }

    #[test]
    fn test_env_overrides_and_ignores_empty() {
        let config = DriveConfig::default().with_env(env(&[
            ("SHDW_ENDPOINT", "http://localhost:8080"),
            ("SHDW_CLUSTER", "devnet"),
            ("SHDW_CDN_URL", "  "),
        ]));
        assert_eq!(config.endpoint, "http://localhost:8080");
        assert_eq!(config.cluster, "devnet");
        assert_eq!(config.cdn_url, SHDW_DRIVE_CDN);
        assert_eq!(config.shdw_config().endpoint, "http://localhost:8080");
    }

    #[test]
    fn test_load_wallet_requires_a_key() {
        let err = DriveConfig::default().load_wallet().unwrap_err();
        assert!(matches!(err, DriveError::Config(_)));
    }

    #[test]
    fn test_load_wallet_prefers_private_key() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        // Not a valid keypair: must never be read when a private key is set.
        write!(file, "garbage").unwrap();

        let secret = bs58::encode([42u8; 32]).into_string();
        let config = DriveConfig {
            private_key: Some(secret.clone()),
            keypair_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        let loaded = config.load_wallet().unwrap();
        assert_eq!(loaded.pubkey(), Wallet::from_private_key(&secret).unwrap().pubkey());
    }

    #[test]
    fn test_load_wallet_from_keypair_file() {
        let secret = [7u8; 32];
        let reference = Wallet::from_private_key(&bs58::encode(secret).into_string()).unwrap();
        let mut bytes = secret.to_vec();
        bytes.extend_from_slice(reference.pubkey().as_bytes());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{}", serde_json::to_string(&bytes).unwrap()).unwrap();

        let config = DriveConfig {
            keypair_path: Some(file.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(config.load_wallet().unwrap().pubkey(), reference.pubkey());
    }
}
