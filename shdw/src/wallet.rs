use std::fmt;
use std::path::Path;

use ed25519_dalek::{Signer, SigningKey};

use crate::error::{Result, ShdwError};
use crate::types::Pubkey;

/// Local ed25519 identity used to sign storage gateway requests.
#[derive(Clone)]
pub struct Wallet {
    signing_key: SigningKey,
    pubkey: Pubkey,
}

impl Wallet {
    pub fn from_signing_key(signing_key: SigningKey) -> Self {
        let pubkey = Pubkey::new(signing_key.verifying_key().to_bytes());
        Self {
            signing_key,
            pubkey,
        }
    }

    /// Fresh random identity.
    pub fn generate() -> Self {
        Self::from_signing_key(SigningKey::generate(&mut rand::rngs::OsRng))
    }

    /// Parse a private key from a bs58 string.
    ///
    /// Accepts either a 32-byte secret or a 64-byte keypair (first 32 bytes
    /// are the secret).
    pub fn from_private_key(key: &str) -> Result<Self> {
        let bytes = bs58::decode(key.trim())
            .into_vec()
            .map_err(|e| ShdwError::Signing(format!("bs58 decode error: {e}")))?;
        Self::from_secret_bytes(&bytes)
    }

    /// Parse a keypair written as a JSON byte array (`[12, 34, ...]`).
    pub fn from_keypair_json(json: &str) -> Result<Self> {
        let bytes: Vec<u8> = serde_json::from_str(json)?;
        Self::from_secret_bytes(&bytes)
    }

    /// Load a JSON byte-array keypair file.
    pub fn from_keypair_file(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_keypair_json(&contents)
    }

    fn from_secret_bytes(bytes: &[u8]) -> Result<Self> {
        let secret: [u8; 32] = match bytes.len() {
            32 | 64 => bytes[..32]
                .try_into()
                .map_err(|_| ShdwError::Signing("invalid key length".into()))?,
            n => return Err(ShdwError::Signing(format!("unexpected key length: {n}"))),
        };
        let wallet = Self::from_signing_key(SigningKey::from_bytes(&secret));

        if bytes.len() == 64 && bytes[32..] != wallet.pubkey.as_bytes()[..] {
            return Err(ShdwError::Signing(
                "keypair public half does not match secret".into(),
            ));
        }
        Ok(wallet)
    }

    pub fn pubkey(&self) -> Pubkey {
        self.pubkey
    }

    /// Sign a text message, returning the bs58-encoded signature.
    pub fn sign_message(&self, message: &str) -> String {
        let signature = self.signing_key.sign(message.as_bytes());
        bs58::encode(signature.to_bytes()).into_string()
    }
}

impl fmt::Debug for Wallet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Wallet").field("pubkey", &self.pubkey).finish_non_exhaustive()
    }
}
