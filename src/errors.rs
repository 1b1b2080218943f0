//! Error types for entropy-keys-core operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    #[error("Encryption type/version not supported ({0}).")]
    UnsupportedVersion(String),

    #[error("Bad public key")]
    BadPublicKey,

    #[error("Bad private key")]
    BadPrivateKey,

    /// Low-order X25519 peer key: the shared secret would be all zeros.
    #[error("Invalid private or public key received")]
    InvalidPublicKey,

    #[error("{key} must be {expected} bytes long, got {actual}")]
    InvalidKeyLength {
        key: &'static str,
        expected: usize,
        actual: usize,
    },

    #[error("Invalid key type: {0}")]
    InvalidKeyType(&'static str),

    #[error("Encryption failed: {0}")]
    EncryptionFailed(String),

    #[error("Signing failed")]
    SigningFailed,

    #[error("Invalid signature encoding")]
    InvalidSignature,

    #[error("nonce must be 24 bytes long, got {0}")]
    InvalidNonce(usize),

    /// AEAD authentication failure. The message text is matched verbatim by
    /// callers, keep it exactly `invalid tag`.
    #[error("invalid tag")]
    InvalidTag,

    #[error("Malformed {field}: {reason}")]
    MalformedEncoding { field: &'static str, reason: String },

    #[error("Decrypted message is not valid UTF-8")]
    InvalidUtf8,

    #[error("Entropy provider returned malformed key material")]
    InvalidEntropy,

    #[error("Entropy unavailable: {0}")]
    EntropyUnavailable(String),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),
}

impl CryptoError {
    /// True for the "tried the wrong key" outcome of a box open.
    pub fn is_invalid_tag(&self) -> bool {
        matches!(self, CryptoError::InvalidTag)
    }
}
