//! # entropy-keys-core
//!
//! Deterministic, per-source key material derived from a host entropy
//! capability, and the operations built on it:
//! - **Signing**: secp256k1 compact ECDSA over SHA-256 of the message
//! - **Encryption**: ERC1024 envelopes over a NaCl-compatible `box`
//!   (X25519 + HSalsa20 + XSalsa20-Poly1305)
//! - **Multi-source decryption**: try every entropy source's key when the
//!   caller cannot say which one the message was encrypted to
//!
//! ## Security Design
//!
//! - Private keys only ever come from [`EntropyProvider`]; nothing is cached
//! - Encryption and signing keys use separately salted entropy requests
//! - Key material uses `Zeroize` on drop
//! - `invalid tag` is kept distinguishable from every other failure

pub mod labels;
pub mod nacl;
pub mod erc1024;
pub mod provider;
pub mod keys;
pub mod resolver;
pub mod signing;
pub mod api;
pub mod errors;

// Re-export core types
pub use api::EntropyKeyring;
pub use erc1024::{EncryptionVersion, Erc1024EncryptedData, KeyInput};
pub use errors::CryptoError;
pub use keys::{
    DerivedKeyPair, EncryptionKeyPair, KeyContext, PrivateKeyMaterial, SigningKeyPair,
};
pub use provider::{
    EntropyProvider, EntropyRequest, EntropySource, EntropySourceId, EntropySourceType,
    MemoryEntropyProvider,
};
pub use resolver::SourceKeyMap;
