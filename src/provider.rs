//! The host entropy capability.
//!
//! The host owns the secret roots (e.g. mnemonics) and answers two requests:
//! list the available sources, and return 32 bytes of entropy for a
//! `(source, salt)` pair. Implementations are injected into every derivation
//! call; this crate never reaches for ambient state.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

use crate::errors::CryptoError;
use crate::keys::bytes_to_hex;
use crate::labels::ENTROPY_REQUEST_VERSION;

pub type EntropySourceId = String;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntropySourceType {
    Mnemonic,
}

/// A source of private key material as enumerated by the host.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntropySource {
    pub id: EntropySourceId,
    pub name: String,
    #[serde(rename = "type")]
    pub source_type: EntropySourceType,
    pub primary: bool,
}

/// Parameters of a `getEntropy` request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct EntropyRequest<'a> {
    pub version: u32,
    /// `None` selects the host's primary source.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<&'a str>,
    /// `None` performs no domain separation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salt: Option<&'a str>,
}

impl<'a> EntropyRequest<'a> {
    pub fn new(source: Option<&'a str>, salt: Option<&'a str>) -> Self {
        Self {
            version: ENTROPY_REQUEST_VERSION,
            source,
            salt,
        }
    }
}

#[async_trait]
pub trait EntropyProvider: Send + Sync {
    /// Sources in host order. Not assumed stable between calls.
    async fn list_entropy_sources(&self) -> Result<Vec<EntropySource>, CryptoError>;

    /// `0x`-prefixed hex of 32 bytes of entropy.
    async fn get_entropy(&self, request: EntropyRequest<'_>) -> Result<String, CryptoError>;
}

#[async_trait]
impl<T: EntropyProvider + ?Sized> EntropyProvider for Arc<T> {
    async fn list_entropy_sources(&self) -> Result<Vec<EntropySource>, CryptoError> {
        (**self).list_entropy_sources().await
    }

    async fn get_entropy(&self, request: EntropyRequest<'_>) -> Result<String, CryptoError> {
        (**self).get_entropy(request).await
    }
}

struct SeededSource {
    source: EntropySource,
    seed: Zeroizing<[u8; 32]>,
}

/// In-process provider backed by fixed 32-byte seeds.
///
/// Unsalted requests return the seed itself; salted requests return
/// `SHA-256(seed || salt)`. Useful for embedding hosts without a secure
/// element and for deterministic tests.
#[derive(Default)]
pub struct MemoryEntropyProvider {
    sources: Vec<SeededSource>,
}

impl MemoryEntropyProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_source(
        mut self,
        id: impl Into<String>,
        name: impl Into<String>,
        primary: bool,
        seed: [u8; 32],
    ) -> Self {
        self.sources.push(SeededSource {
            source: EntropySource {
                id: id.into(),
                name: name.into(),
                source_type: EntropySourceType::Mnemonic,
                primary,
            },
            seed: Zeroizing::new(seed),
        });
        self
    }

    fn resolve(&self, source: Option<&str>) -> Result<&SeededSource, CryptoError> {
        match source {
            Some(id) => self
                .sources
                .iter()
                .find(|s| s.source.id == id)
                .ok_or_else(|| {
                    CryptoError::EntropyUnavailable(format!("unknown entropy source {id}"))
                }),
            None => self
                .sources
                .iter()
                .find(|s| s.source.primary)
                .or_else(|| self.sources.first())
                .ok_or_else(|| CryptoError::EntropyUnavailable("no entropy sources".into())),
        }
    }
}

#[async_trait]
impl EntropyProvider for MemoryEntropyProvider {
    async fn list_entropy_sources(&self) -> Result<Vec<EntropySource>, CryptoError> {
        Ok(self.sources.iter().map(|s| s.source.clone()).collect())
    }

    async fn get_entropy(&self, request: EntropyRequest<'_>) -> Result<String, CryptoError> {
        if request.version != ENTROPY_REQUEST_VERSION {
            return Err(CryptoError::EntropyUnavailable(format!(
                "unsupported entropy request version {}",
                request.version
            )));
        }

        let seeded = self.resolve(request.source)?;
        let entropy = match request.salt {
            None => seeded.seed.clone(),
            Some(salt) => {
                let mut hasher = Sha256::new();
                hasher.update(seeded.seed.as_slice());
                hasher.update(salt.as_bytes());
                Zeroizing::new(hasher.finalize().into())
            }
        };
        Ok(bytes_to_hex(entropy.as_slice()))
    }
}
