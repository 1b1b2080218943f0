//! Key derivation from host entropy.
//!
//! Every private key enters the crate through [`derive_private_key`]; nothing
//! is generated locally or cached. Signing keys are secp256k1 (compressed
//! public key doubles as the source's SRP ID); encryption keys are X25519 and
//! come from a separately salted entropy request so the two never share
//! material.

use std::fmt;

use k256::{elliptic_curve::sec1::ToEncodedPoint, SecretKey};
use tracing::debug;
use zeroize::{Zeroize, ZeroizeOnDrop, Zeroizing};

use crate::errors::CryptoError;
use crate::labels::KEY_PURPOSE_ENCRYPTION;
use crate::nacl;
use crate::provider::{EntropyProvider, EntropyRequest};

/// Which entropy source to derive from, and the caller's domain salt.
///
/// The builders treat empty strings as absent: an empty salt performs no
/// domain separation and an empty source id selects the host's primary
/// source. [`KeyContext::for_source`] is the exception.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct KeyContext {
    entropy_source_id: Option<String>,
    salt: Option<String>,
}

impl KeyContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context with only a salt (primary source).
    pub fn salted(salt: Option<&str>) -> Self {
        Self {
            entropy_source_id: None,
            salt: non_empty(salt),
        }
    }

    pub fn with_source(mut self, entropy_source_id: impl Into<String>) -> Self {
        self.entropy_source_id = non_empty(Some(entropy_source_id.into()));
        self
    }

    pub fn with_salt(mut self, salt: impl Into<String>) -> Self {
        self.salt = non_empty(Some(salt.into()));
        self
    }

    /// Same salt, pinned to a host-enumerated `entropy_source_id`. The id is
    /// kept verbatim, even when empty.
    pub fn for_source(&self, entropy_source_id: &str) -> Self {
        Self {
            entropy_source_id: Some(entropy_source_id.to_string()),
            salt: self.salt.clone(),
        }
    }

    pub fn entropy_source_id(&self) -> Option<&str> {
        self.entropy_source_id.as_deref()
    }

    pub fn salt(&self) -> Option<&str> {
        self.salt.as_deref()
    }
}

fn non_empty<S: AsRef<str> + Into<String>>(value: Option<S>) -> Option<String> {
    value.filter(|v| !v.as_ref().is_empty()).map(Into::into)
}

/// 32 bytes of private key material. Zeroized on drop, never cloned.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct PrivateKeyMaterial([u8; 32]);

impl PrivateKeyMaterial {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Parse the host's `0x`-prefixed hex answer.
    pub fn from_entropy_hex(entropy: &str) -> Result<Self, CryptoError> {
        let bytes =
            Zeroizing::new(hex_to_bytes(entropy).map_err(|_| CryptoError::InvalidEntropy)?);
        let key: [u8; 32] = bytes
            .as_slice()
            .try_into()
            .map_err(|_| CryptoError::InvalidEntropy)?;
        Ok(Self(key))
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }
}

impl fmt::Debug for PrivateKeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKeyMaterial(..)")
    }
}

/// A derived key pair; `N` is the encoded public key length.
#[derive(Debug)]
pub struct DerivedKeyPair<const N: usize> {
    private_key: PrivateKeyMaterial,
    public_key: [u8; N],
}

/// secp256k1 pair with a compressed SEC1 public key.
pub type SigningKeyPair = DerivedKeyPair<33>;

/// X25519 pair for ERC1024 decryption.
pub type EncryptionKeyPair = DerivedKeyPair<32>;

impl<const N: usize> DerivedKeyPair<N> {
    pub fn private_key(&self) -> &PrivateKeyMaterial {
        &self.private_key
    }

    pub fn public_key(&self) -> &[u8; N] {
        &self.public_key
    }

    /// `0x`-prefixed lowercase hex of the public key.
    pub fn public_key_hex(&self) -> String {
        bytes_to_hex(&self.public_key)
    }
}

impl SigningKeyPair {
    pub fn from_private_key(private_key: PrivateKeyMaterial) -> Result<Self, CryptoError> {
        let secret = SecretKey::from_slice(private_key.as_bytes())
            .map_err(|_| CryptoError::InvalidKeyType("not a valid secp256k1 scalar"))?;
        let point = secret.public_key().to_encoded_point(true);

        let mut public_key = [0u8; 33];
        public_key.copy_from_slice(point.as_bytes());
        Ok(Self {
            private_key,
            public_key,
        })
    }
}

impl EncryptionKeyPair {
    pub fn from_private_key(private_key: PrivateKeyMaterial) -> Self {
        let public_key = nacl::public_key(private_key.as_bytes());
        Self {
            private_key,
            public_key,
        }
    }
}

/// Fetch raw private key bytes for `ctx` from the host.
pub async fn derive_private_key<P>(
    provider: &P,
    ctx: &KeyContext,
) -> Result<PrivateKeyMaterial, CryptoError>
where
    P: EntropyProvider + ?Sized,
{
    debug!(
        source = ctx.entropy_source_id().unwrap_or("<primary>"),
        salted = ctx.salt().is_some(),
        "requesting entropy"
    );
    let entropy = Zeroizing::new(
        provider
            .get_entropy(EntropyRequest::new(ctx.entropy_source_id(), ctx.salt()))
            .await?,
    );
    PrivateKeyMaterial::from_entropy_hex(&entropy)
}

pub async fn derive_signing_key_pair<P>(
    provider: &P,
    ctx: &KeyContext,
) -> Result<SigningKeyPair, CryptoError>
where
    P: EntropyProvider + ?Sized,
{
    SigningKeyPair::from_private_key(derive_private_key(provider, ctx).await?)
}

/// Salt for the encryption-purpose entropy request: purpose tag + caller salt.
fn encryption_salt(extra_salt: Option<&str>) -> String {
    match extra_salt {
        Some(extra) => format!("{KEY_PURPOSE_ENCRYPTION}{extra}"),
        None => KEY_PURPOSE_ENCRYPTION.to_string(),
    }
}

pub async fn derive_encryption_key_pair<P>(
    provider: &P,
    ctx: &KeyContext,
) -> Result<EncryptionKeyPair, CryptoError>
where
    P: EntropyProvider + ?Sized,
{
    let mut purpose_ctx = ctx.clone();
    purpose_ctx.salt = Some(encryption_salt(ctx.salt()));
    let private_key = derive_private_key(provider, &purpose_ctx).await?;
    Ok(EncryptionKeyPair::from_private_key(private_key))
}

/// Decode hex with an optional `0x` prefix.
pub fn hex_to_bytes(value: &str) -> Result<Vec<u8>, hex::FromHexError> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);
    hex::decode(digits)
}

/// Encode bytes as `0x`-prefixed lowercase hex.
pub fn bytes_to_hex(bytes: &[u8]) -> String {
    format!("0x{}", hex::encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::MemoryEntropyProvider;

    const MOCK_PRIVATE_KEY: &str =
        "ec180de430cef919666c2009b91ca3d3b7f6c471136abc9937fa40b89357bbb9";
    const MOCK_PUBLIC_KEY: &str =
        "0x02c291ee55d10abcc46de22b775cb0782b06f386ced8b0d0fccb8007a686bbddad";

    fn provider() -> MemoryEntropyProvider {
        let seed: [u8; 32] = hex::decode(MOCK_PRIVATE_KEY).unwrap().try_into().unwrap();
        MemoryEntropyProvider::new()
            .with_source("id1", "source1", true, seed)
            .with_source("id2", "source2", false, [7u8; 32])
    }

    #[test]
    fn hex_helpers_accept_optional_prefix() {
        assert_eq!(hex_to_bytes("0x0a0b").unwrap(), vec![10, 11]);
        assert_eq!(hex_to_bytes("0a0b").unwrap(), vec![10, 11]);
        assert!(hex_to_bytes("0xzz").is_err());
        assert_eq!(bytes_to_hex(&[10, 11]), "0x0a0b");
    }

    #[test]
    fn context_treats_empty_strings_as_absent() {
        let ctx = KeyContext::new().with_source("").with_salt("");
        assert_eq!(ctx.entropy_source_id(), None);
        assert_eq!(ctx.salt(), None);

        let ctx = KeyContext::salted(Some("https://example.org")).for_source("id2");
        assert_eq!(ctx.entropy_source_id(), Some("id2"));
        assert_eq!(ctx.salt(), Some("https://example.org"));

        let ctx = KeyContext::new().with_salt("s").for_source("");
        assert_eq!(ctx.entropy_source_id(), Some(""));
        assert_eq!(ctx.salt(), Some("s"));
    }

    #[test]
    fn entropy_must_be_32_bytes_of_hex() {
        assert!(PrivateKeyMaterial::from_entropy_hex(&format!("0x{MOCK_PRIVATE_KEY}")).is_ok());
        assert!(matches!(
            PrivateKeyMaterial::from_entropy_hex("0x1234"),
            Err(CryptoError::InvalidEntropy)
        ));
        assert!(matches!(
            PrivateKeyMaterial::from_entropy_hex("not hex"),
            Err(CryptoError::InvalidEntropy)
        ));
    }

    #[test]
    fn debug_does_not_leak_key_material() {
        let key = PrivateKeyMaterial::from_bytes([0xab; 32]);
        assert!(!format!("{key:?}").contains("ab"));
    }

    #[test]
    fn zero_scalar_is_invalid_key_type() {
        let err = SigningKeyPair::from_private_key(PrivateKeyMaterial::from_bytes([0u8; 32]))
            .unwrap_err();
        assert!(matches!(err, CryptoError::InvalidKeyType(_)));
    }

    #[tokio::test]
    async fn signing_public_key_from_known_private_key() {
        let provider = provider();
        let pair = derive_signing_key_pair(&provider, &KeyContext::new()).await.unwrap();
        assert_eq!(pair.public_key_hex(), MOCK_PUBLIC_KEY);

        let pair = derive_signing_key_pair(&provider, &KeyContext::new().with_source("id1"))
            .await
            .unwrap();
        assert_eq!(pair.public_key_hex(), MOCK_PUBLIC_KEY);
    }

    #[tokio::test]
    async fn derivation_is_deterministic_and_salt_separated() {
        let provider = provider();
        let salted = KeyContext::new().with_source("id2").with_salt("origin 1");

        let a = derive_signing_key_pair(&provider, &salted).await.unwrap();
        let b = derive_signing_key_pair(&provider, &salted).await.unwrap();
        assert_eq!(a.public_key(), b.public_key());
        assert_eq!(a.private_key().as_bytes(), b.private_key().as_bytes());

        let other = derive_signing_key_pair(&provider, &salted.clone().with_salt("origin 2"))
            .await
            .unwrap();
        assert_ne!(a.public_key(), other.public_key());
    }

    #[tokio::test]
    async fn encryption_key_is_separate_from_signing_key() {
        let provider = provider();
        let ctx = KeyContext::new().with_source("id1");

        let signing = derive_signing_key_pair(&provider, &ctx).await.unwrap();
        let encryption = derive_encryption_key_pair(&provider, &ctx).await.unwrap();
        assert_ne!(signing.private_key().as_bytes(), encryption.private_key().as_bytes());

        let again = derive_encryption_key_pair(&provider, &ctx).await.unwrap();
        assert_eq!(encryption.public_key(), again.public_key());

        let salted = derive_encryption_key_pair(&provider, &ctx.clone().with_salt("x"))
            .await
            .unwrap();
        assert_ne!(encryption.public_key(), salted.public_key());
    }

    #[test]
    fn encryption_salt_prefixes_purpose_tag() {
        assert_eq!(encryption_salt(None), "metamask:snaps:encryption");
        assert_eq!(
            encryption_salt(Some("https://dapp.example")),
            "metamask:snaps:encryptionhttps://dapp.example"
        );
    }
}
