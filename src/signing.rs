//! secp256k1 ECDSA message signing.
//!
//! digest = SHA-256(utf8(message)), no framing
//! signature = RFC6979 deterministic, low-S, compact r || s (64 bytes), `0x` hex

use k256::ecdsa::signature::hazmat::{PrehashSigner, PrehashVerifier};
use k256::ecdsa::{Signature, SigningKey, VerifyingKey};
use sha2::{Digest, Sha256};

use crate::errors::CryptoError;
use crate::keys::{
    bytes_to_hex, derive_private_key, hex_to_bytes, KeyContext, PrivateKeyMaterial,
};
use crate::provider::EntropyProvider;

/// Sign `message` with an already derived private key.
pub fn sign_with_key(
    private_key: &PrivateKeyMaterial,
    message: &str,
) -> Result<String, CryptoError> {
    let signing_key = SigningKey::from_slice(private_key.as_bytes())
        .map_err(|_| CryptoError::InvalidKeyType("not a valid secp256k1 scalar"))?;

    let digest = Sha256::digest(message.as_bytes());
    let signature: Signature = signing_key
        .sign_prehash(&digest)
        .map_err(|_| CryptoError::SigningFailed)?;

    Ok(bytes_to_hex(&signature.to_bytes()))
}

/// Sign `message` with the signing key of `ctx`.
pub async fn sign_message<P>(
    provider: &P,
    message: &str,
    ctx: &KeyContext,
) -> Result<String, CryptoError>
where
    P: EntropyProvider + ?Sized,
{
    let private_key = derive_private_key(provider, ctx).await?;
    sign_with_key(&private_key, message)
}

/// Check a compact signature produced by [`sign_message`].
///
/// Returns `Ok(false)` for a well-formed signature that does not verify.
pub fn verify_message(
    message: &str,
    signature_hex: &str,
    public_key_hex: &str,
) -> Result<bool, CryptoError> {
    let public_key = hex_to_bytes(public_key_hex).map_err(|_| CryptoError::BadPublicKey)?;
    let verifying_key =
        VerifyingKey::from_sec1_bytes(&public_key).map_err(|_| CryptoError::BadPublicKey)?;

    let signature_bytes =
        hex_to_bytes(signature_hex).map_err(|_| CryptoError::InvalidSignature)?;
    let signature =
        Signature::from_slice(&signature_bytes).map_err(|_| CryptoError::InvalidSignature)?;

    let digest = Sha256::digest(message.as_bytes());
    Ok(verifying_key.verify_prehash(&digest, &signature).is_ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::keys::derive_signing_key_pair;
    use crate::provider::MemoryEntropyProvider;

    fn provider() -> MemoryEntropyProvider {
        MemoryEntropyProvider::new().with_source("id1", "source1", true, [0x42; 32])
    }

    #[tokio::test]
    async fn signature_shape() {
        let signature = sign_message(&provider(), "metamask:hello", &KeyContext::new())
            .await
            .unwrap();
        assert!(signature.starts_with("0x"));
        assert_eq!(signature.len(), 2 + 128);
        assert_eq!(signature, signature.to_lowercase());
    }

    #[tokio::test]
    async fn signing_is_deterministic() {
        let provider = provider();
        let a = sign_message(&provider, "same", &KeyContext::new()).await.unwrap();
        let b = sign_message(&provider, "same", &KeyContext::new()).await.unwrap();
        assert_eq!(a, b);
    }

    #[tokio::test]
    async fn signature_verifies_against_derived_public_key() {
        let provider = provider();
        let ctx = KeyContext::new().with_salt("https://dapp.example");
        let signature = sign_message(&provider, "metamask:login", &ctx).await.unwrap();
        let pair = derive_signing_key_pair(&provider, &ctx).await.unwrap();

        assert!(verify_message("metamask:login", &signature, &pair.public_key_hex()).unwrap());
        assert!(!verify_message("metamask:logout", &signature, &pair.public_key_hex()).unwrap());

        // Different salt, different key.
        let other = derive_signing_key_pair(&provider, &KeyContext::new()).await.unwrap();
        assert!(!verify_message("metamask:login", &signature, &other.public_key_hex()).unwrap());
    }

    #[test]
    fn malformed_inputs_to_verify() {
        assert!(matches!(
            verify_message("m", "0x00", "0x02"),
            Err(CryptoError::BadPublicKey)
        ));
        let pk = "0x02c291ee55d10abcc46de22b775cb0782b06f386ced8b0d0fccb8007a686bbddad";
        assert!(matches!(
            verify_message("m", "0x1234", pk),
            Err(CryptoError::InvalidSignature)
        ));
    }
}
