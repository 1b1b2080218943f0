//! Operations spanning every entropy source the host exposes.

use futures::future::try_join_all;
use tracing::{debug, trace};

use crate::erc1024::{self, Erc1024EncryptedData};
use crate::errors::CryptoError;
use crate::keys::{derive_encryption_key_pair, derive_signing_key_pair, KeyContext};
use crate::provider::{EntropyProvider, EntropySourceId};

/// `(source id, 0x-prefixed signing public key)` in host enumeration order.
pub type SourceKeyMap = Vec<(EntropySourceId, String)>;

/// Derive the signing public key (SRP ID) of every source.
///
/// Derivations run concurrently; the result follows enumeration order
/// regardless of which host call completes first.
pub async fn all_public_keys<P>(
    provider: &P,
    salt: Option<&str>,
) -> Result<SourceKeyMap, CryptoError>
where
    P: EntropyProvider + ?Sized,
{
    let sources = provider.list_entropy_sources().await?;
    debug!(count = sources.len(), "deriving public keys for all entropy sources");

    let base = KeyContext::salted(salt);
    let derivations = sources.iter().map(|source| {
        let ctx = base.for_source(&source.id);
        async move {
            let pair = derive_signing_key_pair(provider, &ctx).await?;
            Ok::<_, CryptoError>((source.id.clone(), pair.public_key_hex()))
        }
    });

    try_join_all(derivations).await
}

/// Decrypt `encrypted` with the encryption key of `ctx`'s source, or, when no
/// source is given, with whichever source's key opens it.
///
/// Sources are tried one at a time in enumeration order. `invalid tag` means
/// "wrong key, keep going"; the first other error is remembered and returned
/// if no source succeeds, since a structural problem (bad version, bad
/// encoding) repeats for every key. Host failures abort the scan.
pub async fn decrypt_with_any_source<P>(
    provider: &P,
    encrypted: &Erc1024EncryptedData,
    ctx: &KeyContext,
) -> Result<String, CryptoError>
where
    P: EntropyProvider + ?Sized,
{
    if ctx.entropy_source_id().is_some() {
        let pair = derive_encryption_key_pair(provider, ctx).await?;
        return erc1024::decrypt(encrypted, pair.private_key().as_bytes());
    }

    let sources = provider.list_entropy_sources().await?;
    let mut first_error: Option<CryptoError> = None;

    for source in &sources {
        let pair = derive_encryption_key_pair(provider, &ctx.for_source(&source.id)).await?;
        match erc1024::decrypt(encrypted, pair.private_key().as_bytes()) {
            Ok(plaintext) => {
                debug!(source = %source.id, "decrypted message");
                return Ok(plaintext);
            }
            Err(e) if e.is_invalid_tag() => {
                trace!(source = %source.id, "wrong key, trying next source");
            }
            Err(e) => {
                debug!(source = %source.id, error = %e, "decryption failed");
                if first_error.is_none() {
                    first_error = Some(e);
                }
            }
        }
    }

    Err(first_error.unwrap_or(CryptoError::InvalidTag))
}
