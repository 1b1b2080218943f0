//! The five operations exposed to the RPC layer.
//!
//! Method-name dispatch, parameter schemas and the origin → salt policy live
//! in the RPC layer; it hands every call a [`KeyContext`] carrying the
//! optional entropy source id and the salt, which is threaded unchanged into
//! every derivation.

use crate::erc1024::Erc1024EncryptedData;
use crate::errors::CryptoError;
use crate::keys::{derive_encryption_key_pair, derive_signing_key_pair, KeyContext};
use crate::provider::EntropyProvider;
use crate::resolver::{all_public_keys, decrypt_with_any_source, SourceKeyMap};
use crate::signing;

/// Key operations over one host entropy provider.
pub struct EntropyKeyring<P> {
    provider: P,
}

impl<P: EntropyProvider> EntropyKeyring<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// `getPublicKey`: compressed secp256k1 public key (SRP ID), `0x` hex.
    pub async fn get_public_key(&self, ctx: &KeyContext) -> Result<String, CryptoError> {
        Ok(derive_signing_key_pair(&self.provider, ctx).await?.public_key_hex())
    }

    /// `getAllPublicKeys`: SRP ID of every source, in host order. The source
    /// id of `ctx` is ignored.
    pub async fn get_all_public_keys(
        &self,
        ctx: &KeyContext,
    ) -> Result<SourceKeyMap, CryptoError> {
        all_public_keys(&self.provider, ctx.salt()).await
    }

    /// `signMessage`: compact ECDSA signature over SHA-256(message), `0x` hex.
    ///
    /// Messages must start with [`SIGN_MESSAGE_PREFIX`](crate::labels::SIGN_MESSAGE_PREFIX).
    /// The RPC layer rejects other messages before calling here; this method
    /// signs whatever it gets.
    pub async fn sign_message(
        &self,
        message: &str,
        ctx: &KeyContext,
    ) -> Result<String, CryptoError> {
        signing::sign_message(&self.provider, message, ctx).await
    }

    /// `getEncryptionPublicKey`: X25519 public key, `0x` hex.
    pub async fn get_encryption_public_key(
        &self,
        ctx: &KeyContext,
    ) -> Result<String, CryptoError> {
        Ok(derive_encryption_key_pair(&self.provider, ctx).await?.public_key_hex())
    }

    /// `decryptMessage`: decrypt an ERC1024 envelope, trying every source
    /// when `ctx` names none.
    pub async fn decrypt_message(
        &self,
        data: &Erc1024EncryptedData,
        ctx: &KeyContext,
    ) -> Result<String, CryptoError> {
        decrypt_with_any_source(&self.provider, data, ctx).await
    }
}
