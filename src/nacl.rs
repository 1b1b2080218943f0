//! NaCl-compatible `box` construction.
//!
//! - Key agreement: X25519
//! - Key expansion: HSalsa20(sharedSecret, 0^16) with the "expand 32-byte k" constant
//! - Encryption: XSalsa20-Poly1305 (NaCl `secretbox`)
//!
//! Box layout: tag(16) + ciphertext. This is the layout produced by tweetnacl
//! and @noble/ciphers, so boxes interoperate with deployed ERC1024 clients.

use rand::{rngs::OsRng, RngCore};
use salsa20::cipher::consts::{U10, U16};
use salsa20::cipher::generic_array::GenericArray;
use salsa20::hsalsa;
use x25519_dalek::{PublicKey, StaticSecret};
use xsalsa20poly1305::{
    aead::{Aead, KeyInit},
    Key, Nonce, XSalsa20Poly1305,
};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::errors::CryptoError;

pub const PUBLIC_KEY_LENGTH: usize = 32;
pub const SECRET_KEY_LENGTH: usize = 32;
pub const NONCE_LENGTH: usize = 24;

/// An X25519 key pair for `box`.
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct BoxKeyPair {
    pub secret_key: [u8; SECRET_KEY_LENGTH],
    pub public_key: [u8; PUBLIC_KEY_LENGTH],
}

/// Generate a fresh X25519 key pair from the OS CSPRNG.
pub fn key_pair() -> BoxKeyPair {
    let secret = StaticSecret::random_from_rng(OsRng);
    let public = PublicKey::from(&secret);
    BoxKeyPair {
        secret_key: secret.to_bytes(),
        public_key: public.to_bytes(),
    }
}

/// X25519 public key for a 32-byte secret (clamped as per RFC 7748).
pub fn public_key(secret_key: &[u8; SECRET_KEY_LENGTH]) -> [u8; PUBLIC_KEY_LENGTH] {
    let secret = StaticSecret::from(*secret_key);
    PublicKey::from(&secret).to_bytes()
}

/// Generate 24 random bytes for an XSalsa20 nonce.
pub fn random_nonce() -> [u8; NONCE_LENGTH] {
    let mut nonce = [0u8; NONCE_LENGTH];
    OsRng.fill_bytes(&mut nonce);
    nonce
}

/// `crypto_box_beforenm`: X25519 then HSalsa20 expansion.
///
/// Replacing the HSalsa20 step with any other KDF breaks wire compatibility.
/// A low-order peer key yields an all-zero X25519 output for every secret
/// and is rejected with [`CryptoError::InvalidPublicKey`].
pub fn shared_key(
    peer_public_key: &[u8; PUBLIC_KEY_LENGTH],
    own_secret_key: &[u8; SECRET_KEY_LENGTH],
) -> Result<[u8; 32], CryptoError> {
    let secret = StaticSecret::from(*own_secret_key);
    let shared = secret.diffie_hellman(&PublicKey::from(*peer_public_key));
    if !shared.was_contributory() {
        return Err(CryptoError::InvalidPublicKey);
    }

    let input: GenericArray<u8, U16> = GenericArray::default();
    let mut expanded = hsalsa::<U10>(GenericArray::from_slice(shared.as_bytes()), &input);

    let mut key = [0u8; 32];
    key.copy_from_slice(&expanded);
    expanded.as_mut_slice().zeroize();
    Ok(key)
}

fn check_keys(
    public_key: &[u8],
    secret_key: &[u8],
) -> Result<([u8; PUBLIC_KEY_LENGTH], [u8; SECRET_KEY_LENGTH]), CryptoError> {
    let pk: [u8; PUBLIC_KEY_LENGTH] = public_key
        .try_into()
        .map_err(|_| CryptoError::InvalidKeyLength {
            key: "publicKey",
            expected: PUBLIC_KEY_LENGTH,
            actual: public_key.len(),
        })?;
    let sk: [u8; SECRET_KEY_LENGTH] = secret_key
        .try_into()
        .map_err(|_| CryptoError::InvalidKeyLength {
            key: "secretKey",
            expected: SECRET_KEY_LENGTH,
            actual: secret_key.len(),
        })?;
    Ok((pk, sk))
}

fn cipher_for(
    nonce: &[u8],
    peer_public_key: &[u8],
    own_secret_key: &[u8],
) -> Result<XSalsa20Poly1305, CryptoError> {
    let (pk, mut sk) = check_keys(peer_public_key, own_secret_key)?;
    if nonce.len() != NONCE_LENGTH {
        sk.zeroize();
        return Err(CryptoError::InvalidNonce(nonce.len()));
    }

    let shared = shared_key(&pk, &sk);
    sk.zeroize();
    let mut key = shared?;
    let cipher = XSalsa20Poly1305::new(Key::from_slice(&key));

    key.zeroize();
    Ok(cipher)
}

/// `crypto_box`: encrypt and authenticate `message` for `peer_public_key`.
pub fn seal(
    message: &[u8],
    nonce: &[u8],
    peer_public_key: &[u8],
    own_secret_key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = cipher_for(nonce, peer_public_key, own_secret_key)?;
    cipher
        .encrypt(Nonce::from_slice(nonce), message)
        .map_err(|e| CryptoError::EncryptionFailed(e.to_string()))
}

/// `crypto_box_open`: verify and decrypt a box.
///
/// Any authentication failure (wrong key, tampered box, truncated box) is
/// reported as [`CryptoError::InvalidTag`].
pub fn open(
    sealed: &[u8],
    nonce: &[u8],
    peer_public_key: &[u8],
    own_secret_key: &[u8],
) -> Result<Vec<u8>, CryptoError> {
    let cipher = cipher_for(nonce, peer_public_key, own_secret_key)?;
    cipher
        .decrypt(Nonce::from_slice(nonce), sealed)
        .map_err(|_| CryptoError::InvalidTag)
}
