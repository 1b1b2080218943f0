//! ERC1024 hybrid encryption envelope.
//!
//! Envelope (JSON, as exchanged with dapps and wallets):
//! - version: "x25519-xsalsa20-poly1305"
//! - nonce: base64(24 bytes)
//! - ephemPublicKey: base64(32-byte X25519 public key)
//! - ciphertext: base64(NaCl box)
//!
//! Matches eth-sig-util `encrypt`/`decrypt` and EIP-1098.

use std::fmt;
use std::str::FromStr;

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};
use tracing::trace;
use zeroize::Zeroizing;

use crate::errors::CryptoError;
use crate::keys::hex_to_bytes;
use crate::labels::ERC1024_X25519_XSALSA20_POLY1305;
use crate::nacl;

/// Encryption algorithms an envelope may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EncryptionVersion {
    X25519XSalsa20Poly1305,
}

impl EncryptionVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            EncryptionVersion::X25519XSalsa20Poly1305 => ERC1024_X25519_XSALSA20_POLY1305,
        }
    }
}

impl fmt::Display for EncryptionVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EncryptionVersion {
    type Err = CryptoError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            ERC1024_X25519_XSALSA20_POLY1305 => Ok(EncryptionVersion::X25519XSalsa20Poly1305),
            other => Err(CryptoError::UnsupportedVersion(other.to_string())),
        }
    }
}

/// An ERC1024 encrypted message.
///
/// `version` stays a plain string so envelopes naming an unknown algorithm
/// still deserialize and are rejected by [`decrypt`] with the version in the error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Erc1024EncryptedData {
    pub version: String,
    /// base64, 24 bytes
    pub nonce: String,
    /// base64, 32 bytes
    pub ephem_public_key: String,
    /// base64, tag(16) + ciphertext
    pub ciphertext: String,
}

impl Erc1024EncryptedData {
    pub fn to_json(&self) -> Result<String, CryptoError> {
        Ok(serde_json::to_string(self)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CryptoError> {
        Ok(serde_json::from_str(json)?)
    }
}

/// Key argument that is either raw bytes or hex text (optional `0x`).
#[derive(Debug, Clone, Copy)]
pub enum KeyInput<'a> {
    Bytes(&'a [u8]),
    Hex(&'a str),
}

impl<'a> From<&'a [u8]> for KeyInput<'a> {
    fn from(bytes: &'a [u8]) -> Self {
        KeyInput::Bytes(bytes)
    }
}

impl<'a, const N: usize> From<&'a [u8; N]> for KeyInput<'a> {
    fn from(bytes: &'a [u8; N]) -> Self {
        KeyInput::Bytes(bytes)
    }
}

impl<'a> From<&'a str> for KeyInput<'a> {
    fn from(hex_str: &'a str) -> Self {
        KeyInput::Hex(hex_str)
    }
}

impl<'a> KeyInput<'a> {
    fn resolve(self, bad_key: CryptoError) -> Result<Zeroizing<Vec<u8>>, CryptoError> {
        match self {
            KeyInput::Bytes(bytes) => Ok(Zeroizing::new(bytes.to_vec())),
            KeyInput::Hex(hex_str) => hex_to_bytes(hex_str)
                .map(Zeroizing::new)
                .map_err(|_| bad_key),
        }
    }
}

fn decode_field(field: &'static str, value: &str) -> Result<Vec<u8>, CryptoError> {
    STANDARD
        .decode(value)
        .map_err(|e| CryptoError::MalformedEncoding {
            field,
            reason: e.to_string(),
        })
}

fn decode_fixed(
    field: &'static str,
    value: &str,
    expected: usize,
) -> Result<Vec<u8>, CryptoError> {
    let bytes = decode_field(field, value)?;
    if bytes.len() != expected {
        return Err(CryptoError::MalformedEncoding {
            field,
            reason: format!("expected {expected} bytes, got {}", bytes.len()),
        });
    }
    Ok(bytes)
}

/// Encrypt a UTF-8 message for `receiver_public_key` using the default version.
pub fn encrypt<'a>(
    receiver_public_key: impl Into<KeyInput<'a>>,
    message: &str,
) -> Result<Erc1024EncryptedData, CryptoError> {
    encrypt_with_version(receiver_public_key, message, ERC1024_X25519_XSALSA20_POLY1305)
}

/// Encrypt a UTF-8 message for `receiver_public_key` under `version`.
///
/// The version is checked before any key material is parsed or generated.
pub fn encrypt_with_version<'a>(
    receiver_public_key: impl Into<KeyInput<'a>>,
    message: &str,
    version: &str,
) -> Result<Erc1024EncryptedData, CryptoError> {
    match version.parse::<EncryptionVersion>()? {
        EncryptionVersion::X25519XSalsa20Poly1305 => {
            let public_key = receiver_public_key
                .into()
                .resolve(CryptoError::BadPublicKey)?;

            let ephemeral = nacl::key_pair();
            let nonce = nacl::random_nonce();
            let sealed =
                nacl::seal(message.as_bytes(), &nonce, &public_key, &ephemeral.secret_key)?;

            trace!(len = message.len(), "sealed erc1024 message");

            Ok(Erc1024EncryptedData {
                version: EncryptionVersion::X25519XSalsa20Poly1305.to_string(),
                nonce: STANDARD.encode(nonce),
                ephem_public_key: STANDARD.encode(ephemeral.public_key),
                ciphertext: STANDARD.encode(sealed),
            })
        }
    }
}

/// Decrypt an ERC1024 envelope with the receiver's X25519 secret key.
///
/// Errors are never swallowed: a wrong key surfaces as `invalid tag`,
/// undecodable fields as [`CryptoError::MalformedEncoding`].
pub fn decrypt<'a>(
    encrypted: &Erc1024EncryptedData,
    receiver_private_key: impl Into<KeyInput<'a>>,
) -> Result<String, CryptoError> {
    match encrypted.version.parse::<EncryptionVersion>()? {
        EncryptionVersion::X25519XSalsa20Poly1305 => {
            let secret_key = receiver_private_key
                .into()
                .resolve(CryptoError::BadPrivateKey)?;

            let nonce = decode_fixed("nonce", &encrypted.nonce, nacl::NONCE_LENGTH)?;
            let ciphertext = decode_field("ciphertext", &encrypted.ciphertext)?;
            let ephem_public_key = decode_fixed(
                "ephemPublicKey",
                &encrypted.ephem_public_key,
                nacl::PUBLIC_KEY_LENGTH,
            )?;

            let plaintext = nacl::open(&ciphertext, &nonce, &ephem_public_key, &secret_key)?;
            String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)
        }
    }
}
