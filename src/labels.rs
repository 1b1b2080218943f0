//! Domain separation constants and fixed wire identifiers.
//!
//! RULES:
//! 1. NEVER use raw string literals for crypto contexts, use constants from here
//! 2. New key purposes MUST add a new constant before implementation
//! 3. Values are part of the deployed derivation; changing one changes every key

// --- Key purposes ---

/// Salt prefix that separates encryption keys from signing keys of the same source.
pub const KEY_PURPOSE_ENCRYPTION: &str = "metamask:snaps:encryption";

// --- Host entropy requests ---

/// Version field sent with every entropy request.
pub const ENTROPY_REQUEST_VERSION: u32 = 1;

// --- ERC1024 envelope ---

/// The only envelope version this crate implements.
pub const ERC1024_X25519_XSALSA20_POLY1305: &str = "x25519-xsalsa20-poly1305";

// --- Signing ---

/// Prefix the RPC boundary requires on messages passed to `signMessage`
/// (see [`EntropyKeyring::sign_message`](crate::api::EntropyKeyring::sign_message)).
pub const SIGN_MESSAGE_PREFIX: &str = "metamask:";
