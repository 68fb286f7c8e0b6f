//! SHA-256 access key hashing.
//!
//! Implements the `KeyHasher` trait from `firerange-core` using the `sha2`
//! crate (RustCrypto ecosystem) for hashing and `rand` for key material.

use rand::RngCore;
use sha2::{Digest, Sha256};

use firerange_core::service::hash::{KeyHasher, KEY_PREFIX};

/// Random bytes per generated key (256 bits).
const KEY_BYTES: usize = 32;

/// SHA-256 implementation of `KeyHasher`.
///
/// Keys are `frk_` followed by 64 lowercase hex characters. Only the
/// lowercase hex SHA-256 digest of a key is ever stored.
pub struct Sha256KeyHasher;

impl Sha256KeyHasher {
    /// Create a new hasher.
    pub fn new() -> Self {
        Self
    }
}

impl Default for Sha256KeyHasher {
    fn default() -> Self {
        Self::new()
    }
}

impl KeyHasher for Sha256KeyHasher {
    fn generate_key(&self) -> String {
        let mut bytes = [0u8; KEY_BYTES];
        rand::rng().fill_bytes(&mut bytes);
        let hex: String = bytes.iter().map(|b| format!("{b:02x}")).collect();
        format!("{KEY_PREFIX}{hex}")
    }

    fn hash_key(&self, key: &str) -> String {
        let digest = Sha256::digest(key.as_bytes());
        format!("{:x}", digest)
    }
}
