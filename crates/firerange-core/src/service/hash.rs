//! KeyHasher trait for access key material.
//!
//! Defined in firerange-core so services can issue and verify access keys
//! without coupling to a specific hashing algorithm or RNG. The
//! `Sha256KeyHasher` adapter lives in firerange-infra.

/// Prefix of every generated access key.
pub const KEY_PREFIX: &str = "frk_";

/// Abstraction over access key generation and hashing.
pub trait KeyHasher: Send + Sync {
    /// Generate a new random plaintext key starting with [`KEY_PREFIX`].
    fn generate_key(&self) -> String;

    /// Compute the hex-encoded hash under which a key is stored.
    fn hash_key(&self, key: &str) -> String;
}
