//! Cryptographic operations for Fire Range.
//!
//! - `hash`: SHA-256 access key hashing and random key generation

pub mod hash;
