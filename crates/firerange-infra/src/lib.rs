//! Infrastructure layer for Fire Range.
//!
//! Contains implementations of the ports defined in `firerange-core`: SQLite
//! repositories, the local document store, the outbox mailer and SHA-256
//! access key hashing, plus the config loader and data directory helpers.

pub mod config;
pub mod crypto;
pub mod filesystem;
pub mod mail;
pub mod sqlite;
pub mod storage;
