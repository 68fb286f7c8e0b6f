//! Document byte storage on the local filesystem.

pub mod filesystem;

pub use filesystem::LocalDocumentStore;
