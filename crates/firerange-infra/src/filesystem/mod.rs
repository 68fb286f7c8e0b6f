//! Data directory layout.
//!
//! Everything Fire Range keeps on disk lives under one directory:
//!
//! ```text
//! {data_dir}/
//!   config.toml
//!   firerange.db
//!   documents/{tenant}/{client}/{document}
//!   outbox/{timestamp}-{id}.json
//! ```

use std::path::{Path, PathBuf};

/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "FIRERANGE_DATA_DIR";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `FIRERANGE_DATA_DIR` environment variable
/// 2. `~/.firerange`
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".firerange");
    }

    // Last resort: current directory
    PathBuf::from(".firerange")
}

/// Outbox directory of the file mailer.
pub fn outbox_dir(data_dir: &Path) -> PathBuf {
    data_dir.join("outbox")
}

/// Create the data directory if needed.
pub async fn ensure_data_dir(data_dir: &Path) -> Result<(), std::io::Error> {
    tokio::fs::create_dir_all(data_dir).await
}
