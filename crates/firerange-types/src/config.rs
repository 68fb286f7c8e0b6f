//! Global configuration types.
//!
//! `AppConfig` mirrors `config.toml` in the data directory. Every section and
//! field has a default so an empty or partial file is valid.

use serde::{Deserialize, Serialize};

use crate::document::DEFAULT_MAX_DOCUMENT_BYTES;
use crate::workflow::WorkflowTemplate;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub mail: MailConfig,

    #[serde(default)]
    pub storage: StorageConfig,

    /// Replaces the built-in workflow template when present.
    #[serde(default)]
    pub workflow: Option<WorkflowTemplate>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MailConfig {
    #[serde(default = "default_from_address")]
    pub from_address: String,
    #[serde(default = "default_from_name")]
    pub from_name: String,
    /// Offset applied when rendering appointment dates into emails.
    #[serde(default = "default_utc_offset_hours")]
    pub utc_offset_hours: i32,
}

impl Default for MailConfig {
    fn default() -> Self {
        Self {
            from_address: default_from_address(),
            from_name: default_from_name(),
            utc_offset_hours: default_utc_offset_hours(),
        }
    }
}

fn default_from_address() -> String {
    "no-reply@firerange.local".to_string()
}

fn default_from_name() -> String {
    "Fire Range".to_string()
}

// Brasília time, no DST.
fn default_utc_offset_hours() -> i32 {
    -3
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    #[serde(default = "default_max_document_bytes")]
    pub max_document_bytes: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            max_document_bytes: default_max_document_bytes(),
        }
    }
}

fn default_max_document_bytes() -> u64 {
    DEFAULT_MAX_DOCUMENT_BYTES
}
