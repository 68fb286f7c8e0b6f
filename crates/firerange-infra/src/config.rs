//! Configuration loader for Fire Range.
//!
//! Reads `config.toml` from the data directory (`~/.firerange/` in
//! production) and deserializes it into [`AppConfig`]. Falls back to
//! defaults when the file is missing or malformed.

use std::path::Path;

use chrono::{FixedOffset, Offset, Utc};
use firerange_types::config::{AppConfig, MailConfig};

/// Load configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`AppConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_config(data_dir: &Path) -> AppConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return AppConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return AppConfig::default();
        }
    };

    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            AppConfig::default()
        }
    }
}

/// Time zone used to render appointment dates into emails.
///
/// Offsets outside ±23 hours are rejected with a warning and UTC is used.
pub fn mail_offset(mail: &MailConfig) -> FixedOffset {
    mail.utc_offset_hours
        .checked_mul(3600)
        .and_then(FixedOffset::east_opt)
        .unwrap_or_else(|| {
            tracing::warn!(
                utc_offset_hours = mail.utc_offset_hours,
                "Invalid mail.utc_offset_hours, rendering dates in UTC"
            );
            Utc.fix()
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use firerange_types::document::DEFAULT_MAX_DOCUMENT_BYTES;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(tmp.path()).await;
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.storage.max_document_bytes, DEFAULT_MAX_DOCUMENT_BYTES);
        assert!(config.workflow.is_none());
    }

    #[tokio::test]
    async fn load_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join("config.toml"),
            r#"
[server]
port = 8080

[mail]
from_name = "Clube Alvo Certo"

[[workflow.steps]]
id = "cadastro"
title = "Cadastro"

[[workflow.steps]]
id = "exame"
title = "Exame"
appointment = true
"#,
        )
        .await
        .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.mail.from_name, "Clube Alvo Certo");
        let workflow = config.workflow.unwrap();
        assert_eq!(workflow.steps.len(), 2);
        assert!(workflow.steps[1].appointment);
    }

    #[tokio::test]
    async fn load_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join("config.toml"), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_config(tmp.path()).await;
        assert_eq!(config.server.port, 3000);
    }

    #[test]
    fn mail_offset_uses_configured_hours() {
        let mail = MailConfig::default();
        assert_eq!(mail_offset(&mail).local_minus_utc(), -3 * 3600);

        let mail = MailConfig {
            utc_offset_hours: 99,
            ..MailConfig::default()
        };
        assert_eq!(mail_offset(&mail).local_minus_utc(), 0);
    }
}
