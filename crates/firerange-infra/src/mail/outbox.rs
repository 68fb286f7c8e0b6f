//! File-based mail transport.
//!
//! Implements the `Mailer` trait from `firerange-core` by writing each message
//! as a JSON file into an outbox directory. A relay (or an operator) picks the
//! files up from there; delivery beyond the outbox is outside this process.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use firerange_core::mail::Mailer;
use firerange_types::email::{Attachment, OutgoingEmail};
use firerange_types::error::MailError;
use serde::Serialize;
use uuid::Uuid;

/// One message as written to the outbox.
#[derive(Debug, Serialize)]
struct OutboxMessage<'a> {
    id: Uuid,
    queued_at: DateTime<Utc>,
    from_address: &'a str,
    from_name: &'a str,
    to_address: &'a str,
    to_name: &'a str,
    subject: &'a str,
    body: &'a str,
    attachments: &'a [Attachment],
}

/// Mailer that queues messages as `{outbox_dir}/{timestamp}-{id}.json`.
pub struct OutboxMailer {
    outbox_dir: PathBuf,
    from_address: String,
    from_name: String,
}

impl OutboxMailer {
    pub fn new(outbox_dir: PathBuf, from_address: String, from_name: String) -> Self {
        Self {
            outbox_dir,
            from_address,
            from_name,
        }
    }
}

impl Mailer for OutboxMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), MailError> {
        let to = email.to_address.trim();
        if to.is_empty() || !to.contains('@') || to.contains(char::is_whitespace) {
            return Err(MailError::InvalidRecipient(email.to_address.clone()));
        }

        let message = OutboxMessage {
            id: Uuid::now_v7(),
            queued_at: Utc::now(),
            from_address: &self.from_address,
            from_name: &self.from_name,
            to_address: to,
            to_name: &email.to_name,
            subject: &email.subject,
            body: &email.body,
            attachments: &email.attachments,
        };
        let json = serde_json::to_string_pretty(&message)
            .map_err(|e| MailError::Transport(format!("Failed to encode message: {e}")))?;

        tokio::fs::create_dir_all(&self.outbox_dir)
            .await
            .map_err(|e| MailError::Transport(format!("Failed to create outbox: {e}")))?;

        let path = self.outbox_dir.join(format!(
            "{}-{}.json",
            message.queued_at.format("%Y%m%dT%H%M%S"),
            message.id
        ));
        tokio::fs::write(&path, json)
            .await
            .map_err(|e| MailError::Transport(format!("Failed to write {}: {e}", path.display())))?;

        tracing::info!(message_id = %message.id, path = %path.display(), "email queued in outbox");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn email(to: &str) -> OutgoingEmail {
        OutgoingEmail {
            to_address: to.to_string(),
            to_name: "Ana Souza".to_string(),
            subject: "Agendamento confirmado".to_string(),
            body: "Olá Ana, seu teste é em 10/03/2026 às 14:30.".to_string(),
            attachments: vec![Attachment {
                file_name: "mapa.pdf".to_string(),
                url: "https://example.com/mapa.pdf".to_string(),
            }],
        }
    }

    #[tokio::test]
    async fn test_send_writes_json_file() {
        let dir = tempdir().unwrap();
        let outbox = dir.path().join("outbox");
        let mailer = OutboxMailer::new(
            outbox.clone(),
            "no-reply@alvo.com.br".to_string(),
            "Clube Alvo".to_string(),
        );

        mailer.send(&email("ana@example.com")).await.unwrap();

        let mut entries = std::fs::read_dir(&outbox).unwrap();
        let path = entries.next().unwrap().unwrap().path();
        assert!(entries.next().is_none());
        assert_eq!(path.extension().unwrap(), "json");

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(value["to_address"], "ana@example.com");
        assert_eq!(value["from_name"], "Clube Alvo");
        assert_eq!(value["subject"], "Agendamento confirmado");
        assert_eq!(value["attachments"][0]["file_name"], "mapa.pdf");
    }

    #[tokio::test]
    async fn test_send_rejects_invalid_recipient() {
        let dir = tempdir().unwrap();
        let mailer = OutboxMailer::new(dir.path().join("outbox"), String::new(), String::new());

        for to in ["", "ana", "ana maria@example.com"] {
            assert!(matches!(
                mailer.send(&email(to)).await,
                Err(MailError::InvalidRecipient(_))
            ));
        }
        assert!(!dir.path().join("outbox").exists());
    }
}
