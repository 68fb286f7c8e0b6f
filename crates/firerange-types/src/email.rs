//! Email template and send-log types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::client::ClientId;
use crate::tenant::TenantId;

/// Placeholder replaced with the client's name at send time.
pub const NAME_PLACEHOLDER: &str = "{{nome}}";
/// Placeholder replaced with the appointment date (dd/mm/yyyy).
pub const DATE_PLACEHOLDER: &str = "{{data}}";
/// Placeholder replaced with the appointment time (HH:MM).
pub const TIME_PLACEHOLDER: &str = "{{hora}}";
/// Placeholder replaced with the examiner's name.
pub const EXAMINER_PLACEHOLDER: &str = "{{examinador}}";

pub const MAX_TEMPLATE_KEY_LEN: usize = 64;

/// An email template, unique per (tenant, key).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailTemplate {
    pub id: Uuid,
    pub tenant_id: TenantId,
    /// Stable identifier selecting this template for a communication purpose.
    pub key: String,
    pub title: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Workflow step this email belongs to. When that step is an appointment,
    /// the email cannot be sent until the appointment is scheduled.
    #[serde(default)]
    pub step_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Reference to a file attached to every email sent from a template.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    pub file_name: String,
    pub url: String,
}

/// Body of a template create/replace request. The key comes from the path.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpsertEmailTemplateRequest {
    pub title: String,
    pub subject: String,
    pub body: String,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    #[serde(default)]
    pub step_id: Option<String>,
}

/// Record that a template was sent to a client. Its existence is the only
/// "already sent" signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailSendLog {
    pub id: Uuid,
    pub tenant_id: TenantId,
    pub client_id: ClientId,
    pub template_key: String,
    pub recipient: String,
    pub sent_at: DateTime<Utc>,
}

/// A fully rendered message handed to the mailer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutgoingEmail {
    pub to_address: String,
    pub to_name: String,
    pub subject: String,
    pub body: String,
    pub attachments: Vec<Attachment>,
}

/// Send state of one template for one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailStatus {
    pub key: String,
    pub title: String,
    pub step_id: Option<String>,
    /// Most recent send, `None` if never sent.
    pub last_sent_at: Option<DateTime<Utc>>,
}

/// Template keys are lowercase ASCII letters, digits, `_` and `-`.
pub fn is_valid_template_key(key: &str) -> bool {
    !key.is_empty()
        && key.len() <= MAX_TEMPLATE_KEY_LEN
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_' || c == '-')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_template_key_validation() {
        assert!(is_valid_template_key("boas_vindas"));
        assert!(is_valid_template_key("agendamento-psicologico"));
        assert!(!is_valid_template_key(""));
        assert!(!is_valid_template_key("Boas Vindas"));
        assert!(!is_valid_template_key(&"k".repeat(MAX_TEMPLATE_KEY_LEN + 1)));
    }

    #[test]
    fn test_upsert_request_defaults() {
        let req: UpsertEmailTemplateRequest =
            serde_json::from_str(r#"{"title":"t","subject":"s","body":"b"}"#).unwrap();
        assert!(req.attachments.is_empty());
        assert!(req.step_id.is_none());
    }
}
