//! Placeholder substitution for email templates.

use chrono::FixedOffset;

use firerange_types::client::Client;
use firerange_types::email::{
    DATE_PLACEHOLDER, EXAMINER_PLACEHOLDER, EmailTemplate, NAME_PLACEHOLDER, OutgoingEmail,
    TIME_PLACEHOLDER,
};
use firerange_types::workflow::Schedule;

/// Replace the known placeholders in `text`.
///
/// `{{nome}}` always becomes the client name. The appointment placeholders
/// are only filled when a schedule is given; otherwise they stay verbatim,
/// as does any placeholder this function does not know. Tokens are read from
/// `text` only, so substituted values are never expanded again.
pub fn render_text(
    text: &str,
    client_name: &str,
    schedule: Option<&Schedule>,
    offset: FixedOffset,
) -> String {
    let local = schedule.map(|s| s.scheduled_at.with_timezone(&offset));
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        let Some(len) = rest[start..].find("}}").map(|end| end + 2) else {
            break;
        };
        out.push_str(&rest[..start]);
        let token = &rest[start..start + len];
        let value = match (token, schedule, local) {
            (NAME_PLACEHOLDER, _, _) => Some(client_name.to_string()),
            (DATE_PLACEHOLDER, _, Some(local)) => Some(local.format("%d/%m/%Y").to_string()),
            (TIME_PLACEHOLDER, _, Some(local)) => Some(local.format("%H:%M").to_string()),
            (EXAMINER_PLACEHOLDER, Some(s), _) => Some(s.examiner_name.clone()),
            _ => None,
        };
        match value {
            Some(value) => {
                out.push_str(&value);
                rest = &rest[start + len..];
            }
            None => {
                // Unknown token: keep "{{" and rescan after it, so an inner
                // "{{nome}}" in "{{x {{nome}}" still resolves.
                out.push_str("{{");
                rest = &rest[start + 2..];
            }
        }
    }
    out.push_str(rest);
    out
}

/// Render a template for one recipient. The caller has already checked that
/// the client has an email address.
pub fn render_email(
    template: &EmailTemplate,
    client: &Client,
    to_address: &str,
    schedule: Option<&Schedule>,
    offset: FixedOffset,
) -> OutgoingEmail {
    OutgoingEmail {
        to_address: to_address.to_string(),
        to_name: client.name.clone(),
        subject: render_text(&template.subject, &client.name, schedule, offset),
        body: render_text(&template.body, &client.name, schedule, offset),
        attachments: template.attachments.clone(),
    }
}
