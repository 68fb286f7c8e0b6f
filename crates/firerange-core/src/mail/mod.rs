//! Outgoing mail: the `Mailer` port and template rendering.
//!
//! The core never talks to a mail transport. The email service renders a
//! template into an [`OutgoingEmail`] and hands it to whatever `Mailer` the
//! application was built with (the shipped adapter writes to an outbox
//! directory).

pub mod render;

use firerange_types::email::OutgoingEmail;
use firerange_types::error::MailError;

pub use render::{render_email, render_text};

/// Delivery port for rendered emails.
pub trait Mailer: Send + Sync {
    /// Hand one message to the transport. An `Err` means the message was
    /// not accepted and must not be recorded as sent.
    fn send(
        &self,
        email: &OutgoingEmail,
    ) -> impl std::future::Future<Output = Result<(), MailError>> + Send;
}
