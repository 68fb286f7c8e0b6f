//! Email template and send-log repository trait definition.

use firerange_types::client::ClientId;
use firerange_types::email::{EmailSendLog, EmailTemplate};
use firerange_types::error::RepositoryError;
use firerange_types::tenant::TenantId;

/// Repository trait covering two entity families:
/// - **Templates:** keyed by (tenant, key).
/// - **Send log:** append-only rows recording each delivered email.
pub trait EmailRepository: Send + Sync {
    // -----------------------------------------------------------------------
    // Templates
    // -----------------------------------------------------------------------

    /// All templates of a tenant ordered by key.
    fn list_templates(
        &self,
        tenant_id: &TenantId,
    ) -> impl std::future::Future<Output = Result<Vec<EmailTemplate>, RepositoryError>> + Send;

    fn get_template(
        &self,
        tenant_id: &TenantId,
        key: &str,
    ) -> impl std::future::Future<Output = Result<Option<EmailTemplate>, RepositoryError>> + Send;

    /// Insert or replace by (tenant, key). The stored `id` and `created_at`
    /// of an existing row are kept.
    fn upsert_template(
        &self,
        template: &EmailTemplate,
    ) -> impl std::future::Future<Output = Result<EmailTemplate, RepositoryError>> + Send;

    fn delete_template(
        &self,
        tenant_id: &TenantId,
        key: &str,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    // -----------------------------------------------------------------------
    // Send log
    // -----------------------------------------------------------------------

    fn append_log(
        &self,
        entry: &EmailSendLog,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Send log of one client, newest first.
    fn list_logs(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
    ) -> impl std::future::Future<Output = Result<Vec<EmailSendLog>, RepositoryError>> + Send;
}
