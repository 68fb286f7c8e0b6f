//! Workflow repository trait definition.
//!
//! Persists the step list of one client. Writes are guarded by the workflow
//! `revision`: a save carrying a stale revision is rejected so concurrent
//! edits are never silently overwritten.

use firerange_types::client::ClientId;
use firerange_types::error::RepositoryError;
use firerange_types::tenant::TenantId;
use firerange_types::workflow::{ClientProgress, Workflow};

/// Repository trait for workflow persistence.
pub trait WorkflowRepository: Send + Sync {
    /// Load the workflow of a client, `None` if it was never stored.
    fn load_workflow(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
    ) -> impl std::future::Future<Output = Result<Option<Workflow>, RepositoryError>> + Send;

    /// Store the full step list.
    ///
    /// `workflow.revision` must be the revision that was loaded (0 for a
    /// workflow that was never stored). On success the returned workflow
    /// carries the new revision. A mismatch yields
    /// `RepositoryError::Conflict`.
    fn save_workflow(
        &self,
        workflow: &Workflow,
    ) -> impl std::future::Future<Output = Result<Workflow, RepositoryError>> + Send;

    /// Completed/total step counts of every client of a tenant, ordered by
    /// client name.
    fn progress_by_tenant(
        &self,
        tenant_id: &TenantId,
    ) -> impl std::future::Future<Output = Result<Vec<ClientProgress>, RepositoryError>> + Send;
}
