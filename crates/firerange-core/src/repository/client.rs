//! Client repository trait definition.

use firerange_types::client::{Client, ClientId};
use firerange_types::error::RepositoryError;
use firerange_types::tenant::TenantId;

use super::SortOrder;

/// Filter criteria for listing clients.
#[derive(Debug, Clone, Default)]
pub struct ClientFilter {
    /// Case-insensitive substring match on the client name.
    pub search: Option<String>,
    /// Sort direction on the name column.
    pub sort_order: Option<SortOrder>,
    /// Maximum number of results.
    pub limit: Option<i64>,
    /// Number of results to skip (offset pagination).
    pub offset: Option<i64>,
}

/// Repository trait for client persistence.
pub trait ClientRepository: Send + Sync {
    fn create(
        &self,
        client: &Client,
    ) -> impl std::future::Future<Output = Result<Client, RepositoryError>> + Send;

    fn get(
        &self,
        tenant_id: &TenantId,
        id: &ClientId,
    ) -> impl std::future::Future<Output = Result<Option<Client>, RepositoryError>> + Send;

    fn list(
        &self,
        tenant_id: &TenantId,
        filter: Option<ClientFilter>,
    ) -> impl std::future::Future<Output = Result<Vec<Client>, RepositoryError>> + Send;

    /// Overwrite the mutable fields. Missing rows yield `NotFound`.
    fn update(
        &self,
        client: &Client,
    ) -> impl std::future::Future<Output = Result<Client, RepositoryError>> + Send;

    /// Delete a client together with its workflow, send log and document
    /// metadata. Missing rows yield `NotFound`.
    fn delete(
        &self,
        tenant_id: &TenantId,
        id: &ClientId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
