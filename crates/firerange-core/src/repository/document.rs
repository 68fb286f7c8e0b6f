//! Client document metadata repository trait definition.

use firerange_types::client::ClientId;
use firerange_types::document::ClientDocument;
use firerange_types::error::RepositoryError;
use firerange_types::tenant::TenantId;
use uuid::Uuid;

pub trait DocumentRepository: Send + Sync {
    fn create(
        &self,
        document: &ClientDocument,
    ) -> impl std::future::Future<Output = Result<ClientDocument, RepositoryError>> + Send;

    fn get(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Option<ClientDocument>, RepositoryError>> + Send;

    /// Documents of one client, newest first.
    fn list(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
    ) -> impl std::future::Future<Output = Result<Vec<ClientDocument>, RepositoryError>> + Send;

    fn delete(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
