//! Document store trait.
//!
//! Holds the bytes of client documents. Metadata lives in the
//! `DocumentRepository`; objects here are addressed by
//! (tenant, client, document id) only.

use firerange_types::client::ClientId;
use firerange_types::error::RepositoryError;
use firerange_types::tenant::TenantId;
use uuid::Uuid;

/// Trait for client document byte storage.
///
/// Uses RPITIT (native async fn in traits, Rust 2024 edition).
pub trait DocumentStore: Send + Sync {
    /// Write (or overwrite) the bytes of a document.
    fn put(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        document_id: &Uuid,
        data: &[u8],
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Read the bytes of a document. Missing objects yield `NotFound`.
    fn get(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        document_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<Vec<u8>, RepositoryError>> + Send;

    /// Remove one document. Removing a missing object is not an error.
    fn delete(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        document_id: &Uuid,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;

    /// Remove every document of a client.
    fn delete_client(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
