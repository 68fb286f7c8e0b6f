//! Tenant repository trait definition.

use firerange_types::error::RepositoryError;
use firerange_types::tenant::{Tenant, TenantId};

/// Repository trait for tenant persistence.
///
/// Implementations live in firerange-infra (e.g., SqliteTenantRepository).
pub trait TenantRepository: Send + Sync {
    /// Insert a tenant. A duplicate slug yields `RepositoryError::Conflict`.
    fn create(
        &self,
        tenant: &Tenant,
    ) -> impl std::future::Future<Output = Result<Tenant, RepositoryError>> + Send;

    fn get_by_id(
        &self,
        id: &TenantId,
    ) -> impl std::future::Future<Output = Result<Option<Tenant>, RepositoryError>> + Send;

    fn get_by_slug(
        &self,
        slug: &str,
    ) -> impl std::future::Future<Output = Result<Option<Tenant>, RepositoryError>> + Send;

    /// All tenants ordered by slug.
    fn list(&self) -> impl std::future::Future<Output = Result<Vec<Tenant>, RepositoryError>> + Send;

    /// Delete a tenant and, through cascades, everything it owns.
    fn delete(
        &self,
        id: &TenantId,
    ) -> impl std::future::Future<Output = Result<(), RepositoryError>> + Send;
}
