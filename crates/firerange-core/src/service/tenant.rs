//! Tenant management and tenant-slug resolution.
//!
//! Every tenant-scoped route starts with the tenant slug, so resolving the
//! slug from a request path is the first step of handling any request.

use chrono::Utc;
use tracing::{info, warn};

use firerange_types::error::{RepositoryError, TenantError};
use firerange_types::tenant::{
    CreateTenantRequest, MAX_SLUG_LEN, Tenant, TenantId, is_reserved_slug, is_valid_slug,
    slugify,
};
use firerange_types::workflow::WorkflowTemplate;

use crate::repository::email::EmailRepository;
use crate::repository::tenant::TenantRepository;
use crate::service::email::default_templates;

/// Prefix of the versioned REST API.
pub const API_PREFIX: &str = "/api/v1";

/// Extract the tenant slug from a request path.
///
/// Takes the first segment after an optional `/api/v1` prefix, lowercased.
/// Returns `None` when that segment is missing, is not a valid slug, or is a
/// reserved route name.
///
/// ```
/// use firerange_core::service::tenant::slug_from_path;
///
/// assert_eq!(slug_from_path("/clube-alfa/clients").as_deref(), Some("clube-alfa"));
/// assert_eq!(slug_from_path("/api/v1/clube-alfa/templates").as_deref(), Some("clube-alfa"));
/// assert_eq!(slug_from_path("/tenants"), None);
/// assert_eq!(slug_from_path("/"), None);
/// ```
pub fn slug_from_path(path: &str) -> Option<String> {
    let rest = match path.strip_prefix(API_PREFIX) {
        Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
        _ => path,
    };

    let segment = rest
        .split(['?', '#'])
        .next()?
        .split('/')
        .find(|s| !s.is_empty())?
        .to_lowercase();

    if is_valid_slug(&segment) && !is_reserved_slug(&segment) {
        Some(segment)
    } else {
        None
    }
}

/// Service orchestrating the tenant lifecycle.
pub struct TenantService<T: TenantRepository, E: EmailRepository> {
    tenant_repo: T,
    email_repo: E,
    workflow_template: WorkflowTemplate,
}

impl<T: TenantRepository, E: EmailRepository> TenantService<T, E> {
    /// - `workflow_template`: the active template, used to link the seeded
    ///   email templates to their steps
    pub fn new(tenant_repo: T, email_repo: E, workflow_template: WorkflowTemplate) -> Self {
        Self {
            tenant_repo,
            email_repo,
            workflow_template,
        }
    }

    /// Create a tenant and seed its default email templates.
    pub async fn create_tenant(&self, request: CreateTenantRequest) -> Result<Tenant, TenantError> {
        let name = request.name.trim().to_string();
        if name.is_empty() {
            return Err(TenantError::Invalid("name cannot be empty".to_string()));
        }

        let slug = match request.slug {
            Some(slug) if !slug.trim().is_empty() => slug.trim().to_lowercase(),
            _ => slugify(&name),
        };
        if slug.len() > MAX_SLUG_LEN {
            return Err(TenantError::Invalid(format!(
                "slug '{slug}' is longer than {MAX_SLUG_LEN} characters"
            )));
        }
        if !is_valid_slug(&slug) {
            return Err(TenantError::Invalid(format!(
                "slug '{slug}' must be lowercase letters, digits and single hyphens"
            )));
        }
        if is_reserved_slug(&slug) {
            return Err(TenantError::ReservedSlug(slug));
        }

        let tenant = Tenant {
            id: TenantId::new(),
            slug: slug.clone(),
            name,
            created_at: Utc::now(),
        };

        let tenant = self
            .tenant_repo
            .create(&tenant)
            .await
            .map_err(|e| match e {
                RepositoryError::Conflict(_) => TenantError::SlugConflict(slug.clone()),
                other => TenantError::StorageError(other.to_string()),
            })?;

        if let Err(e) = self.seed_templates(&tenant).await {
            // Drop the half-seeded tenant so the slug can be retried.
            if let Err(cleanup) = self.tenant_repo.delete(&tenant.id).await {
                warn!(tenant = %tenant.slug, error = %cleanup, "failed to roll back tenant");
            }
            return Err(e);
        }

        info!(tenant = %tenant.slug, "tenant created");
        Ok(tenant)
    }

    async fn seed_templates(&self, tenant: &Tenant) -> Result<(), TenantError> {
        for template in default_templates(&tenant.id, &self.workflow_template) {
            self.email_repo
                .upsert_template(&template)
                .await
                .map_err(|e| TenantError::StorageError(e.to_string()))?;
        }
        Ok(())
    }

    pub async fn list_tenants(&self) -> Result<Vec<Tenant>, TenantError> {
        self.tenant_repo
            .list()
            .await
            .map_err(|e| TenantError::StorageError(e.to_string()))
    }

    pub async fn get_tenant_by_slug(&self, slug: &str) -> Result<Tenant, TenantError> {
        self.tenant_repo
            .get_by_slug(&slug.to_lowercase())
            .await
            .map_err(|e| TenantError::StorageError(e.to_string()))?
            .ok_or(TenantError::NotFound)
    }

    /// Resolve the tenant a request path addresses.
    pub async fn resolve_path(&self, path: &str) -> Result<Tenant, TenantError> {
        let slug = slug_from_path(path).ok_or(TenantError::NotFound)?;
        self.get_tenant_by_slug(&slug).await
    }

    /// Delete a tenant with all of its data.
    pub async fn delete_tenant(&self, slug: &str) -> Result<Tenant, TenantError> {
        let tenant = self.get_tenant_by_slug(slug).await?;
        self.tenant_repo
            .delete(&tenant.id)
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => TenantError::NotFound,
                other => TenantError::StorageError(other.to_string()),
            })?;
        info!(tenant = %tenant.slug, "tenant deleted");
        Ok(tenant)
    }
}
