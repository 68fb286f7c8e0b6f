//! Tenant management handlers. Reserved to super admin keys.

use axum::Json;
use axum::extract::{Path, State};

use firerange_types::access::Action;
use firerange_types::tenant::{CreateTenantRequest, Tenant};

use crate::http::error::AppError;
use crate::http::extractors::auth::Authenticated;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// GET /api/v1/tenants - List every tenant.
pub async fn list_tenants(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
) -> Result<Json<ApiResponse<Vec<Tenant>>>, AppError> {
    let timer = RequestTimer::start();
    principal.authorize_global(Action::ManageTenants)?;

    let tenants = state.tenant_service.list_tenants().await?;
    Ok(Json(timer.finish(tenants).with_link("self", "/api/v1/tenants")))
}

/// POST /api/v1/tenants - Create a tenant and seed its email templates.
pub async fn create_tenant(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Json(body): Json<CreateTenantRequest>,
) -> Result<Json<ApiResponse<Tenant>>, AppError> {
    let timer = RequestTimer::start();
    principal.authorize_global(Action::ManageTenants)?;

    let tenant = state.tenant_service.create_tenant(body).await?;
    let slug = tenant.slug.clone();
    Ok(Json(
        timer
            .finish(tenant)
            .with_link("clients", format!("/api/v1/{slug}/clients"))
            .with_link("templates", format!("/api/v1/{slug}/templates")),
    ))
}

/// DELETE /api/v1/tenants/{slug} - Delete a tenant and everything it owns.
pub async fn delete_tenant(
    State(state): State<AppState>,
    Authenticated(principal): Authenticated,
    Path(slug): Path<String>,
) -> Result<Json<ApiResponse<Tenant>>, AppError> {
    let timer = RequestTimer::start();
    principal.authorize_global(Action::ManageTenants)?;

    let tenant = state.tenant_service.delete_tenant(&slug).await?;
    Ok(Json(timer.finish(tenant)))
}
