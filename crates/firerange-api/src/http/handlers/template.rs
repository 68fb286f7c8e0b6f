//! Email template administration handlers.

use axum::Json;
use axum::extract::{Path, State};

use firerange_types::access::Action;
use firerange_types::email::{EmailTemplate, UpsertEmailTemplateRequest};

use crate::http::error::AppError;
use crate::http::extractors::auth::TenantContext;
use crate::http::extractors::path::TemplatePath;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// GET /api/v1/{tenant}/templates
pub async fn list_templates(
    State(state): State<AppState>,
    ctx: TenantContext,
) -> Result<Json<ApiResponse<Vec<EmailTemplate>>>, AppError> {
    let timer = RequestTimer::start();
    ctx.principal.authorize(&ctx.tenant.id, Action::ViewTemplates)?;

    let templates = state.email_service.list_templates(&ctx.tenant.id).await?;
    Ok(Json(
        timer
            .finish(templates)
            .with_link("self", format!("/api/v1/{}/templates", ctx.tenant.slug)),
    ))
}

/// GET /api/v1/{tenant}/templates/{key}
pub async fn get_template(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(path): Path<TemplatePath>,
) -> Result<Json<ApiResponse<EmailTemplate>>, AppError> {
    let timer = RequestTimer::start();
    ctx.principal.authorize(&ctx.tenant.id, Action::ViewTemplates)?;

    let template = state
        .email_service
        .get_template(&ctx.tenant.id, &path.key)
        .await?;
    Ok(Json(timer.finish(template)))
}

/// PUT /api/v1/{tenant}/templates/{key} - Create or replace a template.
pub async fn upsert_template(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(path): Path<TemplatePath>,
    Json(body): Json<UpsertEmailTemplateRequest>,
) -> Result<Json<ApiResponse<EmailTemplate>>, AppError> {
    let timer = RequestTimer::start();
    ctx.principal.authorize(&ctx.tenant.id, Action::ManageTemplates)?;

    let template = state
        .email_service
        .upsert_template(&ctx.tenant.id, &path.key, body)
        .await?;
    Ok(Json(timer.finish(template)))
}

/// DELETE /api/v1/{tenant}/templates/{key}
pub async fn delete_template(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(path): Path<TemplatePath>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let timer = RequestTimer::start();
    ctx.principal.authorize(&ctx.tenant.id, Action::ManageTemplates)?;

    state
        .email_service
        .delete_template(&ctx.tenant.id, &path.key)
        .await?;
    Ok(Json(timer.finish(serde_json::json!({ "deleted": path.key }))))
}
