//! Per-client email status and sending.

use axum::Json;
use axum::extract::{Path, Query, State};

use firerange_types::access::Action;
use firerange_types::email::{EmailSendLog, EmailStatus};

use crate::http::error::AppError;
use crate::http::extractors::auth::TenantContext;
use crate::http::extractors::path::{ClientPath, EmailPath};
use crate::http::extractors::query::SendQuery;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// GET /api/v1/{tenant}/clients/{client_id}/emails - Every template with the
/// last time it was sent to the client.
pub async fn email_status(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(path): Path<ClientPath>,
) -> Result<Json<ApiResponse<Vec<EmailStatus>>>, AppError> {
    let timer = RequestTimer::start();
    let client_id = path.client_id()?;
    ctx.principal
        .authorize_client(&ctx.tenant.id, &client_id, Action::ViewEmailHistory)?;

    let statuses = state
        .email_service
        .email_status(&ctx.tenant.id, &client_id)
        .await?;
    Ok(Json(timer.finish(statuses)))
}

/// POST .../emails/{template_key}/send[?resend=true]
pub async fn send_email(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(path): Path<EmailPath>,
    Query(query): Query<SendQuery>,
) -> Result<Json<ApiResponse<EmailSendLog>>, AppError> {
    let timer = RequestTimer::start();
    let client_id = path.client_id()?;
    ctx.principal
        .authorize_client(&ctx.tenant.id, &client_id, Action::SendEmails)?;

    let entry = state
        .email_service
        .send(&ctx.tenant.id, &client_id, &path.template_key, query.resend)
        .await?;
    Ok(Json(timer.finish(entry)))
}
