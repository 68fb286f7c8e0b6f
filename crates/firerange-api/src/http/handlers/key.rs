//! Access key issuing.

use axum::Json;
use axum::extract::State;
use serde::Serialize;

use firerange_types::access::{AccessKey, CreateAccessKeyRequest};

use crate::http::error::AppError;
use crate::http::extractors::auth::TenantContext;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// A newly issued key. `secret` is returned once and never stored.
#[derive(Debug, Serialize)]
pub struct IssuedKey {
    #[serde(flatten)]
    pub key: AccessKey,
    pub secret: String,
}

/// POST /api/v1/{tenant}/keys - Issue a key bound to this tenant.
pub async fn create_key(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(body): Json<CreateAccessKeyRequest>,
) -> Result<Json<ApiResponse<IssuedKey>>, AppError> {
    let timer = RequestTimer::start();

    let (key, secret) = state
        .access_service
        .issue(&ctx.principal, &ctx.tenant.id, body)
        .await?;
    Ok(Json(timer.finish(IssuedKey { key, secret })))
}
