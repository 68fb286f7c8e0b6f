//! Client CRUD handlers for the REST API.

use axum::Json;
use axum::extract::{Path, Query, State};

use firerange_types::access::{Action, Role};
use firerange_types::client::{Client, CreateClientRequest, UpdateClientRequest};

use crate::http::error::AppError;
use crate::http::extractors::auth::TenantContext;
use crate::http::extractors::path::ClientPath;
use crate::http::extractors::query::ClientListQuery;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

fn with_client_links(resp: ApiResponse<Client>, slug: &str) -> ApiResponse<Client> {
    let base = resp
        .data
        .as_ref()
        .map(|c| format!("/api/v1/{slug}/clients/{}", c.id))
        .unwrap_or_default();
    resp.with_link("workflow", format!("{base}/workflow"))
        .with_link("emails", format!("{base}/emails"))
        .with_link("documents", format!("{base}/documents"))
        .with_link("self", base)
}

/// GET /api/v1/{tenant}/clients - List clients with optional name search.
///
/// Client keys see only their own record.
pub async fn list_clients(
    State(state): State<AppState>,
    ctx: TenantContext,
    Query(query): Query<ClientListQuery>,
) -> Result<Json<ApiResponse<Vec<Client>>>, AppError> {
    let timer = RequestTimer::start();
    ctx.principal.authorize(&ctx.tenant.id, Action::ViewClients)?;

    let clients = match (ctx.principal.role, &ctx.principal.client_id) {
        (Role::Client, Some(own)) => {
            vec![state.client_service.get_client(&ctx.tenant.id, own).await?]
        }
        (Role::Client, None) => Vec::new(),
        _ => {
            state
                .client_service
                .list_clients(&ctx.tenant.id, Some(query.into_filter()))
                .await?
        }
    };

    Ok(Json(
        timer
            .finish(clients)
            .with_link("self", format!("/api/v1/{}/clients", ctx.tenant.slug)),
    ))
}

/// POST /api/v1/{tenant}/clients - Register a client and create its workflow.
pub async fn create_client(
    State(state): State<AppState>,
    ctx: TenantContext,
    Json(body): Json<CreateClientRequest>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    let timer = RequestTimer::start();
    ctx.principal.authorize(&ctx.tenant.id, Action::CreateClients)?;

    let client = state.client_service.create_client(&ctx.tenant.id, body).await?;
    Ok(Json(with_client_links(timer.finish(client), &ctx.tenant.slug)))
}

/// GET /api/v1/{tenant}/clients/{client_id}
pub async fn get_client(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(path): Path<ClientPath>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    let timer = RequestTimer::start();
    let client_id = path.client_id()?;
    ctx.principal
        .authorize_client(&ctx.tenant.id, &client_id, Action::ViewClients)?;

    let client = state.client_service.get_client(&ctx.tenant.id, &client_id).await?;
    Ok(Json(with_client_links(timer.finish(client), &ctx.tenant.slug)))
}

/// PUT /api/v1/{tenant}/clients/{client_id} - Partial update.
pub async fn update_client(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(path): Path<ClientPath>,
    Json(body): Json<UpdateClientRequest>,
) -> Result<Json<ApiResponse<Client>>, AppError> {
    let timer = RequestTimer::start();
    let client_id = path.client_id()?;
    ctx.principal
        .authorize_client(&ctx.tenant.id, &client_id, Action::EditClients)?;

    let client = state
        .client_service
        .update_client(&ctx.tenant.id, &client_id, body)
        .await?;
    Ok(Json(with_client_links(timer.finish(client), &ctx.tenant.slug)))
}

/// DELETE /api/v1/{tenant}/clients/{client_id} - Delete a client with its
/// workflow, email log and documents.
pub async fn delete_client(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(path): Path<ClientPath>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let timer = RequestTimer::start();
    let client_id = path.client_id()?;
    ctx.principal
        .authorize_client(&ctx.tenant.id, &client_id, Action::DeleteClients)?;

    state
        .client_service
        .delete_client(&ctx.tenant.id, &client_id)
        .await?;
    Ok(Json(timer.finish(serde_json::json!({ "deleted": client_id }))))
}
