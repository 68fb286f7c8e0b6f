//! Client document handlers.
//!
//! Uploads take the raw file as the request body, with the file name (and
//! optionally the workflow step) in the query string. Downloads return the
//! raw bytes with the detected content type.

use axum::Json;
use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::header;
use axum::response::{IntoResponse, Response};

use firerange_types::access::Action;
use firerange_types::document::ClientDocument;

use crate::http::error::AppError;
use crate::http::extractors::auth::TenantContext;
use crate::http::extractors::path::{ClientPath, DocumentPath};
use crate::http::extractors::query::UploadQuery;
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// GET /api/v1/{tenant}/clients/{client_id}/documents - Document metadata.
pub async fn list_documents(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(path): Path<ClientPath>,
) -> Result<Json<ApiResponse<Vec<ClientDocument>>>, AppError> {
    let timer = RequestTimer::start();
    let client_id = path.client_id()?;
    ctx.principal
        .authorize_client(&ctx.tenant.id, &client_id, Action::ViewDocuments)?;

    let documents = state
        .document_service
        .list(&ctx.tenant.id, &client_id)
        .await?;
    Ok(Json(timer.finish(documents)))
}

/// POST .../documents?filename=rg.pdf&step_id=documentacao
pub async fn upload_document(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(path): Path<ClientPath>,
    Query(query): Query<UploadQuery>,
    body: Bytes,
) -> Result<Json<ApiResponse<ClientDocument>>, AppError> {
    let timer = RequestTimer::start();
    let client_id = path.client_id()?;
    ctx.principal
        .authorize_client(&ctx.tenant.id, &client_id, Action::UploadDocuments)?;

    let document = state
        .document_service
        .upload(&ctx.tenant.id, &client_id, &query.filename, query.step_id, &body)
        .await?;
    let href = format!(
        "/api/v1/{}/clients/{}/documents/{}",
        ctx.tenant.slug, client_id, document.id
    );
    Ok(Json(timer.finish(document).with_link("self", href)))
}

/// GET .../documents/{document_id} - Download the stored bytes.
pub async fn download_document(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(path): Path<DocumentPath>,
) -> Result<Response, AppError> {
    let client_id = path.client_id()?;
    let document_id = path.document_id()?;
    ctx.principal
        .authorize_client(&ctx.tenant.id, &client_id, Action::ViewDocuments)?;

    let (document, data) = state
        .document_service
        .download(&ctx.tenant.id, &client_id, &document_id)
        .await?;

    let disposition = format!(
        "attachment; filename=\"{}\"",
        document.filename.replace('"', "")
    );
    Ok((
        [
            (header::CONTENT_TYPE, document.mime_type),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response())
}

/// DELETE .../documents/{document_id}
pub async fn delete_document(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(path): Path<DocumentPath>,
) -> Result<Json<ApiResponse<serde_json::Value>>, AppError> {
    let timer = RequestTimer::start();
    let client_id = path.client_id()?;
    let document_id = path.document_id()?;
    ctx.principal
        .authorize_client(&ctx.tenant.id, &client_id, Action::DeleteDocuments)?;

    state
        .document_service
        .delete(&ctx.tenant.id, &client_id, &document_id)
        .await?;
    Ok(Json(timer.finish(serde_json::json!({ "deleted": document_id }))))
}
