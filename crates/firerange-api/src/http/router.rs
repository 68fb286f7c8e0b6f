//! Axum router configuration with middleware.
//!
//! All routes are under `/api/v1/`, except `/health`. Tenant-scoped routes
//! start with the tenant slug. Middleware: CORS, tracing.

use axum::Router;
use axum::extract::DefaultBodyLimit;
use axum::routing::{delete, get, post};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::http::handlers;
use crate::state::AppState;

/// Build the complete API router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let upload_limit =
        usize::try_from(state.config.storage.max_document_bytes).unwrap_or(usize::MAX);

    let api_routes = Router::new()
        // Tenants
        .route(
            "/tenants",
            get(handlers::tenant::list_tenants).post(handlers::tenant::create_tenant),
        )
        .route("/tenants/{slug}", delete(handlers::tenant::delete_tenant))
        // Clients
        .route(
            "/{tenant}/clients",
            get(handlers::client::list_clients).post(handlers::client::create_client),
        )
        .route(
            "/{tenant}/clients/{client_id}",
            get(handlers::client::get_client)
                .put(handlers::client::update_client)
                .delete(handlers::client::delete_client),
        )
        // Workflow
        .route(
            "/{tenant}/clients/{client_id}/workflow",
            get(handlers::workflow::get_workflow),
        )
        .route(
            "/{tenant}/clients/{client_id}/workflow/steps/{step_id}/toggle",
            post(handlers::workflow::toggle_step),
        )
        .route(
            "/{tenant}/clients/{client_id}/workflow/steps/{step_id}/sub-tasks/{sub_task_id}/toggle",
            post(handlers::workflow::toggle_sub_task),
        )
        .route(
            "/{tenant}/clients/{client_id}/workflow/steps/{step_id}/schedule",
            axum::routing::put(handlers::workflow::schedule_step)
                .delete(handlers::workflow::clear_schedule),
        )
        .route(
            "/{tenant}/clients/{client_id}/workflow/reset",
            post(handlers::workflow::reset_workflow),
        )
        // Emails
        .route(
            "/{tenant}/clients/{client_id}/emails",
            get(handlers::email::email_status),
        )
        .route(
            "/{tenant}/clients/{client_id}/emails/{template_key}/send",
            post(handlers::email::send_email),
        )
        // Documents
        .route(
            "/{tenant}/clients/{client_id}/documents",
            get(handlers::document::list_documents)
                .post(handlers::document::upload_document)
                .layer(DefaultBodyLimit::max(upload_limit)),
        )
        .route(
            "/{tenant}/clients/{client_id}/documents/{document_id}",
            get(handlers::document::download_document)
                .delete(handlers::document::delete_document),
        )
        // Email templates
        .route("/{tenant}/templates", get(handlers::template::list_templates))
        .route(
            "/{tenant}/templates/{key}",
            get(handlers::template::get_template)
                .put(handlers::template::upsert_template)
                .delete(handlers::template::delete_template),
        )
        // Dashboard stats
        .route("/{tenant}/stats", get(handlers::stats::get_stats))
        // Access keys
        .route("/{tenant}/keys", post(handlers::key::create_key));

    Router::new()
        .route("/health", get(health_check))
        .nest("/api/v1", api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// GET /health - Simple health check endpoint (no auth required).
async fn health_check() -> axum::Json<serde_json::Value> {
    axum::Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}
