//! Workflow handlers: view, toggles, appointment scheduling and reset.

use axum::Json;
use axum::extract::{Path, State};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use firerange_core::workflow::progress_of;
use firerange_types::access::Action;
use firerange_types::workflow::{Progress, Workflow};

use crate::http::error::AppError;
use crate::http::extractors::auth::TenantContext;
use crate::http::extractors::path::{ClientPath, StepPath, SubTaskPath};
use crate::http::response::{ApiResponse, RequestTimer};
use crate::state::AppState;

/// A workflow together with its derived progress.
#[derive(Debug, Serialize)]
pub struct WorkflowView {
    #[serde(flatten)]
    pub workflow: Workflow,
    pub progress: Progress,
}

impl From<Workflow> for WorkflowView {
    fn from(workflow: Workflow) -> Self {
        let progress = progress_of(&workflow.steps);
        Self { workflow, progress }
    }
}

/// Body of `PUT .../schedule`.
#[derive(Debug, Deserialize)]
pub struct ScheduleRequest {
    pub scheduled_at: DateTime<Utc>,
    pub examiner_name: String,
}

fn respond(
    timer: RequestTimer,
    ctx: &TenantContext,
    workflow: Workflow,
) -> Json<ApiResponse<WorkflowView>> {
    let href = format!(
        "/api/v1/{}/clients/{}/workflow",
        ctx.tenant.slug, workflow.client_id
    );
    Json(timer.finish(WorkflowView::from(workflow)).with_link("self", href))
}

/// GET /api/v1/{tenant}/clients/{client_id}/workflow
pub async fn get_workflow(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(path): Path<ClientPath>,
) -> Result<Json<ApiResponse<WorkflowView>>, AppError> {
    let timer = RequestTimer::start();
    let client_id = path.client_id()?;
    ctx.principal
        .authorize_client(&ctx.tenant.id, &client_id, Action::ViewWorkflow)?;

    let workflow = state
        .workflow_service
        .get_workflow(&ctx.tenant.id, &client_id)
        .await?;
    Ok(respond(timer, &ctx, workflow))
}

/// POST .../workflow/steps/{step_id}/toggle
pub async fn toggle_step(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(path): Path<StepPath>,
) -> Result<Json<ApiResponse<WorkflowView>>, AppError> {
    let timer = RequestTimer::start();
    let client_id = path.client_id()?;
    ctx.principal
        .authorize_client(&ctx.tenant.id, &client_id, Action::ToggleStep)?;

    let workflow = state
        .workflow_service
        .toggle_step(&ctx.tenant.id, &client_id, &path.step_id)
        .await?;
    Ok(respond(timer, &ctx, workflow))
}

/// POST .../workflow/steps/{step_id}/sub-tasks/{sub_task_id}/toggle
pub async fn toggle_sub_task(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(path): Path<SubTaskPath>,
) -> Result<Json<ApiResponse<WorkflowView>>, AppError> {
    let timer = RequestTimer::start();
    let client_id = path.client_id()?;
    ctx.principal
        .authorize_client(&ctx.tenant.id, &client_id, Action::ToggleSubTask)?;

    let workflow = state
        .workflow_service
        .toggle_sub_task(&ctx.tenant.id, &client_id, &path.step_id, &path.sub_task_id)
        .await?;
    Ok(respond(timer, &ctx, workflow))
}

/// PUT .../workflow/steps/{step_id}/schedule - Record an appointment.
pub async fn schedule_step(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(path): Path<StepPath>,
    Json(body): Json<ScheduleRequest>,
) -> Result<Json<ApiResponse<WorkflowView>>, AppError> {
    let timer = RequestTimer::start();
    let client_id = path.client_id()?;
    ctx.principal
        .authorize_client(&ctx.tenant.id, &client_id, Action::ScheduleStep)?;

    let workflow = state
        .workflow_service
        .schedule(
            &ctx.tenant.id,
            &client_id,
            &path.step_id,
            body.scheduled_at,
            &body.examiner_name,
        )
        .await?;
    Ok(respond(timer, &ctx, workflow))
}

/// DELETE .../workflow/steps/{step_id}/schedule - Clear an appointment.
pub async fn clear_schedule(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(path): Path<StepPath>,
) -> Result<Json<ApiResponse<WorkflowView>>, AppError> {
    let timer = RequestTimer::start();
    let client_id = path.client_id()?;
    ctx.principal
        .authorize_client(&ctx.tenant.id, &client_id, Action::ScheduleStep)?;

    let workflow = state
        .workflow_service
        .clear_schedule(&ctx.tenant.id, &client_id, &path.step_id)
        .await?;
    Ok(respond(timer, &ctx, workflow))
}

/// POST .../workflow/reset - Restore the template: every flag false, no
/// schedules.
pub async fn reset_workflow(
    State(state): State<AppState>,
    ctx: TenantContext,
    Path(path): Path<ClientPath>,
) -> Result<Json<ApiResponse<WorkflowView>>, AppError> {
    let timer = RequestTimer::start();
    let client_id = path.client_id()?;
    ctx.principal
        .authorize_client(&ctx.tenant.id, &client_id, Action::ResetWorkflow)?;

    let workflow = state
        .workflow_service
        .reset(&ctx.tenant.id, &client_id)
        .await?;
    Ok(respond(timer, &ctx, workflow))
}
