//! Workflow service: load, mutate through the engine, persist.
//!
//! Saves are revision-checked. When another writer got there first the
//! command is re-applied to the fresher workflow instead of overwriting it,
//! up to [`MAX_APPLY_ATTEMPTS`] times.

use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

use firerange_types::client::ClientId;
use firerange_types::error::{RepositoryError, WorkflowError};
use firerange_types::tenant::TenantId;
use firerange_types::workflow::{ClientProgress, Progress, Workflow, WorkflowCommand, WorkflowTemplate};

use crate::repository::client::ClientRepository;
use crate::repository::workflow::WorkflowRepository;
use crate::workflow::engine::{WorkflowEngine, progress_of};

/// Attempts per command before giving up with `ConcurrentModification`.
pub const MAX_APPLY_ATTEMPTS: usize = 3;

pub struct WorkflowService<C: ClientRepository, W: WorkflowRepository> {
    client_repo: C,
    workflow_repo: W,
    template: WorkflowTemplate,
}

impl<C: ClientRepository, W: WorkflowRepository> WorkflowService<C, W> {
    pub fn new(client_repo: C, workflow_repo: W, template: WorkflowTemplate) -> Self {
        Self {
            client_repo,
            workflow_repo,
            template,
        }
    }

    /// The template new and reset workflows start from.
    pub fn template(&self) -> &WorkflowTemplate {
        &self.template
    }

    async fn ensure_client(&self, tenant_id: &TenantId, client_id: &ClientId) -> Result<(), WorkflowError> {
        self.client_repo
            .get(tenant_id, client_id)
            .await
            .map_err(|e| WorkflowError::StorageError(e.to_string()))?
            .map(|_| ())
            .ok_or(WorkflowError::ClientNotFound)
    }

    /// Load the stored workflow, or a fresh unsaved one (revision 0) if the
    /// client never had one stored.
    async fn load_or_materialize(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
    ) -> Result<Workflow, WorkflowError> {
        let stored = self
            .workflow_repo
            .load_workflow(tenant_id, client_id)
            .await
            .map_err(|e| WorkflowError::StorageError(e.to_string()))?;

        Ok(stored.unwrap_or_else(|| Workflow {
            tenant_id: tenant_id.clone(),
            client_id: client_id.clone(),
            steps: self.template.instantiate(),
            revision: 0,
            updated_at: Utc::now(),
        }))
    }

    pub async fn get_workflow(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
    ) -> Result<Workflow, WorkflowError> {
        self.ensure_client(tenant_id, client_id).await?;
        self.load_or_materialize(tenant_id, client_id).await
    }

    pub async fn progress(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
    ) -> Result<Progress, WorkflowError> {
        let workflow = self.get_workflow(tenant_id, client_id).await?;
        Ok(progress_of(&workflow.steps))
    }

    /// Run one command against a client's workflow and persist the result.
    ///
    /// Commands that change nothing (unknown ids) return the workflow as it
    /// is without writing.
    pub async fn apply(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        command: WorkflowCommand,
    ) -> Result<Workflow, WorkflowError> {
        self.ensure_client(tenant_id, client_id).await?;

        for attempt in 1..=MAX_APPLY_ATTEMPTS {
            let workflow = self.load_or_materialize(tenant_id, client_id).await?;
            self.validate(&workflow, &command)?;

            let mut engine = WorkflowEngine::new(workflow.steps.clone());
            if !engine.apply(&command, &self.template) {
                debug!(tenant_id = %tenant_id, client_id = %client_id, ?command, "workflow command changed nothing");
                return Ok(workflow);
            }

            let candidate = Workflow {
                steps: engine.into_steps(),
                ..workflow
            };
            match self.workflow_repo.save_workflow(&candidate).await {
                Ok(saved) => {
                    info!(
                        tenant_id = %tenant_id,
                        client_id = %client_id,
                        revision = saved.revision,
                        ?command,
                        "workflow updated"
                    );
                    return Ok(saved);
                }
                Err(RepositoryError::Conflict(_)) => {
                    warn!(tenant_id = %tenant_id, client_id = %client_id, attempt, "workflow revision conflict, retrying");
                }
                Err(e) => return Err(WorkflowError::StorageError(e.to_string())),
            }
        }

        Err(WorkflowError::ConcurrentModification)
    }

    /// Reject schedule commands the engine would silently ignore.
    fn validate(&self, workflow: &Workflow, command: &WorkflowCommand) -> Result<(), WorkflowError> {
        let step_id = match command {
            WorkflowCommand::Schedule { step_id, examiner_name, .. } => {
                if examiner_name.trim().is_empty() {
                    return Err(WorkflowError::InvalidSchedule(
                        "examiner name cannot be empty".to_string(),
                    ));
                }
                step_id
            }
            WorkflowCommand::ClearSchedule { step_id } => step_id,
            _ => return Ok(()),
        };

        let step = workflow
            .step(step_id)
            .ok_or_else(|| WorkflowError::StepNotFound(step_id.clone()))?;
        if !step.is_appointment() {
            return Err(WorkflowError::NotSchedulable(step_id.clone()));
        }
        Ok(())
    }

    pub async fn toggle_step(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        step_id: &str,
    ) -> Result<Workflow, WorkflowError> {
        let command = WorkflowCommand::ToggleStep {
            step_id: step_id.to_string(),
        };
        self.apply(tenant_id, client_id, command).await
    }

    pub async fn toggle_sub_task(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        step_id: &str,
        sub_task_id: &str,
    ) -> Result<Workflow, WorkflowError> {
        let command = WorkflowCommand::ToggleSubTask {
            step_id: step_id.to_string(),
            sub_task_id: sub_task_id.to_string(),
        };
        self.apply(tenant_id, client_id, command).await
    }

    pub async fn schedule(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        step_id: &str,
        scheduled_at: DateTime<Utc>,
        examiner_name: &str,
    ) -> Result<Workflow, WorkflowError> {
        let command = WorkflowCommand::Schedule {
            step_id: step_id.to_string(),
            scheduled_at,
            examiner_name: examiner_name.trim().to_string(),
        };
        self.apply(tenant_id, client_id, command).await
    }

    pub async fn clear_schedule(
        &self,
        tenant_id: &TenantId,
        client_id: &ClientId,
        step_id: &str,
    ) -> Result<Workflow, WorkflowError> {
        let command = WorkflowCommand::ClearSchedule {
            step_id: step_id.to_string(),
        };
        self.apply(tenant_id, client_id, command).await
    }

    pub async fn reset(&self, tenant_id: &TenantId, client_id: &ClientId) -> Result<Workflow, WorkflowError> {
        self.apply(tenant_id, client_id, WorkflowCommand::Reset).await
    }

    /// Per-client progress of a tenant. Clients whose workflow was never
    /// stored count as the untouched template.
    pub async fn progress_overview(
        &self,
        tenant_id: &TenantId,
    ) -> Result<Vec<ClientProgress>, WorkflowError> {
        let mut rows = self
            .workflow_repo
            .progress_by_tenant(tenant_id)
            .await
            .map_err(|e| WorkflowError::StorageError(e.to_string()))?;

        let template_total = self.template.steps.len();
        for row in rows.iter_mut().filter(|r| r.progress.total == 0) {
            row.progress = Progress::new(0, template_total);
        }
        Ok(rows)
    }
}
