//! Workflow domain types.
//!
//! A client's workflow is an ordered list of [`Step`]s. Each step is one of
//! three kinds: a plain task, a checklist of [`SubTask`]s, or an appointment
//! that may carry a [`Schedule`]. The propagation rules between these live in
//! `firerange-core::workflow::engine`; this module only holds the shapes.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::ClientId;
use crate::tenant::TenantId;

// ---------------------------------------------------------------------------
// Steps
// ---------------------------------------------------------------------------

/// One ordered stage of a client's certification workflow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Step {
    /// Stable identifier, unique within a workflow (e.g. "documentacao").
    pub id: String,
    pub title: String,
    pub completed: bool,
    pub kind: StepKind,
}

/// What a step carries besides its completion flag.
///
/// Internally tagged by `type`:
/// ```json
/// { "type": "checklist", "sub_tasks": [ ... ] }
/// { "type": "appointment", "schedule": null }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum StepKind {
    Task,
    Checklist { sub_tasks: Vec<SubTask> },
    Appointment { schedule: Option<Schedule> },
}

/// A checklist item nested under a step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTask {
    pub id: String,
    pub label: String,
    pub completed: bool,
}

/// Appointment data recorded for an appointment step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub scheduled_at: DateTime<Utc>,
    pub examiner_name: String,
}

impl Step {
    pub fn sub_tasks(&self) -> &[SubTask] {
        match &self.kind {
            StepKind::Checklist { sub_tasks } => sub_tasks,
            _ => &[],
        }
    }

    pub fn has_sub_tasks(&self) -> bool {
        !self.sub_tasks().is_empty()
    }

    pub fn is_appointment(&self) -> bool {
        matches!(self.kind, StepKind::Appointment { .. })
    }

    pub fn schedule(&self) -> Option<&Schedule> {
        match &self.kind {
            StepKind::Appointment { schedule } => schedule.as_ref(),
            _ => None,
        }
    }

    /// Appointment steps with a recorded schedule render as read-only summary
    /// data instead of an open form.
    pub fn is_scheduled(&self) -> bool {
        self.schedule().is_some()
    }
}

// ---------------------------------------------------------------------------
// Workflow
// ---------------------------------------------------------------------------

/// The persisted workflow of one client.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workflow {
    pub tenant_id: TenantId,
    pub client_id: ClientId,
    pub steps: Vec<Step>,
    /// Optimistic-concurrency token. 0 means "never stored".
    pub revision: i64,
    pub updated_at: DateTime<Utc>,
}

impl Workflow {
    pub fn step(&self, step_id: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.id == step_id)
    }
}

/// Aggregate completion of a workflow. Steps are the unit of progress,
/// regardless of how many sub-tasks they hold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    /// `completed / total * 100`, 0 for an empty workflow.
    pub percent: f64,
}

impl Progress {
    pub fn new(completed: usize, total: usize) -> Self {
        let percent = if total == 0 {
            0.0
        } else {
            completed as f64 / total as f64 * 100.0
        };
        Self {
            completed,
            total,
            percent,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.total > 0 && self.completed == self.total
    }
}

/// Progress of one client, as reported by the tenant overview.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientProgress {
    pub client_id: ClientId,
    pub client_name: String,
    #[serde(flatten)]
    pub progress: Progress,
}

/// A mutation requested by the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum WorkflowCommand {
    ToggleStep {
        step_id: String,
    },
    ToggleSubTask {
        step_id: String,
        sub_task_id: String,
    },
    Schedule {
        step_id: String,
        scheduled_at: DateTime<Utc>,
        examiner_name: String,
    },
    ClearSchedule {
        step_id: String,
    },
    Reset,
}

impl WorkflowCommand {
    /// Step targeted by the command, if any.
    pub fn step_id(&self) -> Option<&str> {
        match self {
            WorkflowCommand::ToggleStep { step_id }
            | WorkflowCommand::ToggleSubTask { step_id, .. }
            | WorkflowCommand::Schedule { step_id, .. }
            | WorkflowCommand::ClearSchedule { step_id } => Some(step_id),
            WorkflowCommand::Reset => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Template
// ---------------------------------------------------------------------------

/// The canonical step list every new (or reset) workflow starts from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowTemplate {
    pub steps: Vec<StepBlueprint>,
}

/// Definition of one step inside a [`WorkflowTemplate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StepBlueprint {
    pub id: String,
    pub title: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_tasks: Vec<SubTaskBlueprint>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub appointment: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubTaskBlueprint {
    pub id: String,
    pub label: String,
}

impl StepBlueprint {
    /// Build a fresh step: incomplete, no schedule, every sub-task incomplete.
    pub fn instantiate(&self) -> Step {
        let kind = if self.appointment {
            StepKind::Appointment { schedule: None }
        } else if !self.sub_tasks.is_empty() {
            StepKind::Checklist {
                sub_tasks: self
                    .sub_tasks
                    .iter()
                    .map(|t| SubTask {
                        id: t.id.clone(),
                        label: t.label.clone(),
                        completed: false,
                    })
                    .collect(),
            }
        } else {
            StepKind::Task
        };

        Step {
            id: self.id.clone(),
            title: self.title.clone(),
            completed: false,
            kind,
        }
    }
}

impl WorkflowTemplate {
    pub fn instantiate(&self) -> Vec<Step> {
        self.steps.iter().map(StepBlueprint::instantiate).collect()
    }

    pub fn step(&self, step_id: &str) -> Option<&StepBlueprint> {
        self.steps.iter().find(|s| s.id == step_id)
    }

    /// Check the structural rules of a template. Returns every problem found.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();

        if self.steps.is_empty() {
            errors.push("workflow template must have at least one step".to_string());
        }

        let mut seen = HashSet::new();
        for step in &self.steps {
            if step.id.trim().is_empty() {
                errors.push("step id cannot be empty".to_string());
            }
            if step.title.trim().is_empty() {
                errors.push(format!("step '{}' has an empty title", step.id));
            }
            if !seen.insert(step.id.as_str()) {
                errors.push(format!("duplicate step id '{}'", step.id));
            }
            if step.appointment && !step.sub_tasks.is_empty() {
                errors.push(format!(
                    "step '{}' cannot be both an appointment and a checklist",
                    step.id
                ));
            }

            let mut seen_sub = HashSet::new();
            for sub in &step.sub_tasks {
                if sub.id.trim().is_empty() {
                    errors.push(format!("step '{}' has a sub-task with an empty id", step.id));
                }
                if !seen_sub.insert(sub.id.as_str()) {
                    errors.push(format!(
                        "duplicate sub-task id '{}' in step '{}'",
                        sub.id, step.id
                    ));
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }
}
