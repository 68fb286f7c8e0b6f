//! Workflow state engine.
//!
//! Owns the ordered step list of one client and the completion propagation
//! between a checklist step and its sub-tasks. Every operation is total:
//! unknown ids leave the list untouched and report `false`.

use chrono::{DateTime, Utc};

use firerange_types::workflow::{Progress, Schedule, Step, StepKind, WorkflowCommand, WorkflowTemplate};

/// In-memory workflow state for a single client.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkflowEngine {
    steps: Vec<Step>,
}

impl WorkflowEngine {
    pub fn new(steps: Vec<Step>) -> Self {
        Self { steps }
    }

    /// Start from a fresh copy of `template`.
    pub fn from_template(template: &WorkflowTemplate) -> Self {
        Self::new(template.instantiate())
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn into_steps(self) -> Vec<Step> {
        self.steps
    }

    fn step_mut(&mut self, step_id: &str) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.id == step_id)
    }

    /// Flip a step's completion flag.
    ///
    /// Going from incomplete to complete also completes every sub-task.
    /// Going back to incomplete leaves the sub-tasks as they are.
    pub fn toggle_step(&mut self, step_id: &str) -> bool {
        let Some(step) = self.step_mut(step_id) else {
            return false;
        };

        step.completed = !step.completed;
        if step.completed {
            if let StepKind::Checklist { sub_tasks } = &mut step.kind {
                for sub in sub_tasks.iter_mut() {
                    sub.completed = true;
                }
            }
        }
        true
    }

    /// Flip one sub-task, then recompute the parent as the AND of its
    /// sub-tasks.
    pub fn toggle_sub_task(&mut self, step_id: &str, sub_task_id: &str) -> bool {
        let Some(step) = self.step_mut(step_id) else {
            return false;
        };
        let StepKind::Checklist { sub_tasks } = &mut step.kind else {
            return false;
        };
        let Some(sub) = sub_tasks.iter_mut().find(|t| t.id == sub_task_id) else {
            return false;
        };

        sub.completed = !sub.completed;
        step.completed = sub_tasks.iter().all(|t| t.completed);
        true
    }

    /// Replace the whole step list with a fresh copy of `template`.
    pub fn reset(&mut self, template: &WorkflowTemplate) {
        self.steps = template.instantiate();
    }

    /// Share of completed steps, in percent. Sub-tasks do not weigh in.
    pub fn progress(&self) -> Progress {
        progress_of(&self.steps)
    }

    /// Record the appointment of an appointment step. The completion flag is
    /// not affected.
    pub fn schedule_step(
        &mut self,
        step_id: &str,
        scheduled_at: DateTime<Utc>,
        examiner_name: &str,
    ) -> bool {
        match self.step_mut(step_id) {
            Some(Step {
                kind: StepKind::Appointment { schedule },
                ..
            }) => {
                *schedule = Some(Schedule {
                    scheduled_at,
                    examiner_name: examiner_name.to_string(),
                });
                true
            }
            _ => false,
        }
    }

    pub fn clear_schedule(&mut self, step_id: &str) -> bool {
        match self.step_mut(step_id) {
            Some(Step {
                kind: StepKind::Appointment { schedule },
                ..
            }) => schedule.take().is_some(),
            _ => false,
        }
    }

    /// Dispatch a command. Returns whether the step list changed.
    pub fn apply(&mut self, command: &WorkflowCommand, template: &WorkflowTemplate) -> bool {
        match command {
            WorkflowCommand::ToggleStep { step_id } => self.toggle_step(step_id),
            WorkflowCommand::ToggleSubTask {
                step_id,
                sub_task_id,
            } => self.toggle_sub_task(step_id, sub_task_id),
            WorkflowCommand::Schedule {
                step_id,
                scheduled_at,
                examiner_name,
            } => self.schedule_step(step_id, *scheduled_at, examiner_name),
            WorkflowCommand::ClearSchedule { step_id } => self.clear_schedule(step_id),
            WorkflowCommand::Reset => {
                let before = std::mem::take(&mut self.steps);
                self.reset(template);
                before != self.steps
            }
        }
    }
}

/// Progress of an arbitrary step list.
pub fn progress_of(steps: &[Step]) -> Progress {
    let completed = steps.iter().filter(|s| s.completed).count();
    Progress::new(completed, steps.len())
}
