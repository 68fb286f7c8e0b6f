//! Workflow CLI subcommands: show, toggle, toggle-sub, schedule, unschedule,
//! reset.

use anyhow::{Result, bail};
use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone, Utc};
use clap::Subcommand;
use console::style;
use dialoguer::Confirm;

use firerange_infra::config::mail_offset;
use firerange_types::workflow::{Progress, StepKind, Workflow};

use crate::cli::client::parse_client_id;
use crate::cli::tenant::resolve_tenant;
use crate::state::AppState;

/// Workflow subcommands.
#[derive(Subcommand)]
pub enum WorkflowCommand {
    /// Show every step of a client's workflow.
    Show {
        /// Tenant slug.
        tenant: String,
        /// Client id.
        client: String,
    },

    /// Toggle a step. Completing a checklist step completes all its items.
    Toggle {
        /// Tenant slug.
        tenant: String,
        /// Client id.
        client: String,
        /// Step id (e.g. "cadastro").
        step: String,
    },

    /// Toggle one checklist item of a step.
    ToggleSub {
        /// Tenant slug.
        tenant: String,
        /// Client id.
        client: String,
        /// Step id (e.g. "documentacao").
        step: String,
        /// Sub-task id (e.g. "rg").
        sub_task: String,
    },

    /// Record the appointment of an appointment step.
    Schedule {
        /// Tenant slug.
        tenant: String,
        /// Client id.
        client: String,
        /// Step id (e.g. "teste_tiro").
        step: String,

        /// Date and time: RFC 3339, or "YYYY-MM-DD HH:MM" in the mail time zone.
        #[arg(long)]
        at: String,

        /// Examiner or instructor name.
        #[arg(long)]
        examiner: String,
    },

    /// Clear the appointment of a step.
    Unschedule {
        /// Tenant slug.
        tenant: String,
        /// Client id.
        client: String,
        /// Step id.
        step: String,
    },

    /// Restore the template: every step open, no appointments.
    Reset {
        /// Tenant slug.
        tenant: String,
        /// Client id.
        client: String,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        force: bool,
    },
}

/// Handle a workflow subcommand.
pub async fn handle_workflow_command(
    cmd: WorkflowCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    let offset = mail_offset(&state.config.mail);

    let (tenant_slug, raw_client) = match &cmd {
        WorkflowCommand::Show { tenant, client }
        | WorkflowCommand::Toggle { tenant, client, .. }
        | WorkflowCommand::ToggleSub { tenant, client, .. }
        | WorkflowCommand::Schedule { tenant, client, .. }
        | WorkflowCommand::Unschedule { tenant, client, .. }
        | WorkflowCommand::Reset { tenant, client, .. } => (tenant.clone(), client.clone()),
    };
    let tenant = resolve_tenant(state, &tenant_slug).await?;
    let client_id = parse_client_id(&raw_client)?;
    let svc = &state.workflow_service;

    let workflow = match cmd {
        WorkflowCommand::Show { .. } => svc.get_workflow(&tenant.id, &client_id).await?,
        WorkflowCommand::Toggle { step, .. } => {
            svc.toggle_step(&tenant.id, &client_id, &step).await?
        }
        WorkflowCommand::ToggleSub { step, sub_task, .. } => {
            svc.toggle_sub_task(&tenant.id, &client_id, &step, &sub_task)
                .await?
        }
        WorkflowCommand::Schedule {
            step, at, examiner, ..
        } => {
            let scheduled_at = parse_schedule_time(&at, offset)?;
            svc.schedule(&tenant.id, &client_id, &step, scheduled_at, &examiner)
                .await?
        }
        WorkflowCommand::Unschedule { step, .. } => {
            svc.clear_schedule(&tenant.id, &client_id, &step).await?
        }
        WorkflowCommand::Reset { force, .. } => {
            if !force && !json {
                let confirmed = Confirm::new()
                    .with_prompt("Reset this workflow? Every step and appointment will be cleared.")
                    .default(false)
                    .interact()?;
                if !confirmed {
                    println!("  Cancelled.");
                    return Ok(());
                }
            }
            svc.reset(&tenant.id, &client_id).await?
        }
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&workflow)?);
    } else {
        print_workflow(&workflow, offset);
    }
    Ok(())
}

/// Parse `--at`: RFC 3339, or a naive "YYYY-MM-DD HH:MM" read in `offset`.
pub(crate) fn parse_schedule_time(raw: &str, offset: FixedOffset) -> Result<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Ok(dt.with_timezone(&Utc));
    }
    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M")
        .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M"));
    match naive {
        Ok(naive) => match offset.from_local_datetime(&naive).single() {
            Some(local) => Ok(local.with_timezone(&Utc)),
            None => bail!("'{raw}' is not a valid local time"),
        },
        Err(_) => bail!("'{raw}' is not a date; use RFC 3339 or \"YYYY-MM-DD HH:MM\""),
    }
}

/// `[####----] 3/8 (37.5%)`
pub(crate) fn progress_bar(progress: &Progress) -> String {
    const WIDTH: usize = 16;
    let filled = if progress.total == 0 {
        0
    } else {
        (progress.completed * WIDTH) / progress.total
    };
    format!(
        "[{}{}] {}/{} ({:.1}%)",
        "#".repeat(filled),
        "-".repeat(WIDTH - filled),
        progress.completed,
        progress.total,
        progress.percent
    )
}

fn check(done: bool) -> String {
    if done {
        format!("{}", style("✓").green())
    } else {
        format!("{}", style("○").dim())
    }
}

fn print_workflow(workflow: &Workflow, offset: FixedOffset) {
    let progress = firerange_core::workflow::progress_of(&workflow.steps);

    println!();
    println!("  {}", progress_bar(&progress));
    println!();
    for (i, step) in workflow.steps.iter().enumerate() {
        let title = if step.completed {
            style(step.title.as_str()).green()
        } else {
            style(step.title.as_str()).white()
        };
        println!(
            "  {} {}. {} {}",
            check(step.completed),
            i + 1,
            title,
            style(format!("({})", step.id)).dim()
        );
        match &step.kind {
            StepKind::Task => {}
            StepKind::Checklist { sub_tasks } => {
                for sub in sub_tasks {
                    println!(
                        "       {} {} {}",
                        check(sub.completed),
                        sub.label,
                        style(format!("({})", sub.id)).dim()
                    );
                }
            }
            StepKind::Appointment { schedule } => match schedule {
                Some(s) => println!(
                    "       {} {} with {}",
                    style("⏰").bold(),
                    s.scheduled_at.with_timezone(&offset).format("%d/%m/%Y %H:%M"),
                    style(&s.examiner_name).cyan()
                ),
                None => println!("       {}", style("not scheduled").yellow()),
            },
        }
    }
    println!();
    println!(
        "  {}",
        style(format!(
            "revision {} · updated {}",
            workflow.revision,
            workflow.updated_at.format("%Y-%m-%d %H:%M UTC")
        ))
        .dim()
    );
    println!();
}
