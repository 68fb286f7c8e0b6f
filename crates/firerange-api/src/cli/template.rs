//! Email template CLI subcommands: list, show, set, delete.

use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use firerange_types::email::{Attachment, UpsertEmailTemplateRequest};

use crate::cli::tenant::resolve_tenant;
use crate::state::AppState;

/// Template subcommands.
#[derive(Subcommand)]
pub enum TemplateCommand {
    /// List the tenant's email templates.
    #[command(alias = "ls")]
    List {
        /// Tenant slug.
        tenant: String,
    },

    /// Show one template with its body.
    Show {
        /// Tenant slug.
        tenant: String,
        /// Template key.
        key: String,
    },

    /// Create or replace a template.
    ///
    /// Placeholders: {{nome}}, and for step-linked templates {{data}},
    /// {{hora}} and {{examinador}}.
    Set {
        /// Tenant slug.
        tenant: String,
        /// Template key (lowercase letters, digits, '_' or '-').
        key: String,

        /// Human-readable title.
        #[arg(long)]
        title: String,

        /// Subject line.
        #[arg(long)]
        subject: String,

        /// Body text.
        #[arg(long, conflicts_with = "body_file", required_unless_present = "body_file")]
        body: Option<String>,

        /// Read the body from a file.
        #[arg(long)]
        body_file: Option<PathBuf>,

        /// Workflow step whose appointment the template announces.
        #[arg(long)]
        step: Option<String>,

        /// Attachment as NAME=URL (repeatable).
        #[arg(long = "attachment", value_name = "NAME=URL")]
        attachments: Vec<String>,
    },

    /// Delete a template.
    #[command(alias = "rm")]
    Delete {
        /// Tenant slug.
        tenant: String,
        /// Template key.
        key: String,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        force: bool,
    },
}

/// Handle a template subcommand.
pub async fn handle_template_command(
    cmd: TemplateCommand,
    state: &AppState,
    json: bool,
) -> Result<()> {
    match cmd {
        TemplateCommand::List { tenant } => list_templates(state, &tenant, json).await,
        TemplateCommand::Show { tenant, key } => show_template(state, &tenant, &key, json).await,
        TemplateCommand::Set {
            tenant,
            key,
            title,
            subject,
            body,
            body_file,
            step,
            attachments,
        } => {
            let body = match (body, body_file) {
                (Some(body), _) => body,
                (None, Some(path)) => tokio::fs::read_to_string(&path)
                    .await
                    .with_context(|| format!("Failed to read {}", path.display()))?,
                (None, None) => return Err(anyhow!("Provide --body or --body-file")),
            };
            let attachments = attachments
                .iter()
                .map(|a| parse_attachment(a))
                .collect::<Result<Vec<_>>>()?;
            let request = UpsertEmailTemplateRequest {
                title,
                subject,
                body,
                attachments,
                step_id: step,
            };
            set_template(state, &tenant, &key, request, json).await
        }
        TemplateCommand::Delete { tenant, key, force } => {
            delete_template(state, &tenant, &key, force, json).await
        }
    }
}

/// Parse a `NAME=URL` attachment argument.
fn parse_attachment(raw: &str) -> Result<Attachment> {
    let (name, url) = raw
        .split_once('=')
        .ok_or_else(|| anyhow!("Attachment '{raw}' must look like NAME=URL"))?;
    Ok(Attachment {
        file_name: name.trim().to_string(),
        url: url.trim().to_string(),
    })
}

async fn list_templates(state: &AppState, tenant_slug: &str, json: bool) -> Result<()> {
    let tenant = resolve_tenant(state, tenant_slug).await?;
    let templates = state.email_service.list_templates(&tenant.id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&templates)?);
        return Ok(());
    }

    if templates.is_empty() {
        println!();
        println!("  {} No email templates.", style("i").blue().bold());
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Key").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Subject").fg(Color::White),
        Cell::new("Step").fg(Color::White),
    ]);

    for t in &templates {
        table.add_row(vec![
            Cell::new(&t.key).fg(Color::Cyan),
            Cell::new(&t.title),
            Cell::new(&t.subject),
            Cell::new(t.step_id.as_deref().unwrap_or("-")).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();

    Ok(())
}

async fn show_template(state: &AppState, tenant_slug: &str, key: &str, json: bool) -> Result<()> {
    let tenant = resolve_tenant(state, tenant_slug).await?;
    let template = state.email_service.get_template(&tenant.id, key).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&template)?);
        return Ok(());
    }

    println!();
    println!("  {} {}", style(&template.title).cyan().bold(), style(format!("({})", template.key)).dim());
    println!();
    println!("  {} {}", style("Subject:").bold(), template.subject);
    if let Some(step) = &template.step_id {
        println!("  {}    {}", style("Step:").bold(), step);
    }
    println!();
    for line in template.body.lines() {
        println!("  {line}");
    }
    if !template.attachments.is_empty() {
        println!();
        println!("  {}", style("── Attachments ──").dim());
        for a in &template.attachments {
            println!("  {} {} {}", style("•").dim(), a.file_name, style(&a.url).dim());
        }
    }
    println!();

    Ok(())
}

async fn set_template(
    state: &AppState,
    tenant_slug: &str,
    key: &str,
    request: UpsertEmailTemplateRequest,
    json: bool,
) -> Result<()> {
    let tenant = resolve_tenant(state, tenant_slug).await?;
    let template = state
        .email_service
        .upsert_template(&tenant.id, key, request)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&template)?);
    } else {
        println!(
            "  {} Saved template '{}'",
            style("✓").green().bold(),
            style(&template.key).cyan()
        );
    }
    Ok(())
}

async fn delete_template(
    state: &AppState,
    tenant_slug: &str,
    key: &str,
    force: bool,
    json: bool,
) -> Result<()> {
    let tenant = resolve_tenant(state, tenant_slug).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!("Delete email template '{}'?", style(key).red().bold()))
            .default(false)
            .interact()?;
        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.email_service.delete_template(&tenant.id, key).await?;

    if json {
        println!("{}", serde_json::json!({ "deleted": key }));
    } else {
        println!("  {} Deleted template '{}'", style("✓").red().bold(), key);
    }
    Ok(())
}
