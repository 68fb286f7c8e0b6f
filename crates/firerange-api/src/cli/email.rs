//! Email CLI subcommands: status, send.

use anyhow::Result;
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use crate::cli::client::parse_client_id;
use crate::cli::tenant::resolve_tenant;
use crate::state::AppState;

/// Email subcommands.
#[derive(Subcommand)]
pub enum EmailCommand {
    /// Every template with the last time it was sent to the client.
    Status {
        /// Tenant slug.
        tenant: String,
        /// Client id.
        client: String,
    },

    /// Render a template for a client and hand it to the mailer.
    Send {
        /// Tenant slug.
        tenant: String,
        /// Client id.
        client: String,
        /// Template key.
        key: String,

        /// Send again even if it was already sent.
        #[arg(long)]
        resend: bool,
    },
}

/// Handle an email subcommand.
pub async fn handle_email_command(cmd: EmailCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        EmailCommand::Status { tenant, client } => email_status(state, &tenant, &client, json).await,
        EmailCommand::Send {
            tenant,
            client,
            key,
            resend,
        } => send_email(state, &tenant, &client, &key, resend, json).await,
    }
}

async fn email_status(state: &AppState, tenant_slug: &str, raw_id: &str, json: bool) -> Result<()> {
    let tenant = resolve_tenant(state, tenant_slug).await?;
    let client_id = parse_client_id(raw_id)?;
    let statuses = state.email_service.email_status(&tenant.id, &client_id).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&statuses)?);
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Key").fg(Color::White),
        Cell::new("Title").fg(Color::White),
        Cell::new("Last sent").fg(Color::White),
    ]);

    for s in &statuses {
        let sent = match &s.last_sent_at {
            Some(at) => Cell::new(at.format("%Y-%m-%d %H:%M UTC").to_string()).fg(Color::Green),
            None => Cell::new("never").fg(Color::DarkGrey),
        };
        table.add_row(vec![Cell::new(&s.key).fg(Color::Cyan), Cell::new(&s.title), sent]);
    }

    println!();
    println!("{table}");
    println!();

    Ok(())
}

async fn send_email(
    state: &AppState,
    tenant_slug: &str,
    raw_id: &str,
    key: &str,
    resend: bool,
    json: bool,
) -> Result<()> {
    let tenant = resolve_tenant(state, tenant_slug).await?;
    let client_id = parse_client_id(raw_id)?;
    let entry = state
        .email_service
        .send(&tenant.id, &client_id, key, resend)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry)?);
    } else {
        println!(
            "  {} Sent '{}' to {}",
            style("✓").green().bold(),
            style(key).cyan(),
            style(&entry.recipient).bold()
        );
    }
    Ok(())
}
