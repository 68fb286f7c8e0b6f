//! Client CLI subcommands: create, list, show, delete.

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::{Confirm, Input};

use firerange_core::repository::client::ClientFilter;
use firerange_types::client::{ClientId, CreateClientRequest};
use firerange_types::workflow::ClientProgress;

use crate::cli::tenant::resolve_tenant;
use crate::cli::workflow::progress_bar;
use crate::state::AppState;

/// Client subcommands.
#[derive(Subcommand)]
pub enum ClientCommand {
    /// Register a client (prompts for the name when omitted).
    Create {
        /// Tenant slug.
        tenant: String,

        /// Full name.
        #[arg(long)]
        name: Option<String>,

        /// Email address used for notifications.
        #[arg(long)]
        email: Option<String>,

        /// Phone number.
        #[arg(long)]
        phone: Option<String>,

        /// CPF or other identity document number.
        #[arg(long)]
        document: Option<String>,

        /// Free-form notes.
        #[arg(long)]
        notes: Option<String>,
    },

    /// List clients with their workflow progress.
    #[command(alias = "ls")]
    List {
        /// Tenant slug.
        tenant: String,

        /// Case-insensitive name search.
        #[arg(long, short)]
        search: Option<String>,

        /// Maximum number of clients.
        #[arg(long)]
        limit: Option<i64>,
    },

    /// Show a client with its workflow progress.
    Show {
        /// Tenant slug.
        tenant: String,

        /// Client id.
        client: String,
    },

    /// Delete a client with its workflow, email log and documents.
    #[command(alias = "rm")]
    Delete {
        /// Tenant slug.
        tenant: String,

        /// Client id.
        client: String,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        force: bool,
    },
}

/// Handle a client subcommand.
pub async fn handle_client_command(cmd: ClientCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        ClientCommand::Create {
            tenant,
            name,
            email,
            phone,
            document,
            notes,
        } => {
            let request = CreateClientRequest {
                name: match name {
                    Some(n) => n,
                    None => Input::<String>::new()
                        .with_prompt("Client name")
                        .interact_text()?,
                },
                email,
                phone,
                document_number: document,
                notes,
            };
            create_client(state, &tenant, request, json).await
        }
        ClientCommand::List { tenant, search, limit } => {
            list_clients(state, &tenant, search, limit, json).await
        }
        ClientCommand::Show { tenant, client } => show_client(state, &tenant, &client, json).await,
        ClientCommand::Delete { tenant, client, force } => {
            delete_client(state, &tenant, &client, force, json).await
        }
    }
}

/// Parse a client id argument.
pub(crate) fn parse_client_id(raw: &str) -> Result<ClientId> {
    raw.trim()
        .parse()
        .with_context(|| format!("'{raw}' is not a valid client id"))
}

async fn create_client(
    state: &AppState,
    tenant_slug: &str,
    request: CreateClientRequest,
    json: bool,
) -> Result<()> {
    let tenant = resolve_tenant(state, tenant_slug).await?;
    let client = state.client_service.create_client(&tenant.id, request).await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&client)?);
        return Ok(());
    }

    println!();
    println!("  {} Client registered", style("✓").green().bold());
    println!();
    println!("  {}  {}", style("Name:").bold(), style(&client.name).cyan());
    if let Some(email) = &client.email {
        println!("  {} {}", style("Email:").bold(), email);
    }
    println!("  {}    {}", style("ID:").bold(), style(client.id.to_string()).dim());
    println!();
    println!(
        "  Follow the workflow: {}",
        style(format!("frange workflow show {} {}", tenant.slug, client.id)).yellow()
    );
    println!();

    Ok(())
}

async fn list_clients(
    state: &AppState,
    tenant_slug: &str,
    search: Option<String>,
    limit: Option<i64>,
    json: bool,
) -> Result<()> {
    let tenant = resolve_tenant(state, tenant_slug).await?;
    let filter = ClientFilter {
        search,
        limit,
        ..Default::default()
    };
    let clients = state
        .client_service
        .list_clients(&tenant.id, Some(filter))
        .await?;
    let progress: Vec<ClientProgress> = state
        .workflow_service
        .progress_overview(&tenant.id)
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&clients)?);
        return Ok(());
    }

    if clients.is_empty() {
        println!();
        println!(
            "  {} No clients found. Register one with: {}",
            style("i").blue().bold(),
            style(format!("frange client create {tenant_slug} --name \"...\"")).yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Email").fg(Color::White),
        Cell::new("Progress").fg(Color::White),
        Cell::new("ID").fg(Color::White),
    ]);

    for client in &clients {
        let row_progress = progress
            .iter()
            .find(|p| p.client_id == client.id)
            .map(|p| p.progress);
        let progress_cell = match row_progress {
            Some(p) if p.is_complete() => Cell::new(progress_bar(&p)).fg(Color::Green),
            Some(p) => Cell::new(progress_bar(&p)).fg(Color::Yellow),
            None => Cell::new("-").fg(Color::DarkGrey),
        };
        table.add_row(vec![
            Cell::new(&client.name).fg(Color::Cyan),
            Cell::new(client.email.as_deref().unwrap_or("-")),
            progress_cell,
            Cell::new(client.id.to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} client{}",
        style(clients.len()).bold(),
        if clients.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

async fn show_client(state: &AppState, tenant_slug: &str, raw_id: &str, json: bool) -> Result<()> {
    let tenant = resolve_tenant(state, tenant_slug).await?;
    let client_id = parse_client_id(raw_id)?;
    let client = state.client_service.get_client(&tenant.id, &client_id).await?;
    let progress = state.workflow_service.progress(&tenant.id, &client_id).await?;
    let documents = state.document_service.list(&tenant.id, &client_id).await?;

    if json {
        let value = serde_json::json!({
            "client": client,
            "progress": progress,
            "documents": documents.len(),
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!("  {}", style(&client.name).cyan().bold());
    println!();
    println!("  {}", style("── Details ──").dim());
    println!("  {}     {}", style("Email:").bold(), client.email.as_deref().unwrap_or("-"));
    println!("  {}     {}", style("Phone:").bold(), client.phone.as_deref().unwrap_or("-"));
    println!(
        "  {}  {}",
        style("Document:").bold(),
        client.document_number.as_deref().unwrap_or("-")
    );
    println!("  {}        {}", style("ID:").bold(), style(client.id.to_string()).dim());
    if !client.notes.is_empty() {
        println!("  {}     {}", style("Notes:").bold(), client.notes);
    }
    println!();
    println!("  {}", style("── Workflow ──").dim());
    println!("  {}", progress_bar(&progress));
    println!("  {} document{}", documents.len(), if documents.len() == 1 { "" } else { "s" });
    println!();
    println!("  {}", style("── Timestamps ──").dim());
    println!("  {} {}", style("Created:").bold(), client.created_at.format("%Y-%m-%d %H:%M UTC"));
    println!("  {} {}", style("Updated:").bold(), client.updated_at.format("%Y-%m-%d %H:%M UTC"));
    println!();

    Ok(())
}

async fn delete_client(
    state: &AppState,
    tenant_slug: &str,
    raw_id: &str,
    force: bool,
    json: bool,
) -> Result<()> {
    let tenant = resolve_tenant(state, tenant_slug).await?;
    let client_id = parse_client_id(raw_id)?;
    let client = state.client_service.get_client(&tenant.id, &client_id).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete client '{}' with their workflow and documents?",
                style(&client.name).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.client_service.delete_client(&tenant.id, &client_id).await?;

    if json {
        println!("{}", serde_json::json!({ "deleted": true, "id": client_id }));
    } else {
        println!("  {} Client '{}' deleted.", style("✓").red().bold(), client.name);
    }

    Ok(())
}
