//! Tenant CLI subcommands: create, list, delete.

use anyhow::{Context, Result};
use clap::Subcommand;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;
use dialoguer::Confirm;

use firerange_types::tenant::{CreateTenantRequest, Tenant};

use crate::state::AppState;

/// Tenant subcommands.
#[derive(Subcommand)]
pub enum TenantCommand {
    /// Create a tenant and seed its default email templates.
    Create {
        /// Display name of the club.
        name: String,

        /// URL slug (derived from the name when omitted).
        #[arg(long)]
        slug: Option<String>,
    },

    /// List all tenants.
    #[command(alias = "ls")]
    List,

    /// Delete a tenant with all its clients, templates and keys.
    #[command(alias = "rm")]
    Delete {
        /// Tenant slug.
        slug: String,

        /// Skip the confirmation prompt.
        #[arg(long, short)]
        force: bool,
    },
}

/// Handle a tenant subcommand.
pub async fn handle_tenant_command(cmd: TenantCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        TenantCommand::Create { name, slug } => create_tenant(state, name, slug, json).await,
        TenantCommand::List => list_tenants(state, json).await,
        TenantCommand::Delete { slug, force } => delete_tenant(state, &slug, force, json).await,
    }
}

/// Look up a tenant by slug with a CLI-friendly error.
pub(crate) async fn resolve_tenant(state: &AppState, slug: &str) -> Result<Tenant> {
    state
        .tenant_service
        .get_tenant_by_slug(slug)
        .await
        .with_context(|| format!("Tenant '{slug}' not found"))
}

async fn create_tenant(state: &AppState, name: String, slug: Option<String>, json: bool) -> Result<()> {
    let tenant = state
        .tenant_service
        .create_tenant(CreateTenantRequest { name, slug })
        .await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tenant)?);
        return Ok(());
    }

    println!();
    println!("  {} Tenant created", style("✓").green().bold());
    println!();
    println!("  {}  {}", style("Name:").bold(), style(&tenant.name).cyan());
    println!("  {}  {}", style("Slug:").bold(), &tenant.slug);
    println!("  {}    {}", style("ID:").bold(), style(tenant.id.to_string()).dim());
    println!();
    println!(
        "  Issue an admin key: {}",
        style(format!("frange key create {} --role admin --name admin", tenant.slug)).yellow()
    );
    println!();

    Ok(())
}

async fn list_tenants(state: &AppState, json: bool) -> Result<()> {
    let tenants = state.tenant_service.list_tenants().await?;

    if json {
        println!("{}", serde_json::to_string_pretty(&tenants)?);
        return Ok(());
    }

    if tenants.is_empty() {
        println!();
        println!(
            "  {} No tenants yet. Create one with: {}",
            style("i").blue().bold(),
            style("frange tenant create \"Clube Alfa\"").yellow()
        );
        println!();
        return Ok(());
    }

    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Name").fg(Color::White),
        Cell::new("Slug").fg(Color::White),
        Cell::new("Created").fg(Color::White),
    ]);

    for tenant in &tenants {
        table.add_row(vec![
            Cell::new(&tenant.name).fg(Color::Cyan),
            Cell::new(&tenant.slug),
            Cell::new(tenant.created_at.format("%Y-%m-%d").to_string()).fg(Color::DarkGrey),
        ]);
    }

    println!();
    println!("{table}");
    println!();
    println!(
        "  {} tenant{}",
        style(tenants.len()).bold(),
        if tenants.len() == 1 { "" } else { "s" }
    );
    println!();

    Ok(())
}

async fn delete_tenant(state: &AppState, slug: &str, force: bool, json: bool) -> Result<()> {
    let tenant = resolve_tenant(state, slug).await?;

    if !force && !json {
        let confirmed = Confirm::new()
            .with_prompt(format!(
                "Permanently delete tenant '{}' and all its clients?",
                style(&tenant.name).red().bold()
            ))
            .default(false)
            .interact()?;

        if !confirmed {
            println!("  Cancelled.");
            return Ok(());
        }
    }

    state.tenant_service.delete_tenant(slug).await?;

    if json {
        println!("{}", serde_json::json!({ "deleted": true, "slug": slug }));
    } else {
        println!("  {} Tenant '{}' deleted.", style("✓").red().bold(), tenant.name);
    }

    Ok(())
}
