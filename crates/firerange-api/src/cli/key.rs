//! Access key CLI subcommands.
//!
//! The CLI runs with full access to the data directory, so it can mint any
//! key, including the first super admin key.

use anyhow::{Result, anyhow};
use clap::Subcommand;
use console::style;

use firerange_types::access::Role;

use crate::cli::client::parse_client_id;
use crate::cli::tenant::resolve_tenant;
use crate::state::AppState;

/// Key subcommands.
#[derive(Subcommand)]
pub enum KeyCommand {
    /// Create an access key. The secret is shown once.
    Create {
        /// Tenant slug (omit for super_admin keys).
        tenant: Option<String>,

        /// Label for the key.
        #[arg(long)]
        name: String,

        /// super_admin, admin, operator or client.
        #[arg(long, default_value = "operator")]
        role: String,

        /// Client id, required for client keys.
        #[arg(long)]
        client: Option<String>,
    },
}

/// Handle a key subcommand.
pub async fn handle_key_command(cmd: KeyCommand, state: &AppState, json: bool) -> Result<()> {
    match cmd {
        KeyCommand::Create {
            tenant,
            name,
            role,
            client,
        } => create_key(state, tenant.as_deref(), &name, &role, client.as_deref(), json).await,
    }
}

async fn create_key(
    state: &AppState,
    tenant_slug: Option<&str>,
    name: &str,
    role: &str,
    client: Option<&str>,
    json: bool,
) -> Result<()> {
    let role: Role = role.parse().map_err(|e: String| anyhow!(e))?;
    let tenant = match tenant_slug {
        Some(slug) => Some(resolve_tenant(state, slug).await?),
        None => None,
    };
    let client_id = client.map(parse_client_id).transpose()?;

    let (key, secret) = state
        .access_service
        .create_key(name, role, tenant.as_ref().map(|t| t.id.clone()), client_id)
        .await?;

    if json {
        let value = serde_json::json!({
            "id": key.id,
            "name": key.name,
            "role": key.role,
            "tenant": tenant.as_ref().map(|t| t.slug.clone()),
            "client_id": key.client_id,
            "secret": secret,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} {} key '{}' created (save this, it won't be shown again):",
        style("🔑").bold(),
        key.role,
        key.name
    );
    println!();
    println!("  {}", style(&secret).yellow().bold());
    println!();
    println!(
        "  Use it as {}",
        style("Authorization: Bearer <key>").dim()
    );
    println!();

    Ok(())
}
