//! System status dashboard command.

use anyhow::Result;
use console::style;

use crate::state::AppState;

/// Per-tenant summary row.
struct TenantSummary {
    slug: String,
    name: String,
    clients: usize,
    completed: usize,
    average_percent: f64,
}

/// Display system status dashboard.
///
/// Shows every tenant with its client count and average workflow progress,
/// plus the data directory and version.
pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let tenants = state.tenant_service.list_tenants().await?;

    let mut summaries = Vec::with_capacity(tenants.len());
    for tenant in &tenants {
        let overview = state.workflow_service.progress_overview(&tenant.id).await?;
        let completed = overview.iter().filter(|p| p.progress.is_complete()).count();
        let average_percent = if overview.is_empty() {
            0.0
        } else {
            overview.iter().map(|p| p.progress.percent).sum::<f64>() / overview.len() as f64
        };
        summaries.push(TenantSummary {
            slug: tenant.slug.clone(),
            name: tenant.name.clone(),
            clients: overview.len(),
            completed,
            average_percent,
        });
    }
    let total_clients: usize = summaries.iter().map(|s| s.clients).sum();

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "tenants": summaries.iter().map(|s| serde_json::json!({
                "slug": s.slug,
                "name": s.name,
                "clients": s.clients,
                "completed": s.completed,
                "average_percent": s.average_percent,
            })).collect::<Vec<_>>(),
            "total_clients": total_clients,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!(
        "  {} Fire Range v{}",
        style("🎯").bold(),
        env!("CARGO_PKG_VERSION")
    );
    println!();

    println!("  {}", style("── Tenants ──").dim());
    if summaries.is_empty() {
        println!(
            "  None yet. Create one with: {}",
            style("frange tenant create \"Clube\"").yellow()
        );
    }
    for s in &summaries {
        println!(
            "  {} {}  {} client{}, {} complete, {:.1}% average",
            style(&s.slug).cyan(),
            style(format!("({})", s.name)).dim(),
            style(s.clients).bold(),
            if s.clients == 1 { "" } else { "s" },
            style(s.completed).green(),
            s.average_percent
        );
    }
    println!();

    println!("  {}", style("── System ──").dim());
    println!("  Clients:  {}", style(total_clients).bold());
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    println!("  Database: {}", style("SQLite (WAL mode)").dim());
    println!();

    Ok(())
}
