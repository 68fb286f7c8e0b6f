//! Fire Range CLI and REST API entry point.
//!
//! Binary name: `frange`
//!
//! Parses CLI arguments, initializes database and services, then dispatches
//! to the appropriate command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use anyhow::{Context, anyhow};
use clap::Parser;
use clap_complete::generate;
use tracing_subscriber::EnvFilter;

use firerange_observe::tracing_setup::{self, LogFormat, TracingOptions};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,firerange=debug",
        _ => "trace",
    };

    let otel = matches!(cli.command, Commands::Serve { otel: true, .. });
    if otel {
        tracing_setup::init_tracing(&TracingOptions {
            default_filter: filter.to_string(),
            format: LogFormat::Json,
            enable_otel: true,
        })
        .map_err(|e| anyhow!("failed to initialize tracing: {e}"))?;
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::new(filter))
            .with_target(false)
            .init();
    }

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "frange", &mut std::io::stdout());
        return Ok(());
    }

    // Initialize application state (DB, services)
    let state = AppState::init().await?;

    match cli.command {
        Commands::Status => cli::status::status(&state, cli.json).await?,
        Commands::Tenant { action } => {
            cli::tenant::handle_tenant_command(action, &state, cli.json).await?;
        }
        Commands::Client { action } => {
            cli::client::handle_client_command(action, &state, cli.json).await?;
        }
        Commands::Workflow { action } => {
            cli::workflow::handle_workflow_command(action, &state, cli.json).await?;
        }
        Commands::Template { action } => {
            cli::template::handle_template_command(action, &state, cli.json).await?;
        }
        Commands::Email { action } => {
            cli::email::handle_email_command(action, &state, cli.json).await?;
        }
        Commands::Key { action } => {
            cli::key::handle_key_command(action, &state, cli.json).await?;
        }

        Commands::Serve { host, port, .. } => {
            let host = host.unwrap_or_else(|| state.config.server.host.clone());
            let port = port.unwrap_or(state.config.server.port);
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr)
                .await
                .with_context(|| format!("failed to bind {addr}"))?;

            println!(
                "  {} Fire Range API listening on {}",
                console::style("🎯").bold(),
                console::style(format!("http://{addr}/api/v1")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;

            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => {}
    }

    if otel {
        tracing_setup::shutdown_tracing();
    }

    Ok(())
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
