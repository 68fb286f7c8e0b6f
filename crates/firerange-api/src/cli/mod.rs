//! CLI command definitions and dispatch for the `frange` binary.
//!
//! Uses clap derive macros for argument parsing. Resource commands are
//! grouped by noun (e.g., `frange client list clube-alfa`,
//! `frange workflow toggle clube-alfa <client> cadastro`).

pub mod client;
pub mod email;
pub mod key;
pub mod status;
pub mod template;
pub mod tenant;
pub mod workflow;

use clap::{Parser, Subcommand};
use clap_complete::Shell;

/// Run a shooting club's CR certification desk.
#[derive(Parser)]
#[command(name = "frange", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Start the REST API server.
    Serve {
        /// Address to bind (defaults to `server.host` in config.toml).
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (defaults to `server.port` in config.toml).
        #[arg(long)]
        port: Option<u16>,

        /// Export spans through OpenTelemetry (stdout exporter).
        #[arg(long)]
        otel: bool,
    },

    /// Show data directory, tenants and overall progress.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },

    /// Manage tenants (create, list, delete).
    Tenant {
        #[command(subcommand)]
        action: tenant::TenantCommand,
    },

    /// Manage clients of a tenant (create, list, show, delete).
    Client {
        #[command(subcommand)]
        action: client::ClientCommand,
    },

    /// Inspect and drive a client's workflow.
    Workflow {
        #[command(subcommand)]
        action: workflow::WorkflowCommand,
    },

    /// Manage email templates (list, show, set, delete).
    Template {
        #[command(subcommand)]
        action: template::TemplateCommand,
    },

    /// Email status and sending for one client.
    Email {
        #[command(subcommand)]
        action: email::EmailCommand,
    },

    /// Manage access keys for the REST API.
    Key {
        #[command(subcommand)]
        action: key::KeyCommand,
    },
}
