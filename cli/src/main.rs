// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! # DAO Governance CLI
//!
//! The `daogov` binary serves the governance REST API and drives it.
//!
//! ## Commands
//!
//! - `daogov serve` - Run the governance HTTP server
//! - `daogov proposal create|submit|start-voting|vote|results|finalize|execute|advance|workflow`
//!   - Proposal operations against a running server
//! - `daogov agent resolve|weights|recommend|capable` - Local agent resolution
//! - `daogov config show|validate|generate` - Configuration management
//! - `daogov simulate` - In-process voting simulation

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use dao_governance::commands::{self, AgentCommand, ConfigCommand, ProposalCommand, SimulateArgs};
use dao_governance::server;
use dao_governance_core::domain::config::GovernanceConfig;

/// DAO Governance - proposals, weighted voting and execution workflows
#[derive(Parser)]
#[command(name = "daogov")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(
        short,
        long,
        global = true,
        env = "GOVERNANCE_CONFIG_PATH",
        value_name = "FILE"
    )]
    config: Option<PathBuf>,

    /// Governance server URL used by proposal commands
    #[arg(
        long,
        global = true,
        env = "GOVERNANCE_SERVER",
        default_value = "http://127.0.0.1:8080"
    )]
    server: String,

    /// Log level (trace, debug, info, warn, error); defaults to the configured level
    #[arg(long, global = true, env = "GOVERNANCE_LOG_LEVEL")]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the governance HTTP server
    #[command(name = "serve")]
    Serve {
        /// HTTP port (overrides configuration)
        #[arg(long)]
        port: Option<u16>,
    },

    /// Proposal operations against a running server
    #[command(name = "proposal")]
    Proposal {
        #[command(subcommand)]
        command: ProposalCommand,
    },

    /// Agent resolution and voting weights
    #[command(name = "agent")]
    Agent {
        #[command(subcommand)]
        command: AgentCommand,
    },

    /// Configuration management
    #[command(name = "config")]
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },

    /// Simulate a C-suite vote in-process
    #[command(name = "simulate")]
    Simulate {
        #[command(flatten)]
        args: SimulateArgs,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = match &cli.log_level {
        Some(level) => level.clone(),
        None => configured_log_level(cli.config.clone()),
    };
    init_logging(&level)?;

    match cli.command {
        Some(Commands::Serve { port }) => {
            info!("Starting DAO governance server");
            server::start_server(cli.config, port).await
        }
        Some(Commands::Proposal { command }) => {
            commands::proposal::handle_command(command, &cli.server).await
        }
        Some(Commands::Agent { command }) => {
            commands::agent::handle_command(command, cli.config).await
        }
        Some(Commands::Config { command }) => {
            commands::config::handle_command(command, cli.config).await
        }
        Some(Commands::Simulate { args }) => commands::simulate::run(args, cli.config).await,
        None => {
            eprintln!("{}", "No command specified. Use --help for usage.".yellow());
            std::process::exit(1);
        }
    }
}

fn configured_log_level(config_path: Option<PathBuf>) -> String {
    GovernanceConfig::load_or_default(config_path)
        .map(|c| c.spec.observability.log_level)
        .unwrap_or_else(|_| "info".to_string())
}

/// Initialize tracing subscriber for logging
fn init_logging(level: &str) -> Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(level))
        .context("Failed to create log filter")?;

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .init();

    Ok(())
}
