// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Governance agent commands
//!
//! Resolution runs locally against the configured weights; no server needed.

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use dao_governance_core::application::AgentResolver;
use dao_governance_core::domain::agent::ResolvedAgent;
use dao_governance_core::domain::config::GovernanceConfig;

#[derive(Subcommand)]
pub enum AgentCommand {
    /// Resolve an agent identifier or legacy alias
    Resolve {
        /// Role name, canonical id or alias (e.g. CTO, cto_zara)
        #[arg(value_name = "IDENTIFIER")]
        identifier: String,
    },

    /// Show the voting weight of every governance agent
    Weights,

    /// Recommend agents for a proposal type
    Recommend {
        #[arg(value_name = "PROPOSAL_TYPE")]
        proposal_type: String,
    },

    /// List agents holding a capability
    Capable {
        #[arg(value_name = "CAPABILITY")]
        capability: String,
    },
}

pub async fn handle_command(command: AgentCommand, config_path: Option<PathBuf>) -> Result<()> {
    let config =
        GovernanceConfig::load_or_default(config_path).context("Failed to load configuration")?;
    let resolver = AgentResolver::with_weights(config.spec.agents.effective_weights());

    match command {
        AgentCommand::Resolve { identifier } => resolve(&resolver, &identifier),
        AgentCommand::Weights => weights(&resolver),
        AgentCommand::Recommend { proposal_type } => {
            let agents = resolver.recommended_agents(&proposal_type);
            println!("Recommended agents for {}:", proposal_type.bold());
            print_agents(&agents);
            Ok(())
        }
        AgentCommand::Capable { capability } => {
            let agents = resolver.agents_with_capability(&capability);
            if agents.is_empty() {
                println!("{}", format!("No agent has capability '{}'", capability).yellow());
            } else {
                print_agents(&agents);
            }
            Ok(())
        }
    }
}

fn resolve(resolver: &AgentResolver, identifier: &str) -> Result<()> {
    let Some(agent) = resolver.resolve(identifier) else {
        anyhow::bail!("'{}' does not resolve to a governance agent", identifier);
    };

    println!("{} ({})", agent.display_name.bold(), agent.role.as_str());
    println!("  ID: {}", agent.agent_id);
    println!("  {}", agent.description.dimmed());
    if let Some(w) = resolver.weight_for_role(agent.role) {
        println!(
            "  Weight: staking={} power={} reputation={}",
            w.staking_weight, w.voting_power, w.reputation_score
        );
    }
    println!("  Capabilities:");
    for cap in &agent.capabilities {
        println!("    - {}", cap);
    }
    Ok(())
}

fn weights(resolver: &AgentResolver) -> Result<()> {
    println!(
        "{:<24} {:<6} {:<10} {:<8} {}",
        "AGENT", "ROLE", "STAKING", "POWER", "REPUTATION"
    );
    let mut total = 0.0;
    for w in resolver.all_voting_weights() {
        total += w.staking_weight;
        println!(
            "{:<24} {:<6} {:<10} {:<8} {}",
            w.agent_id, w.role.as_str(), w.staking_weight, w.voting_power, w.reputation_score
        );
    }
    println!("{}", format!("Eligible weight: {:.2}", total).dimmed());
    Ok(())
}

fn print_agents(agents: &[ResolvedAgent]) {
    for agent in agents {
        println!(
            "  {:<6} {:<24} {}",
            agent.role.as_str().bold(),
            agent.agent_id,
            agent.display_name
        );
    }
}
