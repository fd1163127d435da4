// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Configuration management commands
//!
//! Commands: show, validate, generate

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use dao_governance_core::domain::config::{ConfigProfile, GovernanceConfig};
use dao_governance_core::domain::proposal::ProposalType;

#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Show config file paths checked
        #[arg(long)]
        paths: bool,

        /// Print the effective manifest as YAML
        #[arg(long)]
        yaml: bool,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (default: discover)
        #[arg(value_name = "FILE")]
        file: Option<PathBuf>,
    },

    /// Generate a configuration manifest from a profile
    Generate {
        /// Output path
        #[arg(short, long, default_value = "./governance-config.yaml")]
        output: PathBuf,

        /// Profile: development, production, high-security
        #[arg(short, long, default_value = "production")]
        profile: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

pub async fn handle_command(
    command: ConfigCommand,
    config_override: Option<PathBuf>,
) -> Result<()> {
    match command {
        ConfigCommand::Show { paths, yaml } => show(config_override, paths, yaml),
        ConfigCommand::Validate { file } => validate(file.or(config_override)),
        ConfigCommand::Generate {
            output,
            profile,
            force,
        } => generate(output, &profile, force),
    }
}

fn show(config_override: Option<PathBuf>, show_paths: bool, as_yaml: bool) -> Result<()> {
    let config = GovernanceConfig::load_or_default(config_override.clone())
        .context("Failed to load configuration")?;

    if show_paths {
        println!("{}", "Configuration discovery paths:".bold());
        if let Some(path) = &config_override {
            println!("  1. --config flag: {}", path.display());
        } else {
            println!("  1. --config flag: {}", "(not set)".dimmed());
        }
        println!(
            "  2. GOVERNANCE_CONFIG_PATH: {}",
            std::env::var("GOVERNANCE_CONFIG_PATH")
                .unwrap_or_else(|_| "(not set)".to_string())
                .dimmed()
        );
        println!("  3. ./governance-config.yaml");
        println!("  4. ~/.dao-governance/config.yaml");
        println!("  5. /etc/dao-governance/config.yaml");
        println!();
    }

    if as_yaml {
        print!("{}", config.to_yaml()?);
        return Ok(());
    }

    let spec = &config.spec;
    println!("{}", "Current configuration:".bold());
    println!("  Name: {}", config.metadata.name);
    println!(
        "  Server: {}:{}",
        spec.server.bind_address, spec.server.port
    );
    println!();

    println!("{}", "Voting:".bold());
    println!("  Default quorum: {}", spec.voting.quorum_fraction);
    println!(
        "  Default period: {}",
        humanize(spec.voting.voting_period)
    );
    println!("  {:<16} {:<8} {}", "TYPE", "QUORUM", "PERIOD");
    for t in ProposalType::ALL {
        let policy = spec.voting.policy_for(t);
        let supported = if spec.proposals.supported_types.contains(&t) {
            t.as_str().normal()
        } else {
            t.as_str().dimmed()
        };
        println!(
            "  {:<16} {:<8} {}",
            supported,
            policy.quorum_fraction,
            humanize(policy.voting_period)
        );
    }
    println!();

    println!("{}", "Collaborators:".bold());
    println!(
        "  Notifications: {}",
        spec.collaborators
            .notification_webhook
            .as_deref()
            .unwrap_or("(log only)")
    );
    println!(
        "  Discussions: {}",
        spec.collaborators
            .discussion_webhook
            .as_deref()
            .unwrap_or("(disabled)")
    );
    println!();

    println!("{}", "Observability:".bold());
    println!("  Log level: {}", spec.observability.log_level);
    match spec.observability.metrics_port {
        Some(port) => println!("  Metrics port: {}", port),
        None => println!("  Metrics port: {}", "(disabled)".dimmed()),
    }

    Ok(())
}

fn validate(config_path: Option<PathBuf>) -> Result<()> {
    println!("Validating configuration...");

    let config =
        GovernanceConfig::load_or_default(config_path).context("Failed to load configuration")?;

    config
        .validate()
        .context("Configuration validation failed")?;

    println!("{}", "✓ Configuration is valid".green());

    Ok(())
}

fn generate(output: PathBuf, profile: &str, force: bool) -> Result<()> {
    let profile: ConfigProfile = profile.parse()?;

    if output.exists() && !force {
        anyhow::bail!(
            "{} already exists, pass --force to overwrite",
            output.display()
        );
    }

    GovernanceConfig::for_profile(profile)
        .to_yaml_file(&output)
        .with_context(|| format!("Failed to write config to {:?}", output))?;

    println!(
        "{}",
        format!("✓ Configuration generated: {}", output.display()).green()
    );

    Ok(())
}

fn humanize(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs % 86_400 == 0 {
        format!("{}d", secs / 86_400)
    } else if secs % 3_600 == 0 {
        format!("{}h", secs / 3_600)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generate_writes_loadable_profile() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("governance-config.yaml");

        generate(path.clone(), "high-security", false).unwrap();
        let loaded = GovernanceConfig::from_yaml_file(&path).unwrap();
        assert_eq!(loaded.spec.voting.quorum_fraction, 0.75);

        // Refuses to clobber without --force
        assert!(generate(path.clone(), "development", false).is_err());
        generate(path.clone(), "development", true).unwrap();
        let loaded = GovernanceConfig::from_yaml_file(&path).unwrap();
        assert_eq!(loaded.spec.voting.quorum_fraction, 0.25);
    }

    #[test]
    fn test_humanize() {
        assert_eq!(humanize(std::time::Duration::from_secs(7 * 86_400)), "7d");
        assert_eq!(humanize(std::time::Duration::from_secs(3_600)), "1h");
        assert_eq!(humanize(std::time::Duration::from_secs(90)), "90s");
    }
}
