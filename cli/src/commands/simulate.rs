// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-process C-suite voting simulation
//!
//! Runs a technical proposal through the full pipeline against in-memory
//! stores: create, submit, vote with the given ballot, finalize and, when
//! approved, build and complete the execution workflow.

use anyhow::{Context, Result};
use clap::Args;
use colored::Colorize;
use std::path::PathBuf;
use tracing::info;

use dao_governance_core::application::GovernanceService;
use dao_governance_core::domain::config::GovernanceConfig;
use dao_governance_core::domain::proposal::{
    BudgetRequest, ExecutionDetails, ExecutionPhase, NewProposal, ProposalStage, ProposalType,
};
use dao_governance_core::domain::vote::{CastVote, VoteOption};

use crate::server::build_service_graph;

pub const DEFAULT_BALLOT: &str = "CEO=for,CTO=for,CFO=against,CLO=abstain";

#[derive(Args)]
pub struct SimulateArgs {
    /// Comma separated VOTER=OPTION pairs
    #[arg(long, default_value = DEFAULT_BALLOT)]
    pub ballot: String,

    /// Proposal title
    #[arg(long, default_value = "Adopt event-driven agent runtime")]
    pub title: String,
}

/// Parse `CEO=for,cto_zara=against` into ballot entries.
pub fn parse_ballot(raw: &str) -> Result<Vec<(String, VoteOption)>> {
    raw.split(',')
        .map(str::trim)
        .filter(|entry| !entry.is_empty())
        .map(|entry| {
            let (voter, option) = entry
                .split_once('=')
                .with_context(|| format!("ballot entry '{}' is not VOTER=OPTION", entry))?;
            let option = option
                .parse::<VoteOption>()
                .map_err(|e| anyhow::anyhow!(e))?;
            Ok((voter.trim().to_string(), option))
        })
        .collect()
}

pub async fn run(args: SimulateArgs, config_path: Option<PathBuf>) -> Result<()> {
    let config =
        GovernanceConfig::load_or_default(config_path).context("Failed to load configuration")?;
    config
        .validate()
        .context("Configuration validation failed")?;
    let ballot = parse_ballot(&args.ballot)?;

    let graph = build_service_graph(&config.spec)?;
    let service = graph.service;

    let proposal = service
        .create_proposal(NewProposal {
            title: args.title,
            description: "Replace polling workers with an event-driven runtime".into(),
            proposal_type: ProposalType::Technical,
            proposer: "CTO".into(),
            execution_details: ExecutionDetails {
                phases: vec![
                    ExecutionPhase {
                        id: "design".into(),
                        name: "Architecture design".into(),
                        responsible_agents: vec!["CTO".into()],
                        ..Default::default()
                    },
                    ExecutionPhase {
                        id: "rollout".into(),
                        name: "Staged rollout".into(),
                        responsible_agents: vec!["CTO".into(), "CEO".into()],
                        ..Default::default()
                    },
                    ExecutionPhase {
                        id: "review".into(),
                        name: "Cost and compliance review".into(),
                        responsible_agents: vec!["CFO".into(), "CLO".into()],
                        ..Default::default()
                    },
                ],
                success_criteria: vec!["p99 latency halved".into()],
            },
            budget_request: Some(BudgetRequest {
                total_amount: 50_000.0,
                currency: "USDC".into(),
                justification: "Engineering time and infrastructure".into(),
            }),
            timeline: Default::default(),
            stakeholders: vec!["CEO".into(), "CFO".into(), "CLO".into()],
        })
        .await?;
    info!(proposal_id = %proposal.id, "Simulation proposal created");

    service.submit_proposal(proposal.id, "CTO").await?;
    let voting = service.start_voting(proposal.id, "CTO").await?;
    println!(
        "{} {}",
        "Voting opened on".bold(),
        voting.title.bold()
    );

    for (voter, option) in ballot {
        match service
            .cast_vote(CastVote {
                proposal_id: proposal.id,
                voter_address: voter.clone(),
                vote_option: option,
                reason: None,
            })
            .await
        {
            Ok(vote) => println!("  {:<6} {}", vote.voter_role.as_str(), vote.vote_option),
            Err(e) => println!("  {}", format!("{}: {}", voter, e).yellow()),
        }
    }

    let finalization = service.finalize(proposal.id, "simulation").await?;
    let r = &finalization.results;
    println!();
    println!(
        "For {:.2} / Against {:.2} / Abstain {:.2}  participation {:.0}%",
        r.for_weight,
        r.against_weight,
        r.abstain_weight,
        r.participation * 100.0
    );

    if finalization.proposal.stage != ProposalStage::Approved {
        println!(
            "{}",
            format!("✗ Proposal rejected ({:?})", r.rejection_reason).red()
        );
        return Ok(());
    }
    println!("{}", "✓ Proposal approved".green());

    let workflow = service.create_workflow(proposal.id).await?;
    for a in &workflow.assignments {
        let agents: Vec<&str> = a.responsible_agents.iter().map(|r| r.role.as_str()).collect();
        println!("  {:<28} {}", a.phase_name, agents.join(", "));
    }
    let workflow = service
        .advance_workflow(proposal.id, ProposalStage::Executed, "simulation")
        .await?;
    println!(
        "{}",
        format!(
            "✓ Workflow complete: {} transitions, stage {}",
            workflow.stage_transitions.len(),
            workflow.current_stage
        )
        .green()
    );

    Ok(())
}
