// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Proposal commands
//!
//! Drive proposals through a running governance server.
//!
//! Commands: create, list, show, submit, start-voting, vote, votes, results,
//! finalize, execute, advance, workflow

use anyhow::{Context, Result};
use clap::Subcommand;
use colored::Colorize;
use std::path::PathBuf;

use dao_governance_sdk::{
    CastVote, GovernanceClient, NewProposal, Proposal, ProposalId, ProposalQuery, ProposalStage,
    ProposalType, VoteOption, VotingResults,
};

#[derive(Subcommand)]
pub enum ProposalCommand {
    /// Create a proposal from a YAML or JSON file
    Create {
        #[arg(value_name = "FILE")]
        file: PathBuf,

        /// Submit right after creation
        #[arg(long)]
        submit: bool,
    },

    /// List proposals
    List {
        #[arg(long)]
        stage: Option<ProposalStage>,

        #[arg(long = "type")]
        proposal_type: Option<ProposalType>,

        #[arg(long)]
        proposer: Option<String>,

        #[arg(long, default_value = "1")]
        page: usize,

        #[arg(short, long, default_value = "10")]
        limit: usize,
    },

    /// Show a proposal as YAML
    Show {
        #[arg(value_name = "PROPOSAL_ID")]
        id: ProposalId,
    },

    /// Submit a created proposal for review
    Submit {
        #[arg(value_name = "PROPOSAL_ID")]
        id: ProposalId,

        #[arg(long)]
        by: Option<String>,
    },

    /// Open voting
    StartVoting {
        #[arg(value_name = "PROPOSAL_ID")]
        id: ProposalId,

        #[arg(long)]
        by: Option<String>,
    },

    /// Cast or replace a vote
    Vote {
        #[arg(value_name = "PROPOSAL_ID")]
        id: ProposalId,

        /// Voting agent (role, canonical id or alias)
        #[arg(long)]
        voter: String,

        /// for, against or abstain
        #[arg(long)]
        option: VoteOption,

        #[arg(long)]
        reason: Option<String>,
    },

    /// List the current vote set
    Votes {
        #[arg(value_name = "PROPOSAL_ID")]
        id: ProposalId,
    },

    /// Show the current tally
    Results {
        #[arg(value_name = "PROPOSAL_ID")]
        id: ProposalId,
    },

    /// Close voting and record the outcome
    Finalize {
        #[arg(value_name = "PROPOSAL_ID")]
        id: ProposalId,

        #[arg(long)]
        by: Option<String>,
    },

    /// Create the execution workflow of an approved proposal
    Execute {
        #[arg(value_name = "PROPOSAL_ID")]
        id: ProposalId,
    },

    /// Advance the execution workflow
    Advance {
        #[arg(value_name = "PROPOSAL_ID")]
        id: ProposalId,

        #[arg(long, default_value = "executed")]
        to: ProposalStage,

        #[arg(long)]
        by: Option<String>,
    },

    /// Show the execution workflow
    Workflow {
        #[arg(value_name = "PROPOSAL_ID")]
        id: ProposalId,
    },
}

pub async fn handle_command(command: ProposalCommand, server: &str) -> Result<()> {
    let client = GovernanceClient::new(server);

    match command {
        ProposalCommand::Create { file, submit } => create(&client, file, submit).await,
        ProposalCommand::List {
            stage,
            proposal_type,
            proposer,
            page,
            limit,
        } => {
            let query = ProposalQuery {
                stage,
                proposal_type,
                proposer,
                page: Some(page),
                limit: Some(limit),
            };
            list(&client, &query).await
        }
        ProposalCommand::Show { id } => {
            let proposal = client.get_proposal(id).await?;
            print!("{}", serde_yaml::to_string(&proposal)?);
            Ok(())
        }
        ProposalCommand::Submit { id, by } => {
            let proposal = client.submit_proposal(id, by.as_deref()).await?;
            print_stage(&proposal);
            Ok(())
        }
        ProposalCommand::StartVoting { id, by } => {
            let proposal = client.start_voting(id, by.as_deref()).await?;
            print_stage(&proposal);
            if let Some(window) = &proposal.voting_window {
                println!(
                    "  Voting closes {} (quorum {})",
                    window.closes_at.to_rfc3339(),
                    window.quorum_fraction
                );
            }
            Ok(())
        }
        ProposalCommand::Vote {
            id,
            voter,
            option,
            reason,
        } => {
            let vote = client
                .cast_vote(&CastVote {
                    proposal_id: id,
                    voter_address: voter,
                    vote_option: option,
                    reason,
                })
                .await?;
            println!(
                "{}",
                format!("✓ {} voted {}", vote.voter_agent_id, vote.vote_option).green()
            );
            Ok(())
        }
        ProposalCommand::Votes { id } => {
            let votes = client.list_votes(id).await?;
            if votes.is_empty() {
                println!("{}", "No votes cast".yellow());
                return Ok(());
            }
            println!("{:<24} {:<8} {:<26} {}", "VOTER", "OPTION", "CAST AT", "REASON");
            for v in votes {
                println!(
                    "{:<24} {:<8} {:<26} {}",
                    v.voter_agent_id.as_str(),
                    v.vote_option.as_str(),
                    v.timestamp.to_rfc3339(),
                    v.reason.unwrap_or_default()
                );
            }
            Ok(())
        }
        ProposalCommand::Results { id } => {
            let results = client.get_results(id).await?;
            print_results(&results);
            Ok(())
        }
        ProposalCommand::Finalize { id, by } => {
            let finalization = client.finalize(id, by.as_deref()).await?;
            print_results(&finalization.results);
            if !finalization.transitioned {
                println!("{}", "Proposal was already finalized".dimmed());
            }
            print_stage(&finalization.proposal);
            Ok(())
        }
        ProposalCommand::Execute { id } => {
            let workflow = client.execute(id).await?;
            println!(
                "{}",
                format!("✓ Execution workflow created for {}", workflow.proposal_id).green()
            );
            for a in &workflow.assignments {
                let agents: Vec<&str> = a
                    .responsible_agents
                    .iter()
                    .map(|r| r.role.as_str())
                    .collect();
                println!("  {:<12} {:<20} {}", a.phase_id, a.phase_name, agents.join(", "));
                if !a.unresolved.is_empty() {
                    println!(
                        "    {}",
                        format!("unresolved: {}", a.unresolved.join(", ")).yellow()
                    );
                }
            }
            Ok(())
        }
        ProposalCommand::Advance { id, to, by } => {
            let workflow = client.advance_workflow(id, to, by.as_deref()).await?;
            println!(
                "{}",
                format!("✓ Workflow advanced to {}", workflow.current_stage).green()
            );
            Ok(())
        }
        ProposalCommand::Workflow { id } => {
            let view = client.get_workflow(id).await?;
            let status = view.status;
            println!("Stage: {}", status.current_stage.as_str().bold());
            println!("Progress: {:.0}%", status.progress * 100.0);
            if let Some(next) = status.next_stage {
                println!("Next: {}", next);
            }
            for t in &view.workflow.stage_transitions {
                println!(
                    "  {} → {}  by {} at {}",
                    t.from,
                    t.to,
                    t.triggered_by,
                    t.timestamp.to_rfc3339()
                );
            }
            Ok(())
        }
    }
}

async fn create(client: &GovernanceClient, file: PathBuf, submit: bool) -> Result<()> {
    let content = std::fs::read_to_string(&file)
        .with_context(|| format!("Failed to read proposal: {:?}", file))?;
    let input: NewProposal =
        serde_yaml::from_str(&content).context("Failed to parse proposal file")?;

    println!("Creating proposal: {}", input.title.bold());
    let proposal = client.create_proposal(&input).await?;
    println!("{}", format!("✓ Proposal created: {}", proposal.id).green());

    if submit {
        let proposal = client.submit_proposal(proposal.id, None).await?;
        print_stage(&proposal);
    }
    Ok(())
}

async fn list(client: &GovernanceClient, query: &ProposalQuery) -> Result<()> {
    let page = client.list_proposals(query).await?;
    if page.proposals.is_empty() {
        println!("{}", "No proposals found".yellow());
        return Ok(());
    }

    println!(
        "{} proposals (page {}, {} per page)",
        page.total, page.page, page.limit
    );
    println!(
        "{:<38} {:<14} {:<10} {:<10} {}",
        "ID", "TYPE", "STAGE", "PROPOSER", "TITLE"
    );
    for p in page.proposals {
        println!(
            "{:<38} {:<14} {:<10} {:<10} {}",
            p.id.to_string(),
            p.proposal_type.as_str(),
            p.stage.as_str(),
            p.proposer,
            p.title.bold()
        );
    }
    Ok(())
}

fn print_stage(proposal: &Proposal) {
    println!(
        "{}",
        format!("✓ Proposal {} is {}", proposal.id, proposal.stage).green()
    );
}

fn print_results(results: &VotingResults) {
    println!("{}", "Voting results:".bold());
    println!(
        "  For:     {:.2} ({} votes)",
        results.for_weight, results.for_count
    );
    println!(
        "  Against: {:.2} ({} votes)",
        results.against_weight, results.against_count
    );
    println!(
        "  Abstain: {:.2} ({} votes)",
        results.abstain_weight, results.abstain_count
    );
    println!(
        "  Participation: {:.1}% of {:.2} (quorum {:.0}%: {})",
        results.participation * 100.0,
        results.eligible_weight,
        results.quorum_fraction * 100.0,
        if results.quorum_reached {
            "reached".green()
        } else {
            "not reached".red()
        }
    );
    for p in &results.agent_participation {
        let ballot = p
            .vote_option
            .map(|o| o.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!("    {:<5} {:.2}  {}", p.role.as_str(), p.weight, ballot);
    }
    let outcome = if results.is_approved() {
        results.outcome.to_string().green()
    } else {
        results.outcome.to_string().red()
    };
    match results.rejection_reason {
        Some(reason) => println!("  Outcome: {} ({:?})", outcome, reason),
        None => println!("  Outcome: {}", outcome),
    }
}
