// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Governance Service
//!
//! The single entry point handlers talk to. [`StandardGovernanceService`] is built
//! once at startup and shared behind an `Arc`; it wires the four components
//! together and adds what they deliberately leave out:
//!
//! | Concern | Where |
//! |---------|-------|
//! | Same-proposal serialization | [`ProposalLocks`] guard around every mutation |
//! | Event publication | [`EventBus`], after the state change is saved |
//! | Metrics | `metrics` counters per operation |
//!
//! Collaborators never run inside an operation; they observe the event bus through
//! the notification relay.

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::info;

use crate::application::agent_resolver::AgentResolver;
use crate::application::execution_coordinator::ExecutionCoordinator;
use crate::application::lifecycle::{Finalization, ProposalLifecycleManager};
use crate::application::tally::VotingTallyEngine;
use crate::domain::agent::{AgentVotingWeight, ResolvedAgent};
use crate::domain::config::GovernanceSpec;
use crate::domain::error::GovernanceError;
use crate::domain::events::GovernanceEvent;
use crate::domain::proposal::{
    NewProposal, Proposal, ProposalId, ProposalPage, ProposalQuery, ProposalStage,
};
use crate::domain::repository::{ProposalRepository, VoteRepository, WorkflowRepository};
use crate::domain::vote::{CastVote, Vote, VotingOutcome, VotingResults};
use crate::domain::workflow::{GovernanceWorkflow, WorkflowStatus};
use crate::infrastructure::event_bus::EventBus;
use crate::infrastructure::proposal_locks::ProposalLocks;
use crate::infrastructure::repositories::{
    InMemoryProposalRepository, InMemoryVoteRepository, InMemoryWorkflowRepository,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GovernanceStats {
    pub total_proposals: usize,
    pub by_stage: BTreeMap<String, usize>,
    pub active_voting: usize,
    pub total_votes: usize,
    pub workflows: usize,
}

#[async_trait]
pub trait GovernanceService: Send + Sync {
    async fn create_proposal(&self, input: NewProposal) -> Result<Proposal, GovernanceError>;

    async fn submit_proposal(
        &self,
        id: ProposalId,
        submitted_by: &str,
    ) -> Result<Proposal, GovernanceError>;

    async fn start_voting(
        &self,
        id: ProposalId,
        triggered_by: &str,
    ) -> Result<Proposal, GovernanceError>;

    async fn cast_vote(&self, ballot: CastVote) -> Result<Vote, GovernanceError>;

    /// Current tally; valid at any stage.
    async fn get_results(&self, id: ProposalId) -> Result<VotingResults, GovernanceError>;

    /// Tally and decide. Idempotent once decided.
    async fn finalize(
        &self,
        id: ProposalId,
        triggered_by: &str,
    ) -> Result<Finalization, GovernanceError>;

    async fn get_proposal(&self, id: ProposalId) -> Result<Proposal, GovernanceError>;

    async fn query_proposals(&self, query: &ProposalQuery)
        -> Result<ProposalPage, GovernanceError>;

    async fn votes(&self, id: ProposalId) -> Result<Vec<Vote>, GovernanceError>;

    async fn create_workflow(&self, id: ProposalId) -> Result<GovernanceWorkflow, GovernanceError>;

    /// Advance the workflow; reaching `executed` also executes the proposal.
    async fn advance_workflow(
        &self,
        id: ProposalId,
        to: ProposalStage,
        triggered_by: &str,
    ) -> Result<GovernanceWorkflow, GovernanceError>;

    async fn get_workflow(&self, id: ProposalId) -> Result<GovernanceWorkflow, GovernanceError>;

    async fn workflow_status(&self, id: ProposalId) -> Result<WorkflowStatus, GovernanceError>;

    fn resolve_agent(&self, identifier: &str) -> Result<ResolvedAgent, GovernanceError>;

    fn recommended_agents(&self, proposal_type: &str) -> Vec<ResolvedAgent>;

    fn voting_weights(&self) -> Vec<AgentVotingWeight>;

    async fn stats(&self) -> Result<GovernanceStats, GovernanceError>;
}

pub struct StandardGovernanceService {
    lifecycle: ProposalLifecycleManager,
    tally: VotingTallyEngine,
    coordinator: ExecutionCoordinator,
    resolver: Arc<AgentResolver>,
    event_bus: EventBus,
    locks: ProposalLocks,
}

impl StandardGovernanceService {
    pub fn new(
        spec: &GovernanceSpec,
        proposals: Arc<dyn ProposalRepository>,
        votes: Arc<dyn VoteRepository>,
        workflows: Arc<dyn WorkflowRepository>,
        event_bus: EventBus,
    ) -> Self {
        let resolver = Arc::new(AgentResolver::with_weights(
            spec.agents.effective_weights(),
        ));
        Self {
            lifecycle: ProposalLifecycleManager::new(
                proposals.clone(),
                resolver.clone(),
                spec.voting.clone(),
                spec.proposals.supported_types.clone(),
            ),
            tally: VotingTallyEngine::new(
                votes,
                proposals.clone(),
                resolver.clone(),
                spec.voting.quorum_fraction,
            ),
            coordinator: ExecutionCoordinator::new(workflows, proposals, resolver.clone()),
            resolver,
            event_bus,
            locks: ProposalLocks::new(),
        }
    }

    /// Service over fresh in-memory stores.
    pub fn in_memory(spec: &GovernanceSpec, event_bus: EventBus) -> Self {
        Self::new(
            spec,
            Arc::new(InMemoryProposalRepository::new()),
            Arc::new(InMemoryVoteRepository::new()),
            Arc::new(InMemoryWorkflowRepository::new()),
            event_bus,
        )
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    pub fn resolver(&self) -> &AgentResolver {
        &self.resolver
    }
}

fn record_transition(to: ProposalStage) {
    metrics::counter!("governance_stage_transitions_total", "to" => to.as_str()).increment(1);
}

#[async_trait]
impl GovernanceService for StandardGovernanceService {
    async fn create_proposal(&self, input: NewProposal) -> Result<Proposal, GovernanceError> {
        let proposal = self.lifecycle.create(input).await?;
        metrics::counter!("governance_proposals_created_total").increment(1);
        self.event_bus.publish(GovernanceEvent::ProposalCreated {
            proposal_id: proposal.id,
            proposal_type: proposal.proposal_type,
            proposer: proposal.proposer.clone(),
            created_at: proposal.created_at,
        });
        Ok(proposal)
    }

    async fn submit_proposal(
        &self,
        id: ProposalId,
        submitted_by: &str,
    ) -> Result<Proposal, GovernanceError> {
        let _guard = self.locks.acquire(id).await;
        let proposal = self.lifecycle.submit(id, submitted_by).await?;
        record_transition(ProposalStage::Submitted);
        self.event_bus.publish(GovernanceEvent::ProposalSubmitted {
            proposal_id: id,
            submitted_by: submitted_by.to_string(),
            submitted_at: Utc::now(),
        });
        Ok(proposal)
    }

    async fn start_voting(
        &self,
        id: ProposalId,
        triggered_by: &str,
    ) -> Result<Proposal, GovernanceError> {
        let _guard = self.locks.acquire(id).await;
        let proposal = self.lifecycle.start_voting(id, triggered_by).await?;
        record_transition(ProposalStage::Voting);
        if let Some(window) = &proposal.voting_window {
            self.event_bus.publish(GovernanceEvent::VotingStarted {
                proposal_id: id,
                closes_at: window.closes_at,
                quorum_fraction: window.quorum_fraction,
                started_at: window.opens_at,
            });
        }
        Ok(proposal)
    }

    async fn cast_vote(&self, ballot: CastVote) -> Result<Vote, GovernanceError> {
        let _guard = self.locks.acquire(ballot.proposal_id).await;
        let outcome = self.tally.cast_vote(ballot).await?;
        let vote = outcome.vote;

        metrics::counter!("governance_votes_cast_total", "option" => vote.vote_option.as_str())
            .increment(1);
        if outcome.replaced.is_some() {
            metrics::counter!("governance_votes_replaced_total").increment(1);
        }
        self.event_bus.publish(GovernanceEvent::VoteCast {
            proposal_id: vote.proposal_id,
            voter: vote.voter_agent_id.clone(),
            option: vote.vote_option,
            replaced: outcome.replaced.is_some(),
            cast_at: vote.timestamp,
        });
        Ok(vote)
    }

    async fn get_results(&self, id: ProposalId) -> Result<VotingResults, GovernanceError> {
        let _guard = self.locks.acquire(id).await;
        self.tally.tally(id).await
    }

    async fn finalize(
        &self,
        id: ProposalId,
        triggered_by: &str,
    ) -> Result<Finalization, GovernanceError> {
        let guard = self.locks.acquire(id).await;
        let results = self.tally.tally(id).await?;
        let finalization = self.lifecycle.finalize(id, results, triggered_by).await?;

        if finalization.transitioned {
            let r = &finalization.results;
            record_transition(finalization.proposal.stage);
            metrics::counter!(
                "governance_proposals_finalized_total",
                "outcome" => finalization.proposal.stage.as_str()
            )
            .increment(1);
            let event = match r.outcome {
                VotingOutcome::Approved => GovernanceEvent::ProposalApproved {
                    proposal_id: id,
                    for_weight: r.for_weight,
                    against_weight: r.against_weight,
                    approved_at: Utc::now(),
                },
                VotingOutcome::Rejected => GovernanceEvent::ProposalRejected {
                    proposal_id: id,
                    reason: r.rejection_reason,
                    rejected_at: Utc::now(),
                },
            };
            self.event_bus.publish(event);
        }
        drop(guard);
        if finalization.proposal.stage == ProposalStage::Rejected {
            self.locks.retire(id);
        }
        Ok(finalization)
    }

    async fn get_proposal(&self, id: ProposalId) -> Result<Proposal, GovernanceError> {
        self.lifecycle.get(id).await
    }

    async fn query_proposals(
        &self,
        query: &ProposalQuery,
    ) -> Result<ProposalPage, GovernanceError> {
        self.lifecycle.query(query).await
    }

    async fn votes(&self, id: ProposalId) -> Result<Vec<Vote>, GovernanceError> {
        self.tally.votes(id).await
    }

    async fn create_workflow(&self, id: ProposalId) -> Result<GovernanceWorkflow, GovernanceError> {
        let _guard = self.locks.acquire(id).await;
        let workflow = self.coordinator.create_workflow(id).await?;
        self.event_bus.publish(GovernanceEvent::WorkflowCreated {
            proposal_id: id,
            phases: workflow.assignments.len(),
            created_at: workflow.created_at,
        });
        Ok(workflow)
    }

    async fn advance_workflow(
        &self,
        id: ProposalId,
        to: ProposalStage,
        triggered_by: &str,
    ) -> Result<GovernanceWorkflow, GovernanceError> {
        let guard = self.locks.acquire(id).await;

        if to == ProposalStage::Executed {
            // Check the proposal side first so a failure leaves both logs untouched.
            let proposal = self.lifecycle.get(id).await?;
            if !proposal.stage.can_transition_to(ProposalStage::Executed) {
                return Err(GovernanceError::InvalidTransition {
                    proposal_id: id,
                    from: proposal.stage,
                    to,
                });
            }
        }

        let workflow = self.coordinator.advance(id, to, triggered_by).await?;

        if to == ProposalStage::Executed {
            self.lifecycle.mark_executed(id, triggered_by).await?;
            record_transition(ProposalStage::Executed);
            self.event_bus.publish(GovernanceEvent::ProposalExecuted {
                proposal_id: id,
                triggered_by: triggered_by.to_string(),
                executed_at: Utc::now(),
            });
            info!(proposal_id = %id, "Governance workflow complete");
            drop(guard);
            self.locks.retire(id);
        }
        Ok(workflow)
    }

    async fn get_workflow(&self, id: ProposalId) -> Result<GovernanceWorkflow, GovernanceError> {
        self.coordinator.get_workflow(id).await
    }

    async fn workflow_status(&self, id: ProposalId) -> Result<WorkflowStatus, GovernanceError> {
        self.coordinator.status(id).await
    }

    fn resolve_agent(&self, identifier: &str) -> Result<ResolvedAgent, GovernanceError> {
        self.resolver
            .resolve(identifier)
            .ok_or_else(|| GovernanceError::UnknownAgent(identifier.to_string()))
    }

    fn recommended_agents(&self, proposal_type: &str) -> Vec<ResolvedAgent> {
        self.resolver.recommended_agents(proposal_type)
    }

    fn voting_weights(&self) -> Vec<AgentVotingWeight> {
        self.resolver.all_voting_weights().to_vec()
    }

    async fn stats(&self) -> Result<GovernanceStats, GovernanceError> {
        let proposals = self.lifecycle.list_all().await?;
        let mut by_stage = BTreeMap::new();
        for p in &proposals {
            *by_stage.entry(p.stage.as_str().to_string()).or_insert(0) += 1;
        }
        Ok(GovernanceStats {
            total_proposals: proposals.len(),
            active_voting: by_stage.get("voting").copied().unwrap_or(0),
            by_stage,
            total_votes: self.tally.total_votes().await?,
            workflows: self.coordinator.count().await?,
        })
    }
}
