// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Proposal Lifecycle Manager
//!
//! Owns proposal state and the stage-transition log. Each operation loads the
//! proposal, applies one transition on the aggregate and saves it back; the caller
//! serializes operations on the same proposal.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::agent_resolver::AgentResolver;
use crate::domain::config::VotingConfig;
use crate::domain::error::GovernanceError;
use crate::domain::proposal::{
    NewProposal, Proposal, ProposalId, ProposalPage, ProposalQuery, ProposalStage, ProposalType,
    VotingWindow,
};
use crate::domain::repository::ProposalRepository;
use crate::domain::vote::VotingResults;

/// Result of [`ProposalLifecycleManager::finalize`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finalization {
    pub proposal: Proposal,
    pub results: VotingResults,
    /// False when the proposal had already been finalized.
    pub transitioned: bool,
}

pub struct ProposalLifecycleManager {
    repository: Arc<dyn ProposalRepository>,
    resolver: Arc<AgentResolver>,
    voting: VotingConfig,
    supported_types: Vec<ProposalType>,
}

impl ProposalLifecycleManager {
    pub fn new(
        repository: Arc<dyn ProposalRepository>,
        resolver: Arc<AgentResolver>,
        voting: VotingConfig,
        supported_types: Vec<ProposalType>,
    ) -> Self {
        Self {
            repository,
            resolver,
            voting,
            supported_types,
        }
    }

    pub fn voting_config(&self) -> &VotingConfig {
        &self.voting
    }

    /// Store a new proposal in `created`. Only the proposer must resolve at this
    /// point; the full content checks run on submission.
    pub async fn create(&self, input: NewProposal) -> Result<Proposal, GovernanceError> {
        if self.resolver.resolve(&input.proposer).is_none() {
            return Err(GovernanceError::Validation {
                proposal_id: None,
                violations: vec![format!(
                    "proposer '{}' does not resolve to a governance agent",
                    input.proposer
                )],
            });
        }

        let proposal = Proposal::new(input);
        self.repository.save(&proposal).await?;
        info!(
            proposal_id = %proposal.id,
            proposal_type = %proposal.proposal_type,
            proposer = %proposal.proposer,
            "Proposal created"
        );
        Ok(proposal)
    }

    pub async fn submit(
        &self,
        id: ProposalId,
        submitted_by: &str,
    ) -> Result<Proposal, GovernanceError> {
        let mut proposal = self.get(id).await?;
        if proposal.stage != ProposalStage::Created {
            return Err(GovernanceError::InvalidTransition {
                proposal_id: id,
                from: proposal.stage,
                to: ProposalStage::Submitted,
            });
        }

        let violations = proposal.submission_violations(&self.supported_types);
        if !violations.is_empty() {
            return Err(GovernanceError::Validation {
                proposal_id: Some(id),
                violations,
            });
        }

        proposal.transition(ProposalStage::Submitted, submitted_by)?;
        self.repository.save(&proposal).await?;
        info!(proposal_id = %id, submitted_by, "Proposal submitted");
        Ok(proposal)
    }

    /// Open voting and snapshot the effective policy for the proposal's type.
    /// Re-entering `voting` is rejected.
    pub async fn start_voting(
        &self,
        id: ProposalId,
        triggered_by: &str,
    ) -> Result<Proposal, GovernanceError> {
        let mut proposal = self.get(id).await?;
        proposal.transition(ProposalStage::Voting, triggered_by)?;

        let policy = self.voting.policy_for(proposal.proposal_type);
        let opens_at = Utc::now();
        let closes_at = chrono::Duration::from_std(policy.voting_period)
            .ok()
            .and_then(|period| opens_at.checked_add_signed(period))
            .ok_or(GovernanceError::VotingPeriodOutOfRange {
                proposal_id: id,
                voting_period: policy.voting_period,
            })?;
        proposal.voting_window = Some(VotingWindow {
            opens_at,
            closes_at,
            quorum_fraction: policy.quorum_fraction,
        });

        self.repository.save(&proposal).await?;
        info!(
            proposal_id = %id,
            quorum_fraction = policy.quorum_fraction,
            voting_period = ?policy.voting_period,
            "Voting started"
        );
        Ok(proposal)
    }

    /// Decide a proposal in `voting` from a tally. Idempotent: an already decided
    /// proposal returns its stored results unchanged.
    pub async fn finalize(
        &self,
        id: ProposalId,
        results: VotingResults,
        triggered_by: &str,
    ) -> Result<Finalization, GovernanceError> {
        let mut proposal = self.get(id).await?;

        if proposal.stage != ProposalStage::Voting {
            if let Some(stored) = proposal.voting_results.clone() {
                debug!(proposal_id = %id, stage = %proposal.stage, "Proposal already finalized");
                return Ok(Finalization {
                    proposal,
                    results: stored,
                    transitioned: false,
                });
            }
            return Err(GovernanceError::InvalidTransition {
                proposal_id: id,
                from: proposal.stage,
                to: if results.is_approved() {
                    ProposalStage::Approved
                } else {
                    ProposalStage::Rejected
                },
            });
        }

        let approve = results.quorum_reached && results.for_weight > results.against_weight;
        let to = if approve {
            ProposalStage::Approved
        } else {
            ProposalStage::Rejected
        };
        proposal.transition(to, triggered_by)?;
        proposal.voting_results = Some(results.clone());
        self.repository.save(&proposal).await?;

        info!(
            proposal_id = %id,
            outcome = %to,
            for_weight = results.for_weight,
            against_weight = results.against_weight,
            quorum_reached = results.quorum_reached,
            "Proposal finalized"
        );
        Ok(Finalization {
            proposal,
            results,
            transitioned: true,
        })
    }

    /// Callers must have confirmed that an execution workflow exists.
    pub(crate) async fn mark_executed(
        &self,
        id: ProposalId,
        triggered_by: &str,
    ) -> Result<Proposal, GovernanceError> {
        let mut proposal = self.get(id).await?;
        proposal.transition(ProposalStage::Executed, triggered_by)?;
        self.repository.save(&proposal).await?;
        info!(proposal_id = %id, triggered_by, "Proposal executed");
        Ok(proposal)
    }

    pub async fn get(&self, id: ProposalId) -> Result<Proposal, GovernanceError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or(GovernanceError::ProposalNotFound(id))
    }

    pub async fn query(&self, query: &ProposalQuery) -> Result<ProposalPage, GovernanceError> {
        let mut matching: Vec<Proposal> = self
            .repository
            .list_all()
            .await?
            .into_iter()
            .filter(|p| query.matches(p))
            .collect();
        matching.sort_by_key(|p| p.created_at);

        let total = matching.len();
        let page = query.page();
        let limit = query.limit();
        let proposals = matching
            .into_iter()
            .skip((page - 1).saturating_mul(limit))
            .take(limit)
            .collect();

        Ok(ProposalPage {
            proposals,
            total,
            page,
            limit,
        })
    }

    pub async fn list_all(&self) -> Result<Vec<Proposal>, GovernanceError> {
        Ok(self.repository.list_all().await?)
    }
}
