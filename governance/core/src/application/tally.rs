// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Voting Tally Engine
//!
//! Records votes keyed by `(proposal, canonical voter)` and derives
//! [`VotingResults`] from the current vote set. Re-casting replaces the earlier
//! ballot (last write wins).

use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info};

use crate::application::agent_resolver::AgentResolver;
use crate::domain::error::GovernanceError;
use crate::domain::proposal::{ProposalId, ProposalStage};
use crate::domain::repository::{ProposalRepository, VoteRepository};
use crate::domain::vote::{CastVote, Vote, VotingResults};

/// A stored vote and the ballot it replaced, if any.
#[derive(Debug, Clone)]
pub struct CastOutcome {
    pub vote: Vote,
    pub replaced: Option<Vote>,
}

pub struct VotingTallyEngine {
    votes: Arc<dyn VoteRepository>,
    proposals: Arc<dyn ProposalRepository>,
    resolver: Arc<AgentResolver>,
    default_quorum_fraction: f64,
}

impl VotingTallyEngine {
    pub fn new(
        votes: Arc<dyn VoteRepository>,
        proposals: Arc<dyn ProposalRepository>,
        resolver: Arc<AgentResolver>,
        default_quorum_fraction: f64,
    ) -> Self {
        Self {
            votes,
            proposals,
            resolver,
            default_quorum_fraction,
        }
    }

    pub async fn cast_vote(&self, ballot: CastVote) -> Result<CastOutcome, GovernanceError> {
        let voter = self
            .resolver
            .resolve(&ballot.voter_address)
            .ok_or_else(|| GovernanceError::UnknownVoter(ballot.voter_address.clone()))?;

        let proposal = self
            .proposals
            .find_by_id(ballot.proposal_id)
            .await?
            .ok_or(GovernanceError::ProposalNotFound(ballot.proposal_id))?;

        if proposal.stage != ProposalStage::Voting {
            return Err(GovernanceError::VotingClosed {
                proposal_id: proposal.id,
                stage: proposal.stage,
            });
        }

        let now = Utc::now();
        if let Some(window) = &proposal.voting_window {
            if !window.is_open_at(now) {
                debug!(
                    proposal_id = %proposal.id,
                    opens_at = %window.opens_at,
                    closes_at = %window.closes_at,
                    "Vote outside voting window"
                );
                return Err(GovernanceError::VotingClosed {
                    proposal_id: proposal.id,
                    stage: proposal.stage,
                });
            }
        }

        let vote = Vote {
            proposal_id: proposal.id,
            voter_agent_id: voter.agent_id,
            voter_role: voter.role,
            vote_option: ballot.vote_option,
            reason: ballot.reason.filter(|r| !r.trim().is_empty()),
            timestamp: now,
        };
        let replaced = self.votes.upsert(&vote).await?;

        info!(
            proposal_id = %vote.proposal_id,
            voter = %vote.voter_agent_id,
            option = %vote.vote_option,
            replaced = replaced.is_some(),
            "Vote recorded"
        );
        Ok(CastOutcome { vote, replaced })
    }

    /// Point-in-time tally. Uses the quorum fraction captured when voting opened,
    /// falling back to the configured default.
    pub async fn tally(&self, proposal_id: ProposalId) -> Result<VotingResults, GovernanceError> {
        let proposal = self
            .proposals
            .find_by_id(proposal_id)
            .await?
            .ok_or(GovernanceError::ProposalNotFound(proposal_id))?;

        let quorum_fraction = proposal
            .voting_window
            .as_ref()
            .map(|w| w.quorum_fraction)
            .unwrap_or(self.default_quorum_fraction);

        let votes = self.votes.find_by_proposal(proposal_id).await?;
        Ok(VotingResults::compute(
            proposal_id,
            &votes,
            self.resolver.all_voting_weights(),
            quorum_fraction,
        ))
    }

    pub async fn votes(&self, proposal_id: ProposalId) -> Result<Vec<Vote>, GovernanceError> {
        if self.proposals.find_by_id(proposal_id).await?.is_none() {
            return Err(GovernanceError::ProposalNotFound(proposal_id));
        }
        Ok(self.votes.find_by_proposal(proposal_id).await?)
    }

    pub async fn total_votes(&self) -> Result<usize, GovernanceError> {
        Ok(self.votes.count_all().await?)
    }
}
