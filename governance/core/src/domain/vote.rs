// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Votes and the stake-weighted tally.
//!
//! Weights are converted to basis points before summing, so `for == against` and the
//! quorum threshold are compared exactly rather than through floating-point sums.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::agent::{AgentId, AgentRole, AgentVotingWeight};
use crate::domain::proposal::ProposalId;

const BPS: u64 = 10_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteOption {
    For,
    Against,
    Abstain,
}

impl VoteOption {
    pub fn as_str(&self) -> &'static str {
        match self {
            VoteOption::For => "for",
            VoteOption::Against => "against",
            VoteOption::Abstain => "abstain",
        }
    }
}

impl fmt::Display for VoteOption {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for VoteOption {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "for" | "yes" => Ok(VoteOption::For),
            "against" | "no" => Ok(VoteOption::Against),
            "abstain" => Ok(VoteOption::Abstain),
            other => Err(format!("unknown vote option '{other}'")),
        }
    }
}

/// A recorded vote. At most one exists per `(proposal_id, voter_agent_id)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vote {
    pub proposal_id: ProposalId,
    pub voter_agent_id: AgentId,
    pub voter_role: AgentRole,
    pub vote_option: VoteOption,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    pub timestamp: DateTime<Utc>,
}

/// Ballot as submitted by a client; `voter_address` may be any resolvable alias.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CastVote {
    pub proposal_id: ProposalId,
    pub voter_address: String,
    pub vote_option: VoteOption,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VotingOutcome {
    Approved,
    Rejected,
}

impl fmt::Display for VotingOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VotingOutcome::Approved => f.write_str("approved"),
            VotingOutcome::Rejected => f.write_str("rejected"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectionReason {
    NoQuorum,
    Tie,
    MajorityAgainst,
}

/// One electorate member's part in a tally.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentParticipation {
    pub agent_id: AgentId,
    pub role: AgentRole,
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vote_option: Option<VoteOption>,
}

impl AgentParticipation {
    pub fn voted(&self) -> bool {
        self.vote_option.is_some()
    }
}

/// Point-in-time tally of a proposal's vote set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotingResults {
    pub proposal_id: ProposalId,
    pub for_weight: f64,
    pub against_weight: f64,
    pub abstain_weight: f64,
    pub for_count: usize,
    pub against_count: usize,
    pub abstain_count: usize,
    pub total_voters: usize,
    pub eligible_weight: f64,
    pub participation: f64,
    pub quorum_fraction: f64,
    pub quorum_reached: bool,
    pub outcome: VotingOutcome,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejection_reason: Option<RejectionReason>,
    /// Every eligible agent in electorate order, with its ballot if cast.
    #[serde(default)]
    pub agent_participation: Vec<AgentParticipation>,
    pub tallied_at: DateTime<Utc>,
}

impl VotingResults {
    /// Tally `votes` against the electorate described by `weights`.
    ///
    /// Quorum is inclusive: `cast / eligible >= quorum_fraction`. A tie on a quorate
    /// vote is rejected, and an empty vote set never reaches quorum.
    pub fn compute(
        proposal_id: ProposalId,
        votes: &[Vote],
        weights: &[AgentVotingWeight],
        quorum_fraction: f64,
    ) -> Self {
        let by_role: HashMap<AgentRole, u64> = weights
            .iter()
            .map(|w| (w.role, w.staking_weight_bps()))
            .collect();
        let eligible_bps: u64 = by_role.values().sum();

        let (mut for_bps, mut against_bps, mut abstain_bps) = (0u64, 0u64, 0u64);
        let (mut for_count, mut against_count, mut abstain_count) = (0usize, 0usize, 0usize);
        for vote in votes {
            let w = by_role.get(&vote.voter_role).copied().unwrap_or(0);
            match vote.vote_option {
                VoteOption::For => {
                    for_bps += w;
                    for_count += 1;
                }
                VoteOption::Against => {
                    against_bps += w;
                    against_count += 1;
                }
                VoteOption::Abstain => {
                    abstain_bps += w;
                    abstain_count += 1;
                }
            }
        }

        let total_voters = votes.len();
        let cast_bps = for_bps + against_bps + abstain_bps;
        let quorum_bps = (quorum_fraction.clamp(0.0, 1.0) * BPS as f64).round() as u64;
        let quorum_reached =
            total_voters > 0 && eligible_bps > 0 && cast_bps * BPS >= quorum_bps * eligible_bps;

        let (outcome, rejection_reason) = if !quorum_reached {
            (VotingOutcome::Rejected, Some(RejectionReason::NoQuorum))
        } else if for_bps > against_bps {
            (VotingOutcome::Approved, None)
        } else if for_bps == against_bps {
            (VotingOutcome::Rejected, Some(RejectionReason::Tie))
        } else {
            (VotingOutcome::Rejected, Some(RejectionReason::MajorityAgainst))
        };

        let agent_participation = weights
            .iter()
            .map(|w| AgentParticipation {
                agent_id: w.agent_id.clone(),
                role: w.role,
                weight: from_bps(w.staking_weight_bps()),
                vote_option: votes
                    .iter()
                    .find(|v| v.voter_role == w.role)
                    .map(|v| v.vote_option),
            })
            .collect();

        let participation = if eligible_bps == 0 {
            0.0
        } else {
            cast_bps as f64 / eligible_bps as f64
        };

        Self {
            proposal_id,
            for_weight: from_bps(for_bps),
            against_weight: from_bps(against_bps),
            abstain_weight: from_bps(abstain_bps),
            for_count,
            against_count,
            abstain_count,
            total_voters,
            eligible_weight: from_bps(eligible_bps),
            participation,
            quorum_fraction,
            quorum_reached,
            outcome,
            rejection_reason,
            agent_participation,
            tallied_at: Utc::now(),
        }
    }

    pub fn is_approved(&self) -> bool {
        self.outcome == VotingOutcome::Approved
    }

    /// Same decision, ignoring `tallied_at`.
    pub fn same_decision(&self, other: &VotingResults) -> bool {
        self.outcome == other.outcome
            && self.quorum_reached == other.quorum_reached
            && self.for_weight == other.for_weight
            && self.against_weight == other.against_weight
            && self.abstain_weight == other.abstain_weight
            && self.total_voters == other.total_voters
    }
}

fn from_bps(bps: u64) -> f64 {
    bps as f64 / BPS as f64
}
