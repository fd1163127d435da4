// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::agent::AgentId;
use crate::domain::proposal::{ProposalId, ProposalType};
use crate::domain::vote::{RejectionReason, VoteOption};

/// Governance lifecycle events published after each committed state change.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GovernanceEvent {
    ProposalCreated {
        proposal_id: ProposalId,
        proposal_type: ProposalType,
        proposer: String,
        created_at: DateTime<Utc>,
    },
    ProposalSubmitted {
        proposal_id: ProposalId,
        submitted_by: String,
        submitted_at: DateTime<Utc>,
    },
    VotingStarted {
        proposal_id: ProposalId,
        closes_at: DateTime<Utc>,
        quorum_fraction: f64,
        started_at: DateTime<Utc>,
    },
    VoteCast {
        proposal_id: ProposalId,
        voter: AgentId,
        option: VoteOption,
        replaced: bool,
        cast_at: DateTime<Utc>,
    },
    ProposalApproved {
        proposal_id: ProposalId,
        for_weight: f64,
        against_weight: f64,
        approved_at: DateTime<Utc>,
    },
    ProposalRejected {
        proposal_id: ProposalId,
        reason: Option<RejectionReason>,
        rejected_at: DateTime<Utc>,
    },
    WorkflowCreated {
        proposal_id: ProposalId,
        phases: usize,
        created_at: DateTime<Utc>,
    },
    ProposalExecuted {
        proposal_id: ProposalId,
        triggered_by: String,
        executed_at: DateTime<Utc>,
    },
}

impl GovernanceEvent {
    pub fn proposal_id(&self) -> ProposalId {
        match self {
            GovernanceEvent::ProposalCreated { proposal_id, .. }
            | GovernanceEvent::ProposalSubmitted { proposal_id, .. }
            | GovernanceEvent::VotingStarted { proposal_id, .. }
            | GovernanceEvent::VoteCast { proposal_id, .. }
            | GovernanceEvent::ProposalApproved { proposal_id, .. }
            | GovernanceEvent::ProposalRejected { proposal_id, .. }
            | GovernanceEvent::WorkflowCreated { proposal_id, .. }
            | GovernanceEvent::ProposalExecuted { proposal_id, .. } => *proposal_id,
        }
    }

    /// Snake-case event name, used as the notification event identifier.
    pub fn name(&self) -> &'static str {
        match self {
            GovernanceEvent::ProposalCreated { .. } => "proposal_created",
            GovernanceEvent::ProposalSubmitted { .. } => "proposal_submitted",
            GovernanceEvent::VotingStarted { .. } => "voting_started",
            GovernanceEvent::VoteCast { .. } => "vote_cast",
            GovernanceEvent::ProposalApproved { .. } => "proposal_approved",
            GovernanceEvent::ProposalRejected { .. } => "proposal_rejected",
            GovernanceEvent::WorkflowCreated { .. } => "workflow_created",
            GovernanceEvent::ProposalExecuted { .. } => "proposal_executed",
        }
    }
}
