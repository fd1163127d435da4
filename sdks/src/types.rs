// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Wire types that exist only at the REST boundary.
//!
//! Domain payloads (`Proposal`, `Vote`, `VotingResults`, ...) are re-exported from
//! the core crate so both sides agree on one definition.

use serde::{Deserialize, Serialize};

pub use dao_governance_core::application::GovernanceStats;
pub use dao_governance_core::application::Finalization;
pub use dao_governance_core::domain::agent::{AgentVotingWeight, ResolvedAgent};
pub use dao_governance_core::domain::proposal::{
    NewProposal, Proposal, ProposalId, ProposalPage, ProposalQuery, ProposalStage, ProposalType,
};
pub use dao_governance_core::domain::vote::{
    AgentParticipation, CastVote, Vote, VoteOption, VotingResults,
};
pub use dao_governance_core::domain::workflow::{GovernanceWorkflow, WorkflowStatus};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ActorRequest {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdvanceRequest {
    pub to_stage: ProposalStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub triggered_by: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentView {
    pub agent: ResolvedAgent,
    pub voting_weight: Option<AgentVotingWeight>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkflowView {
    pub workflow: GovernanceWorkflow,
    pub status: WorkflowStatus,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub service: String,
    pub version: String,
    pub uptime_seconds: i64,
}

/// `{"error": {...}}` body returned by the service on failure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ErrorBody,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub category: String,
    pub message: String,
    #[serde(default)]
    pub violations: Vec<String>,
}
