// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain error taxonomy.
//!
//! Every failure surfaced by the governance service carries a stable machine-readable
//! [`GovernanceError::code`] and an [`ErrorCategory`] that the presentation layer maps
//! onto transport status codes.

use crate::domain::proposal::{ProposalId, ProposalStage};
use crate::domain::repository::RepositoryError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Coarse classification used by transports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// The caller sent something malformed or unresolvable.
    Input,
    /// The request is well-formed but conflicts with the current lifecycle state.
    State,
    NotFound,
    Internal,
}

#[derive(Debug, Error)]
pub enum GovernanceError {
    #[error("proposal validation failed: {}", violations.join("; "))]
    Validation {
        proposal_id: Option<ProposalId>,
        violations: Vec<String>,
    },

    #[error("proposal {proposal_id} cannot move from {from} to {to}")]
    InvalidTransition {
        proposal_id: ProposalId,
        from: ProposalStage,
        to: ProposalStage,
    },

    #[error("voter '{0}' does not resolve to a governance agent")]
    UnknownVoter(String),

    #[error("identifier '{0}' does not resolve to a governance agent")]
    UnknownAgent(String),

    #[error("voting is closed for proposal {proposal_id} (stage {stage})")]
    VotingClosed {
        proposal_id: ProposalId,
        stage: ProposalStage,
    },

    #[error("workflow already exists for proposal {0}")]
    WorkflowAlreadyExists(ProposalId),

    #[error("workflow for proposal {proposal_id} cannot advance from {from} to {to}")]
    InvalidStageTransition {
        proposal_id: ProposalId,
        from: ProposalStage,
        to: ProposalStage,
    },

    #[error("proposal {0} not found")]
    ProposalNotFound(ProposalId),

    #[error("no workflow for proposal {0}")]
    WorkflowNotFound(ProposalId),

    #[error("proposal {proposal_id} is not approved (stage {stage})")]
    ProposalNotApproved {
        proposal_id: ProposalId,
        stage: ProposalStage,
    },

    #[error("voting period {voting_period:?} for proposal {proposal_id} cannot be scheduled")]
    VotingPeriodOutOfRange {
        proposal_id: ProposalId,
        voting_period: std::time::Duration,
    },

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl GovernanceError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            GovernanceError::Validation { .. }
            | GovernanceError::UnknownVoter(_)
            | GovernanceError::UnknownAgent(_) => ErrorCategory::Input,
            GovernanceError::InvalidTransition { .. }
            | GovernanceError::VotingClosed { .. }
            | GovernanceError::WorkflowAlreadyExists(_)
            | GovernanceError::InvalidStageTransition { .. }
            | GovernanceError::ProposalNotApproved { .. } => ErrorCategory::State,
            GovernanceError::ProposalNotFound(_) | GovernanceError::WorkflowNotFound(_) => {
                ErrorCategory::NotFound
            }
            GovernanceError::VotingPeriodOutOfRange { .. } | GovernanceError::Repository(_) => {
                ErrorCategory::Internal
            }
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            GovernanceError::Validation { .. } => "validation_failed",
            GovernanceError::InvalidTransition { .. } => "invalid_transition",
            GovernanceError::UnknownVoter(_) => "unknown_voter",
            GovernanceError::UnknownAgent(_) => "unknown_agent",
            GovernanceError::VotingClosed { .. } => "voting_closed",
            GovernanceError::WorkflowAlreadyExists(_) => "workflow_already_exists",
            GovernanceError::InvalidStageTransition { .. } => "invalid_stage_transition",
            GovernanceError::ProposalNotFound(_) => "proposal_not_found",
            GovernanceError::WorkflowNotFound(_) => "workflow_not_found",
            GovernanceError::ProposalNotApproved { .. } => "proposal_not_approved",
            GovernanceError::VotingPeriodOutOfRange { .. } => "voting_period_out_of_range",
            GovernanceError::Repository(_) => "repository_error",
        }
    }

    /// Individual validation messages, empty for every other variant.
    pub fn violations(&self) -> &[String] {
        match self {
            GovernanceError::Validation { violations, .. } => violations,
            _ => &[],
        }
    }
}
