// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Governance Domain Layer
//!
//! Pure domain types and rules. No I/O dependencies beyond the async
//! repository and collaborator traits implemented in `crate::infrastructure`.
//!
//! | Module | Key Types |
//! |--------|-----------|
//! | [`agent`] | `AgentRole`, `AgentId`, `ResolvedAgent`, `AgentVotingWeight` |
//! | [`proposal`] | `Proposal`, `ProposalStage`, `StageTransition`, `NewProposal` |
//! | [`vote`] | `Vote`, `VoteOption`, `VotingResults` |
//! | [`workflow`] | `GovernanceWorkflow`, `ExecutionAssignment` |
//! | [`events`] | `GovernanceEvent` |
//! | [`repository`] | `ProposalRepository`, `VoteRepository`, `WorkflowRepository` |
//! | [`collaborators`] | `NotificationSender`, `DiscussionBridge` |
//! | [`config`] | `GovernanceConfig` manifest |
//! | [`error`] | `GovernanceError` |

pub mod agent;
pub mod proposal;
pub mod vote;
pub mod workflow;
pub mod events;
pub mod repository;
pub mod collaborators;
pub mod config;
pub mod error;

pub use error::{ErrorCategory, GovernanceError};
