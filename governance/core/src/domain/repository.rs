// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Domain Repository Interfaces
//!
//! Persistence contracts for the governance aggregates. Interfaces live in the domain
//! layer; implementations live in `crate::infrastructure::repositories`.
//!
//! | Trait | Aggregate | Implementations |
//! |-------|-----------|----------------|
//! | `ProposalRepository` | `Proposal` | `InMemoryProposalRepository` |
//! | `VoteRepository` | `Vote` (keyed by proposal + voter) | `InMemoryVoteRepository` |
//! | `WorkflowRepository` | `GovernanceWorkflow` | `InMemoryWorkflowRepository` |
//!
//! Implementations are not expected to serialize read-modify-write sequences on the
//! same proposal; the governance service does that with its per-proposal locks.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::proposal::{Proposal, ProposalId};
use crate::domain::vote::Vote;
use crate::domain::workflow::GovernanceWorkflow;

#[async_trait]
pub trait ProposalRepository: Send + Sync {
    /// Save proposal (create or update)
    async fn save(&self, proposal: &Proposal) -> Result<(), RepositoryError>;

    async fn find_by_id(&self, id: ProposalId) -> Result<Option<Proposal>, RepositoryError>;

    /// All proposals, oldest first
    async fn list_all(&self) -> Result<Vec<Proposal>, RepositoryError>;
}

#[async_trait]
pub trait VoteRepository: Send + Sync {
    /// Store a vote, replacing any earlier vote by the same agent on the same proposal.
    /// Returns the replaced vote.
    async fn upsert(&self, vote: &Vote) -> Result<Option<Vote>, RepositoryError>;

    /// Current vote set of a proposal, ordered by voter id
    async fn find_by_proposal(&self, proposal_id: ProposalId) -> Result<Vec<Vote>, RepositoryError>;

    async fn count_all(&self) -> Result<usize, RepositoryError>;
}

#[async_trait]
pub trait WorkflowRepository: Send + Sync {
    /// Insert a workflow; fails with `AlreadyExists` if the proposal already has one
    async fn insert_new(&self, workflow: &GovernanceWorkflow) -> Result<(), RepositoryError>;

    async fn save(&self, workflow: &GovernanceWorkflow) -> Result<(), RepositoryError>;

    async fn find_by_proposal(
        &self,
        proposal_id: ProposalId,
    ) -> Result<Option<GovernanceWorkflow>, RepositoryError>;

    async fn list_all(&self) -> Result<Vec<GovernanceWorkflow>, RepositoryError>;
}

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Entity already exists: {0}")]
    AlreadyExists(String),

    #[error("Storage error: {0}")]
    Storage(String),
}
