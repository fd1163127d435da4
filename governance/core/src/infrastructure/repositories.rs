// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! In-Memory Repository Implementations
//!
//! Thread-safe, HashMap-backed implementations of the domain repository traits.
//! Durable storage is an external dependency of the service; these back the
//! development server, the simulator and the tests.
//!
//! - **InMemoryProposalRepository** - proposals in insertion order
//! - **InMemoryVoteRepository** - one vote per `(proposal, voter)` key
//! - **InMemoryWorkflowRepository** - at most one workflow per proposal

use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use crate::domain::agent::AgentId;
use crate::domain::proposal::{Proposal, ProposalId};
use crate::domain::repository::{
    ProposalRepository, RepositoryError, VoteRepository, WorkflowRepository,
};
use crate::domain::vote::Vote;
use crate::domain::workflow::GovernanceWorkflow;

#[derive(Default)]
struct ProposalStore {
    next_seq: u64,
    entries: HashMap<ProposalId, (u64, Proposal)>,
}

#[derive(Clone, Default)]
pub struct InMemoryProposalRepository {
    store: Arc<RwLock<ProposalStore>>,
}

impl InMemoryProposalRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ProposalRepository for InMemoryProposalRepository {
    async fn save(&self, proposal: &Proposal) -> Result<(), RepositoryError> {
        let mut store = self.store.write();
        let seq = match store.entries.get(&proposal.id) {
            Some((seq, _)) => *seq,
            None => {
                store.next_seq += 1;
                store.next_seq
            }
        };
        store.entries.insert(proposal.id, (seq, proposal.clone()));
        Ok(())
    }

    async fn find_by_id(&self, id: ProposalId) -> Result<Option<Proposal>, RepositoryError> {
        let store = self.store.read();
        Ok(store.entries.get(&id).map(|(_, p)| p.clone()))
    }

    async fn list_all(&self) -> Result<Vec<Proposal>, RepositoryError> {
        let store = self.store.read();
        let mut entries: Vec<&(u64, Proposal)> = store.entries.values().collect();
        entries.sort_by_key(|(seq, _)| *seq);
        Ok(entries.into_iter().map(|(_, p)| p.clone()).collect())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryVoteRepository {
    votes: Arc<RwLock<HashMap<ProposalId, BTreeMap<AgentId, Vote>>>>,
}

impl InMemoryVoteRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl VoteRepository for InMemoryVoteRepository {
    async fn upsert(&self, vote: &Vote) -> Result<Option<Vote>, RepositoryError> {
        let mut votes = self.votes.write();
        Ok(votes
            .entry(vote.proposal_id)
            .or_default()
            .insert(vote.voter_agent_id.clone(), vote.clone()))
    }

    async fn find_by_proposal(&self, proposal_id: ProposalId) -> Result<Vec<Vote>, RepositoryError> {
        let votes = self.votes.read();
        Ok(votes
            .get(&proposal_id)
            .map(|by_voter| by_voter.values().cloned().collect())
            .unwrap_or_default())
    }

    async fn count_all(&self) -> Result<usize, RepositoryError> {
        let votes = self.votes.read();
        Ok(votes.values().map(BTreeMap::len).sum())
    }
}

#[derive(Clone, Default)]
pub struct InMemoryWorkflowRepository {
    workflows: Arc<RwLock<HashMap<ProposalId, GovernanceWorkflow>>>,
}

impl InMemoryWorkflowRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl WorkflowRepository for InMemoryWorkflowRepository {
    async fn insert_new(&self, workflow: &GovernanceWorkflow) -> Result<(), RepositoryError> {
        let mut workflows = self.workflows.write();
        if workflows.contains_key(&workflow.proposal_id) {
            return Err(RepositoryError::AlreadyExists(format!(
                "workflow for proposal {}",
                workflow.proposal_id
            )));
        }
        workflows.insert(workflow.proposal_id, workflow.clone());
        Ok(())
    }

    async fn save(&self, workflow: &GovernanceWorkflow) -> Result<(), RepositoryError> {
        let mut workflows = self.workflows.write();
        workflows.insert(workflow.proposal_id, workflow.clone());
        Ok(())
    }

    async fn find_by_proposal(
        &self,
        proposal_id: ProposalId,
    ) -> Result<Option<GovernanceWorkflow>, RepositoryError> {
        let workflows = self.workflows.read();
        Ok(workflows.get(&proposal_id).cloned())
    }

    async fn list_all(&self) -> Result<Vec<GovernanceWorkflow>, RepositoryError> {
        let workflows = self.workflows.read();
        let mut all: Vec<GovernanceWorkflow> = workflows.values().cloned().collect();
        all.sort_by_key(|w| w.created_at);
        Ok(all)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::agent::AgentRole;
    use crate::domain::vote::VoteOption;
    use chrono::Utc;

    #[tokio::test]
    async fn test_vote_upsert_keeps_one_entry_per_voter() {
        let repo = InMemoryVoteRepository::new();
        let id = ProposalId::new();
        let mut vote = Vote {
            proposal_id: id,
            voter_agent_id: AgentRole::Cto.agent_id(),
            voter_role: AgentRole::Cto,
            vote_option: VoteOption::For,
            reason: None,
            timestamp: Utc::now(),
        };
        assert!(repo.upsert(&vote).await.unwrap().is_none());
        vote.vote_option = VoteOption::Abstain;
        let previous = repo.upsert(&vote).await.unwrap().unwrap();
        assert_eq!(previous.vote_option, VoteOption::For);

        assert_eq!(repo.find_by_proposal(id).await.unwrap().len(), 1);
        assert_eq!(repo.count_all().await.unwrap(), 1);
        let stored = repo.find_by_proposal(id).await.unwrap();
        assert_eq!(stored[0].vote_option, VoteOption::Abstain);
        assert!(repo.find_by_proposal(ProposalId::new()).await.unwrap().is_empty());
    }
}
