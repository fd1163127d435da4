// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Execution Workflow Coordinator
//!
//! Creates at most one [`GovernanceWorkflow`] per approved proposal and walks it
//! forward. Execution itself happens elsewhere; the coordinator only resolves who is
//! responsible for each phase and tracks the stage log.

use std::sync::Arc;
use tracing::info;

use crate::application::agent_resolver::AgentResolver;
use crate::domain::error::GovernanceError;
use crate::domain::proposal::{ProposalId, ProposalStage};
use crate::domain::repository::{ProposalRepository, RepositoryError, WorkflowRepository};
use crate::domain::workflow::{GovernanceWorkflow, WorkflowStatus};

pub struct ExecutionCoordinator {
    workflows: Arc<dyn WorkflowRepository>,
    proposals: Arc<dyn ProposalRepository>,
    resolver: Arc<AgentResolver>,
}

impl ExecutionCoordinator {
    pub fn new(
        workflows: Arc<dyn WorkflowRepository>,
        proposals: Arc<dyn ProposalRepository>,
        resolver: Arc<AgentResolver>,
    ) -> Self {
        Self {
            workflows,
            proposals,
            resolver,
        }
    }

    pub async fn create_workflow(
        &self,
        proposal_id: ProposalId,
    ) -> Result<GovernanceWorkflow, GovernanceError> {
        if self.workflows.find_by_proposal(proposal_id).await?.is_some() {
            return Err(GovernanceError::WorkflowAlreadyExists(proposal_id));
        }

        let proposal = self
            .proposals
            .find_by_id(proposal_id)
            .await?
            .ok_or(GovernanceError::ProposalNotFound(proposal_id))?;
        if proposal.stage != ProposalStage::Approved {
            return Err(GovernanceError::ProposalNotApproved {
                proposal_id,
                stage: proposal.stage,
            });
        }

        let assignments = self.resolver.execution_assignments(&proposal.execution_details);
        let workflow = GovernanceWorkflow::from_proposal(&proposal, assignments);
        self.workflows
            .insert_new(&workflow)
            .await
            .map_err(|e| match e {
                RepositoryError::AlreadyExists(_) => {
                    GovernanceError::WorkflowAlreadyExists(proposal_id)
                }
                other => other.into(),
            })?;

        info!(
            proposal_id = %proposal_id,
            phases = workflow.assignments.len(),
            "Governance workflow created"
        );
        Ok(workflow)
    }

    pub async fn advance(
        &self,
        proposal_id: ProposalId,
        to: ProposalStage,
        triggered_by: &str,
    ) -> Result<GovernanceWorkflow, GovernanceError> {
        let mut workflow = self.get_workflow(proposal_id).await?;
        workflow.advance(to, triggered_by)?;
        self.workflows.save(&workflow).await?;
        info!(proposal_id = %proposal_id, stage = %to, triggered_by, "Workflow advanced");
        Ok(workflow)
    }

    pub async fn get_workflow(
        &self,
        proposal_id: ProposalId,
    ) -> Result<GovernanceWorkflow, GovernanceError> {
        self.workflows
            .find_by_proposal(proposal_id)
            .await?
            .ok_or(GovernanceError::WorkflowNotFound(proposal_id))
    }

    pub async fn status(&self, proposal_id: ProposalId) -> Result<WorkflowStatus, GovernanceError> {
        Ok(self.get_workflow(proposal_id).await?.status())
    }

    pub async fn count(&self) -> Result<usize, GovernanceError> {
        Ok(self.workflows.list_all().await?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::proposal::{ExecutionDetails, ExecutionPhase, NewProposal, Proposal, ProposalType};
    use crate::infrastructure::repositories::{InMemoryProposalRepository, InMemoryWorkflowRepository};

    async fn coordinator_with(stage: ProposalStage) -> (ExecutionCoordinator, ProposalId) {
        let proposals = Arc::new(InMemoryProposalRepository::new());
        let mut p = Proposal::new(NewProposal {
            title: "Adopt new CI".into(),
            description: "Replace the CI runner fleet".into(),
            proposal_type: ProposalType::Technical,
            proposer: "CTO".into(),
            execution_details: ExecutionDetails {
                phases: vec![ExecutionPhase {
                    id: "migrate".into(),
                    name: "Migrate pipelines".into(),
                    responsible_agents: vec!["zara_cto".into(), "contractor".into()],
                    ..Default::default()
                }],
                success_criteria: vec!["all pipelines green".into()],
            },
            budget_request: None,
            timeline: Default::default(),
            stakeholders: vec!["CEO".into()],
        });
        for to in [ProposalStage::Submitted, ProposalStage::Voting, ProposalStage::Approved] {
            if p.stage == stage {
                break;
            }
            p.transition(to, "test").unwrap();
        }
        proposals.save(&p).await.unwrap();
        let coordinator = ExecutionCoordinator::new(
            Arc::new(InMemoryWorkflowRepository::new()),
            proposals,
            Arc::new(AgentResolver::new()),
        );
        (coordinator, p.id)
    }

    #[tokio::test]
    async fn test_create_workflow_twice_fails() {
        let (c, id) = coordinator_with(ProposalStage::Approved).await;
        let wf = c.create_workflow(id).await.unwrap();
        assert_eq!(wf.current_stage, ProposalStage::Approved);
        assert_eq!(wf.assignments[0].responsible_agents.len(), 1);
        assert_eq!(wf.assignments[0].unresolved, vec!["contractor".to_string()]);

        let err = c.create_workflow(id).await.unwrap_err();
        assert!(matches!(err, GovernanceError::WorkflowAlreadyExists(p) if p == id));
    }

    #[tokio::test]
    async fn test_create_workflow_requires_approval() {
        let (c, id) = coordinator_with(ProposalStage::Voting).await;
        let err = c.create_workflow(id).await.unwrap_err();
        assert!(matches!(err, GovernanceError::ProposalNotApproved { .. }));
        assert!(matches!(
            c.get_workflow(id).await.unwrap_err(),
            GovernanceError::WorkflowNotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_advance_to_executed() {
        let (c, id) = coordinator_with(ProposalStage::Approved).await;
        c.create_workflow(id).await.unwrap();
        let err = c.advance(id, ProposalStage::Voting, "ops").await.unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidStageTransition { .. }));

        let wf = c.advance(id, ProposalStage::Executed, "ops").await.unwrap();
        assert_eq!(wf.stage_transitions.len(), 4);
        let status = c.status(id).await.unwrap();
        assert!(status.is_complete);
        assert_eq!(status.progress, 1.0);
    }
}
