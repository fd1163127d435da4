// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Governance Workflow Aggregate
//!
//! Created once a proposal is approved. The workflow carries the proposal's full
//! stage-transition log (seeded at creation) and only ever advances to the single
//! forward successor of its current stage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::agent::ResolvedAgent;
use crate::domain::error::GovernanceError;
use crate::domain::proposal::{Proposal, ProposalId, ProposalStage, StageTransition};

/// Responsible agents for one execution phase.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutionAssignment {
    pub phase_id: String,
    pub phase_name: String,
    pub responsible_agents: Vec<ResolvedAgent>,
    /// References that did not resolve to a governance agent.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unresolved: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GovernanceWorkflow {
    pub proposal_id: ProposalId,
    pub current_stage: ProposalStage,
    pub stage_transitions: Vec<StageTransition>,
    pub assignments: Vec<ExecutionAssignment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl GovernanceWorkflow {
    /// Seed a workflow from an approved proposal.
    pub fn from_proposal(proposal: &Proposal, assignments: Vec<ExecutionAssignment>) -> Self {
        let now = Utc::now();
        Self {
            proposal_id: proposal.id,
            current_stage: proposal.stage,
            stage_transitions: proposal.stage_transitions.clone(),
            assignments,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn advance(
        &mut self,
        to: ProposalStage,
        triggered_by: impl Into<String>,
    ) -> Result<StageTransition, GovernanceError> {
        if self.current_stage.successor() != Some(to) {
            return Err(GovernanceError::InvalidStageTransition {
                proposal_id: self.proposal_id,
                from: self.current_stage,
                to,
            });
        }

        let now = Utc::now();
        let entry = StageTransition {
            from: self.current_stage,
            to,
            timestamp: now,
            triggered_by: triggered_by.into(),
        };
        self.stage_transitions.push(entry.clone());
        self.current_stage = to;
        self.updated_at = now;
        Ok(entry)
    }

    pub fn status(&self) -> WorkflowStatus {
        WorkflowStatus {
            proposal_id: self.proposal_id,
            current_stage: self.current_stage,
            next_stage: self.current_stage.successor(),
            progress: self.current_stage.progress(),
            is_complete: self.current_stage.is_terminal(),
            transitions: self.stage_transitions.len(),
            assignments: self.assignments.clone(),
        }
    }
}

/// Summary view for operators and downstream execution tooling.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkflowStatus {
    pub proposal_id: ProposalId,
    pub current_stage: ProposalStage,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_stage: Option<ProposalStage>,
    pub progress: f64,
    pub is_complete: bool,
    pub transitions: usize,
    pub assignments: Vec<ExecutionAssignment>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::proposal::{NewProposal, ProposalType};

    fn approved_proposal() -> Proposal {
        let mut p = Proposal::new(NewProposal {
            title: "t".into(),
            description: "d".into(),
            proposal_type: ProposalType::Operational,
            proposer: "CEO".into(),
            execution_details: Default::default(),
            budget_request: None,
            timeline: Default::default(),
            stakeholders: vec!["CTO".into()],
        });
        for to in [
            ProposalStage::Submitted,
            ProposalStage::Voting,
            ProposalStage::Approved,
        ] {
            p.transition(to, "test").unwrap();
        }
        p
    }

    #[test]
    fn test_workflow_is_seeded_with_proposal_history() {
        let wf = GovernanceWorkflow::from_proposal(&approved_proposal(), vec![]);
        assert_eq!(wf.current_stage, ProposalStage::Approved);
        assert_eq!(wf.stage_transitions.len(), 3);
        assert_eq!(wf.stage_transitions[0].from, ProposalStage::Created);
    }

    #[test]
    fn test_advance_only_to_successor() {
        let mut wf = GovernanceWorkflow::from_proposal(&approved_proposal(), vec![]);
        let err = wf.advance(ProposalStage::Rejected, "ops").unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidStageTransition { .. }));
        assert_eq!(wf.stage_transitions.len(), 3);

        wf.advance(ProposalStage::Executed, "ops").unwrap();
        assert_eq!(wf.current_stage, ProposalStage::Executed);
        assert!(wf.status().is_complete);
        assert!(wf.advance(ProposalStage::Executed, "ops").is_err());
    }

    #[test]
    fn test_cannot_execute_before_approval() {
        let mut p = approved_proposal();
        p.stage = ProposalStage::Voting;
        let mut wf = GovernanceWorkflow::from_proposal(&p, vec![]);
        assert!(wf.advance(ProposalStage::Executed, "ops").is_err());
    }
}
