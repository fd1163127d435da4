// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Proposal Aggregate
//!
//! A [`Proposal`] moves through a fixed lifecycle:
//!
//! ```text
//! created ─▶ submitted ─▶ voting ─┬─▶ approved ─▶ executed
//!                                 └─▶ rejected
//! ```
//!
//! | Stage | Terminal | Mutations allowed |
//! |-------|----------|-------------------|
//! | `created` | no | submit |
//! | `submitted` | no | start voting |
//! | `voting` | no | cast vote, finalize |
//! | `approved` | no | create workflow, execute |
//! | `rejected` | yes | none |
//! | `executed` | yes | none |
//!
//! Every accepted transition is appended to [`Proposal::stage_transitions`]; entries are
//! never removed or reordered.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

use crate::domain::agent::{AgentId, AgentRole};
use crate::domain::error::GovernanceError;
use crate::domain::vote::VotingResults;

// ============================================================================
// Identifiers and enumerations
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub Uuid);

impl ProposalId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for ProposalId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProposalId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalType {
    Strategic,
    Operational,
    Financial,
    Governance,
    Technical,
    Emergency,
    Constitutional,
}

#[derive(Debug, Error)]
#[error("unknown proposal type '{0}'")]
pub struct UnknownProposalType(pub String);

impl ProposalType {
    pub const ALL: [ProposalType; 7] = [
        ProposalType::Strategic,
        ProposalType::Operational,
        ProposalType::Financial,
        ProposalType::Governance,
        ProposalType::Technical,
        ProposalType::Emergency,
        ProposalType::Constitutional,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalType::Strategic => "strategic",
            ProposalType::Operational => "operational",
            ProposalType::Financial => "financial",
            ProposalType::Governance => "governance",
            ProposalType::Technical => "technical",
            ProposalType::Emergency => "emergency",
            ProposalType::Constitutional => "constitutional",
        }
    }

    /// Roles that should weigh in on a proposal of this type, most relevant first.
    pub fn recommended_roles(&self) -> &'static [AgentRole] {
        match self {
            ProposalType::Strategic => &[AgentRole::Ceo, AgentRole::Cto, AgentRole::Cfo],
            ProposalType::Operational => &[AgentRole::Ceo, AgentRole::Cto],
            ProposalType::Financial => &[AgentRole::Cfo, AgentRole::Ceo],
            ProposalType::Governance => &[AgentRole::Clo, AgentRole::Ceo],
            ProposalType::Technical => &[AgentRole::Cto, AgentRole::Ceo],
            ProposalType::Emergency => &[
                AgentRole::Ceo,
                AgentRole::Cto,
                AgentRole::Cfo,
                AgentRole::Clo,
            ],
            ProposalType::Constitutional => &[AgentRole::Clo, AgentRole::Ceo],
        }
    }
}

impl fmt::Display for ProposalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalType {
    type Err = UnknownProposalType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = s.trim().to_ascii_lowercase();
        ProposalType::ALL
            .into_iter()
            .find(|t| t.as_str() == normalized)
            .ok_or_else(|| UnknownProposalType(s.to_string()))
    }
}

/// Lifecycle stage shared by proposals and their governance workflows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProposalStage {
    Created,
    Submitted,
    Voting,
    Approved,
    Rejected,
    Executed,
}

impl ProposalStage {
    /// The forward path a successful proposal walks.
    pub const SEQUENCE: [ProposalStage; 5] = [
        ProposalStage::Created,
        ProposalStage::Submitted,
        ProposalStage::Voting,
        ProposalStage::Approved,
        ProposalStage::Executed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProposalStage::Created => "created",
            ProposalStage::Submitted => "submitted",
            ProposalStage::Voting => "voting",
            ProposalStage::Approved => "approved",
            ProposalStage::Rejected => "rejected",
            ProposalStage::Executed => "executed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, ProposalStage::Rejected | ProposalStage::Executed)
    }

    /// The single forward successor along [`Self::SEQUENCE`]. `rejected` branches off
    /// `voting` and is only reachable through [`Self::can_transition_to`].
    pub fn successor(&self) -> Option<ProposalStage> {
        match self {
            ProposalStage::Created => Some(ProposalStage::Submitted),
            ProposalStage::Submitted => Some(ProposalStage::Voting),
            ProposalStage::Voting => Some(ProposalStage::Approved),
            ProposalStage::Approved => Some(ProposalStage::Executed),
            ProposalStage::Rejected | ProposalStage::Executed => None,
        }
    }

    pub fn can_transition_to(&self, to: ProposalStage) -> bool {
        matches!(
            (self, to),
            (ProposalStage::Created, ProposalStage::Submitted)
                | (ProposalStage::Submitted, ProposalStage::Voting)
                | (ProposalStage::Voting, ProposalStage::Approved)
                | (ProposalStage::Voting, ProposalStage::Rejected)
                | (ProposalStage::Approved, ProposalStage::Executed)
        )
    }

    /// Fraction of [`Self::SEQUENCE`] completed. A rejected proposal counts as finished.
    pub fn progress(&self) -> f64 {
        match self {
            ProposalStage::Rejected => 1.0,
            stage => {
                let idx = Self::SEQUENCE
                    .iter()
                    .position(|s| s == stage)
                    .unwrap_or_default();
                idx as f64 / (Self::SEQUENCE.len() - 1) as f64
            }
        }
    }
}

impl fmt::Display for ProposalStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProposalStage {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "created" => Ok(ProposalStage::Created),
            "submitted" => Ok(ProposalStage::Submitted),
            "voting" => Ok(ProposalStage::Voting),
            "approved" => Ok(ProposalStage::Approved),
            "rejected" => Ok(ProposalStage::Rejected),
            "executed" => Ok(ProposalStage::Executed),
            other => Err(format!("unknown stage '{other}'")),
        }
    }
}

/// One entry of the append-only stage-transition log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageTransition {
    pub from: ProposalStage,
    pub to: ProposalStage,
    pub timestamp: DateTime<Utc>,
    pub triggered_by: String,
}

// ============================================================================
// Proposal content
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionDetails {
    #[serde(default)]
    pub phases: Vec<ExecutionPhase>,
    #[serde(default)]
    pub success_criteria: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExecutionPhase {
    #[serde(default)]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Agent references as submitted; resolved when a workflow is created.
    #[serde(default)]
    pub responsible_agents: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_duration: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_allocation: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetRequest {
    pub total_amount: f64,
    pub currency: String,
    #[serde(default)]
    pub justification: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalTimeline {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_start_date: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub estimated_completion_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub key_milestones: Vec<String>,
}

/// Voting policy captured when voting opens.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VotingWindow {
    pub opens_at: DateTime<Utc>,
    pub closes_at: DateTime<Utc>,
    pub quorum_fraction: f64,
}

impl VotingWindow {
    pub fn is_open_at(&self, now: DateTime<Utc>) -> bool {
        now >= self.opens_at && now < self.closes_at
    }
}

/// Client input for creating a proposal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewProposal {
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub proposal_type: ProposalType,
    pub proposer: String,
    #[serde(default)]
    pub execution_details: ExecutionDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_request: Option<BudgetRequest>,
    #[serde(default)]
    pub timeline: ProposalTimeline,
    #[serde(default)]
    pub stakeholders: Vec<String>,
}

// ============================================================================
// Aggregate Root: Proposal
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub proposal_type: ProposalType,
    /// Proposer reference as submitted.
    pub proposer: String,
    /// Canonical id of the proposer, when the reference resolves.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposer_agent_id: Option<AgentId>,
    pub execution_details: ExecutionDetails,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub budget_request: Option<BudgetRequest>,
    pub timeline: ProposalTimeline,
    pub stakeholders: Vec<String>,
    pub stage: ProposalStage,
    pub stage_transitions: Vec<StageTransition>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voting_window: Option<VotingWindow>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voting_results: Option<VotingResults>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Proposal {
    pub fn new(input: NewProposal) -> Self {
        let now = Utc::now();
        let proposer_agent_id = AgentRole::from_identifier(&input.proposer).map(|r| r.agent_id());
        Self {
            id: ProposalId::new(),
            title: input.title,
            description: input.description,
            proposal_type: input.proposal_type,
            proposer: input.proposer,
            proposer_agent_id,
            execution_details: input.execution_details,
            budget_request: input.budget_request,
            timeline: input.timeline,
            stakeholders: input.stakeholders,
            stage: ProposalStage::Created,
            stage_transitions: Vec::new(),
            voting_window: None,
            voting_results: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Move to `to`, appending a log entry. Illegal moves leave the proposal untouched.
    pub fn transition(
        &mut self,
        to: ProposalStage,
        triggered_by: impl Into<String>,
    ) -> Result<StageTransition, GovernanceError> {
        if !self.stage.can_transition_to(to) {
            return Err(GovernanceError::InvalidTransition {
                proposal_id: self.id,
                from: self.stage,
                to,
            });
        }

        let now = Utc::now();
        let entry = StageTransition {
            from: self.stage,
            to,
            timestamp: now,
            triggered_by: triggered_by.into(),
        };
        self.stage_transitions.push(entry.clone());
        self.stage = to;
        self.updated_at = now;

        Ok(entry)
    }

    /// Every reason this proposal cannot be submitted. Empty means it can.
    pub fn submission_violations(&self, supported_types: &[ProposalType]) -> Vec<String> {
        let mut violations = Vec::new();

        if self.title.trim().is_empty() {
            violations.push("title must not be empty".to_string());
        }
        if self.description.trim().is_empty() {
            violations.push("description must not be empty".to_string());
        }
        if AgentRole::from_identifier(&self.proposer).is_none() {
            violations.push(format!(
                "proposer '{}' does not resolve to a governance agent",
                self.proposer
            ));
        }
        if self.stakeholders.iter().all(|s| s.trim().is_empty()) {
            violations.push("at least one stakeholder is required".to_string());
        }
        if !supported_types.contains(&self.proposal_type) {
            violations.push(format!(
                "proposal type '{}' is not supported",
                self.proposal_type
            ));
        }
        if let Some(budget) = &self.budget_request {
            if budget.total_amount.is_nan() || budget.total_amount <= 0.0 {
                violations.push("budget amount must be greater than zero".to_string());
            }
            if budget.currency.trim().is_empty() {
                violations.push("budget currency must not be empty".to_string());
            }
        }
        for (idx, phase) in self.execution_details.phases.iter().enumerate() {
            if phase.name.trim().is_empty() {
                violations.push(format!("execution phase {} has an empty name", idx + 1));
            }
        }

        violations
    }

    /// Recipients for lifecycle notifications: proposer, then stakeholders, deduplicated.
    pub fn notification_recipients(&self) -> Vec<String> {
        let mut recipients: Vec<String> = Vec::with_capacity(self.stakeholders.len() + 1);
        for r in std::iter::once(&self.proposer).chain(self.stakeholders.iter()) {
            if !r.trim().is_empty() && !recipients.contains(r) {
                recipients.push(r.clone());
            }
        }
        recipients
    }
}

/// Filter and pagination for proposal listings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProposalQuery {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<ProposalStage>,
    #[serde(default, rename = "type", skip_serializing_if = "Option::is_none")]
    pub proposal_type: Option<ProposalType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposer: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub limit: Option<usize>,
}

impl ProposalQuery {
    pub const DEFAULT_PAGE: usize = 1;
    pub const DEFAULT_LIMIT: usize = 10;

    pub fn matches(&self, proposal: &Proposal) -> bool {
        if let Some(stage) = self.stage {
            if proposal.stage != stage {
                return false;
            }
        }
        if let Some(t) = self.proposal_type {
            if proposal.proposal_type != t {
                return false;
            }
        }
        if let Some(proposer) = &self.proposer {
            // Alias-aware: `ceo_mimi` matches a proposal filed by `CEO`.
            let wanted = AgentRole::from_identifier(proposer).map(|r| r.agent_id());
            let same = match (&wanted, &proposal.proposer_agent_id) {
                (Some(a), Some(b)) => a == b,
                _ => proposal.proposer.eq_ignore_ascii_case(proposer),
            };
            if !same {
                return false;
            }
        }
        true
    }

    pub fn page(&self) -> usize {
        self.page.filter(|p| *p > 0).unwrap_or(Self::DEFAULT_PAGE)
    }

    pub fn limit(&self) -> usize {
        self.limit.filter(|l| *l > 0).unwrap_or(Self::DEFAULT_LIMIT)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalPage {
    pub proposals: Vec<Proposal>,
    pub total: usize,
    pub page: usize,
    pub limit: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    pub(crate) fn sample() -> NewProposal {
        NewProposal {
            title: "Upgrade build cache".into(),
            description: "Move the shared build cache to the new cluster".into(),
            proposal_type: ProposalType::Technical,
            proposer: "cto_zara".into(),
            execution_details: ExecutionDetails::default(),
            budget_request: None,
            timeline: ProposalTimeline::default(),
            stakeholders: vec!["CEO".into(), "CFO".into()],
        }
    }

    #[test]
    fn test_full_forward_walk_is_logged_in_order() {
        let mut p = Proposal::new(sample());
        for to in [
            ProposalStage::Submitted,
            ProposalStage::Voting,
            ProposalStage::Approved,
            ProposalStage::Executed,
        ] {
            p.transition(to, "test").unwrap();
        }
        let walk: Vec<_> = p.stage_transitions.iter().map(|t| (t.from, t.to)).collect();
        assert_eq!(
            walk,
            vec![
                (ProposalStage::Created, ProposalStage::Submitted),
                (ProposalStage::Submitted, ProposalStage::Voting),
                (ProposalStage::Voting, ProposalStage::Approved),
                (ProposalStage::Approved, ProposalStage::Executed),
            ]
        );
    }

    #[test]
    fn test_illegal_transitions_do_not_mutate() {
        let mut p = Proposal::new(sample());
        let err = p.transition(ProposalStage::Voting, "test").unwrap_err();
        assert!(matches!(err, GovernanceError::InvalidTransition { .. }));
        assert_eq!(p.stage, ProposalStage::Created);
        assert!(p.stage_transitions.is_empty());

        p.transition(ProposalStage::Submitted, "test").unwrap();
        p.transition(ProposalStage::Voting, "test").unwrap();
        p.transition(ProposalStage::Rejected, "test").unwrap();
        for to in [ProposalStage::Approved, ProposalStage::Executed, ProposalStage::Voting] {
            assert!(p.transition(to, "test").is_err());
        }
        assert_eq!(p.stage_transitions.len(), 3);
    }

    #[test]
    fn test_submission_violations_are_all_reported() {
        let mut input = sample();
        input.title = " ".into();
        input.description = String::new();
        input.proposer = "intern".into();
        input.stakeholders.clear();
        input.budget_request = Some(BudgetRequest {
            total_amount: 0.0,
            currency: "".into(),
            justification: String::new(),
        });
        let p = Proposal::new(input);
        let violations = p.submission_violations(&[ProposalType::Financial]);
        assert_eq!(violations.len(), 7, "{violations:?}");
    }

    #[test]
    fn test_stage_successors() {
        assert_eq!(ProposalStage::Voting.successor(), Some(ProposalStage::Approved));
        assert_eq!(ProposalStage::Rejected.successor(), None);
        assert_eq!(ProposalStage::Executed.successor(), None);
        assert_eq!(ProposalStage::Approved.progress(), 0.75);
    }

    #[test]
    fn test_query_matches_proposer_aliases() {
        let p = Proposal::new(sample());
        let q = ProposalQuery {
            proposer: Some("Zara-CTO".into()),
            ..Default::default()
        };
        assert!(q.matches(&p));
        assert_eq!(q.page(), 1);
        assert_eq!(q.limit(), 10);
    }

    #[test]
    fn test_type_parsing() {
        assert_eq!("Financial".parse::<ProposalType>().unwrap(), ProposalType::Financial);
        assert!("marketing".parse::<ProposalType>().is_err());
    }
}
