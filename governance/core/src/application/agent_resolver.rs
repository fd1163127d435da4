// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Agent Resolver
//!
//! Maps arbitrary agent references (canonical role names, legacy aliases, canonical
//! agent ids) onto [`ResolvedAgent`]s and their voting weights.
//!
//! Resolution never fails loudly: single lookups return `None`, batch lookups drop
//! what does not resolve. Callers that need strictness compare counts.

use std::collections::HashSet;

use crate::domain::agent::{AgentRole, AgentVotingWeight, ResolvedAgent};
use crate::domain::proposal::{ExecutionDetails, ProposalType};
use crate::domain::workflow::ExecutionAssignment;

/// Role returned for proposal types that have no recommendation table entry.
pub const DEFAULT_RECOMMENDED_ROLE: AgentRole = AgentRole::Ceo;

#[derive(Debug, Clone)]
pub struct AgentResolver {
    weights: Vec<AgentVotingWeight>,
}

impl Default for AgentResolver {
    fn default() -> Self {
        Self::new()
    }
}

impl AgentResolver {
    /// Resolver backed by the standard weight table.
    pub fn new() -> Self {
        Self {
            weights: AgentRole::ALL.iter().map(|r| r.standard_weight()).collect(),
        }
    }

    /// Resolver with reconfigured weights. Roles missing from `weights` keep their
    /// standard record, so every role still has exactly one.
    pub fn with_weights(weights: Vec<AgentVotingWeight>) -> Self {
        let weights = AgentRole::ALL
            .iter()
            .map(|role| {
                weights
                    .iter()
                    .find(|w| w.role == *role)
                    .map(|w| AgentVotingWeight {
                        agent_id: role.agent_id(),
                        ..w.clone()
                    })
                    .unwrap_or_else(|| role.standard_weight())
            })
            .collect();
        Self { weights }
    }

    pub fn resolve(&self, identifier: &str) -> Option<ResolvedAgent> {
        AgentRole::from_identifier(identifier).map(ResolvedAgent::for_role)
    }

    pub fn resolve_many<S: AsRef<str>>(&self, identifiers: &[S]) -> Vec<ResolvedAgent> {
        identifiers
            .iter()
            .filter_map(|id| self.resolve(id.as_ref()))
            .collect()
    }

    pub fn voting_weight(&self, identifier: &str) -> Option<AgentVotingWeight> {
        let role = AgentRole::from_identifier(identifier)?;
        self.weight_for_role(role).cloned()
    }

    pub fn weight_for_role(&self, role: AgentRole) -> Option<&AgentVotingWeight> {
        self.weights.iter().find(|w| w.role == role)
    }

    /// The eligible electorate: one record per canonical role.
    pub fn all_voting_weights(&self) -> &[AgentVotingWeight] {
        &self.weights
    }

    /// Recommended participants for a proposal type, most relevant first.
    /// Unknown types get [`DEFAULT_RECOMMENDED_ROLE`] alone.
    pub fn recommended_agents(&self, proposal_type: &str) -> Vec<ResolvedAgent> {
        let roles: &[AgentRole] = match proposal_type.parse::<ProposalType>() {
            Ok(t) => t.recommended_roles(),
            Err(_) => &[DEFAULT_RECOMMENDED_ROLE],
        };
        roles.iter().copied().map(ResolvedAgent::for_role).collect()
    }

    /// Exact match, or a case-insensitive substring of one of the agent's capabilities.
    pub fn has_capability(&self, identifier: &str, capability: &str) -> bool {
        let Some(role) = AgentRole::from_identifier(identifier) else {
            return false;
        };
        role_has_capability(role, capability)
    }

    pub fn agents_with_capability(&self, capability: &str) -> Vec<ResolvedAgent> {
        AgentRole::ALL
            .iter()
            .copied()
            .filter(|role| role_has_capability(*role, capability))
            .map(ResolvedAgent::for_role)
            .collect()
    }

    /// Every agent responsible for any phase, deduplicated in first-seen order.
    pub fn resolve_execution_agents(&self, details: &ExecutionDetails) -> Vec<ResolvedAgent> {
        let mut seen = HashSet::new();
        details
            .phases
            .iter()
            .flat_map(|phase| phase.responsible_agents.iter())
            .filter_map(|reference| self.resolve(reference))
            .filter(|agent| seen.insert(agent.role))
            .collect()
    }

    /// Per-phase assignments, keeping references that did not resolve.
    pub fn execution_assignments(&self, details: &ExecutionDetails) -> Vec<ExecutionAssignment> {
        details
            .phases
            .iter()
            .enumerate()
            .map(|(idx, phase)| {
                let mut responsible: Vec<ResolvedAgent> = Vec::new();
                let mut unresolved = Vec::new();
                for reference in &phase.responsible_agents {
                    match self.resolve(reference) {
                        Some(agent) if responsible.iter().any(|a| a.role == agent.role) => {}
                        Some(agent) => responsible.push(agent),
                        None => unresolved.push(reference.clone()),
                    }
                }
                ExecutionAssignment {
                    phase_id: if phase.id.is_empty() {
                        format!("phase-{}", idx + 1)
                    } else {
                        phase.id.clone()
                    },
                    phase_name: phase.name.clone(),
                    responsible_agents: responsible,
                    unresolved,
                }
            })
            .collect()
    }
}

fn role_has_capability(role: AgentRole, capability: &str) -> bool {
    let wanted = capability.trim().to_ascii_lowercase();
    if wanted.is_empty() {
        return false;
    }
    role.capabilities()
        .iter()
        .any(|c| *c == wanted || c.contains(wanted.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::proposal::ExecutionPhase;

    #[test]
    fn test_legacy_aliases_resolve_to_same_agent() {
        let resolver = AgentResolver::new();
        let a = resolver.resolve("ceo_mimi").unwrap();
        let b = resolver.resolve("CEO-Mimi").unwrap();
        let c = resolver.resolve("mimi_ceo").unwrap();
        assert_eq!(a, b);
        assert_eq!(b, c);
        assert_eq!(a.role, AgentRole::Ceo);
        assert_eq!(a.agent_id.as_str(), "ceo-mimi-character");
        assert_eq!(a.display_name, "Mimi - Chief Executive Officer");
    }

    #[test]
    fn test_resolve_many_drops_unknown() {
        let resolver = AgentResolver::new();
        let agents = resolver.resolve_many(&["CFO", "ghost", "clo_alex", ""]);
        let roles: Vec<_> = agents.iter().map(|a| a.role).collect();
        assert_eq!(roles, vec![AgentRole::Cfo, AgentRole::Clo]);
    }

    #[test]
    fn test_voting_weight_lookup() {
        let resolver = AgentResolver::new();
        let w = resolver.voting_weight("maya-cfo").unwrap();
        assert_eq!(w.staking_weight, 0.35);
        assert_eq!(w.reputation_score, 950);
        assert!(resolver.voting_weight("nobody").is_none());
        assert_eq!(resolver.all_voting_weights().len(), 4);
    }

    #[test]
    fn test_recommended_agents() {
        let resolver = AgentResolver::new();
        let roles = |t: &str| -> Vec<AgentRole> {
            resolver.recommended_agents(t).iter().map(|a| a.role).collect()
        };
        assert_eq!(roles("financial"), vec![AgentRole::Cfo, AgentRole::Ceo]);
        assert_eq!(roles("emergency").len(), 4);
        assert_eq!(roles("marketing"), vec![AgentRole::Ceo]);
    }

    #[test]
    fn test_capabilities() {
        let resolver = AgentResolver::new();
        assert!(resolver.has_capability("CLO", "compliance_validation"));
        assert!(resolver.has_capability("cfo_maya", "Budget"));
        assert!(!resolver.has_capability("CLO", "build_management"));
        assert!(!resolver.has_capability("nobody", "workspace_analysis"));
        assert_eq!(resolver.agents_with_capability("workspace_analysis").len(), 4);
        let infra: Vec<_> = resolver
            .agents_with_capability("infrastructure_analysis")
            .into_iter()
            .map(|a| a.role)
            .collect();
        assert_eq!(infra, vec![AgentRole::Cto]);
    }

    #[test]
    fn test_execution_agents_and_assignments() {
        let resolver = AgentResolver::new();
        let details = ExecutionDetails {
            phases: vec![
                ExecutionPhase {
                    name: "Design".into(),
                    responsible_agents: vec!["CTO".into(), "zara_cto".into(), "vendor".into()],
                    ..Default::default()
                },
                ExecutionPhase {
                    id: "rollout".into(),
                    name: "Rollout".into(),
                    responsible_agents: vec!["CFO".into(), "cto".into()],
                    ..Default::default()
                },
            ],
            success_criteria: vec![],
        };
        let roles: Vec<_> = resolver
            .resolve_execution_agents(&details)
            .into_iter()
            .map(|a| a.role)
            .collect();
        assert_eq!(roles, vec![AgentRole::Cto, AgentRole::Cfo]);

        let assignments = resolver.execution_assignments(&details);
        assert_eq!(assignments[0].phase_id, "phase-1");
        assert_eq!(assignments[0].responsible_agents.len(), 1);
        assert_eq!(assignments[0].unresolved, vec!["vendor".to_string()]);
        assert_eq!(assignments[1].phase_id, "rollout");
        assert_eq!(assignments[1].responsible_agents.len(), 2);
    }

    #[test]
    fn test_reconfigured_weights_keep_one_record_per_role() {
        let mut cfo = AgentRole::Cfo.standard_weight();
        cfo.staking_weight = 0.6;
        let resolver = AgentResolver::with_weights(vec![cfo]);
        assert_eq!(resolver.all_voting_weights().len(), 4);
        assert_eq!(resolver.voting_weight("CFO").unwrap().staking_weight, 0.6);
        assert_eq!(resolver.voting_weight("CEO").unwrap().staking_weight, 0.4);
    }
}
