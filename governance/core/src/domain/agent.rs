// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Governance Agents
//!
//! The closed set of governance participants ([`AgentRole`]), the alias table that
//! maps legacy identifiers onto them, and the standard voting-weight records.
//!
//! Resolution is deliberately table-driven: an identifier either normalizes to a
//! canonical role name, matches an entry of [`LEGACY_ALIASES`], or does not resolve
//! at all. There is no fuzzy matching.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical governance role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum AgentRole {
    #[serde(rename = "CEO")]
    Ceo,
    #[serde(rename = "CTO")]
    Cto,
    #[serde(rename = "CFO")]
    Cfo,
    #[serde(rename = "CLO")]
    Clo,
}

/// Legacy spellings accepted for each role, stored in normalized form
/// (lower-case, `-` folded to `_`).
pub const LEGACY_ALIASES: &[(&str, AgentRole)] = &[
    ("ceo_mimi", AgentRole::Ceo),
    ("mimi_ceo", AgentRole::Ceo),
    ("chief_executive_officer", AgentRole::Ceo),
    ("ceo_mimi_character", AgentRole::Ceo),
    ("cto_alex", AgentRole::Cto),
    ("alex_cto", AgentRole::Cto),
    ("cto_zara", AgentRole::Cto),
    ("zara_cto", AgentRole::Cto),
    ("chief_technology_officer", AgentRole::Cto),
    ("cto_zara_character", AgentRole::Cto),
    ("cfo_maya", AgentRole::Cfo),
    ("maya_cfo", AgentRole::Cfo),
    ("chief_financial_officer", AgentRole::Cfo),
    ("cfo_maya_character", AgentRole::Cfo),
    ("clo_alex", AgentRole::Clo),
    ("alex_clo", AgentRole::Clo),
    ("chief_legal_officer", AgentRole::Clo),
    ("clo_alex_character", AgentRole::Clo),
];

impl AgentRole {
    pub const ALL: [AgentRole; 4] = [AgentRole::Ceo, AgentRole::Cto, AgentRole::Cfo, AgentRole::Clo];

    pub fn as_str(&self) -> &'static str {
        match self {
            AgentRole::Ceo => "CEO",
            AgentRole::Cto => "CTO",
            AgentRole::Cfo => "CFO",
            AgentRole::Clo => "CLO",
        }
    }

    /// Fixed per-role codename used to derive the canonical agent id.
    pub fn codename(&self) -> &'static str {
        match self {
            AgentRole::Ceo => "mimi",
            AgentRole::Cto => "zara",
            AgentRole::Cfo => "maya",
            AgentRole::Clo => "alex",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            AgentRole::Ceo => "Mimi - Chief Executive Officer",
            AgentRole::Cto => "Zara - Chief Technology Officer",
            AgentRole::Cfo => "Maya - Chief Financial Officer",
            AgentRole::Clo => "Alex - Chief Legal Officer",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            AgentRole::Ceo => "Orchestrates strategic decisions, optimizes business outcomes, and ensures alignment across all agent operations.",
            AgentRole::Cto => "Architects and optimizes the technical infrastructure that powers the agent ecosystem.",
            AgentRole::Cfo => "Manages financial strategy, budget optimization, and ROI analysis.",
            AgentRole::Clo => "Ensures compliance, governance, and legal integrity across all agent operations.",
        }
    }

    pub fn capabilities(&self) -> &'static [&'static str] {
        match self {
            AgentRole::Ceo => &[
                "workspace_analysis",
                "affected_analysis",
                "build_management",
                "test_automation",
                "scaffold_generation",
                "workspace_optimization",
                "business_data_collection",
                "alert_generation",
                "trend_analysis",
                "department_analysis",
            ],
            AgentRole::Cto => &[
                "workspace_analysis",
                "affected_analysis",
                "build_management",
                "test_automation",
                "scaffold_generation",
                "workspace_optimization",
                "technical_metrics",
                "performance_monitoring",
                "infrastructure_analysis",
            ],
            AgentRole::Cfo => &[
                "workspace_analysis",
                "affected_analysis",
                "project_build_costs",
                "resource_optimization",
                "financial_data_collection",
                "budget_alert_generation",
                "financial_trend_analysis",
                "department_cost_analysis",
            ],
            AgentRole::Clo => &[
                "workspace_analysis",
                "compliance_validation",
                "governance_monitoring",
                "compliance_data_collection",
                "legal_alert_generation",
                "regulatory_trend_analysis",
                "department_compliance_analysis",
            ],
        }
    }

    /// Canonical agent id, e.g. `ceo-mimi-character`. Same role, same id.
    pub fn agent_id(&self) -> AgentId {
        AgentId(format!(
            "{}-{}-character",
            self.as_str().to_ascii_lowercase(),
            self.codename()
        ))
    }

    /// Standard weight record for this role.
    pub fn standard_weight(&self) -> AgentVotingWeight {
        let (voting_power, staking_weight, reputation_score) = match self {
            AgentRole::Ceo => (1000, 0.40, 1000),
            AgentRole::Cto => (800, 0.30, 900),
            AgentRole::Cfo => (900, 0.35, 950),
            AgentRole::Clo => (700, 0.25, 850),
        };
        AgentVotingWeight {
            agent_id: self.agent_id(),
            role: *self,
            voting_power,
            staking_weight,
            reputation_score,
        }
    }

    /// Resolve an arbitrary identifier to a role.
    ///
    /// The identifier is normalized first (trimmed, lower-cased, `-` folded to `_`);
    /// it then matches either a canonical role name or a [`LEGACY_ALIASES`] entry.
    pub fn from_identifier(identifier: &str) -> Option<AgentRole> {
        let normalized = normalize_identifier(identifier);
        if normalized.is_empty() {
            return None;
        }

        if let Some(role) = AgentRole::ALL
            .iter()
            .find(|role| role.as_str().eq_ignore_ascii_case(&normalized))
        {
            return Some(*role);
        }

        LEGACY_ALIASES
            .iter()
            .find(|(alias, _)| *alias == normalized)
            .map(|(_, role)| *role)
    }
}

impl fmt::Display for AgentRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lower-case the identifier and unify `-` / `_` separators.
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_ascii_lowercase().replace('-', "_")
}

/// Canonical identifier of a governance agent.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub String);

impl AgentId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A governance participant after alias resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedAgent {
    pub agent_id: AgentId,
    pub role: AgentRole,
    pub capabilities: Vec<String>,
    pub display_name: String,
    pub description: String,
}

impl ResolvedAgent {
    pub fn for_role(role: AgentRole) -> Self {
        Self {
            agent_id: role.agent_id(),
            role,
            capabilities: role.capabilities().iter().map(|c| c.to_string()).collect(),
            display_name: role.display_name().to_string(),
            description: role.description().to_string(),
        }
    }
}

/// Voting weight record of a canonical role.
///
/// `staking_weight` is the role's influence share in `[0, 1]`. Shares are assigned
/// independently and do not need to sum to 1.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentVotingWeight {
    pub agent_id: AgentId,
    pub role: AgentRole,
    pub voting_power: u32,
    pub staking_weight: f64,
    pub reputation_score: u32,
}

impl AgentVotingWeight {
    /// Staking weight in basis points. Tallies sum these so comparisons are exact.
    pub fn staking_weight_bps(&self) -> u64 {
        (self.staking_weight.clamp(0.0, 1.0) * 10_000.0).round() as u64
    }
}
