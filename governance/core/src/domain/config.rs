// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

// Governance Configuration Types
//
// Kubernetes-style manifest (apiVersion/kind/metadata/spec) describing:
// - REST server binding
// - Voting policy (quorum fraction, voting period, per-type overrides)
// - Supported proposal types
// - Agent weight reconfiguration
// - Collaborator webhooks
// - Observability settings

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use crate::domain::agent::{AgentRole, AgentVotingWeight};
use crate::domain::proposal::ProposalType;

pub const API_VERSION: &str = "dao.governance/v1";
pub const KIND: &str = "GovernanceConfig";

const HOUR: u64 = 60 * 60;
const DAY: u64 = 24 * HOUR;

/// Longest voting period a policy may configure.
pub const MAX_VOTING_PERIOD: Duration = Duration::from_secs(365 * DAY);

/// Top-level governance configuration manifest
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceConfig {
    /// API version (must be "dao.governance/v1")
    #[serde(rename = "apiVersion")]
    pub api_version: String,

    /// Resource kind (must be "GovernanceConfig")
    pub kind: String,

    pub metadata: ConfigMetadata,

    #[serde(default)]
    pub spec: GovernanceSpec,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigMetadata {
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub labels: Option<HashMap<String, String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GovernanceSpec {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub voting: VotingConfig,

    #[serde(default)]
    pub proposals: ProposalsConfig,

    #[serde(default)]
    pub agents: AgentsConfig,

    #[serde(default)]
    pub collaborators: CollaboratorsConfig,

    #[serde(default)]
    pub observability: ObservabilityConfig,

    /// Broadcast buffer size for governance events
    #[serde(default = "default_event_bus_capacity")]
    pub event_bus_capacity: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingConfig {
    /// Fraction of eligible weight that must participate, inclusive
    #[serde(default = "default_quorum_fraction")]
    pub quorum_fraction: f64,

    #[serde(default = "default_voting_period", with = "humantime_serde")]
    pub voting_period: Duration,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub type_overrides: BTreeMap<ProposalType, VotingOverride>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VotingOverride {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quorum_fraction: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none", with = "humantime_serde")]
    pub voting_period: Option<Duration>,
}

/// Effective policy for one proposal type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct VotingPolicy {
    pub quorum_fraction: f64,
    pub voting_period: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProposalsConfig {
    #[serde(default = "default_supported_types")]
    pub supported_types: Vec<ProposalType>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AgentsConfig {
    /// Per-role weight reconfiguration; unspecified fields keep the standard value
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub weights: Vec<WeightOverride>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeightOverride {
    pub role: AgentRole,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voting_power: Option<u32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub staking_weight: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reputation_score: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CollaboratorsConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notification_webhook: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discussion_webhook: Option<String>,

    #[serde(default = "default_collaborator_timeout", with = "humantime_serde")]
    pub timeout: Duration,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Prometheus exporter port; disabled when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metrics_port: Option<u16>,
}

/// Named presets for `config generate`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigProfile {
    Development,
    Production,
    HighSecurity,
}

impl FromStr for ConfigProfile {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "development" | "dev" => Ok(ConfigProfile::Development),
            "production" | "prod" => Ok(ConfigProfile::Production),
            "high-security" | "high_security" => Ok(ConfigProfile::HighSecurity),
            other => anyhow::bail!(
                "Unknown profile '{}'. Expected development, production or high-security",
                other
            ),
        }
    }
}

fn default_event_bus_capacity() -> usize {
    1000
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_quorum_fraction() -> f64 {
    0.5
}

fn default_voting_period() -> Duration {
    Duration::from_secs(7 * DAY)
}

fn default_supported_types() -> Vec<ProposalType> {
    ProposalType::ALL.to_vec()
}

fn default_collaborator_timeout() -> Duration {
    Duration::from_secs(5)
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for GovernanceSpec {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            voting: VotingConfig::default(),
            proposals: ProposalsConfig::default(),
            agents: AgentsConfig::default(),
            collaborators: CollaboratorsConfig::default(),
            observability: ObservabilityConfig::default(),
            event_bus_capacity: default_event_bus_capacity(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

impl Default for VotingConfig {
    fn default() -> Self {
        let periods = [
            (ProposalType::Strategic, 14 * DAY),
            (ProposalType::Financial, 10 * DAY),
            (ProposalType::Governance, 21 * DAY),
            (ProposalType::Emergency, DAY),
            (ProposalType::Technical, 5 * DAY),
            (ProposalType::Operational, 4 * DAY),
        ];
        Self {
            quorum_fraction: default_quorum_fraction(),
            voting_period: default_voting_period(),
            type_overrides: periods
                .into_iter()
                .map(|(t, secs)| {
                    (
                        t,
                        VotingOverride {
                            quorum_fraction: None,
                            voting_period: Some(Duration::from_secs(secs)),
                        },
                    )
                })
                .collect(),
        }
    }
}

impl VotingConfig {
    pub fn policy_for(&self, proposal_type: ProposalType) -> VotingPolicy {
        let over = self.type_overrides.get(&proposal_type);
        VotingPolicy {
            quorum_fraction: over
                .and_then(|o| o.quorum_fraction)
                .unwrap_or(self.quorum_fraction),
            voting_period: over
                .and_then(|o| o.voting_period)
                .unwrap_or(self.voting_period),
        }
    }
}

impl Default for ProposalsConfig {
    fn default() -> Self {
        Self {
            supported_types: default_supported_types(),
        }
    }
}

impl AgentsConfig {
    /// Standard weights with any configured overrides applied.
    pub fn effective_weights(&self) -> Vec<AgentVotingWeight> {
        AgentRole::ALL
            .iter()
            .map(|role| {
                let mut weight = role.standard_weight();
                if let Some(o) = self.weights.iter().rev().find(|o| o.role == *role) {
                    if let Some(v) = o.voting_power {
                        weight.voting_power = v;
                    }
                    if let Some(s) = o.staking_weight {
                        weight.staking_weight = s;
                    }
                    if let Some(r) = o.reputation_score {
                        weight.reputation_score = r;
                    }
                }
                weight
            })
            .collect()
    }
}

impl Default for CollaboratorsConfig {
    fn default() -> Self {
        Self {
            notification_webhook: None,
            discussion_webhook: None,
            timeout: default_collaborator_timeout(),
        }
    }
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            metrics_port: None,
        }
    }
}

impl Default for GovernanceConfig {
    fn default() -> Self {
        Self::for_profile(ConfigProfile::Production)
    }
}

impl GovernanceConfig {
    pub fn for_profile(profile: ConfigProfile) -> Self {
        let (name, spec) = match profile {
            ConfigProfile::Production => ("dao-governance", GovernanceSpec::default()),
            ConfigProfile::Development => {
                let mut spec = GovernanceSpec::default();
                spec.voting = VotingConfig {
                    quorum_fraction: 0.25,
                    voting_period: Duration::from_secs(HOUR),
                    type_overrides: BTreeMap::new(),
                };
                spec.observability.log_level = "debug".to_string();
                ("dao-governance-dev", spec)
            }
            ConfigProfile::HighSecurity => {
                let mut spec = GovernanceSpec::default();
                let strict = |quorum: f64, secs: u64| VotingOverride {
                    quorum_fraction: Some(quorum),
                    voting_period: Some(Duration::from_secs(secs)),
                };
                spec.voting = VotingConfig {
                    quorum_fraction: 0.75,
                    voting_period: Duration::from_secs(14 * DAY),
                    type_overrides: BTreeMap::from([
                        (ProposalType::Governance, strict(0.9, 21 * DAY)),
                        (ProposalType::Constitutional, strict(0.9, 28 * DAY)),
                        (ProposalType::Emergency, strict(0.75, 2 * DAY)),
                    ]),
                };
                ("dao-governance-high-security", spec)
            }
        };

        Self {
            api_version: API_VERSION.to_string(),
            kind: KIND.to_string(),
            metadata: ConfigMetadata {
                name: name.to_string(),
                version: Some("1.0.0".to_string()),
                labels: None,
            },
            spec,
        }
    }

    /// Load configuration from YAML file
    pub fn from_yaml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    pub fn to_yaml_file(&self, path: impl AsRef<Path>) -> anyhow::Result<()> {
        std::fs::write(path, self.to_yaml()?)?;
        Ok(())
    }

    pub fn to_yaml(&self) -> anyhow::Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        let config = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Discover configuration file using precedence order
    /// 1. GOVERNANCE_CONFIG_PATH environment variable
    /// 2. ./governance-config.yaml (working directory)
    /// 3. ~/.dao-governance/config.yaml (user home)
    /// 4. /etc/dao-governance/config.yaml (system)
    pub fn discover_config() -> Option<PathBuf> {
        if let Ok(path) = std::env::var("GOVERNANCE_CONFIG_PATH") {
            let path = PathBuf::from(path);
            if path.exists() {
                return Some(path);
            }
        }

        let cwd = PathBuf::from("./governance-config.yaml");
        if cwd.exists() {
            return Some(cwd);
        }

        if let Some(home) = dirs::home_dir() {
            let user_config = home.join(".dao-governance").join("config.yaml");
            if user_config.exists() {
                return Some(user_config);
            }
        }

        let system_config = PathBuf::from("/etc/dao-governance/config.yaml");
        if system_config.exists() {
            return Some(system_config);
        }

        None
    }

    /// Load configuration with discovery, fallback to default
    pub fn load_or_default(cli_path: Option<PathBuf>) -> anyhow::Result<Self> {
        // Explicit path must exist and parse
        if let Some(path) = cli_path {
            tracing::info!("Loading configuration from explicit path: {:?}", path);
            let mut config = Self::from_yaml_file(&path)
                .map_err(|e| anyhow::anyhow!("Failed to load config at {:?}: {}", path, e))?;
            config.apply_env_overrides();
            return Ok(config);
        }

        if let Some(config_path) = Self::discover_config() {
            tracing::info!("Loading configuration from discovered path: {:?}", config_path);
            let mut config = Self::from_yaml_file(config_path)?;
            config.apply_env_overrides();
            Ok(config)
        } else {
            tracing::warn!("No configuration file found in standard locations. Using defaults.");
            let mut config = Self::default();
            config.apply_env_overrides();
            Ok(config)
        }
    }

    /// Apply environment variable overrides to configuration
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(val) = lookup("GOVERNANCE_PORT") {
            match val.parse::<u16>() {
                Ok(port) => {
                    tracing::info!("Environment override: GOVERNANCE_PORT={}", port);
                    self.spec.server.port = port;
                }
                Err(_) => tracing::warn!(
                    "Invalid value for GOVERNANCE_PORT: '{}'. Expected a port number. Ignoring.",
                    val
                ),
            }
        }

        if let Some(val) = lookup("GOVERNANCE_QUORUM_FRACTION") {
            match val.parse::<f64>() {
                Ok(q) => {
                    tracing::info!("Environment override: GOVERNANCE_QUORUM_FRACTION={}", q);
                    self.spec.voting.quorum_fraction = q;
                }
                Err(_) => tracing::warn!(
                    "Invalid value for GOVERNANCE_QUORUM_FRACTION: '{}'. Expected a number. Ignoring.",
                    val
                ),
            }
        }

        if let Some(val) = lookup("GOVERNANCE_NOTIFICATION_WEBHOOK") {
            tracing::info!("Environment override: GOVERNANCE_NOTIFICATION_WEBHOOK");
            self.spec.collaborators.notification_webhook = Some(val);
        }

        if let Some(val) = lookup("GOVERNANCE_DISCUSSION_WEBHOOK") {
            tracing::info!("Environment override: GOVERNANCE_DISCUSSION_WEBHOOK");
            self.spec.collaborators.discussion_webhook = Some(val);
        }
    }

    /// Validate configuration, reporting every problem found
    pub fn validate(&self) -> anyhow::Result<()> {
        let errors = self.validation_errors();
        if errors.is_empty() {
            Ok(())
        } else {
            anyhow::bail!("Invalid configuration:\n  - {}", errors.join("\n  - "))
        }
    }

    pub fn validation_errors(&self) -> Vec<String> {
        let mut errors = Vec::new();

        if self.api_version != API_VERSION {
            errors.push(format!(
                "Invalid apiVersion: '{}'. Must be '{}'",
                self.api_version, API_VERSION
            ));
        }
        if self.kind != KIND {
            errors.push(format!("Invalid kind: '{}'. Must be '{}'", self.kind, KIND));
        }
        if self.metadata.name.trim().is_empty() {
            errors.push("metadata.name cannot be empty".to_string());
        }

        let voting = &self.spec.voting;
        check_quorum(&mut errors, "spec.voting.quorum_fraction", voting.quorum_fraction);
        check_period(&mut errors, "spec.voting.voting_period", voting.voting_period);
        for (t, o) in &voting.type_overrides {
            if let Some(q) = o.quorum_fraction {
                check_quorum(
                    &mut errors,
                    &format!("spec.voting.type_overrides.{t}.quorum_fraction"),
                    q,
                );
            }
            if let Some(p) = o.voting_period {
                check_period(
                    &mut errors,
                    &format!("spec.voting.type_overrides.{t}.voting_period"),
                    p,
                );
            }
        }

        if self.spec.proposals.supported_types.is_empty() {
            errors.push("spec.proposals.supported_types must list at least one type".to_string());
        }

        for o in &self.spec.agents.weights {
            if let Some(s) = o.staking_weight {
                if !(0.0..=1.0).contains(&s) {
                    errors.push(format!(
                        "spec.agents.weights[{}].staking_weight must be within [0, 1], got {}",
                        o.role, s
                    ));
                }
            }
            if o.voting_power == Some(0) {
                errors.push(format!(
                    "spec.agents.weights[{}].voting_power must be positive",
                    o.role
                ));
            }
        }

        let collaborators = &self.spec.collaborators;
        for (field, value) in [
            ("notification_webhook", &collaborators.notification_webhook),
            ("discussion_webhook", &collaborators.discussion_webhook),
        ] {
            if let Some(raw) = value {
                if let Err(e) = url::Url::parse(raw) {
                    errors.push(format!(
                        "spec.collaborators.{field} is not a valid URL ('{raw}'): {e}"
                    ));
                }
            }
        }
        if collaborators.timeout.is_zero() {
            errors.push("spec.collaborators.timeout must be positive".to_string());
        }

        if self.spec.event_bus_capacity == 0 {
            errors.push("spec.event_bus_capacity must be positive".to_string());
        }

        errors
    }
}

fn check_quorum(errors: &mut Vec<String>, field: &str, value: f64) {
    if !(value > 0.0 && value <= 1.0) {
        errors.push(format!("{field} must be within (0, 1], got {value}"));
    }
}

fn check_period(errors: &mut Vec<String>, field: &str, value: Duration) {
    if value.is_zero() {
        errors.push(format!("{field} must be positive"));
    } else if value > MAX_VOTING_PERIOD {
        errors.push(format!(
            "{field} must not exceed {}, got {}",
            humantime_serde::re::humantime::format_duration(MAX_VOTING_PERIOD),
            humantime_serde::re::humantime::format_duration(value)
        ));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_manifest() {
        let config = GovernanceConfig::default();
        assert_eq!(config.api_version, API_VERSION);
        assert_eq!(config.kind, KIND);
        assert_eq!(config.spec.voting.quorum_fraction, 0.5);
        assert_eq!(config.spec.voting.voting_period, Duration::from_secs(7 * DAY));
        assert_eq!(config.spec.proposals.supported_types.len(), 7);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_policy_for_type_uses_overrides() {
        let config = GovernanceConfig::for_profile(ConfigProfile::HighSecurity);
        let gov = config.spec.voting.policy_for(ProposalType::Governance);
        assert_eq!(gov.quorum_fraction, 0.9);
        let tech = config.spec.voting.policy_for(ProposalType::Technical);
        assert_eq!(tech.quorum_fraction, 0.75);
        assert_eq!(tech.voting_period, Duration::from_secs(14 * DAY));

        let dev = GovernanceConfig::for_profile(ConfigProfile::Development);
        let p = dev.spec.voting.policy_for(ProposalType::Emergency);
        assert_eq!(p.voting_period, Duration::from_secs(HOUR));
        assert_eq!(p.quorum_fraction, 0.25);
    }

    #[test]
    fn test_yaml_roundtrip_with_humantime_periods() {
        let yaml = r#"
apiVersion: dao.governance/v1
kind: GovernanceConfig
metadata:
  name: test
spec:
  voting:
    quorum_fraction: 0.6
    voting_period: 3days
    type_overrides:
      emergency:
        voting_period: 6h
  agents:
    weights:
      - role: CFO
        staking_weight: 0.5
"#;
        let config = GovernanceConfig::from_yaml_str(yaml).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.spec.voting.voting_period, Duration::from_secs(3 * DAY));
        assert_eq!(
            config.spec.voting.policy_for(ProposalType::Emergency).voting_period,
            Duration::from_secs(6 * HOUR)
        );
        assert_eq!(config.spec.server.port, 8080);

        let weights = config.spec.agents.effective_weights();
        let cfo = weights.iter().find(|w| w.role == AgentRole::Cfo).unwrap();
        assert_eq!(cfo.staking_weight, 0.5);
        assert_eq!(cfo.voting_power, 900);

        let reparsed = GovernanceConfig::from_yaml_str(&config.to_yaml().unwrap()).unwrap();
        assert_eq!(reparsed.spec.voting.voting_period, config.spec.voting.voting_period);
    }

    #[test]
    fn test_validation_reports_every_problem() {
        let mut config = GovernanceConfig::default();
        config.kind = "Other".into();
        config.spec.voting.quorum_fraction = 0.0;
        config.spec.proposals.supported_types.clear();
        config.spec.collaborators.notification_webhook = Some("not a url".into());
        config.spec.agents.weights.push(WeightOverride {
            role: AgentRole::Ceo,
            voting_power: Some(0),
            staking_weight: Some(1.5),
            reputation_score: None,
        });
        let errors = config.validation_errors();
        assert_eq!(errors.len(), 6, "{errors:#?}");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_voting_period_upper_bound() {
        let mut config = GovernanceConfig::default();
        config.spec.voting.voting_period = Duration::from_secs(300_000 * 365 * DAY);
        config.spec.voting.type_overrides.insert(
            ProposalType::Emergency,
            VotingOverride {
                voting_period: Some(MAX_VOTING_PERIOD + Duration::from_secs(1)),
                ..Default::default()
            },
        );
        let errors = config.validation_errors();
        assert_eq!(errors.len(), 2, "{errors:#?}");
        assert!(errors[0].starts_with("spec.voting.voting_period must not exceed"));
        assert!(errors[1].contains("type_overrides.emergency.voting_period"));

        config.spec.voting.voting_period = MAX_VOTING_PERIOD;
        config.spec.voting.type_overrides.clear();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_overrides() {
        let mut config = GovernanceConfig::default();
        let env: HashMap<&str, &str> = HashMap::from([
            ("GOVERNANCE_PORT", "9191"),
            ("GOVERNANCE_QUORUM_FRACTION", "nope"),
            ("GOVERNANCE_NOTIFICATION_WEBHOOK", "http://hooks.local/notify"),
        ]);
        config.apply_overrides_from(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.spec.server.port, 9191);
        assert_eq!(config.spec.voting.quorum_fraction, 0.5);
        assert_eq!(
            config.spec.collaborators.notification_webhook.as_deref(),
            Some("http://hooks.local/notify")
        );
    }

    #[test]
    fn test_load_from_explicit_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("governance-config.yaml");
        GovernanceConfig::for_profile(ConfigProfile::Development)
            .to_yaml_file(&path)
            .unwrap();

        let loaded = GovernanceConfig::load_or_default(Some(path)).unwrap();
        assert_eq!(loaded.spec.observability.log_level, "debug");
        assert_eq!(loaded.spec.voting.voting_period, Duration::from_secs(HOUR));

        let missing = dir.path().join("absent.yaml");
        assert!(GovernanceConfig::load_or_default(Some(missing)).is_err());
    }

    #[test]
    fn test_profile_parsing() {
        assert_eq!(
            "high-security".parse::<ConfigProfile>().unwrap(),
            ConfigProfile::HighSecurity
        );
        assert!("staging".parse::<ConfigProfile>().is_err());
    }
}
