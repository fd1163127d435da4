// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod agent_resolver;
pub mod execution_coordinator;
pub mod governance_service;
pub mod lifecycle;
pub mod notification_relay;
pub mod tally;

// Re-export services for convenience
pub use agent_resolver::AgentResolver;
pub use execution_coordinator::ExecutionCoordinator;
pub use governance_service::{GovernanceService, GovernanceStats, StandardGovernanceService};
pub use lifecycle::{Finalization, ProposalLifecycleManager};
pub use notification_relay::NotificationRelay;
pub use tally::{CastOutcome, VotingTallyEngine};
