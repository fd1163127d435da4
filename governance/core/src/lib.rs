// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # `dao-governance-core` - Proposal & Voting Pipeline
//!
//! Owns the proposal lifecycle state machine, agent-role resolution, stake-weighted
//! vote tallying and execution-workflow tracking for the DAO governance service.
//!
//! ## Crate Layout
//!
//! | Module | Layer | Contents |
//! |--------|-------|----------|
//! | [`domain`] | Domain | `Proposal`, `Vote`, `VotingResults`, `GovernanceWorkflow`, `AgentRole` |
//! | [`application`] | Application | resolver, lifecycle manager, tally engine, execution coordinator, `GovernanceService` |
//! | [`infrastructure`] | Infrastructure | in-memory stores, event bus, per-proposal locks, webhook collaborators |
//! | [`presentation`] | Presentation | Axum REST router under `/api/governance` |

pub mod domain;
pub mod application;
pub mod infrastructure;
pub mod presentation;

pub use domain::*;
