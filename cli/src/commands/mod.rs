// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Command implementations for the daogov CLI

pub mod agent;
pub mod config;
pub mod proposal;
pub mod simulate;

pub use self::agent::AgentCommand;
pub use self::config::ConfigCommand;
pub use self::proposal::ProposalCommand;
pub use self::simulate::SimulateArgs;
