// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

/// DAO Governance Rust SDK
///
/// Typed client for the governance service's REST API.

pub mod client;
pub mod types;

pub use client::{GovernanceClient, SdkError};
pub use types::*;
