// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Outbound collaborator interfaces.
//!
//! Both are fire-and-forget from the governance core's point of view: they are invoked
//! after state has been committed, and their failures are logged, never propagated.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::proposal::ProposalId;

#[async_trait]
pub trait NotificationSender: Send + Sync {
    async fn notify(
        &self,
        proposal_id: ProposalId,
        event: &str,
        recipients: &[String],
    ) -> Result<(), CollaboratorError>;
}

#[async_trait]
pub trait DiscussionBridge: Send + Sync {
    async fn create_thread(
        &self,
        proposal_id: ProposalId,
        participants: &[String],
    ) -> Result<ThreadHandle, CollaboratorError>;
}

/// Reference to a discussion thread created for a proposal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadHandle {
    pub thread_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
}

#[derive(Debug, Error)]
pub enum CollaboratorError {
    #[error("collaborator unreachable: {0}")]
    Unreachable(String),

    #[error("collaborator rejected request with status {status}: {body}")]
    Rejected { status: u16, body: String },

    #[error("invalid collaborator response: {0}")]
    InvalidResponse(String),

    #[error("collaborator client could not be configured: {0}")]
    Setup(String),
}
