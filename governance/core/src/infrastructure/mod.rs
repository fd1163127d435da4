// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod event_bus;
pub mod notification;
pub mod proposal_locks;
pub mod repositories;

pub use event_bus::{EventBus, EventBusError, EventReceiver};
pub use notification::{
    LoggingNotificationSender, NoopDiscussionBridge, WebhookDiscussionBridge,
    WebhookNotificationSender,
};
pub use proposal_locks::ProposalLocks;
pub use repositories::{
    InMemoryProposalRepository, InMemoryVoteRepository, InMemoryWorkflowRepository,
};
