// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Notification Relay Application Service
//!
//! Subscribes to governance events and forwards them to the outbound
//! collaborators:
//! - every event goes to the [`NotificationSender`], addressed to the proposer and
//!   stakeholders
//! - `voting_started` additionally opens a discussion thread through the
//!   [`DiscussionBridge`]
//!
//! Runs after the fact, so collaborator failures are logged and counted and never
//! touch governance state.

use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::domain::collaborators::{DiscussionBridge, NotificationSender};
use crate::domain::events::GovernanceEvent;
use crate::domain::repository::ProposalRepository;
use crate::infrastructure::event_bus::{EventBus, EventBusError, EventReceiver};

pub struct NotificationRelay {
    notifier: Arc<dyn NotificationSender>,
    discussions: Arc<dyn DiscussionBridge>,
    proposals: Arc<dyn ProposalRepository>,
}

impl NotificationRelay {
    pub fn new(
        notifier: Arc<dyn NotificationSender>,
        discussions: Arc<dyn DiscussionBridge>,
        proposals: Arc<dyn ProposalRepository>,
    ) -> Self {
        Self {
            notifier,
            discussions,
            proposals,
        }
    }

    /// Subscribe now and relay in a background task until the bus closes.
    pub fn start(self: Arc<Self>, event_bus: &EventBus) -> JoinHandle<()> {
        info!("Starting governance notification relay");
        let receiver = event_bus.subscribe();
        tokio::spawn(async move { self.run(receiver).await })
    }

    async fn run(&self, mut receiver: EventReceiver) {
        let mut relayed = 0u64;
        loop {
            match receiver.recv().await {
                Ok(event) => {
                    self.relay(&event).await;
                    relayed += 1;
                }
                Err(EventBusError::Lagged(n)) => {
                    warn!("Notification relay skipped {} events", n);
                }
                Err(EventBusError::Closed) | Err(EventBusError::Empty) => {
                    info!(relayed, "Event bus closed, stopping notification relay");
                    break;
                }
            }
        }
    }

    /// Deliver one event. Never fails.
    pub async fn relay(&self, event: &GovernanceEvent) {
        let proposal_id = event.proposal_id();
        let recipients = match self.proposals.find_by_id(proposal_id).await {
            Ok(Some(proposal)) => proposal.notification_recipients(),
            Ok(None) => {
                debug!(proposal_id = %proposal_id, "Proposal vanished before notification");
                return;
            }
            Err(e) => {
                warn!(proposal_id = %proposal_id, error = %e, "Could not load proposal for notification");
                return;
            }
        };

        if let Err(e) = self
            .notifier
            .notify(proposal_id, event.name(), &recipients)
            .await
        {
            metrics::counter!("governance_collaborator_failures_total", "collaborator" => "notification")
                .increment(1);
            warn!(
                proposal_id = %proposal_id,
                event = event.name(),
                error = %e,
                "Notification delivery failed"
            );
        }

        if matches!(event, GovernanceEvent::VotingStarted { .. }) {
            match self.discussions.create_thread(proposal_id, &recipients).await {
                Ok(handle) => {
                    info!(proposal_id = %proposal_id, thread_id = %handle.thread_id, "Discussion thread created")
                }
                Err(e) => {
                    metrics::counter!("governance_collaborator_failures_total", "collaborator" => "discussion")
                        .increment(1);
                    warn!(proposal_id = %proposal_id, error = %e, "Discussion thread creation failed");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::collaborators::{CollaboratorError, ThreadHandle};
    use crate::domain::proposal::{NewProposal, Proposal, ProposalId, ProposalType};
    use crate::infrastructure::repositories::InMemoryProposalRepository;
    use async_trait::async_trait;
    use chrono::Utc;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct Recording {
        notified: Mutex<Vec<(String, Vec<String>)>>,
        threads: Mutex<Vec<Vec<String>>>,
    }

    #[async_trait]
    impl NotificationSender for Recording {
        async fn notify(
            &self,
            _proposal_id: ProposalId,
            event: &str,
            recipients: &[String],
        ) -> Result<(), CollaboratorError> {
            self.notified.lock().push((event.to_string(), recipients.to_vec()));
            Ok(())
        }
    }

    #[async_trait]
    impl DiscussionBridge for Recording {
        async fn create_thread(
            &self,
            proposal_id: ProposalId,
            participants: &[String],
        ) -> Result<ThreadHandle, CollaboratorError> {
            self.threads.lock().push(participants.to_vec());
            Ok(ThreadHandle {
                thread_id: proposal_id.to_string(),
                url: None,
            })
        }
    }

    #[tokio::test]
    async fn test_voting_started_notifies_and_opens_thread() {
        let proposals = Arc::new(InMemoryProposalRepository::new());
        let p = Proposal::new(NewProposal {
            title: "t".into(),
            description: "d".into(),
            proposal_type: ProposalType::Governance,
            proposer: "CLO".into(),
            execution_details: Default::default(),
            budget_request: None,
            timeline: Default::default(),
            stakeholders: vec!["CEO".into(), "CLO".into()],
        });
        proposals.save(&p).await.unwrap();

        let recording = Arc::new(Recording::default());
        let relay = NotificationRelay::new(recording.clone(), recording.clone(), proposals);
        relay
            .relay(&GovernanceEvent::VotingStarted {
                proposal_id: p.id,
                closes_at: Utc::now(),
                quorum_fraction: 0.5,
                started_at: Utc::now(),
            })
            .await;

        let notified = recording.notified.lock().clone();
        assert_eq!(notified.len(), 1);
        assert_eq!(notified[0].0, "voting_started");
        assert_eq!(notified[0].1, vec!["CLO".to_string(), "CEO".to_string()]);
        assert_eq!(recording.threads.lock().len(), 1);
    }
}
