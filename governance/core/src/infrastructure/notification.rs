// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Collaborator Adapters
//!
//! Implementations of the outbound collaborator interfaces.
//!
//! - **WebhookNotificationSender** - POSTs `{proposal_id, event, recipients}` as JSON
//! - **WebhookDiscussionBridge** - POSTs `{proposal_id, participants}`, expects a
//!   `{thread_id, url?}` response
//! - **LoggingNotificationSender** / **NoopDiscussionBridge** - used when no webhook
//!   is configured

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;
use tracing::info;

use crate::domain::collaborators::{
    CollaboratorError, DiscussionBridge, NotificationSender, ThreadHandle,
};
use crate::domain::proposal::ProposalId;

// ============================================================================
// Webhook implementations
// ============================================================================

#[derive(Serialize)]
struct NotificationPayload<'a> {
    proposal_id: ProposalId,
    event: &'a str,
    recipients: &'a [String],
}

#[derive(Serialize)]
struct ThreadPayload<'a> {
    proposal_id: ProposalId,
    participants: &'a [String],
}

fn build_client(timeout: Duration) -> Result<Client, CollaboratorError> {
    Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| CollaboratorError::Setup(e.to_string()))
}

async fn post_json<T: Serialize + ?Sized>(
    client: &Client,
    url: &str,
    payload: &T,
) -> Result<reqwest::Response, CollaboratorError> {
    let response = client
        .post(url)
        .json(payload)
        .send()
        .await
        .map_err(|e| CollaboratorError::Unreachable(e.to_string()))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(CollaboratorError::Rejected {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response)
}

pub struct WebhookNotificationSender {
    url: String,
    client: Client,
}

impl WebhookNotificationSender {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CollaboratorError> {
        Ok(Self {
            url: url.into(),
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl NotificationSender for WebhookNotificationSender {
    async fn notify(
        &self,
        proposal_id: ProposalId,
        event: &str,
        recipients: &[String],
    ) -> Result<(), CollaboratorError> {
        let payload = NotificationPayload {
            proposal_id,
            event,
            recipients,
        };
        post_json(&self.client, &self.url, &payload).await?;
        Ok(())
    }
}

pub struct WebhookDiscussionBridge {
    url: String,
    client: Client,
}

impl WebhookDiscussionBridge {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, CollaboratorError> {
        Ok(Self {
            url: url.into(),
            client: build_client(timeout)?,
        })
    }
}

#[async_trait]
impl DiscussionBridge for WebhookDiscussionBridge {
    async fn create_thread(
        &self,
        proposal_id: ProposalId,
        participants: &[String],
    ) -> Result<ThreadHandle, CollaboratorError> {
        let payload = ThreadPayload {
            proposal_id,
            participants,
        };
        let response = post_json(&self.client, &self.url, &payload).await?;
        response
            .json::<ThreadHandle>()
            .await
            .map_err(|e| CollaboratorError::InvalidResponse(e.to_string()))
    }
}

// ============================================================================
// Defaults
// ============================================================================

/// Logs notifications instead of delivering them.
#[derive(Debug, Default, Clone)]
pub struct LoggingNotificationSender;

#[async_trait]
impl NotificationSender for LoggingNotificationSender {
    async fn notify(
        &self,
        proposal_id: ProposalId,
        event: &str,
        recipients: &[String],
    ) -> Result<(), CollaboratorError> {
        info!(proposal_id = %proposal_id, event, recipients = ?recipients, "Notification");
        Ok(())
    }
}

/// Hands out a local thread id without contacting anything.
#[derive(Debug, Default, Clone)]
pub struct NoopDiscussionBridge;

#[async_trait]
impl DiscussionBridge for NoopDiscussionBridge {
    async fn create_thread(
        &self,
        proposal_id: ProposalId,
        _participants: &[String],
    ) -> Result<ThreadHandle, CollaboratorError> {
        Ok(ThreadHandle {
            thread_id: format!("local-{proposal_id}"),
            url: None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;
    use serde_json::json;

    #[tokio::test]
    async fn test_webhook_notification_posts_payload() {
        let mut server = mockito::Server::new_async().await;
        let id = ProposalId::new();
        let mock = server
            .mock("POST", "/notify")
            .match_body(Matcher::PartialJson(json!({
                "proposal_id": id.to_string(),
                "event": "voting_started",
                "recipients": ["CEO", "CFO"],
            })))
            .with_status(202)
            .create_async()
            .await;

        let sender = WebhookNotificationSender::new(
            format!("{}/notify", server.url()),
            Duration::from_secs(2),
        )
        .unwrap();
        sender
            .notify(id, "voting_started", &["CEO".to_string(), "CFO".to_string()])
            .await
            .unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_webhook_failure_status_is_reported() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/notify")
            .with_status(503)
            .with_body("down")
            .create_async()
            .await;

        let sender = WebhookNotificationSender::new(
            format!("{}/notify", server.url()),
            Duration::from_secs(2),
        )
        .unwrap();
        let err = sender.notify(ProposalId::new(), "x", &[]).await.unwrap_err();
        assert!(matches!(err, CollaboratorError::Rejected { status: 503, .. }));
    }

    #[tokio::test]
    async fn test_discussion_bridge_parses_thread_handle() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/threads")
            .with_status(201)
            .with_header("content-type", "application/json")
            .with_body(r#"{"thread_id":"t-42","url":"https://talk.example/t-42"}"#)
            .create_async()
            .await;

        let bridge = WebhookDiscussionBridge::new(
            format!("{}/threads", server.url()),
            Duration::from_secs(2),
        )
        .unwrap();
        let handle = bridge
            .create_thread(ProposalId::new(), &["CLO".to_string()])
            .await
            .unwrap();
        assert_eq!(handle.thread_id, "t-42");
        assert_eq!(handle.url.as_deref(), Some("https://talk.example/t-42"));
    }

    #[tokio::test]
    async fn test_webhook_timeout_bounds_a_silent_endpoint() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let held = tokio::spawn(async move {
            let mut open = Vec::new();
            while let Ok((socket, _)) = listener.accept().await {
                open.push(socket);
            }
        });

        let sender =
            WebhookNotificationSender::new(format!("http://{addr}/notify"), Duration::from_millis(200))
                .unwrap();
        let result = tokio::time::timeout(
            Duration::from_secs(5),
            sender.notify(ProposalId::new(), "voting_started", &[]),
        )
        .await
        .expect("configured timeout should fire first");
        assert!(matches!(result, Err(CollaboratorError::Unreachable(_))));
        held.abort();
    }

    #[tokio::test]
    async fn test_noop_bridge() {
        let id = ProposalId::new();
        let handle = NoopDiscussionBridge.create_thread(id, &[]).await.unwrap();
        assert_eq!(handle.thread_id, format!("local-{id}"));
    }
}
