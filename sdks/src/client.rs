// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;

use crate::types::*;

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with its error envelope.
    #[error("{status} {code}: {message}")]
    Api {
        status: u16,
        code: String,
        category: String,
        message: String,
        violations: Vec<String>,
    },

    #[error("unexpected {status} response: {body}")]
    UnexpectedResponse { status: u16, body: String },
}

impl SdkError {
    /// Service error code, when the failure came from the service.
    pub fn code(&self) -> Option<&str> {
        match self {
            SdkError::Api { code, .. } => Some(code),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, SdkError>;

/// Client for the DAO governance REST API.
pub struct GovernanceClient {
    base_url: String,
    client: Client,
    api_key: Option<String>,
}

impl GovernanceClient {
    /// Create a new client for a server such as `http://localhost:8080`.
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            base_url,
            client: Client::new(),
            api_key: None,
        }
    }

    /// Set the API key sent as a bearer token.
    pub fn with_api_key(mut self, api_key: impl Into<String>) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}/api/governance{}", self.base_url, path)
    }

    fn authorize(&self, req: RequestBuilder) -> RequestBuilder {
        match &self.api_key {
            Some(key) => req.header("Authorization", format!("Bearer {}", key)),
            None => req,
        }
    }

    async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let req = self.authorize(self.client.get(self.url(path)));
        decode(req.send().await?).await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(&self, path: &str, body: &B) -> Result<T> {
        let req = self.authorize(self.client.post(self.url(path)).json(body));
        decode(req.send().await?).await
    }

    // ========================================================================
    // Proposals
    // ========================================================================

    pub async fn create_proposal(&self, input: &NewProposal) -> Result<Proposal> {
        self.post("/proposals", input).await
    }

    pub async fn list_proposals(&self, query: &ProposalQuery) -> Result<ProposalPage> {
        let mut params = url::form_urlencoded::Serializer::new(String::new());
        if let Some(stage) = query.stage {
            params.append_pair("stage", stage.as_str());
        }
        if let Some(t) = query.proposal_type {
            params.append_pair("type", t.as_str());
        }
        if let Some(proposer) = &query.proposer {
            params.append_pair("proposer", proposer);
        }
        if let Some(page) = query.page {
            params.append_pair("page", &page.to_string());
        }
        if let Some(limit) = query.limit {
            params.append_pair("limit", &limit.to_string());
        }
        let params = params.finish();
        if params.is_empty() {
            self.get("/proposals").await
        } else {
            self.get(&format!("/proposals?{params}")).await
        }
    }

    pub async fn get_proposal(&self, id: ProposalId) -> Result<Proposal> {
        self.get(&format!("/proposals/{id}")).await
    }

    pub async fn submit_proposal(&self, id: ProposalId, triggered_by: Option<&str>) -> Result<Proposal> {
        self.post(&format!("/proposals/{id}/submit"), &actor(triggered_by))
            .await
    }

    pub async fn start_voting(&self, id: ProposalId, triggered_by: Option<&str>) -> Result<Proposal> {
        self.post(&format!("/proposals/{id}/start-voting"), &actor(triggered_by))
            .await
    }

    pub async fn finalize(&self, id: ProposalId, triggered_by: Option<&str>) -> Result<Finalization> {
        self.post(&format!("/proposals/{id}/finalize"), &actor(triggered_by))
            .await
    }

    pub async fn get_results(&self, id: ProposalId) -> Result<VotingResults> {
        self.get(&format!("/proposals/{id}/results")).await
    }

    pub async fn list_votes(&self, id: ProposalId) -> Result<Vec<Vote>> {
        self.get(&format!("/proposals/{id}/votes")).await
    }

    // ========================================================================
    // Voting
    // ========================================================================

    pub async fn cast_vote(&self, ballot: &CastVote) -> Result<Vote> {
        self.post("/votes", ballot).await
    }

    // ========================================================================
    // Execution workflow
    // ========================================================================

    /// Create the execution workflow of an approved proposal.
    pub async fn execute(&self, id: ProposalId) -> Result<GovernanceWorkflow> {
        self.post(&format!("/proposals/{id}/execute"), &serde_json::json!({}))
            .await
    }

    pub async fn get_workflow(&self, id: ProposalId) -> Result<WorkflowView> {
        self.get(&format!("/proposals/{id}/workflow")).await
    }

    pub async fn advance_workflow(
        &self,
        id: ProposalId,
        to_stage: ProposalStage,
        triggered_by: Option<&str>,
    ) -> Result<GovernanceWorkflow> {
        let body = AdvanceRequest {
            to_stage,
            triggered_by: triggered_by.map(str::to_string),
        };
        self.post(&format!("/proposals/{id}/workflow/advance"), &body)
            .await
    }

    // ========================================================================
    // Agents and service
    // ========================================================================

    pub async fn resolve_agent(&self, identifier: &str) -> Result<AgentView> {
        let encoded: String = url::form_urlencoded::byte_serialize(identifier.as_bytes()).collect();
        self.get(&format!("/agents/{encoded}")).await
    }

    pub async fn recommended_agents(&self, proposal_type: &str) -> Result<Vec<ResolvedAgent>> {
        let encoded: String = url::form_urlencoded::byte_serialize(proposal_type.as_bytes()).collect();
        self.get(&format!("/agents/recommended/{encoded}")).await
    }

    pub async fn voting_weights(&self) -> Result<Vec<AgentVotingWeight>> {
        self.get("/weights").await
    }

    pub async fn health(&self) -> Result<HealthStatus> {
        self.get("/health").await
    }

    pub async fn config(&self) -> Result<serde_json::Value> {
        self.get("/config").await
    }

    pub async fn stats(&self) -> Result<GovernanceStats> {
        self.get("/stats").await
    }
}

fn actor(triggered_by: Option<&str>) -> ActorRequest {
    ActorRequest {
        triggered_by: triggered_by.map(str::to_string),
    }
}

async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        return Ok(response.json().await?);
    }

    let body = response.text().await?;
    match serde_json::from_str::<ErrorEnvelope>(&body) {
        Ok(envelope) => Err(SdkError::Api {
            status: status.as_u16(),
            code: envelope.error.code,
            category: envelope.error.category,
            message: envelope.error.message,
            violations: envelope.error.violations,
        }),
        Err(_) => Err(SdkError::UnexpectedResponse {
            status: status.as_u16(),
            body,
        }),
    }
}
