// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! # Governance REST API
//!
//! Axum router for the governance service, nested under `/api/governance`.
//! Handlers are thin: parse, call [`GovernanceService`], map errors.
//!
//! Errors are returned as
//! `{"error": {"code", "category", "message", "violations"?}}` with the status
//! derived from [`ErrorCategory`]:
//!
//! | Category | Status |
//! |----------|--------|
//! | `input` (validation) | 422 |
//! | `input` (other) | 400 |
//! | `state` | 409 |
//! | `not_found` | 404 |
//! | `internal` | 500 |

use axum::{
    body::Bytes,
    extract::{rejection::JsonRejection, rejection::QueryRejection, Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::collections::BTreeMap;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::application::governance_service::GovernanceService;
use crate::domain::agent::{AgentVotingWeight, ResolvedAgent};
use crate::domain::config::GovernanceConfig;
use crate::domain::error::{ErrorCategory, GovernanceError};
use crate::domain::proposal::{NewProposal, ProposalId, ProposalQuery, ProposalStage, ProposalType};
use crate::domain::vote::CastVote;

/// Actor recorded on transitions when the request body names none.
pub const DEFAULT_ACTOR: &str = "api";

pub struct AppState {
    pub service: Arc<dyn GovernanceService>,
    pub config: Arc<GovernanceConfig>,
    pub started_at: DateTime<Utc>,
}

pub fn app(service: Arc<dyn GovernanceService>, config: Arc<GovernanceConfig>) -> Router {
    let state = Arc::new(AppState {
        service,
        config,
        started_at: Utc::now(),
    });

    let api = Router::new()
        .route("/proposals", post(create_proposal).get(list_proposals))
        .route("/proposals/{id}", get(get_proposal))
        .route("/proposals/{id}/submit", post(submit_proposal))
        .route("/proposals/{id}/start-voting", post(start_voting))
        .route("/proposals/{id}/finalize", post(finalize_proposal))
        .route("/proposals/{id}/results", get(get_results))
        .route("/proposals/{id}/votes", get(list_votes))
        .route("/proposals/{id}/execute", post(create_workflow))
        .route("/proposals/{id}/workflow", get(get_workflow))
        .route("/proposals/{id}/workflow/advance", post(advance_workflow))
        .route("/votes", post(cast_vote))
        .route("/agents/recommended/{proposal_type}", get(recommended_agents))
        .route("/agents/{identifier}", get(resolve_agent))
        .route("/weights", get(voting_weights))
        .route("/health", get(health))
        .route("/config", get(config_view))
        .route("/stats", get(stats));

    Router::new()
        .nest("/api/governance", api)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    Governance(GovernanceError),
    BadRequest { code: &'static str, message: String },
}

impl From<GovernanceError> for ApiError {
    fn from(e: GovernanceError) -> Self {
        ApiError::Governance(e)
    }
}

impl ApiError {
    fn bad_request(code: &'static str, message: impl Into<String>) -> Self {
        ApiError::BadRequest {
            code,
            message: message.into(),
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::Governance(GovernanceError::Validation { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            ApiError::Governance(e) => match e.category() {
                ErrorCategory::Input => StatusCode::BAD_REQUEST,
                ErrorCategory::State => StatusCode::CONFLICT,
                ErrorCategory::NotFound => StatusCode::NOT_FOUND,
                ErrorCategory::Internal => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::BadRequest { code, message } => json!({
                "error": {
                    "code": code,
                    "category": ErrorCategory::Input,
                    "message": message,
                }
            }),
            ApiError::Governance(e) => {
                if status == StatusCode::INTERNAL_SERVER_ERROR {
                    error!(error = %e, "Governance request failed");
                }
                let mut detail = json!({
                    "code": e.code(),
                    "category": e.category(),
                    "message": e.to_string(),
                });
                let violations = e.violations();
                if !violations.is_empty() {
                    detail["violations"] = json!(violations);
                }
                json!({ "error": detail })
            }
        };
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

fn parse_id(raw: &str) -> ApiResult<ProposalId> {
    raw.parse()
        .map_err(|_| ApiError::bad_request("invalid_proposal_id", format!("'{raw}' is not a proposal id")))
}

// ============================================================================
// Request / response bodies
// ============================================================================

/// Optional body of transition endpoints.
#[derive(Debug, Default, Deserialize)]
pub struct ActorRequest {
    #[serde(default)]
    pub triggered_by: Option<String>,
}

impl ActorRequest {
    fn from_body(body: &Bytes) -> ApiResult<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }
        serde_json::from_slice(body).map_err(|e| ApiError::bad_request("invalid_body", e.to_string()))
    }

    fn actor(&self) -> &str {
        self.triggered_by
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .unwrap_or(DEFAULT_ACTOR)
    }
}

#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub to_stage: ProposalStage,
    #[serde(default)]
    pub triggered_by: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct AgentView {
    pub agent: ResolvedAgent,
    pub voting_weight: Option<AgentVotingWeight>,
}

#[derive(Debug, Serialize)]
struct PolicyView {
    quorum_fraction: f64,
    #[serde(with = "humantime_serde")]
    voting_period: std::time::Duration,
}

// ============================================================================
// Proposal handlers
// ============================================================================

async fn create_proposal(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<NewProposal>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(input) = payload.map_err(|e| ApiError::bad_request("invalid_body", e.body_text()))?;
    let proposal = state.service.create_proposal(input).await?;
    Ok((StatusCode::CREATED, Json(proposal)))
}

async fn list_proposals(
    State(state): State<Arc<AppState>>,
    query: Result<Query<ProposalQuery>, QueryRejection>,
) -> ApiResult<impl IntoResponse> {
    let Query(query) = query.map_err(|e| ApiError::bad_request("invalid_query", e.body_text()))?;
    Ok(Json(state.service.query_proposals(&query).await?))
}

async fn get_proposal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    Ok(Json(state.service.get_proposal(id).await?))
}

async fn submit_proposal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let actor = ActorRequest::from_body(&body)?;
    Ok(Json(state.service.submit_proposal(id, actor.actor()).await?))
}

async fn start_voting(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let actor = ActorRequest::from_body(&body)?;
    Ok(Json(state.service.start_voting(id, actor.actor()).await?))
}

async fn finalize_proposal(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    body: Bytes,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let actor = ActorRequest::from_body(&body)?;
    Ok(Json(state.service.finalize(id, actor.actor()).await?))
}

async fn get_results(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    Ok(Json(state.service.get_results(id).await?))
}

async fn list_votes(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    // 404 for unknown proposals rather than an empty list
    state.service.get_proposal(id).await?;
    Ok(Json(state.service.votes(id).await?))
}

async fn cast_vote(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<CastVote>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let Json(ballot) = payload.map_err(|e| ApiError::bad_request("invalid_body", e.body_text()))?;
    let vote = state.service.cast_vote(ballot).await?;
    Ok((StatusCode::CREATED, Json(vote)))
}

// ============================================================================
// Workflow handlers
// ============================================================================

async fn create_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let workflow = state.service.create_workflow(id).await?;
    Ok((StatusCode::CREATED, Json(workflow)))
}

async fn get_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let workflow = state.service.get_workflow(id).await?;
    let status = workflow.status();
    Ok(Json(json!({ "workflow": workflow, "status": status })))
}

async fn advance_workflow(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    payload: Result<Json<AdvanceRequest>, JsonRejection>,
) -> ApiResult<impl IntoResponse> {
    let id = parse_id(&id)?;
    let Json(request) = payload.map_err(|e| ApiError::bad_request("invalid_body", e.body_text()))?;
    let actor = request
        .triggered_by
        .as_deref()
        .filter(|s| !s.trim().is_empty())
        .unwrap_or(DEFAULT_ACTOR);
    Ok(Json(
        state
            .service
            .advance_workflow(id, request.to_stage, actor)
            .await?,
    ))
}

// ============================================================================
// Agent handlers
// ============================================================================

async fn resolve_agent(
    State(state): State<Arc<AppState>>,
    Path(identifier): Path<String>,
) -> ApiResult<impl IntoResponse> {
    let agent = state.service.resolve_agent(&identifier)?;
    let voting_weight = state
        .service
        .voting_weights()
        .into_iter()
        .find(|w| w.agent_id == agent.agent_id);
    Ok(Json(AgentView {
        agent,
        voting_weight,
    }))
}

async fn recommended_agents(
    State(state): State<Arc<AppState>>,
    Path(proposal_type): Path<String>,
) -> impl IntoResponse {
    Json(state.service.recommended_agents(&proposal_type))
}

async fn voting_weights(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.service.voting_weights())
}

// ============================================================================
// Service handlers
// ============================================================================

async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let uptime = (Utc::now() - state.started_at).num_seconds().max(0);
    Json(json!({
        "status": "healthy",
        "service": state.config.metadata.name,
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": uptime,
    }))
}

/// Effective governance policy. Webhook URLs are reported as configured or not.
async fn config_view(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let spec = &state.config.spec;
    let policies: BTreeMap<ProposalType, PolicyView> = ProposalType::ALL
        .iter()
        .map(|t| {
            let p = spec.voting.policy_for(*t);
            (
                *t,
                PolicyView {
                    quorum_fraction: p.quorum_fraction,
                    voting_period: p.voting_period,
                },
            )
        })
        .collect();

    Json(json!({
        "name": state.config.metadata.name,
        "supported_types": spec.proposals.supported_types,
        "voting_policies": policies,
        "collaborators": {
            "notification_webhook": spec.collaborators.notification_webhook.is_some(),
            "discussion_webhook": spec.collaborators.discussion_webhook.is_some(),
        },
    }))
}

async fn stats(State(state): State<Arc<AppState>>) -> ApiResult<impl IntoResponse> {
    Ok(Json(state.service.stats().await?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repository::RepositoryError;

    #[test]
    fn test_status_mapping() {
        let id = ProposalId::new();
        let cases = [
            (
                GovernanceError::Validation {
                    proposal_id: Some(id),
                    violations: vec!["title is required".into()],
                },
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                GovernanceError::UnknownVoter("CMO".into()),
                StatusCode::BAD_REQUEST,
            ),
            (
                GovernanceError::InvalidTransition {
                    proposal_id: id,
                    from: ProposalStage::Created,
                    to: ProposalStage::Voting,
                },
                StatusCode::CONFLICT,
            ),
            (GovernanceError::ProposalNotFound(id), StatusCode::NOT_FOUND),
            (
                GovernanceError::Repository(RepositoryError::Storage("disk".into())),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, status) in cases {
            assert_eq!(ApiError::from(err).status(), status);
        }
    }

    #[test]
    fn test_actor_defaults_for_empty_body() {
        let actor = ActorRequest::from_body(&Bytes::new()).unwrap();
        assert_eq!(actor.actor(), DEFAULT_ACTOR);

        let actor = ActorRequest::from_body(&Bytes::from_static(br#"{"triggered_by":"CEO"}"#)).unwrap();
        assert_eq!(actor.actor(), "CEO");

        assert!(ActorRequest::from_body(&Bytes::from_static(b"{nope")).is_err());
    }
}
