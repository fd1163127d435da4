// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! REST router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use dao_governance_core::application::StandardGovernanceService;
use dao_governance_core::domain::config::GovernanceConfig;
use dao_governance_core::infrastructure::EventBus;
use dao_governance_core::presentation::app;

fn router() -> Router {
    let config = GovernanceConfig::default();
    let service = StandardGovernanceService::in_memory(&config.spec, EventBus::new(64));
    app(Arc::new(service), Arc::new(config))
}

async fn call(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn proposal_body() -> Value {
    json!({
        "title": "Hire a security auditor",
        "description": "External audit of the treasury contracts",
        "type": "financial",
        "proposer": "cfo_maya",
        "budget_request": {"total_amount": 12000.0, "currency": "USDC"},
        "stakeholders": ["CEO", "CLO"]
    })
}

#[tokio::test]
async fn test_health() {
    let router = router();
    let (status, body) = call(&router, Method::GET, "/api/governance/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["service"], "dao-governance");
}

#[tokio::test]
async fn test_full_flow_over_http() {
    let router = router();

    let (status, created) =
        call(&router, Method::POST, "/api/governance/proposals", Some(proposal_body())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["stage"], "created");
    let id = created["id"].as_str().unwrap().to_string();

    let (status, _) = call(
        &router,
        Method::POST,
        &format!("/api/governance/proposals/{id}/submit"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (status, voting) = call(
        &router,
        Method::POST,
        &format!("/api/governance/proposals/{id}/start-voting"),
        Some(json!({"triggered_by": "CFO"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(voting["stage"], "voting");
    assert_eq!(voting["stage_transitions"][1]["triggered_by"], "CFO");

    for (voter, option) in [("CEO", "for"), ("CFO", "for"), ("CTO", "against")] {
        let (status, vote) = call(
            &router,
            Method::POST,
            "/api/governance/votes",
            Some(json!({"proposal_id": id, "voter_address": voter, "vote_option": option})),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(vote["vote_option"], option);
    }

    let (status, results) = call(
        &router,
        Method::GET,
        &format!("/api/governance/proposals/{id}/results"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(results["for_weight"], 0.75);
    assert_eq!(results["quorum_reached"], true);

    let (status, finalized) = call(
        &router,
        Method::POST,
        &format!("/api/governance/proposals/{id}/finalize"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(finalized["proposal"]["stage"], "approved");
    assert_eq!(finalized["transitioned"], true);

    let (status, workflow) = call(
        &router,
        Method::POST,
        &format!("/api/governance/proposals/{id}/execute"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(workflow["current_stage"], "approved");

    let (status, advanced) = call(
        &router,
        Method::POST,
        &format!("/api/governance/proposals/{id}/workflow/advance"),
        Some(json!({"to_stage": "executed"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(advanced["current_stage"], "executed");

    let (_, view) = call(
        &router,
        Method::GET,
        &format!("/api/governance/proposals/{id}/workflow"),
        None,
    )
    .await;
    assert_eq!(view["status"]["is_complete"], true);

    let (_, listed) = call(&router, Method::GET, "/api/governance/proposals?stage=executed", None).await;
    assert_eq!(listed["total"], 1);
}

#[tokio::test]
async fn test_error_mapping() {
    let router = router();

    let (status, body) = call(&router, Method::GET, "/api/governance/proposals/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "invalid_proposal_id");

    let missing = uuid::Uuid::new_v4();
    let (status, body) = call(
        &router,
        Method::GET,
        &format!("/api/governance/proposals/{missing}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["category"], "not_found");

    let (_, created) =
        call(&router, Method::POST, "/api/governance/proposals", Some(proposal_body())).await;
    let id = created["id"].as_str().unwrap().to_string();

    // Voting before submission is a state conflict
    let (status, body) = call(
        &router,
        Method::POST,
        &format!("/api/governance/proposals/{id}/start-voting"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "invalid_transition");

    let (status, body) = call(
        &router,
        Method::POST,
        "/api/governance/votes",
        Some(json!({"proposal_id": id, "voter_address": "0xabc", "vote_option": "for"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "unknown_voter");

    let mut invalid = proposal_body();
    invalid["title"] = json!("");
    invalid["stakeholders"] = json!([]);
    let (_, created) = call(&router, Method::POST, "/api/governance/proposals", Some(invalid)).await;
    let invalid_id = created["id"].as_str().unwrap().to_string();
    let (status, body) = call(
        &router,
        Method::POST,
        &format!("/api/governance/proposals/{invalid_id}/submit"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"]["violations"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_agent_endpoints() {
    let router = router();

    let (status, body) = call(&router, Method::GET, "/api/governance/agents/zara_cto", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["agent"]["role"], "CTO");
    assert_eq!(body["voting_weight"]["staking_weight"], 0.3);

    let (status, body) = call(&router, Method::GET, "/api/governance/agents/cmo", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "unknown_agent");

    let (_, body) = call(
        &router,
        Method::GET,
        "/api/governance/agents/recommended/financial",
        None,
    )
    .await;
    let roles: Vec<&str> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["role"].as_str().unwrap())
        .collect();
    assert_eq!(roles, vec!["CFO", "CEO"]);

    let (_, weights) = call(&router, Method::GET, "/api/governance/weights", None).await;
    assert_eq!(weights.as_array().unwrap().len(), 4);

    let (_, config) = call(&router, Method::GET, "/api/governance/config", None).await;
    assert_eq!(config["voting_policies"]["financial"]["voting_period"], "10days");
    assert_eq!(config["collaborators"]["notification_webhook"], false);
}
