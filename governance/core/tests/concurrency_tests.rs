// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Same-proposal operations are serialized by the service; these tests race them
//! on a multi-threaded runtime and check the resulting state is consistent.

use std::sync::Arc;

use dao_governance_core::application::{GovernanceService, StandardGovernanceService};
use dao_governance_core::domain::agent::AgentRole;
use dao_governance_core::domain::config::GovernanceSpec;
use dao_governance_core::domain::error::GovernanceError;
use dao_governance_core::domain::proposal::{NewProposal, ProposalId, ProposalStage, ProposalType};
use dao_governance_core::domain::vote::{CastVote, VoteOption};
use dao_governance_core::infrastructure::EventBus;

async fn open_proposal(service: &StandardGovernanceService) -> ProposalId {
    let proposal = service
        .create_proposal(NewProposal {
            title: "Quarterly budget".into(),
            description: "Allocate the operating budget".into(),
            proposal_type: ProposalType::Financial,
            proposer: "CFO".into(),
            execution_details: Default::default(),
            budget_request: None,
            timeline: Default::default(),
            stakeholders: vec!["CEO".into()],
        })
        .await
        .unwrap();
    service.submit_proposal(proposal.id, "CFO").await.unwrap();
    service.start_voting(proposal.id, "CFO").await.unwrap();
    proposal.id
}

fn option_for(i: usize) -> VoteOption {
    match i % 3 {
        0 => VoteOption::For,
        1 => VoteOption::Against,
        _ => VoteOption::Abstain,
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_votes_keep_one_vote_per_agent() {
    let service = Arc::new(StandardGovernanceService::in_memory(
        &GovernanceSpec::default(),
        EventBus::new(1024),
    ));
    let id = open_proposal(&service).await;

    let mut handles = Vec::new();
    for i in 0..100 {
        let service = service.clone();
        let role = AgentRole::ALL[i % AgentRole::ALL.len()];
        handles.push(tokio::spawn(async move {
            service
                .cast_vote(CastVote {
                    proposal_id: id,
                    voter_address: role.as_str().to_string(),
                    vote_option: option_for(i),
                    reason: Some(format!("round {i}")),
                })
                .await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    let votes = service.votes(id).await.unwrap();
    assert_eq!(votes.len(), 4);
    let results = service.get_results(id).await.unwrap();
    assert_eq!(results.total_voters, 4);
    assert_eq!(service.stats().await.unwrap().total_votes, 4);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_finalize_transitions_once() {
    let service = Arc::new(StandardGovernanceService::in_memory(
        &GovernanceSpec::default(),
        EventBus::new(1024),
    ));
    let id = open_proposal(&service).await;
    for role in [AgentRole::Ceo, AgentRole::Cfo] {
        service
            .cast_vote(CastVote {
                proposal_id: id,
                voter_address: role.as_str().to_string(),
                vote_option: VoteOption::For,
                reason: None,
            })
            .await
            .unwrap();
    }

    let mut handles = Vec::new();
    for _ in 0..16 {
        let service = service.clone();
        handles.push(tokio::spawn(async move { service.finalize(id, "CEO").await }));
    }

    let mut transitioned = 0;
    let mut outcomes = Vec::new();
    for handle in handles {
        let finalization = handle.await.unwrap().unwrap();
        if finalization.transitioned {
            transitioned += 1;
        }
        outcomes.push(finalization.results);
    }

    assert_eq!(transitioned, 1);
    assert!(outcomes.windows(2).all(|w| w[0].same_decision(&w[1])));

    let proposal = service.get_proposal(id).await.unwrap();
    assert_eq!(proposal.stage, ProposalStage::Approved);
    let approvals = proposal
        .stage_transitions
        .iter()
        .filter(|t| t.to == ProposalStage::Approved)
        .count();
    assert_eq!(approvals, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_votes_racing_finalize_are_counted_or_refused() {
    let service = Arc::new(StandardGovernanceService::in_memory(
        &GovernanceSpec::default(),
        EventBus::new(1024),
    ));
    let id = open_proposal(&service).await;

    let mut votes = Vec::new();
    for i in 0..40 {
        let service = service.clone();
        let role = AgentRole::ALL[i % AgentRole::ALL.len()];
        votes.push(tokio::spawn(async move {
            service
                .cast_vote(CastVote {
                    proposal_id: id,
                    voter_address: role.as_str().to_string(),
                    vote_option: option_for(i),
                    reason: None,
                })
                .await
        }));
    }
    let finalizer = {
        let service = service.clone();
        tokio::spawn(async move { service.finalize(id, "CEO").await })
    };

    for handle in votes {
        match handle.await.unwrap() {
            Ok(_) | Err(GovernanceError::VotingClosed { .. }) => {}
            Err(other) => panic!("unexpected error: {other}"),
        }
    }
    let finalization = finalizer.await.unwrap().unwrap();

    // Nothing was recorded after the decision
    let current = service.get_results(id).await.unwrap();
    assert!(current.same_decision(&finalization.results));
    assert_eq!(current.total_voters, finalization.results.total_voters);
    assert_eq!(
        service.get_proposal(id).await.unwrap().voting_results,
        Some(finalization.results)
    );
}
