// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

//! Tally properties checked over every ballot the four-seat electorate can produce.
//!
//! - weights only ever come from the voter's role
//! - approval requires quorum and a strict weighted majority
//! - quorum is inclusive and computed on exact basis points
//! - results do not depend on vote order

use chrono::Utc;
use dao_governance_core::domain::agent::{AgentRole, AgentVotingWeight};
use dao_governance_core::domain::proposal::ProposalId;
use dao_governance_core::domain::vote::{
    RejectionReason, Vote, VoteOption, VotingOutcome, VotingResults,
};

const OPTIONS: [Option<VoteOption>; 4] = [
    None,
    Some(VoteOption::For),
    Some(VoteOption::Against),
    Some(VoteOption::Abstain),
];

fn electorate() -> Vec<AgentVotingWeight> {
    AgentRole::ALL.iter().map(|r| r.standard_weight()).collect()
}

fn vote(proposal_id: ProposalId, role: AgentRole, option: VoteOption) -> Vote {
    Vote {
        proposal_id,
        voter_agent_id: role.agent_id(),
        voter_role: role,
        vote_option: option,
        reason: None,
        timestamp: Utc::now(),
    }
}

/// Every combination of abstention / for / against / abstain across the four seats.
fn all_ballots(proposal_id: ProposalId) -> Vec<Vec<Vote>> {
    let mut ballots = Vec::new();
    for a in OPTIONS {
        for b in OPTIONS {
            for c in OPTIONS {
                for d in OPTIONS {
                    let votes = AgentRole::ALL
                        .iter()
                        .zip([a, b, c, d])
                        .filter_map(|(role, option)| option.map(|o| vote(proposal_id, *role, o)))
                        .collect();
                    ballots.push(votes);
                }
            }
        }
    }
    ballots
}

fn bps(role: AgentRole) -> u64 {
    role.standard_weight().staking_weight_bps()
}

#[test]
fn test_outcome_matches_weighted_majority_rule() {
    let id = ProposalId::new();
    let weights = electorate();
    let eligible: u64 = AgentRole::ALL.iter().map(|r| bps(*r)).sum();

    for votes in all_ballots(id) {
        let results = VotingResults::compute(id, &votes, &weights, 0.5);

        let sum = |option: VoteOption| -> u64 {
            votes
                .iter()
                .filter(|v| v.vote_option == option)
                .map(|v| bps(v.voter_role))
                .sum()
        };
        let (f, a, ab) = (
            sum(VoteOption::For),
            sum(VoteOption::Against),
            sum(VoteOption::Abstain),
        );
        let quorate = !votes.is_empty() && (f + a + ab) * 2 >= eligible;

        assert_eq!(results.total_voters, votes.len());
        assert_eq!(
            results.for_count + results.against_count + results.abstain_count,
            votes.len()
        );
        assert_eq!(results.quorum_reached, quorate, "ballot {votes:?}");
        assert_eq!(results.is_approved(), quorate && f > a, "ballot {votes:?}");

        match results.rejection_reason {
            None => assert_eq!(results.outcome, VotingOutcome::Approved),
            Some(RejectionReason::NoQuorum) => assert!(!quorate),
            Some(RejectionReason::Tie) => assert!(quorate && f == a),
            Some(RejectionReason::MajorityAgainst) => assert!(quorate && a > f),
        }
        assert!(results.participation >= 0.0 && results.participation <= 1.0);
    }
}

#[test]
fn test_vote_order_does_not_change_results() {
    let id = ProposalId::new();
    let weights = electorate();
    for votes in all_ballots(id) {
        let forward = VotingResults::compute(id, &votes, &weights, 0.5);
        let mut reversed = votes.clone();
        reversed.reverse();
        let backward = VotingResults::compute(id, &reversed, &weights, 0.5);
        assert!(forward.same_decision(&backward));
        assert_eq!(forward.for_weight, backward.for_weight);
        assert_eq!(forward.against_weight, backward.against_weight);
    }
}

#[test]
fn test_unanimous_quorum_needs_everyone() {
    let id = ProposalId::new();
    let weights = electorate();
    let all_but_clo: Vec<Vote> = [AgentRole::Ceo, AgentRole::Cto, AgentRole::Cfo]
        .iter()
        .map(|r| vote(id, *r, VoteOption::For))
        .collect();

    let r = VotingResults::compute(id, &all_but_clo, &weights, 1.0);
    assert!(!r.quorum_reached);

    let mut everyone = all_but_clo;
    everyone.push(vote(id, AgentRole::Clo, VoteOption::Abstain));
    let r = VotingResults::compute(id, &everyone, &weights, 1.0);
    assert!(r.quorum_reached);
    assert_eq!(r.participation, 1.0);
    assert_eq!(r.outcome, VotingOutcome::Approved);
}

#[test]
fn test_zero_quorum_still_needs_a_vote() {
    let id = ProposalId::new();
    let r = VotingResults::compute(id, &[], &electorate(), 0.0);
    assert!(!r.quorum_reached);
    assert_eq!(r.rejection_reason, Some(RejectionReason::NoQuorum));
}
