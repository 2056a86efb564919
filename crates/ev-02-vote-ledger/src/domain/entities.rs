//! Ledger result types. Serialized camelCase for the HTTP layer.

use serde::Serialize;
use shared_types::{Candidate, CandidateId, Timestamp, VoterId, VoterIdentity};

/// Successful vote.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteReceipt {
    pub voter_id: VoterId,
    pub candidate_id: CandidateId,
    /// Candidate's tally after this vote.
    pub candidate_votes: u64,
    pub voted_at: Timestamp,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterStatus {
    pub voter_id: VoterId,
    pub has_voted: bool,
    pub voted_for: Option<CandidateId>,
    pub voted_at: Option<Timestamp>,
}

impl From<&VoterIdentity> for VoterStatus {
    fn from(voter: &VoterIdentity) -> Self {
        Self {
            voter_id: voter.id,
            has_voted: voter.has_voted,
            voted_for: voter.voted_for,
            voted_at: voter.voted_at,
        }
    }
}

/// One row of the results table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyEntry {
    pub candidate_id: CandidateId,
    pub full_name: String,
    pub party: String,
    pub votes: u64,
}

impl From<Candidate> for TallyEntry {
    fn from(c: Candidate) -> Self {
        Self {
            candidate_id: c.id,
            full_name: c.full_name,
            party: c.party,
            votes: c.votes,
        }
    }
}

/// A candidate whose stored tally differs from the recount.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TallyMismatch {
    pub candidate_id: CandidateId,
    pub recorded: u64,
    pub counted: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReconcileReport {
    pub candidates_checked: usize,
    pub mismatches: Vec<TallyMismatch>,
}

impl ReconcileReport {
    pub fn is_consistent(&self) -> bool {
        self.mismatches.is_empty()
    }
}
