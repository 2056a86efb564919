//! Vote ledger error types.

use shared_types::{CandidateId, StoreError, VoterId};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VoteError {
    #[error("voter not found")]
    VoterNotFound,

    /// The voter had already voted, or lost a concurrent race to vote.
    #[error("voter has already voted")]
    AlreadyVoted,

    #[error("candidate not found")]
    CandidateNotFound,

    /// The vote was recorded on the voter but the tally could not be
    /// incremented. Requires reconciliation.
    #[error("vote by {voter} recorded but tally for {candidate} not incremented: {reason}")]
    IntegrityViolation {
        voter: VoterId,
        candidate: CandidateId,
        reason: String,
    },

    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),
}

impl From<StoreError> for VoteError {
    fn from(err: StoreError) -> Self {
        VoteError::UpstreamUnavailable(err.to_string())
    }
}
