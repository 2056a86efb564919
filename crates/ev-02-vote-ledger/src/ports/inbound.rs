//! # Inbound Port
//!
//! Ledger operations offered to the HTTP gateway.

use async_trait::async_trait;
use shared_types::{CandidateId, VoterId};

use crate::domain::{ReconcileReport, TallyEntry, VoteError, VoteReceipt, VoterStatus};

#[async_trait]
pub trait VoteLedgerApi: Send + Sync {
    /// Record a vote and credit the candidate.
    ///
    /// Under any number of concurrent calls for one voter, exactly one
    /// returns `Ok`; the rest return `AlreadyVoted`.
    ///
    /// # Errors
    /// - `VoterNotFound`, `AlreadyVoted`, `CandidateNotFound`
    /// - `IntegrityViolation` if the voter was marked but the tally write failed
    /// - `UpstreamUnavailable` if the store failed before anything was written
    async fn cast_vote(
        &self,
        voter: &VoterId,
        candidate: &CandidateId,
    ) -> Result<VoteReceipt, VoteError>;

    async fn voter_status(&self, voter: &VoterId) -> Result<VoterStatus, VoteError>;

    /// Every candidate with its stored tally, highest first.
    async fn tally(&self) -> Result<Vec<TallyEntry>, VoteError>;

    /// Recount votes from voter records and compare against stored tallies.
    /// Read-only.
    async fn reconcile(&self) -> Result<ReconcileReport, VoteError>;
}
