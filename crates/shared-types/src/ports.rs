//! # Persistence Port
//!
//! The contract between the election core and the document store holding
//! voters and candidates.
//!
//! ## Atomicity Requirements
//!
//! | Method | Guarantee |
//! |--------|-----------|
//! | `compare_and_set_voted` | Single indivisible "set voted only if unvoted" step |
//! | `increment_candidate_votes` | Pure increment, no read-then-write |
//!
//! Application-level locking is not a substitute: several service instances
//! may share one store, so these guarantees must come from the store itself.

use async_trait::async_trait;

use crate::entities::{Candidate, CandidateId, VoterId, VoterIdentity};
use crate::errors::StoreError;
use crate::phone::NormalizedPhone;
use crate::time::Timestamp;

/// Key-addressable voter and candidate records with atomic updates.
#[async_trait]
pub trait ElectionStore: Send + Sync {
    /// Look up a voter by canonical phone key.
    async fn find_voter_by_phone(
        &self,
        phone: &NormalizedPhone,
    ) -> Result<Option<VoterIdentity>, StoreError>;

    /// Look up a voter by id.
    async fn find_voter_by_id(&self, id: &VoterId) -> Result<Option<VoterIdentity>, StoreError>;

    /// Atomically mark a voter as voted.
    ///
    /// Sets `has_voted = true`, `voted_for = candidate` and `voted_at = now`
    /// only if the voter exists and `has_voted` is currently false.
    ///
    /// # Returns
    /// - `Ok(true)`: this call performed the transition
    /// - `Ok(false)`: the voter is missing or had already voted
    async fn compare_and_set_voted(
        &self,
        id: &VoterId,
        candidate: &CandidateId,
        now: Timestamp,
    ) -> Result<bool, StoreError>;

    /// Atomically add one vote to a candidate.
    ///
    /// # Returns
    /// The tally after the increment, or `None` if the candidate is missing.
    async fn increment_candidate_votes(&self, id: &CandidateId)
        -> Result<Option<u64>, StoreError>;

    /// Look up a candidate by id.
    async fn find_candidate_by_id(&self, id: &CandidateId)
        -> Result<Option<Candidate>, StoreError>;

    /// All candidates, in a stable order.
    async fn list_candidates(&self) -> Result<Vec<Candidate>, StoreError>;

    /// Number of voters whose `voted_for` names each candidate.
    ///
    /// Used to reconcile stored tallies after an integrity event.
    async fn count_votes_by_candidate(&self) -> Result<Vec<(CandidateId, u64)>, StoreError>;
}
