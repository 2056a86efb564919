//! In-memory election store.
//!
//! Suitable for a single authoritative process and for tests. A networked
//! document store implements the same [`ElectionStore`] contract with its own
//! conditional-update and `$inc`-style primitives.

use std::collections::BTreeMap;

use async_trait::async_trait;
use dashmap::DashMap;
use parking_lot::Mutex;
use shared_types::{
    Candidate, CandidateId, ElectionStore, NormalizedPhone, StoreError, Timestamp, VoterId,
    VoterIdentity,
};
use tracing::debug;

use crate::ports::VoterRegistry;

/// Voter and candidate records keyed by id, with unique secondary indexes.
#[derive(Default)]
pub struct InMemoryElectionStore {
    voters: DashMap<VoterId, VoterIdentity>,
    by_phone: DashMap<NormalizedPhone, VoterId>,
    by_pin: DashMap<String, VoterId>,
    candidates: DashMap<CandidateId, Candidate>,
    /// Serializes record creation so the three voter maps stay in step.
    registration: Mutex<()>,
}

impl InMemoryElectionStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn voter_count(&self) -> usize {
        self.voters.len()
    }

    pub fn candidate_count(&self) -> usize {
        self.candidates.len()
    }
}

#[async_trait]
impl ElectionStore for InMemoryElectionStore {
    async fn find_voter_by_phone(
        &self,
        phone: &NormalizedPhone,
    ) -> Result<Option<VoterIdentity>, StoreError> {
        let Some(id) = self.by_phone.get(phone).map(|entry| *entry.value()) else {
            return Ok(None);
        };
        Ok(self.voters.get(&id).map(|v| v.value().clone()))
    }

    async fn find_voter_by_id(&self, id: &VoterId) -> Result<Option<VoterIdentity>, StoreError> {
        Ok(self.voters.get(id).map(|v| v.value().clone()))
    }

    async fn compare_and_set_voted(
        &self,
        id: &VoterId,
        candidate: &CandidateId,
        now: Timestamp,
    ) -> Result<bool, StoreError> {
        // The shard write lock is held for the whole check-and-set.
        let Some(mut voter) = self.voters.get_mut(id) else {
            return Ok(false);
        };
        if voter.has_voted {
            return Ok(false);
        }
        voter.has_voted = true;
        voter.voted_for = Some(*candidate);
        voter.voted_at = Some(now);
        Ok(true)
    }

    async fn increment_candidate_votes(
        &self,
        id: &CandidateId,
    ) -> Result<Option<u64>, StoreError> {
        Ok(self.candidates.get_mut(id).map(|mut candidate| {
            candidate.votes += 1;
            candidate.votes
        }))
    }

    async fn find_candidate_by_id(
        &self,
        id: &CandidateId,
    ) -> Result<Option<Candidate>, StoreError> {
        Ok(self.candidates.get(id).map(|c| c.value().clone()))
    }

    async fn list_candidates(&self) -> Result<Vec<Candidate>, StoreError> {
        let mut candidates: Vec<Candidate> =
            self.candidates.iter().map(|c| c.value().clone()).collect();
        candidates.sort_by(|a, b| a.full_name.cmp(&b.full_name).then(a.id.cmp(&b.id)));
        Ok(candidates)
    }

    async fn count_votes_by_candidate(&self) -> Result<Vec<(CandidateId, u64)>, StoreError> {
        let mut counts: BTreeMap<CandidateId, u64> = self
            .candidates
            .iter()
            .map(|c| (*c.key(), 0))
            .collect();
        for voter in self.voters.iter() {
            if let Some(candidate) = voter.voted_for {
                *counts.entry(candidate).or_insert(0) += 1;
            }
        }
        Ok(counts.into_iter().collect())
    }
}

#[async_trait]
impl VoterRegistry for InMemoryElectionStore {
    async fn register_voter(&self, voter: VoterIdentity) -> Result<(), StoreError> {
        if !voter.is_consistent() {
            return Err(StoreError::Corrupt(format!(
                "voter {} has inconsistent vote fields",
                voter.id
            )));
        }

        let _guard = self.registration.lock();
        if self.voters.contains_key(&voter.id) {
            return Err(StoreError::Duplicate {
                field: "id",
                value: voter.id.to_string(),
            });
        }
        if self.by_pin.contains_key(&voter.pin) {
            return Err(StoreError::Duplicate {
                field: "pin",
                value: voter.pin.clone(),
            });
        }
        if self.by_phone.contains_key(&voter.phone) {
            return Err(StoreError::Duplicate {
                field: "phone",
                value: voter.phone.to_string(),
            });
        }

        debug!(voter_id = %voter.id, phone = %voter.phone.masked(), "Registering voter");
        self.by_pin.insert(voter.pin.clone(), voter.id);
        self.by_phone.insert(voter.phone.clone(), voter.id);
        self.voters.insert(voter.id, voter);
        Ok(())
    }

    async fn register_candidate(&self, candidate: Candidate) -> Result<(), StoreError> {
        let _guard = self.registration.lock();
        if self.candidates.contains_key(&candidate.id) {
            return Err(StoreError::Duplicate {
                field: "id",
                value: candidate.id.to_string(),
            });
        }
        debug!(candidate_id = %candidate.id, name = %candidate.full_name, "Registering candidate");
        self.candidates.insert(candidate.id, candidate);
        Ok(())
    }
}
