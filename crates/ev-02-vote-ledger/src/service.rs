//! # Vote Ledger Service
//!
//! Application service implementing [`VoteLedgerApi`] over an
//! [`ElectionStore`].

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{CandidateId, ElectionStore, TimeSource, Timestamp, VoterId};
use tracing::{debug, error, info, warn};

use crate::domain::{
    ReconcileReport, RetryPolicy, TallyEntry, TallyMismatch, VoteError, VoteReceipt, VoterStatus,
};
use crate::ports::VoteLedgerApi;

pub struct VoteLedgerService {
    store: Arc<dyn ElectionStore>,
    clock: Arc<dyn TimeSource>,
    retry: RetryPolicy,
}

impl VoteLedgerService {
    pub fn new(store: Arc<dyn ElectionStore>, clock: Arc<dyn TimeSource>) -> Self {
        Self::with_retry(store, clock, RetryPolicy::default())
    }

    pub fn with_retry(
        store: Arc<dyn ElectionStore>,
        clock: Arc<dyn TimeSource>,
        retry: RetryPolicy,
    ) -> Self {
        Self {
            store,
            clock,
            retry,
        }
    }
}

/// Increment the tally, retrying transient failures.
async fn increment_with_retry(
    store: &dyn ElectionStore,
    retry: RetryPolicy,
    candidate: &CandidateId,
) -> Result<u64, String> {
    let mut attempt = 1;
    loop {
        match store.increment_candidate_votes(candidate).await {
            Ok(Some(votes)) => return Ok(votes),
            Ok(None) => return Err("candidate disappeared before increment".into()),
            Err(e) if e.is_transient() && attempt < retry.max_attempts => {
                warn!(candidate_id = %candidate, attempt, error = %e, "Tally increment failed, retrying");
                tokio::time::sleep(retry.backoff(attempt)).await;
                attempt += 1;
            }
            Err(e) => return Err(e.to_string()),
        }
    }
}

/// Credit `candidate` for a voter whose CAS already succeeded.
///
/// Runs on its own task: once the voter is marked, the increment and its
/// retries finish even if the caller is dropped.
async fn settle_tally(
    store: Arc<dyn ElectionStore>,
    retry: RetryPolicy,
    voter: VoterId,
    candidate: CandidateId,
    voted_at: Timestamp,
) -> Result<u64, String> {
    let result = increment_with_retry(store.as_ref(), retry, &candidate).await;
    match &result {
        Ok(candidate_votes) => {
            info!(voter_id = %voter, candidate_id = %candidate, candidate_votes, "Vote recorded");
        }
        Err(reason) => {
            error!(
                target: "integrity",
                voter_id = %voter,
                candidate_id = %candidate,
                voted_at,
                reason = %reason,
                "Voter marked as voted but tally increment failed"
            );
        }
    }
    result
}

#[async_trait]
impl VoteLedgerApi for VoteLedgerService {
    async fn cast_vote(
        &self,
        voter_id: &VoterId,
        candidate_id: &CandidateId,
    ) -> Result<VoteReceipt, VoteError> {
        let voter = self
            .store
            .find_voter_by_id(voter_id)
            .await?
            .ok_or(VoteError::VoterNotFound)?;
        if voter.has_voted {
            debug!(voter_id = %voter_id, "Vote refused: already voted");
            return Err(VoteError::AlreadyVoted);
        }

        if self.store.find_candidate_by_id(candidate_id).await?.is_none() {
            return Err(VoteError::CandidateNotFound);
        }

        let now = self.clock.now();
        if !self
            .store
            .compare_and_set_voted(voter_id, candidate_id, now)
            .await?
        {
            info!(voter_id = %voter_id, "Vote refused: lost concurrent race");
            return Err(VoteError::AlreadyVoted);
        }

        let settle = tokio::spawn(settle_tally(
            Arc::clone(&self.store),
            self.retry,
            *voter_id,
            *candidate_id,
            now,
        ));
        let candidate_votes = match settle.await {
            Ok(result) => result,
            Err(join_error) => {
                error!(
                    target: "integrity",
                    voter_id = %voter_id,
                    candidate_id = %candidate_id,
                    voted_at = now,
                    error = %join_error,
                    "Tally task did not complete after voter was marked"
                );
                Err(format!("tally task failed: {join_error}"))
            }
        }
        .map_err(|reason| VoteError::IntegrityViolation {
            voter: *voter_id,
            candidate: *candidate_id,
            reason,
        })?;

        Ok(VoteReceipt {
            voter_id: *voter_id,
            candidate_id: *candidate_id,
            candidate_votes,
            voted_at: now,
        })
    }

    async fn voter_status(&self, voter_id: &VoterId) -> Result<VoterStatus, VoteError> {
        self.store
            .find_voter_by_id(voter_id)
            .await?
            .map(|voter| VoterStatus::from(&voter))
            .ok_or(VoteError::VoterNotFound)
    }

    async fn tally(&self) -> Result<Vec<TallyEntry>, VoteError> {
        let mut entries: Vec<TallyEntry> = self
            .store
            .list_candidates()
            .await?
            .into_iter()
            .map(TallyEntry::from)
            .collect();
        // Stable sort keeps the store's name order among equal tallies.
        entries.sort_by(|a, b| b.votes.cmp(&a.votes));
        Ok(entries)
    }

    async fn reconcile(&self) -> Result<ReconcileReport, VoteError> {
        let candidates = self.store.list_candidates().await?;
        let mut counted: BTreeMap<CandidateId, u64> = self
            .store
            .count_votes_by_candidate()
            .await?
            .into_iter()
            .collect();

        let mut report = ReconcileReport {
            candidates_checked: candidates.len(),
            mismatches: Vec::new(),
        };
        for candidate in &candidates {
            let count = counted.remove(&candidate.id).unwrap_or(0);
            if count != candidate.votes {
                report.mismatches.push(TallyMismatch {
                    candidate_id: candidate.id,
                    recorded: candidate.votes,
                    counted: count,
                });
            }
        }
        // Votes naming a candidate that no longer exists.
        for (candidate_id, count) in counted {
            if count > 0 {
                report.mismatches.push(TallyMismatch {
                    candidate_id,
                    recorded: 0,
                    counted: count,
                });
            }
        }

        if report.is_consistent() {
            info!(candidates = report.candidates_checked, "Tallies reconciled");
        } else {
            warn!(
                target: "integrity",
                mismatches = report.mismatches.len(),
                "Tally reconciliation found mismatches"
            );
        }
        Ok(report)
    }
}
