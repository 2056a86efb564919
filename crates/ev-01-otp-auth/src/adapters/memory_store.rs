//! # In-Memory Challenge Store
//!
//! Per-phone challenges in a `DashMap`. Attempt handling runs under the
//! entry's shard lock, so concurrent verifies of one phone are serialized.
//!
//! The capacity bound is checked before insert and may be overshot by the
//! number of inserts racing on different shards.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use shared_types::{NormalizedPhone, TimeSource, Timestamp};
use tracing::{debug, warn};

use crate::domain::{hashes_match, AttemptOutcome, CodeHash, OtpChallenge, OtpError};
use crate::ports::ChallengeStore;

pub struct InMemoryChallengeStore {
    entries: DashMap<NormalizedPhone, OtpChallenge>,
    max_entries: usize,
}

impl InMemoryChallengeStore {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: DashMap::new(),
            max_entries,
        }
    }

    fn purge(&self, now: Timestamp) -> usize {
        let before = self.entries.len();
        self.entries.retain(|_, challenge| !challenge.is_expired(now));
        before.saturating_sub(self.entries.len())
    }
}

#[async_trait]
impl ChallengeStore for InMemoryChallengeStore {
    async fn put(
        &self,
        phone: &NormalizedPhone,
        challenge: OtpChallenge,
        now: Timestamp,
    ) -> Result<(), OtpError> {
        if !self.entries.contains_key(phone) && self.entries.len() >= self.max_entries {
            let purged = self.purge(now);
            debug!(purged, "Challenge store at capacity, purged expired entries");
            if self.entries.len() >= self.max_entries {
                warn!(capacity = self.max_entries, "Challenge store full");
                return Err(OtpError::StoreFull);
            }
        }
        self.entries.insert(phone.clone(), challenge);
        Ok(())
    }

    async fn attempt(
        &self,
        phone: &NormalizedPhone,
        presented: &CodeHash,
        now: Timestamp,
        max_attempts: u32,
    ) -> Result<AttemptOutcome, OtpError> {
        let Entry::Occupied(mut entry) = self.entries.entry(phone.clone()) else {
            return Ok(AttemptOutcome::Missing);
        };

        if entry.get().is_expired(now) {
            entry.remove();
            return Ok(AttemptOutcome::Expired);
        }

        if hashes_match(&entry.get().code_hash, presented) {
            entry.remove();
            return Ok(AttemptOutcome::Matched);
        }

        let challenge = entry.get_mut();
        challenge.attempts = challenge.attempts.saturating_add(1);
        if challenge.attempts >= max_attempts {
            entry.remove();
            return Ok(AttemptOutcome::Locked);
        }
        Ok(AttemptOutcome::Mismatch {
            attempts_left: max_attempts - challenge.attempts,
        })
    }

    async fn peek(&self, phone: &NormalizedPhone) -> Option<OtpChallenge> {
        self.entries.get(phone).map(|c| c.value().clone())
    }

    async fn remove(&self, phone: &NormalizedPhone) {
        self.entries.remove(phone);
    }

    async fn purge_expired(&self, now: Timestamp) -> usize {
        self.purge(now)
    }

    async fn live_count(&self) -> usize {
        self.entries.len()
    }
}

/// Periodically drop expired challenges.
///
/// Runs until the task is aborted.
pub async fn sweep_task(
    store: Arc<dyn ChallengeStore>,
    clock: Arc<dyn TimeSource>,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    loop {
        ticker.tick().await;
        let purged = store.purge_expired(clock.now()).await;
        if purged > 0 {
            let remaining = store.live_count().await;
            debug!(purged, remaining, "Swept expired challenges");
        }
    }
}
