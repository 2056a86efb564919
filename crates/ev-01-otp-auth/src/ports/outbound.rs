//! # Outbound Ports
//!
//! Dependencies the OTP service needs from the outside world.
//!
//! | Trait | Purpose |
//! |-------|---------|
//! | `ChallengeStore` | Per-phone pending challenges with atomic attempt handling |
//! | `CodeDelivery` | Hand the plaintext code to SMS or another channel |

use async_trait::async_trait;
use shared_types::{NormalizedPhone, Timestamp};
use thiserror::Error;

use crate::domain::{AttemptOutcome, CodeHash, OtpChallenge, OtpCode, OtpError};

/// Storage for pending challenges.
///
/// A shared implementation (e.g. a TTL cache with atomic scripts) is required
/// when more than one service instance serves the same election.
#[async_trait]
pub trait ChallengeStore: Send + Sync {
    /// Store `challenge` for `phone`, replacing any earlier one.
    ///
    /// # Errors
    /// - `StoreFull` if capacity is reached even after dropping expired entries
    async fn put(
        &self,
        phone: &NormalizedPhone,
        challenge: OtpChallenge,
        now: Timestamp,
    ) -> Result<(), OtpError>;

    /// Present a code hash.
    ///
    /// Expiry check, comparison, attempt counting and removal happen as one
    /// step, so two concurrent correct submissions cannot both match.
    async fn attempt(
        &self,
        phone: &NormalizedPhone,
        presented: &CodeHash,
        now: Timestamp,
        max_attempts: u32,
    ) -> Result<AttemptOutcome, OtpError>;

    /// Read the live challenge without touching it.
    async fn peek(&self, phone: &NormalizedPhone) -> Option<OtpChallenge>;

    /// Drop a challenge.
    async fn remove(&self, phone: &NormalizedPhone);

    /// Drop every challenge expired at `now`, returning how many were removed.
    async fn purge_expired(&self, now: Timestamp) -> usize;

    /// Number of challenges currently held.
    async fn live_count(&self) -> usize;
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("code delivery failed: {0}")]
pub struct DeliveryError(pub String);

/// Channel that carries the plaintext code to the voter.
#[async_trait]
pub trait CodeDelivery: Send + Sync {
    async fn send_code(&self, phone: &NormalizedPhone, code: &OtpCode) -> Result<(), DeliveryError>;
}
