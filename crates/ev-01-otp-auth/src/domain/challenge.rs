//! Challenge state kept per phone between send-otp and verify-otp.

use shared_types::Timestamp;

use super::code::CodeHash;

/// A pending one-time code for one phone.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpChallenge {
    pub code_hash: CodeHash,
    pub issued_at: Timestamp,
    pub expires_at: Timestamp,
    /// Failed verification attempts so far.
    pub attempts: u32,
}

impl OtpChallenge {
    pub fn new(code_hash: CodeHash, issued_at: Timestamp, ttl_ms: u64) -> Self {
        Self {
            code_hash,
            issued_at,
            expires_at: issued_at.saturating_add(ttl_ms),
            attempts: 0,
        }
    }

    /// A challenge is still valid at exactly `expires_at`.
    pub fn is_expired(&self, now: Timestamp) -> bool {
        now > self.expires_at
    }
}

/// Result of presenting a code to the challenge store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// No challenge for this phone.
    Missing,
    /// The challenge had expired and was removed.
    Expired,
    /// Wrong code; the challenge stays with `attempts_left` tries.
    Mismatch { attempts_left: u32 },
    /// Wrong code on the last allowed try; the challenge was removed.
    Locked,
    /// Correct code; the challenge was consumed.
    Matched,
}
