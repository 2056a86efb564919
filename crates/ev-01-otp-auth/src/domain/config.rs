//! OTP tuning knobs.

use std::time::Duration;

/// Runtime settings for [`crate::OtpAuthService`].
#[derive(Debug, Clone)]
pub struct OtpConfig {
    /// Lifetime of an issued code.
    pub ttl: Duration,
    /// Failed attempts allowed before the challenge is discarded.
    pub max_attempts: u32,
    /// Upper bound on live challenges held in memory.
    pub max_entries: usize,
    /// Return the plaintext code in the send-otp response. Development only.
    pub expose_code: bool,
    /// Lifetime of the voting pass returned by a successful verification.
    pub pass_ttl: Duration,
}

impl Default for OtpConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(5 * 60),
            max_attempts: 5,
            max_entries: 100_000,
            expose_code: false,
            pass_ttl: Duration::from_secs(10 * 60),
        }
    }
}

impl OtpConfig {
    pub fn ttl_ms(&self) -> u64 {
        self.ttl.as_millis() as u64
    }

    pub fn pass_ttl_ms(&self) -> u64 {
        self.pass_ttl.as_millis() as u64
    }
}
