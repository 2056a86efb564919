//! OTP error types.

use shared_types::StoreError;
use thiserror::Error;

/// Errors returned by issue and verify.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OtpError {
    /// No voter is registered under the phone.
    #[error("voter not found")]
    VoterNotFound,

    /// The voter has already cast a ballot.
    #[error("voter has already voted")]
    AlreadyVoted,

    /// No live challenge exists for the phone.
    #[error("no pending otp for this phone")]
    ChallengeNotFound,

    /// The challenge outlived its TTL.
    #[error("otp has expired")]
    Expired,

    /// Wrong code; the challenge is still live.
    #[error("invalid otp ({attempts_left} attempts left)")]
    InvalidCode { attempts_left: u32 },

    /// Wrong code on the last allowed attempt; a new code is required.
    #[error("too many failed attempts")]
    AttemptsExceeded,

    /// The challenge store is at capacity.
    #[error("otp store is full")]
    StoreFull,

    /// The voter store failed.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// The configured secret cannot key the MAC.
    #[error("invalid otp secret")]
    InvalidSecret,
}

impl From<StoreError> for OtpError {
    fn from(err: StoreError) -> Self {
        OtpError::UpstreamUnavailable(err.to_string())
    }
}

impl OtpError {
    /// True for outcomes the client caused, as opposed to server faults.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            OtpError::StoreFull | OtpError::UpstreamUnavailable(_) | OtpError::InvalidSecret
        )
    }
}
