//! # Inbound Port
//!
//! The OTP API offered to the HTTP gateway.

use async_trait::async_trait;
use shared_types::{NormalizedPhone, Timestamp, VoterId};

use crate::domain::{OtpError, PassError, VotingPass};

/// Result of a successful send-otp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedOtp {
    pub phone: NormalizedPhone,
    pub expires_at: Timestamp,
    /// False if the delivery channel reported a failure.
    pub delivered: bool,
    /// Plaintext code, only when exposure is enabled outside production.
    pub dev_code: Option<String>,
}

/// Result of a successful verify-otp.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifiedVoter {
    pub voter_id: VoterId,
    pub has_voted: bool,
    /// Present only when the voter can still vote.
    pub voting_pass: Option<VotingPass>,
}

#[async_trait]
pub trait OtpAuthApi: Send + Sync {
    /// Issue a code to the voter registered under `phone`.
    ///
    /// # Errors
    /// - `VoterNotFound`, `AlreadyVoted`: no challenge is stored
    /// - `StoreFull`, `UpstreamUnavailable`
    async fn issue_otp(&self, phone: &str) -> Result<IssuedOtp, OtpError>;

    /// Check `code` against the live challenge for `phone`.
    ///
    /// # Errors
    /// - `ChallengeNotFound`, `Expired`, `InvalidCode`, `AttemptsExceeded`
    /// - `VoterNotFound` if the voter was removed after issuance
    async fn verify_otp(&self, phone: &str, code: &str) -> Result<VerifiedVoter, OtpError>;

    /// Check a voting pass presented for `voter`.
    fn authorize_vote(&self, token: &str, voter: &VoterId) -> Result<(), PassError>;
}
