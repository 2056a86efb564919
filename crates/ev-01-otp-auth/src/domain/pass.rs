//! # Voting Pass
//!
//! A short-lived bearer token returned by a successful verification and
//! required by cast-vote. It ties the vote request to a voter who proved
//! possession of the registered phone.
//!
//! Format: `<voterId>.<expiresAtMs>.<hex tag>` where the tag is
//! `HMAC-SHA256(secret, "voting-pass:" voterId "." expiresAtMs)`. The label
//! keeps pass tags disjoint from code hashes made with the same key.

use shared_types::{Timestamp, VoterId};
use thiserror::Error;

use super::code::OtpSecret;

const PASS_LABEL: &[u8] = b"voting-pass:";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum PassError {
    #[error("malformed voting pass")]
    Malformed,

    #[error("voting pass signature mismatch")]
    BadSignature,

    #[error("voting pass expired")]
    Expired,

    #[error("voting pass issued to a different voter")]
    WrongVoter,
}

/// An encoded voting pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VotingPass {
    pub token: String,
    pub expires_at: Timestamp,
}

/// Issues and checks voting passes.
#[derive(Debug, Clone)]
pub struct PassSigner {
    secret: OtpSecret,
    ttl_ms: u64,
}

impl PassSigner {
    pub fn new(secret: OtpSecret, ttl_ms: u64) -> Self {
        Self { secret, ttl_ms }
    }

    pub fn issue(&self, voter: &VoterId, now: Timestamp) -> VotingPass {
        let expires_at = now.saturating_add(self.ttl_ms);
        let body = format!("{voter}.{expires_at}");
        let tag = self.secret.mac(&[PASS_LABEL, body.as_bytes()]);
        VotingPass {
            token: format!("{body}.{}", hex::encode(tag)),
            expires_at,
        }
    }

    /// Check signature and expiry, returning the voter the pass was issued to.
    pub fn verify(&self, token: &str, now: Timestamp) -> Result<VoterId, PassError> {
        let (body, tag_hex) = token.rsplit_once('.').ok_or(PassError::Malformed)?;
        let (voter, expires_at) = body.split_once('.').ok_or(PassError::Malformed)?;
        let voter: VoterId = voter.parse().map_err(|_| PassError::Malformed)?;
        let expires_at: Timestamp = expires_at.parse().map_err(|_| PassError::Malformed)?;
        let tag = hex::decode(tag_hex).map_err(|_| PassError::Malformed)?;

        if !self.secret.verify(&[PASS_LABEL, body.as_bytes()], &tag) {
            return Err(PassError::BadSignature);
        }
        if now > expires_at {
            return Err(PassError::Expired);
        }
        Ok(voter)
    }

    /// [`Self::verify`], then require the pass to belong to `voter`.
    pub fn verify_for(
        &self,
        token: &str,
        voter: &VoterId,
        now: Timestamp,
    ) -> Result<(), PassError> {
        if self.verify(token, now)? != *voter {
            return Err(PassError::WrongVoter);
        }
        Ok(())
    }
}
