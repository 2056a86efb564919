//! # OTP Authentication Service
//!
//! Application service implementing [`OtpAuthApi`].
//!
//! It holds the outbound ports (voter store, challenge store, delivery
//! channel, clock) and delegates hashing and pass signing to the domain.

use std::sync::Arc;

use async_trait::async_trait;
use shared_types::{normalize_phone, ElectionStore, TimeSource, VoterId};
use tracing::{info, warn};

use crate::domain::{
    AttemptOutcome, OtpChallenge, OtpCode, OtpConfig, OtpError, OtpSecret, PassError, PassSigner,
};
use crate::ports::{ChallengeStore, CodeDelivery, IssuedOtp, OtpAuthApi, VerifiedVoter};

pub struct OtpAuthService {
    voters: Arc<dyn ElectionStore>,
    challenges: Arc<dyn ChallengeStore>,
    delivery: Arc<dyn CodeDelivery>,
    clock: Arc<dyn TimeSource>,
    secret: OtpSecret,
    passes: PassSigner,
    config: OtpConfig,
}

impl OtpAuthService {
    pub fn new(
        voters: Arc<dyn ElectionStore>,
        challenges: Arc<dyn ChallengeStore>,
        delivery: Arc<dyn CodeDelivery>,
        clock: Arc<dyn TimeSource>,
        secret: OtpSecret,
        config: OtpConfig,
    ) -> Self {
        let passes = PassSigner::new(secret.clone(), config.pass_ttl_ms());
        Self {
            voters,
            challenges,
            delivery,
            clock,
            secret,
            passes,
            config,
        }
    }

    pub fn config(&self) -> &OtpConfig {
        &self.config
    }

    /// The challenge store, for sweeping and health reporting.
    pub fn challenges(&self) -> Arc<dyn ChallengeStore> {
        Arc::clone(&self.challenges)
    }
}

#[async_trait]
impl OtpAuthApi for OtpAuthService {
    async fn issue_otp(&self, raw_phone: &str) -> Result<IssuedOtp, OtpError> {
        let phone = normalize_phone(raw_phone);
        let voter = self
            .voters
            .find_voter_by_phone(&phone)
            .await?
            .ok_or(OtpError::VoterNotFound)?;

        if voter.has_voted {
            info!(voter_id = %voter.id, "OTP refused: voter has already voted");
            return Err(OtpError::AlreadyVoted);
        }

        let code = OtpCode::generate();
        let now = self.clock.now();
        let challenge = OtpChallenge::new(
            self.secret.hash(&phone, code.as_str()),
            now,
            self.config.ttl_ms(),
        );
        let expires_at = challenge.expires_at;
        self.challenges.put(&phone, challenge, now).await?;

        // The challenge stays live on delivery failure so the voter can retry
        // verification if the message arrives late.
        let delivered = match self.delivery.send_code(&phone, &code).await {
            Ok(()) => true,
            Err(e) => {
                warn!(phone = %phone.masked(), error = %e, "OTP delivery failed");
                false
            }
        };

        info!(voter_id = %voter.id, phone = %phone.masked(), expires_at, "OTP issued");

        Ok(IssuedOtp {
            phone,
            expires_at,
            delivered,
            dev_code: self.config.expose_code.then(|| code.as_str().to_string()),
        })
    }

    async fn verify_otp(&self, raw_phone: &str, code: &str) -> Result<VerifiedVoter, OtpError> {
        let phone = normalize_phone(raw_phone);
        let presented = self.secret.hash(&phone, code.trim());
        let now = self.clock.now();

        match self
            .challenges
            .attempt(&phone, &presented, now, self.config.max_attempts)
            .await?
        {
            AttemptOutcome::Matched => {}
            AttemptOutcome::Missing => return Err(OtpError::ChallengeNotFound),
            AttemptOutcome::Expired => return Err(OtpError::Expired),
            AttemptOutcome::Mismatch { attempts_left } => {
                info!(phone = %phone.masked(), attempts_left, "OTP mismatch");
                return Err(OtpError::InvalidCode { attempts_left });
            }
            AttemptOutcome::Locked => {
                warn!(phone = %phone.masked(), "OTP attempt limit reached, challenge discarded");
                return Err(OtpError::AttemptsExceeded);
            }
        }

        let voter = self
            .voters
            .find_voter_by_phone(&phone)
            .await?
            .ok_or(OtpError::VoterNotFound)?;

        info!(voter_id = %voter.id, has_voted = voter.has_voted, "OTP verified");

        Ok(VerifiedVoter {
            voter_id: voter.id,
            has_voted: voter.has_voted,
            voting_pass: (!voter.has_voted).then(|| self.passes.issue(&voter.id, now)),
        })
    }

    fn authorize_vote(&self, token: &str, voter: &VoterId) -> Result<(), PassError> {
        self.passes.verify_for(token, voter, self.clock.now())
    }
}
