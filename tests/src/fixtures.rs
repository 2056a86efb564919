//! Shared test fixtures.

use std::sync::Arc;

use ev_01_otp_auth::{
    CapturingDelivery, InMemoryChallengeStore, OtpAuthApi, OtpAuthService, OtpConfig, OtpSecret,
};
use ev_02_vote_ledger::{RetryPolicy, VoteLedgerService};
use ev_03_election_store::{InMemoryElectionStore, VoterRegistry};
use shared_types::{
    normalize_phone, Candidate, CandidateId, ManualTimeSource, VoterId, VoterIdentity,
};

/// Start of every test clock, in ms since the epoch.
pub const T0: u64 = 1_700_000_000_000;

/// OTP and ledger services over one in-memory store.
pub struct Election {
    pub store: Arc<InMemoryElectionStore>,
    pub challenges: Arc<InMemoryChallengeStore>,
    pub delivery: Arc<CapturingDelivery>,
    pub clock: Arc<ManualTimeSource>,
    pub otp: Arc<OtpAuthService>,
    pub ledger: Arc<VoteLedgerService>,
}

impl Election {
    pub fn new() -> Self {
        Self::with_config(OtpConfig::default())
    }

    pub fn with_config(config: OtpConfig) -> Self {
        let store = Arc::new(InMemoryElectionStore::new());
        let challenges = Arc::new(InMemoryChallengeStore::new(config.max_entries));
        let delivery = Arc::new(CapturingDelivery::new());
        let clock = Arc::new(ManualTimeSource::new(T0));

        let otp = Arc::new(OtpAuthService::new(
            store.clone(),
            challenges.clone(),
            delivery.clone(),
            clock.clone(),
            OtpSecret::new(b"integration-test-secret-32-bytes").expect("non-empty key"),
            config,
        ));
        let ledger = Arc::new(VoteLedgerService::with_retry(
            store.clone(),
            clock.clone(),
            RetryPolicy::none(),
        ));

        Self {
            store,
            challenges,
            delivery,
            clock,
            otp,
            ledger,
        }
    }

    pub async fn add_voter(&self, name: &str, pin: &str, phone: &str) -> VoterId {
        let voter = VoterIdentity::new(name, pin, normalize_phone(phone));
        let id = voter.id;
        self.store
            .register_voter(voter)
            .await
            .expect("voter registration");
        id
    }

    pub async fn add_candidate(&self, name: &str, party: &str) -> CandidateId {
        let candidate = Candidate::new(name, party);
        let id = candidate.id;
        self.store
            .register_candidate(candidate)
            .await
            .expect("candidate registration");
        id
    }

    /// Code most recently delivered to `phone`.
    pub fn delivered_code(&self, phone: &str) -> String {
        self.delivery
            .last_code(&normalize_phone(phone))
            .expect("a code was delivered")
    }

    /// Issue and verify in one step.
    pub async fn sign_in(&self, phone: &str) -> VoterId {
        self.otp.issue_otp(phone).await.expect("issue");
        let code = self.delivered_code(phone);
        self.otp
            .verify_otp(phone, &code)
            .await
            .expect("verify")
            .voter_id
    }
}

impl Default for Election {
    fn default() -> Self {
        Self::new()
    }
}

/// A six-digit code guaranteed to differ from `code`.
pub fn other_code(code: &str) -> String {
    if code == "000000" { "000001" } else { "000000" }.to_string()
}
