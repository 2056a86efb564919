//! # Voting Flow Tests
//!
//! OTP issuance, verification and vote casting wired over one store:
//!
//! ```text
//! IssueOTP ──► VerifyOTP ──► CastVote
//!    │             │             │
//!    └─ challenge  └─ consumed   └─ voter marked, tally +1
//! ```

#[cfg(test)]
mod tests {
    use crate::fixtures::{other_code, Election, T0};
    use ev_01_otp_auth::{ChallengeStore, OtpAuthApi, OtpConfig, OtpError};
    use ev_02_vote_ledger::{VoteError, VoteLedgerApi};
    use shared_types::{normalize_phone, ElectionStore};

    const PHONE: &str = "9876543210";

    // =========================================================================
    // REFERENCE SCENARIO
    // =========================================================================

    /// Voter 9876543210 signs in, votes for C1, then tries C2 and a new OTP.
    #[tokio::test]
    async fn test_reference_scenario() {
        let election = Election::new();
        let voter_id = election.add_voter("Asha", "1234", PHONE).await;
        let c1 = election.add_candidate("Arun", "Party A").await;
        let c2 = election.add_candidate("Bina", "Party B").await;

        let issued = election.otp.issue_otp(PHONE).await.unwrap();
        assert_eq!(issued.expires_at, T0 + 300_000);
        let code = election.delivered_code(PHONE);
        assert_eq!(code.len(), 6);

        let verified = election.otp.verify_otp(PHONE, &code).await.unwrap();
        assert_eq!(verified.voter_id, voter_id);
        assert!(!verified.has_voted);
        assert!(verified.voting_pass.is_some());

        let receipt = election.ledger.cast_vote(&voter_id, &c1).await.unwrap();
        assert_eq!(receipt.candidate_votes, 1);

        let second = election.ledger.cast_vote(&voter_id, &c2).await;
        assert!(matches!(second, Err(VoteError::AlreadyVoted)));

        let tally = election.ledger.tally().await.unwrap();
        let votes_for = |id| tally.iter().find(|t| t.candidate_id == id).unwrap().votes;
        assert_eq!(votes_for(c1), 1);
        assert_eq!(votes_for(c2), 0);

        let refused = election.otp.issue_otp(PHONE).await;
        assert!(matches!(refused, Err(OtpError::AlreadyVoted)));
        assert_eq!(election.challenges.live_count().await, 0);
        assert_eq!(election.delivery.sent_count(), 1);
    }

    // =========================================================================
    // OTP LIFECYCLE
    // =========================================================================

    #[tokio::test]
    async fn test_code_is_single_use() {
        let election = Election::new();
        election.add_voter("Asha", "1234", PHONE).await;

        election.otp.issue_otp(PHONE).await.unwrap();
        let code = election.delivered_code(PHONE);

        assert!(election.otp.verify_otp(PHONE, &code).await.is_ok());
        assert!(matches!(
            election.otp.verify_otp(PHONE, &code).await,
            Err(OtpError::ChallengeNotFound)
        ));
    }

    #[tokio::test]
    async fn test_expired_code_rejected_regardless_of_value() {
        let election = Election::new();
        election.add_voter("Asha", "1234", PHONE).await;

        election.otp.issue_otp(PHONE).await.unwrap();
        let code = election.delivered_code(PHONE);
        election.clock.advance(300_001);

        assert!(matches!(
            election.otp.verify_otp(PHONE, &code).await,
            Err(OtpError::Expired)
        ));
        // Expired challenges are dropped on first touch.
        assert!(election
            .challenges
            .peek(&normalize_phone(PHONE))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_code_valid_at_exact_expiry() {
        let election = Election::new();
        election.add_voter("Asha", "1234", PHONE).await;

        election.otp.issue_otp(PHONE).await.unwrap();
        let code = election.delivered_code(PHONE);
        election.clock.advance(300_000);

        assert!(election.otp.verify_otp(PHONE, &code).await.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_code_keeps_challenge() {
        let election = Election::new();
        election.add_voter("Asha", "1234", PHONE).await;

        election.otp.issue_otp(PHONE).await.unwrap();
        let code = election.delivered_code(PHONE);

        let wrong = election.otp.verify_otp(PHONE, &other_code(&code)).await;
        assert!(matches!(wrong, Err(OtpError::InvalidCode { attempts_left: 4 })));

        assert!(election.otp.verify_otp(PHONE, &code).await.is_ok());
    }

    #[tokio::test]
    async fn test_reissue_replaces_previous_code() {
        let election = Election::new();
        election.add_voter("Asha", "1234", PHONE).await;

        election.otp.issue_otp(PHONE).await.unwrap();
        let first = election.delivered_code(PHONE);
        election.otp.issue_otp(PHONE).await.unwrap();
        let second = election.delivered_code(PHONE);

        if first != second {
            assert!(matches!(
                election.otp.verify_otp(PHONE, &first).await,
                Err(OtpError::InvalidCode { .. })
            ));
        }
        assert!(election.otp.verify_otp(PHONE, &second).await.is_ok());
    }

    #[tokio::test]
    async fn test_phone_formats_share_one_challenge() {
        let election = Election::new();
        let voter_id = election.add_voter("Asha", "1234", PHONE).await;

        election.otp.issue_otp("+91 98765-43210").await.unwrap();
        let code = election.delivered_code(PHONE);

        let verified = election.otp.verify_otp("(987) 654 3210", &code).await.unwrap();
        assert_eq!(verified.voter_id, voter_id);
    }

    #[tokio::test]
    async fn test_unknown_phone_stores_nothing() {
        let election = Election::new();
        assert!(matches!(
            election.otp.issue_otp("1111111111").await,
            Err(OtpError::VoterNotFound)
        ));
        assert_eq!(election.challenges.live_count().await, 0);
        assert_eq!(election.delivery.sent_count(), 0);
    }

    #[tokio::test]
    async fn test_delivery_failure_keeps_challenge() {
        let election = Election::new();
        election.add_voter("Asha", "1234", PHONE).await;
        election.delivery.set_failing(true);

        let issued = election.otp.issue_otp(PHONE).await.unwrap();
        assert!(!issued.delivered);
        assert_eq!(election.challenges.live_count().await, 1);
    }

    #[tokio::test]
    async fn test_dev_code_exposure() {
        let election = Election::with_config(OtpConfig {
            expose_code: true,
            ..OtpConfig::default()
        });
        election.add_voter("Asha", "1234", PHONE).await;

        let issued = election.otp.issue_otp(PHONE).await.unwrap();
        assert_eq!(issued.dev_code, Some(election.delivered_code(PHONE)));
    }

    // =========================================================================
    // VOTING PASS
    // =========================================================================

    #[tokio::test]
    async fn test_voting_pass_authorizes_only_its_voter() {
        let election = Election::new();
        let asha = election.add_voter("Asha", "1234", PHONE).await;
        let ravi = election.add_voter("Ravi", "5678", "9000000001").await;

        election.otp.issue_otp(PHONE).await.unwrap();
        let code = election.delivered_code(PHONE);
        let pass = election
            .otp
            .verify_otp(PHONE, &code)
            .await
            .unwrap()
            .voting_pass
            .unwrap();

        assert!(election.otp.authorize_vote(&pass.token, &asha).is_ok());
        assert!(election.otp.authorize_vote(&pass.token, &ravi).is_err());

        election.clock.advance(10 * 60 * 1000 + 1);
        assert!(election.otp.authorize_vote(&pass.token, &asha).is_err());
    }

    #[tokio::test]
    async fn test_voted_voter_verifying_gets_no_pass() {
        let election = Election::new();
        let voter_id = election.add_voter("Asha", "1234", PHONE).await;
        let c1 = election.add_candidate("Arun", "Party A").await;

        // Challenge issued before the vote, verified after it.
        election.otp.issue_otp(PHONE).await.unwrap();
        let code = election.delivered_code(PHONE);
        election.ledger.cast_vote(&voter_id, &c1).await.unwrap();

        let verified = election.otp.verify_otp(PHONE, &code).await.unwrap();
        assert!(verified.has_voted);
        assert!(verified.voting_pass.is_none());
    }

    // =========================================================================
    // LEDGER
    // =========================================================================

    #[tokio::test]
    async fn test_status_reflects_vote() {
        let election = Election::new();
        let voter_id = election.sign_in_new_voter().await;
        let c1 = election.add_candidate("Arun", "Party A").await;

        let before = election.ledger.voter_status(&voter_id).await.unwrap();
        assert!(!before.has_voted);
        assert_eq!(before.voted_for, None);

        election.clock.advance(5_000);
        election.ledger.cast_vote(&voter_id, &c1).await.unwrap();

        let after = election.ledger.voter_status(&voter_id).await.unwrap();
        assert!(after.has_voted);
        assert_eq!(after.voted_for, Some(c1));
        assert_eq!(after.voted_at, Some(T0 + 5_000));

        let stored = election.store.find_voter_by_id(&voter_id).await.unwrap().unwrap();
        assert!(stored.is_consistent());
    }

    #[tokio::test]
    async fn test_unknown_candidate_leaves_voter_unvoted() {
        let election = Election::new();
        let voter_id = election.sign_in_new_voter().await;

        let result = election
            .ledger
            .cast_vote(&voter_id, &shared_types::CandidateId::new())
            .await;
        assert!(matches!(result, Err(VoteError::CandidateNotFound)));

        let status = election.ledger.voter_status(&voter_id).await.unwrap();
        assert!(!status.has_voted);
    }

    impl Election {
        async fn sign_in_new_voter(&self) -> shared_types::VoterId {
            self.add_voter("Asha", "1234", PHONE).await;
            self.sign_in(PHONE).await
        }
    }
}
