//! # OTP Guessing
//!
//! An attacker who knows a voter's phone number tries to guess the code.
//! The per-challenge attempt cap must end the attempt long before the
//! million-code space is searched, and the response for a missing challenge
//! must not differ from a wrong guess.

#[cfg(test)]
mod tests {
    use crate::fixtures::{other_code, Election};
    use ev_01_otp_auth::{ChallengeStore, OtpAuthApi, OtpConfig, OtpError};
    use ev_04_api_gateway::ApiError;
    use shared_types::normalize_phone;

    const VICTIM: &str = "9876543210";

    #[tokio::test]
    async fn test_guessing_locks_challenge() {
        let election = Election::with_config(OtpConfig {
            max_attempts: 3,
            ..OtpConfig::default()
        });
        election.add_voter("Asha", "1234", VICTIM).await;
        election.otp.issue_otp(VICTIM).await.unwrap();
        let code = election.delivered_code(VICTIM);
        let wrong = other_code(&code);

        assert!(matches!(
            election.otp.verify_otp(VICTIM, &wrong).await,
            Err(OtpError::InvalidCode { attempts_left: 2 })
        ));
        assert!(matches!(
            election.otp.verify_otp(VICTIM, &wrong).await,
            Err(OtpError::InvalidCode { attempts_left: 1 })
        ));
        assert!(matches!(
            election.otp.verify_otp(VICTIM, &wrong).await,
            Err(OtpError::AttemptsExceeded)
        ));

        // The real code is now useless too.
        assert!(matches!(
            election.otp.verify_otp(VICTIM, &code).await,
            Err(OtpError::ChallengeNotFound)
        ));
        assert!(election
            .challenges
            .peek(&normalize_phone(VICTIM))
            .await
            .is_none());
    }

    #[tokio::test]
    async fn test_guess_without_challenge_matches_wrong_guess() {
        let election = Election::new();
        election.add_voter("Asha", "1234", VICTIM).await;
        election.add_voter("Ravi", "5678", "9000000001").await;

        // No challenge for Ravi; a live one for Asha.
        let unissued = election.otp.verify_otp("9000000001", "123456").await.unwrap_err();

        election.otp.issue_otp(VICTIM).await.unwrap();
        let code = election.delivered_code(VICTIM);
        let guess = election
            .otp
            .verify_otp(VICTIM, &other_code(&code))
            .await
            .unwrap_err();

        assert_eq!(ApiError::from(unissued), ApiError::from(guess));
    }

    #[tokio::test]
    async fn test_code_bound_to_phone() {
        let election = Election::new();
        election.add_voter("Asha", "1234", VICTIM).await;
        election.add_voter("Ravi", "5678", "9000000001").await;

        election.otp.issue_otp(VICTIM).await.unwrap();
        election.otp.issue_otp("9000000001").await.unwrap();
        let victim_code = election.delivered_code(VICTIM);
        let attacker_code = election.delivered_code("9000000001");

        if victim_code != attacker_code {
            assert!(election
                .otp
                .verify_otp("9000000001", &victim_code)
                .await
                .is_err());
        }
        assert!(election.otp.verify_otp(VICTIM, &victim_code).await.is_ok());
    }
}
