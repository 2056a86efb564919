//! # Double Voting
//!
//! A verified voter tries to vote twice: by replaying the voting pass, by
//! forging a pass for someone else, and by racing two casts.

#[cfg(test)]
mod tests {
    use crate::fixtures::Election;
    use ev_01_otp_auth::{OtpAuthApi, PassError};
    use ev_02_vote_ledger::{VoteError, VoteLedgerApi};
    use std::sync::Arc;

    const PHONE: &str = "9876543210";

    async fn pass_for(election: &Election, phone: &str) -> String {
        election.otp.issue_otp(phone).await.unwrap();
        let code = election.delivered_code(phone);
        election
            .otp
            .verify_otp(phone, &code)
            .await
            .unwrap()
            .voting_pass
            .unwrap()
            .token
    }

    #[tokio::test]
    async fn test_replayed_pass_cannot_vote_again() {
        let election = Election::new();
        let voter = election.add_voter("Asha", "1234", PHONE).await;
        let c1 = election.add_candidate("Arun", "Party A").await;
        let c2 = election.add_candidate("Bina", "Party B").await;
        let pass = pass_for(&election, PHONE).await;

        election.otp.authorize_vote(&pass, &voter).unwrap();
        election.ledger.cast_vote(&voter, &c1).await.unwrap();

        // The pass is still well-formed; the ledger is what refuses.
        election.otp.authorize_vote(&pass, &voter).unwrap();
        assert!(matches!(
            election.ledger.cast_vote(&voter, &c2).await,
            Err(VoteError::AlreadyVoted)
        ));
    }

    #[tokio::test]
    async fn test_pass_rewritten_for_other_voter_rejected() {
        let election = Election::new();
        election.add_voter("Asha", "1234", PHONE).await;
        let ravi = election.add_voter("Ravi", "5678", "9000000001").await;
        let pass = pass_for(&election, PHONE).await;

        // Swap the voter id, keep the tag.
        let (_, rest) = pass.split_once('.').unwrap();
        let forged = format!("{ravi}.{rest}");

        assert_eq!(
            election.otp.authorize_vote(&forged, &ravi),
            Err(PassError::BadSignature)
        );
    }

    #[tokio::test]
    async fn test_extended_expiry_rejected() {
        let election = Election::new();
        let voter = election.add_voter("Asha", "1234", PHONE).await;
        let pass = pass_for(&election, PHONE).await;

        let mut parts: Vec<&str> = pass.split('.').collect();
        let extended = (parts[1].parse::<u64>().unwrap() + 86_400_000).to_string();
        parts[1] = &extended;
        let forged = parts.join(".");

        assert_eq!(
            election.otp.authorize_vote(&forged, &voter),
            Err(PassError::BadSignature)
        );
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_racing_casts_credit_one_candidate() {
        let election = Arc::new(Election::new());
        let voter = election.add_voter("Asha", "1234", PHONE).await;
        let c1 = election.add_candidate("Arun", "Party A").await;
        let c2 = election.add_candidate("Bina", "Party B").await;

        let (a, b) = tokio::join!(
            {
                let election = Arc::clone(&election);
                tokio::spawn(async move { election.ledger.cast_vote(&voter, &c1).await })
            },
            {
                let election = Arc::clone(&election);
                tokio::spawn(async move { election.ledger.cast_vote(&voter, &c2).await })
            }
        );
        let results = [a.unwrap(), b.unwrap()];
        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);

        let total: u64 = election
            .ledger
            .tally()
            .await
            .unwrap()
            .iter()
            .map(|t| t.votes)
            .sum();
        assert_eq!(total, 1);
        assert!(election.ledger.reconcile().await.unwrap().is_consistent());
    }
}
