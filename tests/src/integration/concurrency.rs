//! # Concurrency Tests
//!
//! Racing requests on a multi-threaded runtime. The store's compare-and-set
//! is the only serialization point; nothing here takes an application lock.

#[cfg(test)]
mod tests {
    use crate::fixtures::Election;
    use ev_01_otp_auth::OtpAuthApi;
    use ev_02_vote_ledger::{VoteError, VoteLedgerApi};
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::task::JoinSet;

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_casts_for_one_voter_single_winner() {
        let election = Arc::new(Election::new());
        let voter = election.add_voter("Asha", "1234", "9876543210").await;
        let candidates = [
            election.add_candidate("Arun", "Party A").await,
            election.add_candidate("Bina", "Party B").await,
            election.add_candidate("Chetan", "Party C").await,
        ];

        let mut tasks = JoinSet::new();
        for i in 0..60 {
            let election = Arc::clone(&election);
            let candidate = candidates[i % candidates.len()];
            tasks.spawn(async move { election.ledger.cast_vote(&voter, &candidate).await });
        }

        let mut wins = 0;
        let mut already_voted = 0;
        while let Some(result) = tasks.join_next().await {
            match result.unwrap() {
                Ok(_) => wins += 1,
                Err(VoteError::AlreadyVoted) => already_voted += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }

        assert_eq!(wins, 1);
        assert_eq!(already_voted, 59);

        let total: u64 = election
            .ledger
            .tally()
            .await
            .unwrap()
            .iter()
            .map(|t| t.votes)
            .sum();
        assert_eq!(total, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_tallies_match_distinct_voters() {
        let election = Arc::new(Election::new());
        let candidates = [
            election.add_candidate("Arun", "Party A").await,
            election.add_candidate("Bina", "Party B").await,
        ];

        let mut voters = Vec::new();
        for i in 0..40u32 {
            let phone = format!("90000{:05}", i);
            voters.push(election.add_voter("Voter", &format!("pin-{i}"), &phone).await);
        }

        // Every voter fires three casts at once, split across candidates.
        let mut tasks = JoinSet::new();
        for (i, voter) in voters.iter().copied().enumerate() {
            for attempt in 0..3 {
                let election = Arc::clone(&election);
                let candidate = candidates[(i + attempt) % 2];
                tasks.spawn(async move {
                    election
                        .ledger
                        .cast_vote(&voter, &candidate)
                        .await
                        .map(|r| (voter, r.candidate_id))
                });
            }
        }

        let mut winners: HashMap<_, _> = HashMap::new();
        while let Some(result) = tasks.join_next().await {
            match result.unwrap() {
                Ok((voter, candidate)) => {
                    assert!(winners.insert(voter, candidate).is_none(), "voter won twice");
                }
                Err(VoteError::AlreadyVoted) => {}
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(winners.len(), voters.len());

        let tally = election.ledger.tally().await.unwrap();
        for candidate in candidates {
            let expected = winners.values().filter(|c| **c == candidate).count() as u64;
            let recorded = tally
                .iter()
                .find(|t| t.candidate_id == candidate)
                .unwrap()
                .votes;
            assert_eq!(recorded, expected);
        }

        let report = election.ledger.reconcile().await.unwrap();
        assert!(report.is_consistent());
        assert_eq!(report.candidates_checked, 2);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_aborted_casts_never_strand_a_voter() {
        let election = Arc::new(Election::new());
        let candidate = election.add_candidate("Arun", "Party A").await;

        let mut voters = Vec::new();
        for i in 0..50u32 {
            let phone = format!("91000{:05}", i);
            voters.push(election.add_voter("Voter", &format!("pin-{i}"), &phone).await);
        }

        // Abort every request at whatever point it has reached.
        let mut tasks = JoinSet::new();
        for voter in voters.iter().copied() {
            let election = Arc::clone(&election);
            tasks.spawn(async move { election.ledger.cast_vote(&voter, &candidate).await });
        }
        tokio::task::yield_now().await;
        tasks.abort_all();
        while tasks.join_next().await.is_some() {}

        let mut marked = 0u64;
        for voter in &voters {
            if election.ledger.voter_status(voter).await.unwrap().has_voted {
                marked += 1;
            }
        }

        // Tally updates that outlived their request land shortly after.
        let mut recorded = 0;
        for _ in 0..200 {
            recorded = election.ledger.tally().await.unwrap()[0].votes;
            if recorded == marked {
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert_eq!(recorded, marked);
        assert!(election.ledger.reconcile().await.unwrap().is_consistent());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn test_concurrent_verifies_consume_code_once() {
        let election = Arc::new(Election::new());
        election.add_voter("Asha", "1234", "9876543210").await;
        election.otp.issue_otp("9876543210").await.unwrap();
        let code = election.delivered_code("9876543210");

        let mut tasks = JoinSet::new();
        for _ in 0..32 {
            let election = Arc::clone(&election);
            let code = code.clone();
            tasks.spawn(async move { election.otp.verify_otp("9876543210", &code).await });
        }

        let mut successes = 0;
        while let Some(result) = tasks.join_next().await {
            if result.unwrap().is_ok() {
                successes += 1;
            }
        }
        assert_eq!(successes, 1);
    }
}
