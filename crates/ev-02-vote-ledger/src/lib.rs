//! # Vote Ledger Subsystem
//!
//! Moves a verified voter from "unvoted" to "voted" and credits one candidate,
//! exactly once per voter.
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | A voter transitions at most once | `ElectionStore::compare_and_set_voted` |
//! | Losing concurrent calls never touch a tally | CAS runs before the increment |
//! | Tallies only grow by pure increments | `ElectionStore::increment_candidate_votes` |
//! | A failed increment after a recorded vote is never silent | `VoteError::IntegrityViolation`, `integrity` log target |
//!
//! ## Write Ordering
//!
//! ```text
//! find voter ──→ hasVoted? ──→ find candidate ──→ CAS voter ──→ +1 tally
//!     │              │               │                │             │
//!  NotFound     AlreadyVoted   CandidateNotFound  AlreadyVoted   retry, then
//!                                                (lost race)   IntegrityViolation
//! ```
//!
//! The pre-checks give precise errors; the CAS is what makes the transition
//! safe. If every increment retry fails the voter stays recorded as voted and
//! the tally is one short until [`VoteLedgerApi::reconcile`] flags it.

pub mod domain;
pub mod ports;
pub mod service;

pub use domain::{
    ReconcileReport, RetryPolicy, TallyEntry, TallyMismatch, VoteError, VoteReceipt, VoterStatus,
};
pub use ports::VoteLedgerApi;
pub use service::VoteLedgerService;
