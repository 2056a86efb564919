//! Domain layer for the vote ledger.

pub mod entities;
pub mod errors;
pub mod retry;

pub use entities::{ReconcileReport, TallyEntry, TallyMismatch, VoteReceipt, VoterStatus};
pub use errors::VoteError;
pub use retry::RetryPolicy;
