//! # Election Store
//!
//! Record store for voters and candidates implementing the
//! [`shared_types::ElectionStore`] persistence port, plus the voter-roll
//! import used to seed it.
//!
//! ## Module Structure
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │  adapters/memory.rs  - InMemoryElectionStore (DashMap)       │
//! └──────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌──────────────────────────────────────────────────────────────┐
//! │  ports/registry.rs   - VoterRegistry (admin-side writes)     │
//! │  shared_types::ports - ElectionStore (core-side contract)    │
//! └──────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌──────────────────────────────────────────────────────────────┐
//! │  domain/import.rs    - seed file parsing and row validation  │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Atomicity
//!
//! Each voter and candidate record lives in one `DashMap` slot. The vote
//! flag and the tally are updated while holding that slot's shard lock, so
//! `compare_and_set_voted` and `increment_candidate_votes` are single
//! indivisible steps.

pub mod adapters;
pub mod domain;
pub mod ports;

pub use adapters::InMemoryElectionStore;
pub use domain::import::{
    import_seed, load_seed_file, validate_voter_rows, CandidateRow, ImportError, ImportErrorCode,
    ImportReport, RowError, SeedFile, VoterRow,
};
pub use ports::VoterRegistry;
