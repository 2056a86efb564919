//! Ports layer for the vote ledger.

pub mod inbound;

pub use inbound::VoteLedgerApi;
