//! Cross-crate flows.

pub mod concurrency;
pub mod http_flows;
pub mod voting_flows;
