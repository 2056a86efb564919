//! # Election Service Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── fixtures.rs       # Wired services over the in-memory store
//! ├── integration/      # Cross-crate flows
//! │   ├── voting_flows.rs
//! │   ├── concurrency.rs
//! │   └── http_flows.rs
//! └── exploits/         # Attack simulations
//!     ├── otp_guessing.rs
//!     └── double_vote.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p ev-tests
//! cargo test -p ev-tests integration::
//! cargo test -p ev-tests exploits::
//! ```

#![allow(dead_code)]

pub mod exploits;
pub mod fixtures;
pub mod integration;
