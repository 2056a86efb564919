//! # OTP Authentication Subsystem
//!
//! Proves that the person at the API holds the phone registered to a voter.
//!
//! ## Flow
//!
//! ```text
//! send-otp(phone) ──→ voter lookup ──→ challenge stored ──→ code delivered
//!                                                               │
//! verify-otp(phone, code) ←──────────────── voter types code ───┘
//!        │
//!        ├── match     → challenge consumed, voter id returned (+ voting pass)
//!        ├── mismatch  → attempt counted, challenge kept until the cap
//!        └── expired   → challenge removed
//! ```
//!
//! ## Domain Invariants
//!
//! | Invariant | Enforcement |
//! |-----------|-------------|
//! | At most one live challenge per phone | `ChallengeStore::put` overwrites |
//! | A matched challenge verifies once | `ChallengeStore::attempt` removes on match |
//! | Codes are never stored in plaintext | `domain::code::OtpSecret::hash` |
//! | Comparison is constant time | `domain::code::hashes_match` |
//! | Voters who already voted get no challenge | `OtpAuthService::issue_otp` |
//!
//! ## Module Structure (Hexagonal Architecture)
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  adapters/ - DashMap challenge store, log-only code delivery    │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ implements ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  ports/inbound.rs  - OtpAuthApi trait                           │
//! │  ports/outbound.rs - ChallengeStore, CodeDelivery traits        │
//! └─────────────────────────────────────────────────────────────────┘
//!                          ↑ uses ↑
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  domain/code.rs      - code generation, keyed hashing           │
//! │  domain/challenge.rs - OtpChallenge, AttemptOutcome             │
//! │  domain/pass.rs      - signed voting pass                       │
//! │  domain/errors.rs    - OtpError                                 │
//! └─────────────────────────────────────────────────────────────────┘
//! ```

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod service;

pub use adapters::{sweep_task, InMemoryChallengeStore, LogDelivery};
#[cfg(any(test, feature = "test-utils"))]
pub use adapters::CapturingDelivery;
pub use domain::{
    AttemptOutcome, CodeHash, OtpChallenge, OtpCode, OtpConfig, OtpError, OtpSecret, PassError,
    PassSigner, VotingPass, CODE_LENGTH,
};
pub use ports::{ChallengeStore, CodeDelivery, DeliveryError, IssuedOtp, OtpAuthApi, VerifiedVoter};
pub use service::OtpAuthService;
