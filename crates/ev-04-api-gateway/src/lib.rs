//! # Election API Gateway
//!
//! JSON-over-HTTP front end for voter verification and vote casting.
//!
//! ## Architecture
//!
//! ```text
//!   client ──► CORS ─► Tracing ─► RateLimit ─► Timeout ─► BodyLimit ─► handler
//!                                                                      │
//!                               ┌──────────────────────────────────────┤
//!                               ▼                                      ▼
//!                        OtpAuthApi (ev-01)                  VoteLedgerApi (ev-02)
//!                               │                                      │
//!                               └───────────► ElectionStore ◄──────────┘
//! ```
//!
//! ## Routes
//!
//! | Method | Path | Auth |
//! |--------|------|------|
//! | POST | `/api/voters/send-otp` | none |
//! | POST | `/api/voters/verify-otp` | none |
//! | POST | `/api/voters/cast-vote` | voting pass (`Authorization: Bearer`) |
//! | GET | `/api/voters/status/:id` | none |
//! | GET | `/api/candidates/tally` | none |
//! | GET | `/api/admin/reconcile` | localhost + API key |
//! | GET | `/health`, `/metrics` | none |
//!
//! ## Security
//!
//! - Per-IP token buckets, with a stricter bucket for POST
//! - Missing and wrong OTPs produce identical responses
//! - Plaintext codes are echoed only outside production, and only when
//!   `otp.expose_code` is set

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod middleware;
pub mod router;
pub mod service;

pub use domain::config::{ConfigError, ElectionConfig, RunMode, SECRET_LEN};
pub use domain::error::{ApiError, ApiResult, GatewayError};
pub use middleware::GatewayMetrics;
pub use router::AppState;
pub use service::ElectionGateway;
