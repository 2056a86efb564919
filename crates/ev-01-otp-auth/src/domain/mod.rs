//! Domain layer for OTP authentication.

pub mod challenge;
pub mod code;
pub mod config;
pub mod errors;
pub mod pass;

pub use challenge::{AttemptOutcome, OtpChallenge};
pub use code::{hashes_match, CodeHash, OtpCode, OtpSecret, CODE_LENGTH};
pub use config::OtpConfig;
pub use errors::OtpError;
pub use pass::{PassError, PassSigner, VotingPass};
