//! Ports layer for OTP authentication.

pub mod inbound;
pub mod outbound;

pub use inbound::{IssuedOtp, OtpAuthApi, VerifiedVoter};
pub use outbound::{ChallengeStore, CodeDelivery, DeliveryError};
