//! Attack simulations against the OTP and voting paths.

pub mod double_vote;
pub mod otp_guessing;
