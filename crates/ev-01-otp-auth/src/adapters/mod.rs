//! Adapters layer for OTP authentication.

pub mod delivery;
pub mod memory_store;

#[cfg(any(test, feature = "test-utils"))]
pub use delivery::CapturingDelivery;
pub use delivery::LogDelivery;
pub use memory_store::{sweep_task, InMemoryChallengeStore};
