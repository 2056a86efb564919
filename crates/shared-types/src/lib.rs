//! # Shared Types Crate
//!
//! Domain entities and the persistence port shared by every election crate.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: `VoterIdentity` and `Candidate` are defined
//!   once and consumed by the OTP, ledger and storage crates.
//! - **Normalized Keys Only**: phone lookups take a [`NormalizedPhone`], which
//!   can only be produced by [`normalize_phone`]. Raw strings never reach the
//!   OTP Store or the voter index.
//! - **Atomic Storage Contract**: [`ElectionStore`] exposes compare-and-set and
//!   increment primitives instead of generic read/write, so callers cannot
//!   express a racy read-then-write vote update.

pub mod entities;
pub mod errors;
pub mod phone;
pub mod ports;
pub mod time;

pub use entities::*;
pub use errors::*;
pub use phone::{normalize_phone, NormalizedPhone, PHONE_DIGITS};
pub use ports::ElectionStore;
pub use time::{ManualTimeSource, SystemTimeSource, TimeSource, Timestamp};
