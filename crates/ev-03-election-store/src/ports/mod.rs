//! Ports for the election store.

pub mod registry;

pub use registry::VoterRegistry;
