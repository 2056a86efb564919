//! Domain layer: voter-roll import rules.

pub mod import;
