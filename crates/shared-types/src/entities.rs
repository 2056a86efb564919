//! # Election Entities
//!
//! Records persisted by the external document store. Only the fields the
//! verification and voting core depends on are modelled here.
//!
//! ## Vote Invariant
//!
//! | Field | Unvoted | Voted |
//! |-------|---------|-------|
//! | `has_voted` | `false` | `true` |
//! | `voted_for` | `None` | `Some(candidate)` |
//! | `voted_at` | `None` | `Some(ts)` |
//!
//! The transition is one-way and only performed through
//! `ElectionStore::compare_and_set_voted`.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::phone::NormalizedPhone;
use crate::time::Timestamp;

/// Opaque voter identifier assigned at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct VoterId(pub Uuid);

impl VoterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for VoterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for VoterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for VoterId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// Opaque candidate identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CandidateId(pub Uuid);

impl CandidateId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CandidateId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CandidateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for CandidateId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim()).map(Self)
    }
}

/// A registered voter.
///
/// Created by the bulk-import collaborator; the core never creates voters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoterIdentity {
    /// Immutable identifier.
    pub id: VoterId,
    /// Display name from the voter roll.
    #[serde(default)]
    pub name: String,
    /// Administrator-issued credential, unique across voters.
    pub pin: String,
    /// Canonical phone key, unique across voters.
    pub phone: NormalizedPhone,
    /// Set exactly once by the vote transaction.
    pub has_voted: bool,
    /// Candidate chosen, `None` until voted.
    pub voted_for: Option<CandidateId>,
    /// Time of the vote in ms since Unix epoch, `None` until voted.
    pub voted_at: Option<Timestamp>,
}

impl VoterIdentity {
    /// Create an unvoted voter record.
    pub fn new(name: impl Into<String>, pin: impl Into<String>, phone: NormalizedPhone) -> Self {
        Self {
            id: VoterId::new(),
            name: name.into(),
            pin: pin.into(),
            phone,
            has_voted: false,
            voted_for: None,
            voted_at: None,
        }
    }

    /// Check the vote invariant: unvoted records carry no vote details and
    /// voted records carry both.
    pub fn is_consistent(&self) -> bool {
        if self.has_voted {
            self.voted_for.is_some() && self.voted_at.is_some()
        } else {
            self.voted_for.is_none() && self.voted_at.is_none()
        }
    }
}

/// A candidate on the ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candidate {
    pub id: CandidateId,
    pub full_name: String,
    pub party: String,
    /// Tally, only mutated by `ElectionStore::increment_candidate_votes`.
    pub votes: u64,
}

impl Candidate {
    pub fn new(full_name: impl Into<String>, party: impl Into<String>) -> Self {
        Self {
            id: CandidateId::new(),
            full_name: full_name.into(),
            party: party.into(),
            votes: 0,
        }
    }
}
