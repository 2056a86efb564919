//! # Registry Port
//!
//! Admin-side writes that create records. The verification and voting core
//! never calls these; they exist for the bulk-import collaborator.

use async_trait::async_trait;
use shared_types::{Candidate, StoreError, VoterIdentity};

/// Record creation for the voter roll and the ballot.
#[async_trait]
pub trait VoterRegistry: Send + Sync {
    /// Insert a new voter.
    ///
    /// # Errors
    /// - `Duplicate { field: "pin" | "phone" | "id" }` if a unique key is taken
    async fn register_voter(&self, voter: VoterIdentity) -> Result<(), StoreError>;

    /// Insert a new candidate.
    async fn register_candidate(&self, candidate: Candidate) -> Result<(), StoreError>;
}
