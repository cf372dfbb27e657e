//! `Store` trait — single async interface for profile and catalog persistence.

use async_trait::async_trait;

use crate::engagement::model::{Challenge, ProfileUpdate, UserProfile};
use crate::error::DatabaseError;

/// Backend-agnostic store covering user profiles and the challenge catalog.
///
/// The catalog is read-only from the core's perspective; `insert_challenge`
/// exists only for the external seeding path.
#[async_trait]
pub trait Store: Send + Sync {
    /// Run all pending schema migrations.
    async fn run_migrations(&self) -> Result<(), DatabaseError>;

    // ── Profiles ────────────────────────────────────────────────────

    /// Look up a profile. `Ok(None)` means the user has never been seen.
    async fn get_profile(&self, user_id: &str) -> Result<Option<UserProfile>, DatabaseError>;

    /// Persist a freshly created profile. Called exactly once per user.
    async fn create_profile(&self, profile: &UserProfile) -> Result<(), DatabaseError>;

    /// Apply one transition's mutation as a single atomic update.
    async fn apply_update(
        &self,
        user_id: &str,
        update: &ProfileUpdate,
    ) -> Result<(), DatabaseError>;

    // ── Catalog ─────────────────────────────────────────────────────

    /// The catalog entry with the smallest id strictly greater than
    /// `min_exclusive_id`, if any. A single bounded query, never a scan.
    async fn query_next_challenge(
        &self,
        min_exclusive_id: i64,
    ) -> Result<Option<Challenge>, DatabaseError>;

    /// Insert a catalog entry if its id is not already present.
    /// Returns whether a row was inserted.
    async fn insert_challenge(&self, challenge: &Challenge) -> Result<bool, DatabaseError>;

    /// Number of entries in the catalog.
    async fn challenge_count(&self) -> Result<u64, DatabaseError>;
}
