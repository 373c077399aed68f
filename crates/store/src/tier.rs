//! The storage-tier seam.
//!
//! Every persistence tier — database, file cache, in-memory — implements the
//! same contract, so the chain can consult them in order and fall back
//! without the caller knowing which tier served a request.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use classpoints_core::transaction::PointTransaction;
use classpoints_core::user::User;

use crate::error::StoreError;

/// A full roster snapshot: every user plus the transaction log in append
/// order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RosterData {
    pub users: Vec<User>,
    pub transactions: Vec<PointTransaction>,
}

/// One level of the persistence chain.
#[async_trait]
pub trait RosterTier: Send + Sync {
    /// Tier name for logs.
    fn name(&self) -> &'static str;

    /// Load the full snapshot. `Err(StoreError::NoData)` means the tier is
    /// reachable but holds nothing yet — the chain falls through without
    /// marking the tier degraded.
    async fn load(&self) -> Result<RosterData, StoreError>;

    /// Insert or replace a user by id.
    async fn upsert_user(&self, user: &User) -> Result<(), StoreError>;

    /// Append one transaction. Append order must be preserved.
    async fn append_transaction(&self, transaction: &PointTransaction)
        -> Result<(), StoreError>;

    /// Overwrite the tier's contents with the given snapshot. Used to seed
    /// empty tiers and to write back after a tier recovers.
    async fn replace_all(&self, data: &RosterData) -> Result<(), StoreError>;
}
