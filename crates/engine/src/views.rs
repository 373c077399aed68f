//! Read views: thin snapshot wrappers over the pure functions in core.

use classpoints_core::stats::{self, ClassStats};
use classpoints_core::user::User;

use crate::engine::ClassEngine;

impl ClassEngine {
    /// Users ranked by points descending with the deterministic tie-break.
    pub async fn leaderboard(&self) -> Vec<User> {
        let snapshot = self.store().snapshot().await;
        stats::leaderboard(&snapshot.users)
    }

    /// Learner-only aggregate statistics plus recent activity.
    pub async fn class_stats(&self) -> ClassStats {
        let snapshot = self.store().snapshot().await;
        stats::class_stats(&snapshot.users, &snapshot.transactions)
    }
}
