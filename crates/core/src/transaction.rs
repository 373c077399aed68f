//! Point transactions — the append-only audit trail.
//!
//! Every points mutation records the *requested* delta, pre-clamp, so the
//! log is the sole source of truth for how a balance came to be. Records are
//! immutable once created.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{Timestamp, UserId};

/// Default reason for a positive points change.
pub const REASON_AWARDED: &str = "Points awarded";
/// Default reason for a negative points change.
pub const REASON_DEDUCTED: &str = "Points deducted";

/// One entry in the audit trail.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PointTransaction {
    /// UUID v7: time-ordered with embedded randomness.
    pub id: String,
    /// The affected user. Weak reference — lookup only.
    pub user_id: UserId,
    /// The acting facilitator.
    pub teacher_id: UserId,
    /// The requested delta, signed and nonzero, recorded pre-clamp.
    pub points_change: i64,
    pub reason: String,
    pub created_at: Timestamp,
}

impl PointTransaction {
    /// Record a points change. An omitted (or whitespace-only) reason falls
    /// back to the sign-based default.
    pub fn record(
        user_id: UserId,
        teacher_id: UserId,
        points_change: i64,
        reason: Option<String>,
        now: Timestamp,
    ) -> Self {
        let reason = reason
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| default_reason(points_change).to_string());

        PointTransaction {
            id: Uuid::now_v7().to_string(),
            user_id,
            teacher_id,
            points_change,
            reason,
            created_at: now,
        }
    }
}

/// The reason used when the caller supplies none.
pub fn default_reason(points_change: i64) -> &'static str {
    if points_change > 0 {
        REASON_AWARDED
    } else {
        REASON_DEDUCTED
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
