//! Pure ranking and aggregation over roster snapshots.
//!
//! No side effects; safe to call repeatedly and concurrently. The inputs are
//! plain slices so any snapshot source works.

use serde::Serialize;

use crate::transaction::PointTransaction;
use crate::user::{Role, User};

/// How many transactions `recent_activity` reports.
pub const RECENT_ACTIVITY_LIMIT: usize = 5;

/// Users sorted by points descending.
///
/// Ties break by `joined_at` ascending, then id ascending, so the output is
/// deterministic across calls regardless of input order.
pub fn leaderboard(users: &[User]) -> Vec<User> {
    let mut ranked = users.to_vec();
    ranked.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| a.joined_at.cmp(&b.joined_at))
            .then_with(|| a.id.cmp(&b.id))
    });
    ranked
}

/// Aggregate classroom summary. Learner-only: facilitators do not count
/// toward totals or averages.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClassStats {
    pub total_students: usize,
    pub total_points: i64,
    /// Rounded mean over learners; `0` when there are no learners.
    pub average_points: i64,
    pub top_student: Option<User>,
    /// The most recent transactions, newest first.
    pub recent_activity: Vec<PointTransaction>,
}

/// Compute summary statistics from a roster snapshot.
///
/// `transactions` is the log in append order; the newest entries are at the
/// end.
pub fn class_stats(users: &[User], transactions: &[PointTransaction]) -> ClassStats {
    let learners: Vec<User> = users
        .iter()
        .filter(|u| u.role == Role::Learner)
        .cloned()
        .collect();

    let total_students = learners.len();
    let total_points: i64 = learners.iter().map(|u| u.points).sum();
    let average_points = if total_students == 0 {
        0
    } else {
        (total_points as f64 / total_students as f64).round() as i64
    };

    let top_student = leaderboard(&learners).into_iter().next();

    let recent_activity: Vec<PointTransaction> = transactions
        .iter()
        .rev()
        .take(RECENT_ACTIVITY_LIMIT)
        .cloned()
        .collect();

    ClassStats {
        total_students,
        total_points,
        average_points,
        top_student,
        recent_activity,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
