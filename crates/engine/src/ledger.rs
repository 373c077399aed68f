//! The points ledger: clamp-and-record mutation of a user's balance.

use chrono::Utc;
use serde::Serialize;

use classpoints_core::error::CoreError;
use classpoints_core::transaction::PointTransaction;
use classpoints_core::user::User;
use classpoints_events::RosterEvent;

use crate::engine::ClassEngine;

/// The result of a successful points application.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PointsReceipt {
    pub user: User,
    pub transaction: PointTransaction,
}

impl ClassEngine {
    /// Apply a point delta to a user on behalf of a facilitator.
    ///
    /// Preconditions, checked in order with no state change on failure:
    /// 1. `delta` is nonzero, else `InvalidArgument`;
    /// 2. the acting user exists and is a facilitator *now*, else
    ///    `Unauthorized`;
    /// 3. the target exists, else `NotFound`.
    ///
    /// The new balance is `max(0, current + delta)` — the clamp applies
    /// against the current stored points at call time, so each application
    /// clamps independently. The transaction records the requested
    /// pre-clamp delta; the user update and the transaction append are one
    /// combined store write.
    pub async fn apply_points(
        &self,
        acting_user_id: &str,
        target_user_id: &str,
        delta: i64,
        reason: Option<String>,
    ) -> Result<PointsReceipt, CoreError> {
        if delta == 0 {
            return Err(CoreError::InvalidArgument(
                "Points change must be nonzero".to_string(),
            ));
        }

        let actor = self.store().get(acting_user_id).await.ok_or_else(|| {
            CoreError::Unauthorized(format!("Unknown acting user '{acting_user_id}'"))
        })?;
        if !actor.is_facilitator() {
            return Err(CoreError::Unauthorized(format!(
                "User '{}' is not a facilitator",
                actor.id
            )));
        }

        let mut target =
            self.store()
                .get(target_user_id)
                .await
                .ok_or_else(|| CoreError::NotFound {
                    entity: "user",
                    id: target_user_id.to_string(),
                })?;

        target.points = (target.points + delta).max(0);
        let transaction = PointTransaction::record(
            target.id.clone(),
            actor.id.clone(),
            delta,
            reason,
            Utc::now(),
        );

        tracing::debug!(
            target = %target.id,
            actor = %actor.id,
            delta,
            new_total = target.points,
            "points applied"
        );

        let persistence = self
            .store()
            .record_points(target.clone(), transaction.clone())
            .await;
        self.note_persistence("apply_points", persistence);

        self.publish(RosterEvent::PointsApplied {
            user_id: target.id.clone(),
            transaction_id: transaction.id.clone(),
            points_change: delta,
            new_total: target.points,
        });

        Ok(PointsReceipt {
            user: target,
            transaction,
        })
    }
}
