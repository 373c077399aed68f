//! Role management: the one-way learner-to-facilitator transition.

use classpoints_core::error::CoreError;
use classpoints_core::user::{Role, User};
use classpoints_events::RosterEvent;

use crate::engine::ClassEngine;

impl ClassEngine {
    /// Promote a user to facilitator.
    ///
    /// Unconditional by design: there is no authorization gate on this
    /// operation (documented as an open concern in DESIGN.md). Idempotent —
    /// promoting an existing facilitator returns the record unchanged
    /// without a persist or an event. No demotion operation exists.
    pub async fn promote_to_facilitator(&self, user_id: &str) -> Result<User, CoreError> {
        let mut user = self
            .store()
            .get(user_id)
            .await
            .ok_or_else(|| CoreError::NotFound {
                entity: "user",
                id: user_id.to_string(),
            })?;

        if user.role == Role::Facilitator {
            return Ok(user);
        }

        user.role = Role::Facilitator;
        tracing::info!(user_id = %user.id, "promoted to facilitator");
        let (user, persistence) = self.store().upsert(user).await;
        self.note_persistence("promote_to_facilitator", persistence);

        self.publish(RosterEvent::RolePromoted {
            user_id: user.id.clone(),
        });
        Ok(user)
    }
}
