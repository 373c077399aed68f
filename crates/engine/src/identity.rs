//! Identity resolution: find-or-create by email.

use chrono::Utc;

use classpoints_core::error::CoreError;
use classpoints_core::user::{validate_external_identity, ExternalIdentity, User};
use classpoints_events::RosterEvent;

use crate::engine::ClassEngine;

impl ClassEngine {
    /// Resolve an external identity to a roster record.
    ///
    /// Matching is by email, case-insensitive. A returning user comes back
    /// with only `last_active_at` refreshed — display name, role, points,
    /// and avatar are never overwritten by the provider. A first-time
    /// identity creates a learner with the baseline avatar and persists it
    /// immediately.
    ///
    /// Never fails for a well-formed identity: storage trouble degrades to
    /// the fallback tier inside the store.
    pub async fn resolve_identity(
        &self,
        identity: ExternalIdentity,
    ) -> Result<User, CoreError> {
        validate_external_identity(&identity)?;

        let now = Utc::now();
        let user = match self.store().find_by_email(&identity.email).await {
            Some(mut existing) => {
                tracing::debug!(user_id = %existing.id, "returning user resolved");
                existing.last_active_at = now;
                let (user, persistence) = self.store().upsert(existing).await;
                self.note_persistence("resolve_identity", persistence);
                user
            }
            None => {
                let created = User::from_identity(&identity, now);
                tracing::info!(user_id = %created.id, "new participant joined the roster");
                let (user, persistence) = self.store().upsert(created).await;
                self.note_persistence("resolve_identity", persistence);
                user
            }
        };

        self.publish(RosterEvent::IdentityResolved { user: user.clone() });
        Ok(user)
    }

    /// Forward the identity provider's sign-out signal. No roster mutation.
    pub fn sign_out(&self, user_id: &str) {
        tracing::debug!(user_id, "sign-out");
        self.publish(RosterEvent::SignedOut {
            user_id: user_id.to_string(),
        });
    }
}
