//! Profile operations: avatar save and display-name update.

use classpoints_core::avatar::{validate_avatar, AvatarConfig};
use classpoints_core::error::CoreError;
use classpoints_core::user::{validate_display_name, User};
use classpoints_events::RosterEvent;

use crate::engine::ClassEngine;

impl ClassEngine {
    /// Replace a user's avatar configuration wholesale.
    ///
    /// Every field is validated against its option set or palette first;
    /// an out-of-set value fails with `InvalidArgument` and no state
    /// change. There is no per-field merge.
    pub async fn save_avatar(
        &self,
        user_id: &str,
        config: AvatarConfig,
    ) -> Result<User, CoreError> {
        validate_avatar(&config)?;

        let mut user = self
            .store()
            .get(user_id)
            .await
            .ok_or_else(|| CoreError::NotFound {
                entity: "user",
                id: user_id.to_string(),
            })?;

        user.avatar = config;
        let (user, persistence) = self.store().upsert(user).await;
        self.note_persistence("save_avatar", persistence);

        self.publish(RosterEvent::AvatarUpdated {
            user_id: user.id.clone(),
        });
        Ok(user)
    }

    /// Change a user's display name. The trimmed name must be 2-20
    /// characters.
    pub async fn update_display_name(
        &self,
        user_id: &str,
        name: &str,
    ) -> Result<User, CoreError> {
        let name = validate_display_name(name)?;

        let mut user = self
            .store()
            .get(user_id)
            .await
            .ok_or_else(|| CoreError::NotFound {
                entity: "user",
                id: user_id.to_string(),
            })?;

        user.display_name = name;
        let (user, persistence) = self.store().upsert(user).await;
        self.note_persistence("update_display_name", persistence);
        Ok(user)
    }
}
