//! Fixed fallback roster.
//!
//! Consulted only when every persistence tier reports no data at open, so
//! the system is never in an un-renderable empty state. Timestamps are fixed
//! so the seed is fully deterministic.

use chrono::{DateTime, TimeZone, Utc};

use classpoints_core::avatar::AvatarConfig;
use classpoints_core::transaction::PointTransaction;
use classpoints_core::user::{Role, User};

use crate::tier::RosterData;

fn seeded_at(minute: u32) -> DateTime<Utc> {
    // First day of school, staggered so the leaderboard tie-break is visible.
    Utc.with_ymd_and_hms(2024, 9, 2, 8, minute, 0).unwrap()
}

fn seed_user(
    id: &str,
    email: &str,
    display_name: &str,
    role: Role,
    points: i64,
    minute: u32,
    avatar: AvatarConfig,
) -> User {
    User {
        id: id.to_string(),
        email: email.to_string(),
        display_name: display_name.to_string(),
        role,
        points,
        avatar,
        joined_at: seeded_at(minute),
        last_active_at: seeded_at(minute),
    }
}

/// The fixed classroom: one facilitator and a handful of learners with
/// assorted points and avatars.
pub fn seed_roster() -> RosterData {
    let users = vec![
        seed_user(
            "seed-teacher",
            "teacher@classpoints.example",
            "Ms. Rivera",
            Role::Facilitator,
            0,
            0,
            AvatarConfig {
                hair: "long".to_string(),
                hair_color: "#000000".to_string(),
                outfit: "formal".to_string(),
                outfit_color: "#45B7D1".to_string(),
                accessory: "glasses".to_string(),
                ..AvatarConfig::default()
            },
        ),
        seed_user(
            "seed-student-1",
            "maya@classpoints.example",
            "Maya",
            Role::Learner,
            12,
            5,
            AvatarConfig {
                hair: "curly".to_string(),
                hair_color: "#9370DB".to_string(),
                outfit: "hoodie".to_string(),
                ..AvatarConfig::default()
            },
        ),
        seed_user(
            "seed-student-2",
            "leo@classpoints.example",
            "Leo",
            Role::Learner,
            8,
            6,
            AvatarConfig {
                hair: "buzz".to_string(),
                eyes: "wink".to_string(),
                outfit: "sporty".to_string(),
                outfit_color: "#4ECDC4".to_string(),
                ..AvatarConfig::default()
            },
        ),
        seed_user(
            "seed-student-3",
            "sofia@classpoints.example",
            "Sofia",
            Role::Learner,
            8,
            7,
            AvatarConfig {
                hair: "ponytail".to_string(),
                hair_color: "#FFD700".to_string(),
                eyes: "star".to_string(),
                accessory: "headband".to_string(),
                ..AvatarConfig::default()
            },
        ),
        seed_user(
            "seed-student-4",
            "amir@classpoints.example",
            "Amir",
            Role::Learner,
            3,
            8,
            AvatarConfig {
                skin: "#C68642".to_string(),
                outfit: "uniform".to_string(),
                outfit_color: "#98D8C8".to_string(),
                ..AvatarConfig::default()
            },
        ),
    ];

    let transactions = vec![
        PointTransaction {
            id: "seed-tx-1".to_string(),
            user_id: "seed-student-1".to_string(),
            teacher_id: "seed-teacher".to_string(),
            points_change: 12,
            reason: "Great first week".to_string(),
            created_at: seeded_at(30),
        },
        PointTransaction {
            id: "seed-tx-2".to_string(),
            user_id: "seed-student-2".to_string(),
            teacher_id: "seed-teacher".to_string(),
            points_change: 8,
            reason: "Helped a classmate".to_string(),
            created_at: seeded_at(31),
        },
        PointTransaction {
            id: "seed-tx-3".to_string(),
            user_id: "seed-student-3".to_string(),
            teacher_id: "seed-teacher".to_string(),
            points_change: 8,
            reason: "Great first week".to_string(),
            created_at: seeded_at(32),
        },
        PointTransaction {
            id: "seed-tx-4".to_string(),
            user_id: "seed-student-4".to_string(),
            teacher_id: "seed-teacher".to_string(),
            points_change: 3,
            reason: "Points awarded".to_string(),
            created_at: seeded_at(33),
        },
    ];

    RosterData { users, transactions }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use classpoints_core::avatar::validate_avatar;

    #[test]
    fn seed_has_a_facilitator_and_learners() {
        let data = seed_roster();
        assert!(data.users.iter().any(|u| u.role == Role::Facilitator));
        assert!(data.users.iter().any(|u| u.role == Role::Learner));
    }

    #[test]
    fn seed_avatars_are_all_valid() {
        for user in seed_roster().users {
            assert!(
                validate_avatar(&user.avatar).is_ok(),
                "seed avatar for {} out of palette",
                user.id
            );
        }
    }

    #[test]
    fn seed_emails_are_unique() {
        let data = seed_roster();
        let mut emails: Vec<_> = data.users.iter().map(|u| u.email.to_lowercase()).collect();
        emails.sort();
        emails.dedup();
        assert_eq!(emails.len(), data.users.len());
    }

    #[test]
    fn seed_points_match_transaction_history() {
        let data = seed_roster();
        for user in data.users.iter().filter(|u| u.role == Role::Learner) {
            let replayed = data
                .transactions
                .iter()
                .filter(|t| t.user_id == user.id)
                .fold(0i64, |points, t| (points + t.points_change).max(0));
            assert_eq!(replayed, user.points, "history mismatch for {}", user.id);
        }
    }
}
