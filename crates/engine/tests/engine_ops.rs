//! Integration tests for the engine operations.
//!
//! Exercises the full stack — facade, roster store, and persistence chain —
//! against in-memory tiers: identity resolution, the points ledger with its
//! clamp, role promotion, avatar saves, and the degraded-persistence path.

use std::sync::Arc;
use std::time::Duration;

use classpoints_core::avatar::AvatarConfig;
use classpoints_core::error::CoreError;
use classpoints_core::user::{ExternalIdentity, Role, User};
use classpoints_engine::{ClassEngine, EngineConfig};
use classpoints_events::{EventBus, RosterEvent};
use classpoints_store::{MemoryTier, RosterData, RosterStore, RosterTier, TieredStore};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

async fn engine_with_tiers(tiers: Vec<Box<dyn RosterTier>>) -> ClassEngine {
    let store = RosterStore::open(TieredStore::new(tiers, Duration::from_secs(1))).await;
    ClassEngine::with_store(
        Arc::new(store),
        Arc::new(EventBus::default()),
        EngineConfig::default(),
    )
}

/// An engine over a single pre-emptied memory tier, so tests start from a
/// blank roster instead of the seed.
async fn empty_engine() -> ClassEngine {
    engine_with_tiers(vec![Box::new(MemoryTier::with_data(RosterData::default()))]).await
}

fn identity(id: &str, email: &str) -> ExternalIdentity {
    ExternalIdentity {
        id: id.to_string(),
        email: email.to_string(),
        display_name: None,
    }
}

async fn resolve(engine: &ClassEngine, id: &str, email: &str) -> User {
    engine
        .resolve_identity(identity(id, email))
        .await
        .expect("resolution should succeed")
}

/// Resolve an identity and promote it, returning the facilitator.
async fn facilitator(engine: &ClassEngine) -> User {
    let user = resolve(engine, "teacher-1", "teacher@example.com").await;
    engine
        .promote_to_facilitator(&user.id)
        .await
        .expect("promotion should succeed")
}

// ---------------------------------------------------------------------------
// Identity resolution
// ---------------------------------------------------------------------------

/// A first-time identity creates a learner with zero points, the baseline
/// avatar, and the email local-part as display name.
#[tokio::test]
async fn new_identity_creates_default_learner() {
    let engine = empty_engine().await;

    let user = resolve(&engine, "u9", "z@example.com").await;

    assert_eq!(user.id, "u9");
    assert_eq!(user.role, Role::Learner);
    assert_eq!(user.points, 0);
    assert_eq!(user.avatar, AvatarConfig::default());
    assert_eq!(user.display_name, "z");
}

/// Resolving the same email twice returns the same user id and does not
/// create a duplicate roster entry.
#[tokio::test]
async fn repeat_resolution_is_idempotent() {
    let engine = empty_engine().await;

    let first = resolve(&engine, "u1", "a@example.com").await;
    let second = resolve(&engine, "u1", "a@example.com").await;

    assert_eq!(first.id, second.id);
    assert_eq!(engine.store().snapshot().await.users.len(), 1);
}

/// A returning user's stored profile survives whatever the provider sends
/// on later sign-ins; only the activity timestamp moves.
#[tokio::test]
async fn resolution_never_overwrites_the_stored_profile() {
    let engine = empty_engine().await;

    let user = resolve(&engine, "u1", "a@example.com").await;
    engine.promote_to_facilitator(&user.id).await.unwrap();
    engine.update_display_name(&user.id, "Ada").await.unwrap();

    let again = engine
        .resolve_identity(ExternalIdentity {
            id: "u1".to_string(),
            email: "A@Example.com".to_string(), // matching is case-insensitive
            display_name: Some("Provider Name".to_string()),
        })
        .await
        .unwrap();

    assert_eq!(again.display_name, "Ada");
    assert_eq!(again.role, Role::Facilitator);
    assert!(again.last_active_at >= user.last_active_at);
    assert_eq!(engine.store().snapshot().await.users.len(), 1);
}

#[tokio::test]
async fn malformed_identity_is_rejected() {
    let engine = empty_engine().await;
    let result = engine.resolve_identity(identity("u1", "not-an-email")).await;
    assert!(matches!(result, Err(CoreError::InvalidArgument(_))));
}

// ---------------------------------------------------------------------------
// Points ledger
// ---------------------------------------------------------------------------

/// The clamp applies per call: 3 points, then -10 clamps to 0, then +5
/// lands at 5. Both transactions record the requested pre-clamp delta, in
/// order.
#[tokio::test]
async fn clamp_applies_per_call_and_records_requested_deltas() {
    let engine = empty_engine().await;
    let teacher = facilitator(&engine).await;
    let student = resolve(&engine, "s1", "amy@example.com").await;

    engine
        .apply_points(&teacher.id, &student.id, 3, None)
        .await
        .unwrap();

    let deducted = engine
        .apply_points(&teacher.id, &student.id, -10, None)
        .await
        .unwrap();
    assert_eq!(deducted.user.points, 0);
    assert_eq!(deducted.transaction.points_change, -10);

    let awarded = engine
        .apply_points(&teacher.id, &student.id, 5, None)
        .await
        .unwrap();
    assert_eq!(awarded.user.points, 5);
    assert_eq!(awarded.transaction.points_change, 5);

    let log = engine.store().snapshot().await.transactions;
    let for_student: Vec<i64> = log
        .iter()
        .filter(|t| t.user_id == student.id)
        .map(|t| t.points_change)
        .collect();
    assert_eq!(for_student, vec![3, -10, 5]);
}

/// Points never go negative, regardless of delta ordering.
#[tokio::test]
async fn points_never_negative_for_any_sequence() {
    let engine = empty_engine().await;
    let teacher = facilitator(&engine).await;
    let student = resolve(&engine, "s1", "amy@example.com").await;

    for delta in [-5, 2, -100, 7, -1, -1, 3, -50] {
        let receipt = engine
            .apply_points(&teacher.id, &student.id, delta, None)
            .await
            .unwrap();
        assert!(receipt.user.points >= 0, "balance went negative on {delta}");
    }
}

#[tokio::test]
async fn zero_delta_is_rejected_without_side_effects() {
    let engine = empty_engine().await;
    let teacher = facilitator(&engine).await;
    let student = resolve(&engine, "s1", "amy@example.com").await;

    let result = engine.apply_points(&teacher.id, &student.id, 0, None).await;
    assert!(matches!(result, Err(CoreError::InvalidArgument(_))));

    let snapshot = engine.store().snapshot().await;
    assert!(snapshot.transactions.is_empty());
    assert_eq!(engine.store().get(&student.id).await.unwrap().points, 0);
}

#[tokio::test]
async fn non_facilitator_actor_is_rejected_without_side_effects() {
    let engine = empty_engine().await;
    let learner = resolve(&engine, "s1", "amy@example.com").await;
    let target = resolve(&engine, "s2", "ben@example.com").await;

    let result = engine.apply_points(&learner.id, &target.id, 5, None).await;
    assert!(matches!(result, Err(CoreError::Unauthorized(_))));

    let snapshot = engine.store().snapshot().await;
    assert!(snapshot.transactions.is_empty());
    assert_eq!(engine.store().get(&target.id).await.unwrap().points, 0);
}

#[tokio::test]
async fn unknown_actor_is_unauthorized_and_unknown_target_is_not_found() {
    let engine = empty_engine().await;
    let teacher = facilitator(&engine).await;

    assert!(matches!(
        engine.apply_points("ghost", &teacher.id, 5, None).await,
        Err(CoreError::Unauthorized(_))
    ));
    assert!(matches!(
        engine.apply_points(&teacher.id, "ghost", 5, None).await,
        Err(CoreError::NotFound { .. })
    ));
}

/// An omitted reason falls back to the sign-based default; an explicit one
/// is recorded verbatim.
#[tokio::test]
async fn reasons_default_by_sign() {
    let engine = empty_engine().await;
    let teacher = facilitator(&engine).await;
    let student = resolve(&engine, "s1", "amy@example.com").await;

    let awarded = engine
        .apply_points(&teacher.id, &student.id, 5, None)
        .await
        .unwrap();
    assert_eq!(awarded.transaction.reason, "Points awarded");

    let deducted = engine
        .apply_points(&teacher.id, &student.id, -2, None)
        .await
        .unwrap();
    assert_eq!(deducted.transaction.reason, "Points deducted");

    let custom = engine
        .apply_points(&teacher.id, &student.id, 1, Some("Bonus round".to_string()))
        .await
        .unwrap();
    assert_eq!(custom.transaction.reason, "Bonus round");
}

// ---------------------------------------------------------------------------
// Role promotion
// ---------------------------------------------------------------------------

/// Promoting twice yields the same end state as promoting once.
#[tokio::test]
async fn promotion_is_idempotent() {
    let engine = empty_engine().await;
    let user = resolve(&engine, "s1", "amy@example.com").await;

    let once = engine.promote_to_facilitator(&user.id).await.unwrap();
    let twice = engine.promote_to_facilitator(&user.id).await.unwrap();

    assert_eq!(once.role, Role::Facilitator);
    assert_eq!(once, twice);
    assert_eq!(engine.store().snapshot().await.users.len(), 1);
}

#[tokio::test]
async fn promoting_unknown_user_is_not_found() {
    let engine = empty_engine().await;
    assert!(matches!(
        engine.promote_to_facilitator("ghost").await,
        Err(CoreError::NotFound { .. })
    ));
}

// ---------------------------------------------------------------------------
// Avatar and display name
// ---------------------------------------------------------------------------

/// A save replaces the prior configuration wholesale; a subsequent read
/// returns exactly the new config.
#[tokio::test]
async fn avatar_save_replaces_wholesale() {
    let engine = empty_engine().await;
    let user = resolve(&engine, "s1", "amy@example.com").await;

    let new_config = AvatarConfig {
        hair: "ponytail".to_string(),
        hair_color: "#FFD700".to_string(),
        eyes: "star".to_string(),
        eye_color: "#FF1493".to_string(),
        skin: "#8D5524".to_string(),
        outfit: "dress".to_string(),
        outfit_color: "#F7DC6F".to_string(),
        accessory: "necklace".to_string(),
    };

    let updated = engine.save_avatar(&user.id, new_config.clone()).await.unwrap();
    assert_eq!(updated.avatar, new_config);
    assert_eq!(engine.store().get(&user.id).await.unwrap().avatar, new_config);
}

#[tokio::test]
async fn out_of_palette_avatar_is_rejected_without_change() {
    let engine = empty_engine().await;
    let user = resolve(&engine, "s1", "amy@example.com").await;

    let bad = AvatarConfig {
        hair: "mohawk".to_string(),
        ..AvatarConfig::default()
    };
    assert!(matches!(
        engine.save_avatar(&user.id, bad).await,
        Err(CoreError::InvalidArgument(_))
    ));
    assert_eq!(
        engine.store().get(&user.id).await.unwrap().avatar,
        AvatarConfig::default()
    );
}

#[tokio::test]
async fn display_name_is_length_checked() {
    let engine = empty_engine().await;
    let user = resolve(&engine, "s1", "amy@example.com").await;

    assert!(matches!(
        engine.update_display_name(&user.id, "A").await,
        Err(CoreError::InvalidArgument(_))
    ));

    let updated = engine.update_display_name(&user.id, "  Amy P  ").await.unwrap();
    assert_eq!(updated.display_name, "Amy P");
}

// ---------------------------------------------------------------------------
// Views
// ---------------------------------------------------------------------------

#[tokio::test]
async fn leaderboard_is_sorted_and_deterministic() {
    let engine = empty_engine().await;
    let teacher = facilitator(&engine).await;
    for (id, email, points) in [
        ("s1", "a@example.com", 5),
        ("s2", "b@example.com", 20),
        ("s3", "c@example.com", 5),
    ] {
        let user = resolve(&engine, id, email).await;
        if points != 0 {
            engine
                .apply_points(&teacher.id, &user.id, points, None)
                .await
                .unwrap();
        }
    }

    let first: Vec<String> = engine.leaderboard().await.into_iter().map(|u| u.id).collect();
    let second: Vec<String> = engine.leaderboard().await.into_iter().map(|u| u.id).collect();
    assert_eq!(first, second);

    let points: Vec<i64> = engine.leaderboard().await.iter().map(|u| u.points).collect();
    let mut sorted = points.clone();
    sorted.sort_by(|a, b| b.cmp(a));
    assert_eq!(points, sorted);
    // s1 joined before s3; equal points rank s1 first.
    let s1_pos = first.iter().position(|id| id == "s1").unwrap();
    let s3_pos = first.iter().position(|id| id == "s3").unwrap();
    assert!(s1_pos < s3_pos);
}

/// A roster with only a facilitator has zero learners and must not divide
/// by zero.
#[tokio::test]
async fn class_stats_with_zero_learners() {
    let engine = empty_engine().await;
    facilitator(&engine).await;

    let stats = engine.class_stats().await;
    assert_eq!(stats.total_students, 0);
    assert_eq!(stats.average_points, 0);
    assert!(stats.top_student.is_none());
}

#[tokio::test]
async fn class_stats_reports_recent_activity_newest_first() {
    let engine = empty_engine().await;
    let teacher = facilitator(&engine).await;
    let student = resolve(&engine, "s1", "amy@example.com").await;

    for delta in [1, 2, 3, 4, 5, 6, 7] {
        engine
            .apply_points(&teacher.id, &student.id, delta, None)
            .await
            .unwrap();
    }

    let stats = engine.class_stats().await;
    let deltas: Vec<i64> = stats
        .recent_activity
        .iter()
        .map(|t| t.points_change)
        .collect();
    assert_eq!(deltas, vec![7, 6, 5, 4, 3]);
}

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[tokio::test]
async fn operations_publish_roster_events() {
    let engine = empty_engine().await;
    let mut rx = engine.subscribe();

    let teacher = facilitator(&engine).await;
    let student = resolve(&engine, "s1", "amy@example.com").await;
    engine
        .apply_points(&teacher.id, &student.id, 5, None)
        .await
        .unwrap();
    engine.sign_out(&student.id);

    assert!(matches!(
        rx.recv().await.unwrap(),
        RosterEvent::IdentityResolved { .. }
    ));
    assert!(matches!(
        rx.recv().await.unwrap(),
        RosterEvent::RolePromoted { .. }
    ));
    assert!(matches!(
        rx.recv().await.unwrap(),
        RosterEvent::IdentityResolved { .. }
    ));
    match rx.recv().await.unwrap() {
        RosterEvent::PointsApplied {
            user_id, new_total, ..
        } => {
            assert_eq!(user_id, student.id);
            assert_eq!(new_total, 5);
        }
        other => panic!("unexpected event: {other:?}"),
    }
    assert!(matches!(
        rx.recv().await.unwrap(),
        RosterEvent::SignedOut { .. }
    ));
}

// ---------------------------------------------------------------------------
// Degraded persistence
// ---------------------------------------------------------------------------

/// With the primary tier down, operations still succeed and the engine
/// surfaces the soft `PersistenceDegraded` warning on the bus.
#[tokio::test]
async fn primary_failure_degrades_to_cache_without_failing_the_operation() {
    let primary = Arc::new(MemoryTier::with_data(RosterData::default()));
    let cache = MemoryTier::with_data(RosterData::default());

    struct Shared(Arc<MemoryTier>);

    #[async_trait::async_trait]
    impl RosterTier for Shared {
        fn name(&self) -> &'static str {
            self.0.name()
        }
        async fn load(&self) -> Result<RosterData, classpoints_store::StoreError> {
            self.0.load().await
        }
        async fn upsert_user(
            &self,
            user: &User,
        ) -> Result<(), classpoints_store::StoreError> {
            self.0.upsert_user(user).await
        }
        async fn append_transaction(
            &self,
            transaction: &classpoints_core::transaction::PointTransaction,
        ) -> Result<(), classpoints_store::StoreError> {
            self.0.append_transaction(transaction).await
        }
        async fn replace_all(
            &self,
            data: &RosterData,
        ) -> Result<(), classpoints_store::StoreError> {
            self.0.replace_all(data).await
        }
    }

    let engine =
        engine_with_tiers(vec![Box::new(Shared(Arc::clone(&primary))), Box::new(cache)]).await;
    let mut rx = engine.subscribe();

    primary.set_unavailable(true);
    let user = resolve(&engine, "s1", "amy@example.com").await;
    assert_eq!(user.id, "s1");

    // IdentityResolved is preceded by the degradation warning.
    assert!(matches!(
        rx.recv().await.unwrap(),
        RosterEvent::PersistenceDegraded { .. }
    ));
    assert!(matches!(
        rx.recv().await.unwrap(),
        RosterEvent::IdentityResolved { .. }
    ));
}
