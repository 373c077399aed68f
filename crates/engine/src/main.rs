use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use classpoints_engine::{ClassEngine, EngineConfig};

/// Smoke binary: boot the engine against the configured tiers and log
/// roster health. Useful for verifying a deployment's storage chain.
#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // --- Tracing ---
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "classpoints_engine=info,classpoints_store=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // --- Configuration ---
    let config = EngineConfig::from_env();
    tracing::info!(
        class = %config.class_name,
        cache_dir = %config.cache_dir.display(),
        primary = config.database_url.is_some(),
        "Loaded engine configuration"
    );

    // --- Engine ---
    let engine = ClassEngine::open(config).await;

    let stats = engine.class_stats().await;
    tracing::info!(
        total_students = stats.total_students,
        total_points = stats.total_points,
        average_points = stats.average_points,
        recent_activity = stats.recent_activity.len(),
        "Roster loaded"
    );

    for user in engine.leaderboard().await {
        tracing::info!(
            id = %user.id,
            name = %user.display_name,
            role = user.role.as_str(),
            points = user.points,
            "participant"
        );
    }
}
