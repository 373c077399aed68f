use std::time::Duration;

/// Storage-layer errors. Absorbed at the [`RosterStore`](crate::RosterStore)
/// boundary: callers of the engine operations never see these directly.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Tier '{tier}' unavailable: {detail}")]
    Unavailable { tier: &'static str, detail: String },

    #[error("Tier '{tier}' timed out after {after:?}")]
    Timeout { tier: &'static str, after: Duration },

    /// The tier is reachable but holds no roster yet.
    #[error("Tier holds no data")]
    NoData,

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}
