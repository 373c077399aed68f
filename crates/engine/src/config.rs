use std::path::PathBuf;
use std::time::Duration;

/// Engine configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development; library
/// callers may also build the struct directly.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Display name for the class (default: `My Awesome Class`).
    pub class_name: String,
    /// PostgreSQL connection string. When unset, the engine runs on the
    /// file cache alone.
    pub database_url: Option<String>,
    /// Directory for the local fallback cache (default: `.classpoints`).
    pub cache_dir: PathBuf,
    /// Per-tier store call timeout in seconds (default: `5`).
    pub store_timeout_secs: u64,
    /// Broadcast channel capacity for the event bus (default: `256`).
    pub event_bus_capacity: usize,
}

impl EngineConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var              | Default            |
    /// |----------------------|--------------------|
    /// | `CLASS_NAME`         | `My Awesome Class` |
    /// | `DATABASE_URL`       | unset              |
    /// | `CACHE_DIR`          | `.classpoints`     |
    /// | `STORE_TIMEOUT_SECS` | `5`                |
    /// | `EVENT_BUS_CAPACITY` | `256`              |
    pub fn from_env() -> Self {
        let class_name =
            std::env::var("CLASS_NAME").unwrap_or_else(|_| "My Awesome Class".into());

        let database_url = std::env::var("DATABASE_URL").ok();

        let cache_dir: PathBuf = std::env::var("CACHE_DIR")
            .unwrap_or_else(|_| ".classpoints".into())
            .into();

        let store_timeout_secs: u64 = std::env::var("STORE_TIMEOUT_SECS")
            .unwrap_or_else(|_| "5".into())
            .parse()
            .expect("STORE_TIMEOUT_SECS must be a valid u64");

        let event_bus_capacity: usize = std::env::var("EVENT_BUS_CAPACITY")
            .unwrap_or_else(|_| "256".into())
            .parse()
            .expect("EVENT_BUS_CAPACITY must be a valid usize");

        Self {
            class_name,
            database_url,
            cache_dir,
            store_timeout_secs,
            event_bus_capacity,
        }
    }

    pub fn store_timeout(&self) -> Duration {
        Duration::from_secs(self.store_timeout_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            class_name: "My Awesome Class".into(),
            database_url: None,
            cache_dir: ".classpoints".into(),
            store_timeout_secs: 5,
            event_bus_capacity: 256,
        }
    }
}
