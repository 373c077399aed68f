use std::sync::Arc;

use tokio::sync::broadcast;

use classpoints_events::{EventBus, RosterEvent};
use classpoints_store::{
    FileTier, Persistence, PostgresTier, RosterStore, RosterTier, TieredStore,
};

use crate::config::EngineConfig;

/// The engine facade: shared roster store, event bus, and configuration.
///
/// Cheaply cloneable (inner data is behind `Arc`).
#[derive(Clone)]
pub struct ClassEngine {
    store: Arc<RosterStore>,
    bus: Arc<EventBus>,
    config: EngineConfig,
}

impl ClassEngine {
    /// Boot the engine from configuration: build the tier chain (PostgreSQL
    /// primary when `database_url` is set, then the file cache) and load the
    /// roster.
    ///
    /// A primary that cannot be reached at boot is skipped with a warning —
    /// the engine starts degraded rather than failing.
    pub async fn open(config: EngineConfig) -> Self {
        let mut tiers: Vec<Box<dyn RosterTier>> = Vec::new();

        if let Some(url) = &config.database_url {
            match PostgresTier::connect(url).await {
                Ok(tier) => tiers.push(Box::new(tier)),
                Err(err) => {
                    tracing::warn!(error = %err, "primary tier unreachable at boot, continuing on cache");
                }
            }
        }
        tiers.push(Box::new(FileTier::new(&config.cache_dir)));

        let store =
            RosterStore::open(TieredStore::new(tiers, config.store_timeout())).await;
        let bus = EventBus::new(config.event_bus_capacity);

        Self {
            store: Arc::new(store),
            bus: Arc::new(bus),
            config,
        }
    }

    /// Assemble an engine from already-built parts (tests, embedders).
    pub fn with_store(store: Arc<RosterStore>, bus: Arc<EventBus>, config: EngineConfig) -> Self {
        Self { store, bus, config }
    }

    pub fn store(&self) -> &RosterStore {
        &self.store
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Subscribe to roster events. This is the identity-change surface:
    /// consumers observe `IdentityResolved` / `SignedOut` here.
    pub fn subscribe(&self) -> broadcast::Receiver<RosterEvent> {
        self.bus.subscribe()
    }

    pub(crate) fn publish(&self, event: RosterEvent) {
        self.bus.publish(event);
    }

    /// Surface a non-durable write as a soft warning: callers already got a
    /// successful result, but persistence was best-effort this time.
    pub(crate) fn note_persistence(&self, operation: &'static str, persistence: Persistence) {
        if persistence == Persistence::CacheOnly {
            tracing::warn!(operation, "write not durably persisted; local cache holds it");
            self.bus.publish(RosterEvent::PersistenceDegraded {
                operation: operation.to_string(),
                detail: "primary tier rejected the write".to_string(),
            });
        }
    }
}
