//! Ordered persistence chain.
//!
//! Tiers are consulted primary-first. Every call is wrapped in a bounded
//! timeout; an error or timeout degrades to the next tier instead of
//! hanging or failing the operation. A degraded tier is remembered, and the
//! first successful contact after recovery receives the full snapshot
//! before resuming incremental writes.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use classpoints_core::transaction::PointTransaction;
use classpoints_core::user::User;

use crate::error::StoreError;
use crate::tier::{RosterData, RosterTier};

/// Default per-tier call timeout.
pub const DEFAULT_TIER_TIMEOUT: Duration = Duration::from_secs(5);

/// Outcome marker for a mutation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// The primary tier accepted the write.
    Durable,
    /// The primary tier rejected or timed out; a fallback tier (or only the
    /// in-memory working copy) holds the write.
    CacheOnly,
}

struct TierSlot {
    tier: Box<dyn RosterTier>,
    degraded: AtomicBool,
}

enum WriteOp<'a> {
    User(&'a User),
    Transaction(&'a PointTransaction),
}

pub struct TieredStore {
    slots: Vec<TierSlot>,
    timeout: Duration,
}

impl TieredStore {
    /// Build a chain from tiers in priority order (primary first).
    pub fn new(tiers: Vec<Box<dyn RosterTier>>, timeout: Duration) -> Self {
        let slots = tiers
            .into_iter()
            .map(|tier| TierSlot {
                tier,
                degraded: AtomicBool::new(false),
            })
            .collect();
        Self { slots, timeout }
    }

    async fn with_timeout<T, F>(&self, tier: &'static str, fut: F) -> Result<T, StoreError>
    where
        F: Future<Output = Result<T, StoreError>>,
    {
        match tokio::time::timeout(self.timeout, fut).await {
            Ok(result) => result,
            Err(_) => Err(StoreError::Timeout {
                tier,
                after: self.timeout,
            }),
        }
    }

    /// Load the roster: the first tier that returns data wins. `NoData`
    /// falls through without marking the tier degraded; errors and timeouts
    /// do mark it. `None` means no tier holds a roster (seed territory).
    pub async fn load(&self) -> Option<RosterData> {
        for slot in &self.slots {
            let name = slot.tier.name();
            match self.with_timeout(name, slot.tier.load()).await {
                Ok(data) => {
                    slot.degraded.store(false, Ordering::SeqCst);
                    tracing::debug!(tier = name, users = data.users.len(), "roster loaded");
                    return Some(data);
                }
                Err(StoreError::NoData) => {
                    slot.degraded.store(false, Ordering::SeqCst);
                    tracing::debug!(tier = name, "tier holds no data, falling through");
                }
                Err(err) => {
                    slot.degraded.store(true, Ordering::SeqCst);
                    tracing::warn!(tier = name, error = %err, "tier load failed, falling through");
                }
            }
        }
        None
    }

    async fn apply(&self, slot: &TierSlot, op: &WriteOp<'_>) -> Result<(), StoreError> {
        let name = slot.tier.name();
        match op {
            WriteOp::User(user) => self.with_timeout(name, slot.tier.upsert_user(user)).await,
            WriteOp::Transaction(transaction) => {
                self.with_timeout(name, slot.tier.append_transaction(transaction))
                    .await
            }
        }
    }

    /// Write-through: every tier receives the ops. `snapshot` is the
    /// post-mutation roster; a tier returning from degradation gets the full
    /// snapshot (which already contains the ops) instead of an incremental
    /// replay it may have missed pieces of.
    async fn write(&self, ops: &[WriteOp<'_>], snapshot: &RosterData) -> Persistence {
        let mut durable = false;
        for (index, slot) in self.slots.iter().enumerate() {
            let name = slot.tier.name();

            if slot.degraded.load(Ordering::SeqCst) {
                match self.with_timeout(name, slot.tier.replace_all(snapshot)).await {
                    Ok(()) => {
                        slot.degraded.store(false, Ordering::SeqCst);
                        tracing::info!(tier = name, "tier recovered, snapshot written back");
                        durable |= index == 0;
                    }
                    Err(err) => {
                        tracing::warn!(tier = name, error = %err, "tier still unavailable");
                    }
                }
                continue;
            }

            let mut accepted = true;
            for op in ops {
                if let Err(err) = self.apply(slot, op).await {
                    slot.degraded.store(true, Ordering::SeqCst);
                    tracing::warn!(tier = name, error = %err, "tier write failed");
                    accepted = false;
                    break;
                }
            }
            durable |= accepted && index == 0;
        }

        if durable {
            Persistence::Durable
        } else {
            Persistence::CacheOnly
        }
    }

    pub async fn persist_user(&self, user: &User, snapshot: &RosterData) -> Persistence {
        self.write(&[WriteOp::User(user)], snapshot).await
    }

    pub async fn persist_transaction(
        &self,
        transaction: &PointTransaction,
        snapshot: &RosterData,
    ) -> Persistence {
        self.write(&[WriteOp::Transaction(transaction)], snapshot).await
    }

    /// The combined ledger write: the updated user and its transaction go to
    /// each tier together.
    pub async fn persist_points(
        &self,
        user: &User,
        transaction: &PointTransaction,
        snapshot: &RosterData,
    ) -> Persistence {
        self.write(
            &[WriteOp::User(user), WriteOp::Transaction(transaction)],
            snapshot,
        )
        .await
    }

    /// Push a full snapshot to every tier. Used to seed an empty chain.
    pub async fn persist_snapshot(&self, snapshot: &RosterData) -> Persistence {
        let mut durable = false;
        for (index, slot) in self.slots.iter().enumerate() {
            let name = slot.tier.name();
            match self.with_timeout(name, slot.tier.replace_all(snapshot)).await {
                Ok(()) => {
                    slot.degraded.store(false, Ordering::SeqCst);
                    durable |= index == 0;
                }
                Err(err) => {
                    slot.degraded.store(true, Ordering::SeqCst);
                    tracing::warn!(tier = name, error = %err, "snapshot write failed");
                }
            }
        }
        if durable {
            Persistence::Durable
        } else {
            Persistence::CacheOnly
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
