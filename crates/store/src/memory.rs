//! In-process tier.
//!
//! Serves as the default tier in tests and as a stand-in primary. The
//! `set_unavailable` switch makes failure paths testable without a real
//! backend going down.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use classpoints_core::transaction::PointTransaction;
use classpoints_core::user::User;

use crate::error::StoreError;
use crate::tier::{RosterData, RosterTier};

#[derive(Default)]
pub struct MemoryTier {
    data: RwLock<Option<RosterData>>,
    unavailable: AtomicBool,
}

impl MemoryTier {
    /// An empty tier: `load` reports `NoData` until something is written.
    pub fn new() -> Self {
        Self::default()
    }

    /// A tier pre-filled with a snapshot (which may be an empty roster).
    pub fn with_data(data: RosterData) -> Self {
        Self {
            data: RwLock::new(Some(data)),
            unavailable: AtomicBool::new(false),
        }
    }

    /// Flip the tier's availability. While unavailable every call fails
    /// with [`StoreError::Unavailable`].
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), StoreError> {
        if self.unavailable.load(Ordering::SeqCst) {
            Err(StoreError::Unavailable {
                tier: "memory",
                detail: "marked unavailable".to_string(),
            })
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl RosterTier for MemoryTier {
    fn name(&self) -> &'static str {
        "memory"
    }

    async fn load(&self) -> Result<RosterData, StoreError> {
        self.check_available()?;
        self.data
            .read()
            .await
            .clone()
            .ok_or(StoreError::NoData)
    }

    async fn upsert_user(&self, user: &User) -> Result<(), StoreError> {
        self.check_available()?;
        let mut guard = self.data.write().await;
        let data = guard.get_or_insert_with(RosterData::default);
        match data.users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => data.users.push(user.clone()),
        }
        Ok(())
    }

    async fn append_transaction(
        &self,
        transaction: &PointTransaction,
    ) -> Result<(), StoreError> {
        self.check_available()?;
        let mut guard = self.data.write().await;
        guard
            .get_or_insert_with(RosterData::default)
            .transactions
            .push(transaction.clone());
        Ok(())
    }

    async fn replace_all(&self, data: &RosterData) -> Result<(), StoreError> {
        self.check_available()?;
        *self.data.write().await = Some(data.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
