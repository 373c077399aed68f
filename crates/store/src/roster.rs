//! The roster store: in-memory working copy + persistence chain.
//!
//! All reads are served from the working copy; every mutation updates the
//! copy and writes through the chain while still holding the write guard,
//! so mutations (including their persistence) are fully serialized. That
//! single guard scope is what keeps the points-clamp invariant intact even
//! under concurrent misuse, and guarantees a ledger write never lands
//! without its transaction (or vice versa).

use tokio::sync::RwLock;

use classpoints_core::stats;
use classpoints_core::transaction::PointTransaction;
use classpoints_core::user::{normalize_email, User};
use classpoints_core::types::UserId;

use crate::seed::seed_roster;
use crate::tier::RosterData;
use crate::tiered::{Persistence, TieredStore};

/// Ordering for [`RosterStore::list`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOrder {
    /// Insertion order (first resolution first).
    Joined,
    /// Points descending; ties by `joined_at` ascending, then id.
    PointsDesc,
}

/// Filter for [`RosterStore::list_transactions`].
#[derive(Debug, Clone, Default)]
pub struct TransactionFilter {
    pub user_id: Option<UserId>,
    pub limit: Option<usize>,
}

pub struct RosterStore {
    inner: RwLock<RosterData>,
    tiers: TieredStore,
}

impl RosterStore {
    /// Initialize from the chain. When no tier holds data, the fixed seed
    /// roster is loaded and written back so the store is never empty.
    pub async fn open(tiers: TieredStore) -> Self {
        let data = match tiers.load().await {
            Some(data) => data,
            None => {
                tracing::info!("no persistence tier holds a roster, loading seed data");
                let seed = seed_roster();
                tiers.persist_snapshot(&seed).await;
                seed
            }
        };
        Self {
            inner: RwLock::new(data),
            tiers,
        }
    }

    pub async fn get(&self, user_id: &str) -> Option<User> {
        self.inner
            .read()
            .await
            .users
            .iter()
            .find(|u| u.id == user_id)
            .cloned()
    }

    /// Email lookup is case-insensitive: it is the key that matches
    /// returning users across sessions.
    pub async fn find_by_email(&self, email: &str) -> Option<User> {
        let needle = normalize_email(email);
        self.inner
            .read()
            .await
            .users
            .iter()
            .find(|u| normalize_email(&u.email) == needle)
            .cloned()
    }

    pub async fn list(&self, order: ListOrder) -> Vec<User> {
        let guard = self.inner.read().await;
        match order {
            ListOrder::Joined => guard.users.clone(),
            ListOrder::PointsDesc => stats::leaderboard(&guard.users),
        }
    }

    /// Insert or replace a user by id. Returns the stored record and
    /// whether the write reached the primary tier.
    pub async fn upsert(&self, user: User) -> (User, Persistence) {
        let mut guard = self.inner.write().await;
        match guard.users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => guard.users.push(user.clone()),
        }
        let persistence = self.tiers.persist_user(&user, &guard).await;
        (user, persistence)
    }

    /// The combined ledger write: replace the user and append the
    /// transaction under one guard, persisted together.
    pub async fn record_points(
        &self,
        user: User,
        transaction: PointTransaction,
    ) -> Persistence {
        let mut guard = self.inner.write().await;
        match guard.users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => guard.users.push(user.clone()),
        }
        guard.transactions.push(transaction.clone());
        self.tiers.persist_points(&user, &transaction, &guard).await
    }

    /// Append-only; order preserved.
    pub async fn append(&self, transaction: PointTransaction) -> Persistence {
        let mut guard = self.inner.write().await;
        guard.transactions.push(transaction.clone());
        self.tiers.persist_transaction(&transaction, &guard).await
    }

    /// Transactions newest-first for display, optionally filtered by user
    /// and capped.
    pub async fn list_transactions(&self, filter: TransactionFilter) -> Vec<PointTransaction> {
        let guard = self.inner.read().await;
        let iter = guard.transactions.iter().rev().filter(|t| {
            filter
                .user_id
                .as_ref()
                .map(|id| &t.user_id == id)
                .unwrap_or(true)
        });
        match filter.limit {
            Some(limit) => iter.take(limit).cloned().collect(),
            None => iter.cloned().collect(),
        }
    }

    /// A cloned roster for the pure read functions.
    pub async fn snapshot(&self) -> RosterData {
        self.inner.read().await.clone()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
