//! JSON-file cache tier.
//!
//! Two named entries in the cache directory, `users.json` and
//! `pointTransactions.json` — each the serialized camelCase form of the
//! corresponding in-memory collection. This layout matches what external
//! consumers persisted historically, so an existing cache directory is
//! readable as-is.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use classpoints_core::transaction::PointTransaction;
use classpoints_core::user::User;

use crate::error::StoreError;
use crate::tier::{RosterData, RosterTier};

/// Cache entry holding the user collection.
pub const USERS_ENTRY: &str = "users.json";
/// Cache entry holding the transaction log.
pub const TRANSACTIONS_ENTRY: &str = "pointTransactions.json";

pub struct FileTier {
    dir: PathBuf,
}

impl FileTier {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn users_path(&self) -> PathBuf {
        self.dir.join(USERS_ENTRY)
    }

    fn transactions_path(&self) -> PathBuf {
        self.dir.join(TRANSACTIONS_ENTRY)
    }

    async fn read_entry<T: DeserializeOwned>(path: &Path) -> Result<Option<T>, StoreError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    /// Write an entry via a temporary file and rename, so a crash mid-write
    /// never leaves a truncated entry behind.
    async fn write_entry<T: Serialize>(&self, path: &Path, value: &T) -> Result<(), StoreError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        let bytes = serde_json::to_vec_pretty(value)?;
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, &bytes).await?;
        tokio::fs::rename(&tmp, path).await?;
        Ok(())
    }
}

#[async_trait]
impl RosterTier for FileTier {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn load(&self) -> Result<RosterData, StoreError> {
        let users: Option<Vec<User>> = Self::read_entry(&self.users_path()).await?;
        let Some(users) = users else {
            return Err(StoreError::NoData);
        };
        let transactions: Vec<PointTransaction> =
            Self::read_entry(&self.transactions_path()).await?.unwrap_or_default();
        Ok(RosterData { users, transactions })
    }

    async fn upsert_user(&self, user: &User) -> Result<(), StoreError> {
        let mut users: Vec<User> =
            Self::read_entry(&self.users_path()).await?.unwrap_or_default();
        match users.iter_mut().find(|u| u.id == user.id) {
            Some(existing) => *existing = user.clone(),
            None => users.push(user.clone()),
        }
        self.write_entry(&self.users_path(), &users).await
    }

    async fn append_transaction(
        &self,
        transaction: &PointTransaction,
    ) -> Result<(), StoreError> {
        let mut transactions: Vec<PointTransaction> =
            Self::read_entry(&self.transactions_path()).await?.unwrap_or_default();
        transactions.push(transaction.clone());
        self.write_entry(&self.transactions_path(), &transactions).await
    }

    async fn replace_all(&self, data: &RosterData) -> Result<(), StoreError> {
        self.write_entry(&self.users_path(), &data.users).await?;
        self.write_entry(&self.transactions_path(), &data.transactions).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use classpoints_core::user::ExternalIdentity;

    fn user(id: &str) -> User {
        User::from_identity(
            &ExternalIdentity {
                id: id.to_string(),
                email: format!("{id}@example.com"),
                display_name: None,
            },
            Utc::now(),
        )
    }

    fn tx(id: &str, user_id: &str) -> PointTransaction {
        let mut tx =
            PointTransaction::record(user_id.to_string(), "t1".to_string(), 5, None, Utc::now());
        tx.id = id.to_string();
        tx
    }

    #[tokio::test]
    async fn empty_directory_reports_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let tier = FileTier::new(dir.path());
        assert!(matches!(tier.load().await, Err(StoreError::NoData)));
    }

    #[tokio::test]
    async fn snapshot_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let tier = FileTier::new(dir.path());

        let data = RosterData {
            users: vec![user("s1"), user("s2")],
            transactions: vec![tx("tx1", "s1")],
        };
        tier.replace_all(&data).await.unwrap();

        let loaded = tier.load().await.unwrap();
        assert_eq!(loaded.users.len(), 2);
        assert_eq!(loaded.transactions.len(), 1);
        assert_eq!(loaded.transactions[0].id, "tx1");
    }

    #[tokio::test]
    async fn upsert_into_fresh_directory_creates_entry() {
        let dir = tempfile::tempdir().unwrap();
        let tier = FileTier::new(dir.path());

        tier.upsert_user(&user("s1")).await.unwrap();

        let loaded = tier.load().await.unwrap();
        assert_eq!(loaded.users.len(), 1);
        // Transactions entry absent is fine: it defaults to empty.
        assert!(loaded.transactions.is_empty());
    }

    #[tokio::test]
    async fn append_preserves_order() {
        let dir = tempfile::tempdir().unwrap();
        let tier = FileTier::new(dir.path());
        tier.replace_all(&RosterData::default()).await.unwrap();

        for i in 0..3 {
            tier.append_transaction(&tx(&format!("tx{i}"), "s1")).await.unwrap();
        }

        let ids: Vec<_> = tier
            .load()
            .await
            .unwrap()
            .transactions
            .into_iter()
            .map(|t| t.id)
            .collect();
        assert_eq!(ids, vec!["tx0", "tx1", "tx2"]);
    }

    #[tokio::test]
    async fn entries_use_the_documented_camel_case_layout() {
        let dir = tempfile::tempdir().unwrap();
        let tier = FileTier::new(dir.path());
        tier.replace_all(&RosterData {
            users: vec![user("s1")],
            transactions: vec![tx("tx1", "s1")],
        })
        .await
        .unwrap();

        let users_raw =
            tokio::fs::read_to_string(dir.path().join(USERS_ENTRY)).await.unwrap();
        assert!(users_raw.contains("\"displayName\""));
        assert!(users_raw.contains("\"joinedAt\""));

        let tx_raw =
            tokio::fs::read_to_string(dir.path().join(TRANSACTIONS_ENTRY)).await.unwrap();
        assert!(tx_raw.contains("\"pointsChange\""));
        assert!(tx_raw.contains("\"teacherId\""));
    }
}
