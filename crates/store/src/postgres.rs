//! PostgreSQL primary tier.
//!
//! Schema lives in `migrations/` and is applied at connect time. Avatar
//! fields are flattened into text columns; roles are stored as their string
//! form.

use async_trait::async_trait;
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Row};

use classpoints_core::avatar::AvatarConfig;
use classpoints_core::transaction::PointTransaction;
use classpoints_core::user::{Role, User};

use crate::error::StoreError;
use crate::tier::{RosterData, RosterTier};

/// Column list shared across queries to avoid repetition.
const USER_COLUMNS: &str = "id, email, display_name, role, points, \
                            hair, hair_color, eyes, eye_color, skin, outfit, outfit_color, accessory, \
                            joined_at, last_active_at";

const TRANSACTION_COLUMNS: &str = "id, user_id, teacher_id, points_change, reason, created_at";

pub struct PostgresTier {
    pool: PgPool,
}

impl PostgresTier {
    /// Connect, run migrations, and return the tier.
    pub async fn connect(database_url: &str) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .map_err(|err| StoreError::Unavailable {
                tier: "postgres",
                detail: format!("migration failed: {err}"),
            })?;
        Ok(Self { pool })
    }

    /// Wrap an existing pool (migrations are the caller's responsibility).
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn user_from_row(row: &PgRow) -> Result<User, StoreError> {
    let role: String = row.try_get("role")?;
    Ok(User {
        id: row.try_get("id")?,
        email: row.try_get("email")?,
        display_name: row.try_get("display_name")?,
        role: role
            .parse::<Role>()
            .map_err(|err| StoreError::Unavailable {
                tier: "postgres",
                detail: err.to_string(),
            })?,
        points: row.try_get("points")?,
        avatar: AvatarConfig {
            hair: row.try_get("hair")?,
            hair_color: row.try_get("hair_color")?,
            eyes: row.try_get("eyes")?,
            eye_color: row.try_get("eye_color")?,
            skin: row.try_get("skin")?,
            outfit: row.try_get("outfit")?,
            outfit_color: row.try_get("outfit_color")?,
            accessory: row.try_get("accessory")?,
        },
        joined_at: row.try_get("joined_at")?,
        last_active_at: row.try_get("last_active_at")?,
    })
}

fn transaction_from_row(row: &PgRow) -> Result<PointTransaction, StoreError> {
    Ok(PointTransaction {
        id: row.try_get("id")?,
        user_id: row.try_get("user_id")?,
        teacher_id: row.try_get("teacher_id")?,
        points_change: row.try_get("points_change")?,
        reason: row.try_get("reason")?,
        created_at: row.try_get("created_at")?,
    })
}

async fn insert_user<'e, E>(executor: E, user: &User) -> Result<(), StoreError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO users (id, email, display_name, role, points,
                            hair, hair_color, eyes, eye_color, skin, outfit, outfit_color, accessory,
                            joined_at, last_active_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15)
         ON CONFLICT (id) DO UPDATE SET
             email = EXCLUDED.email,
             display_name = EXCLUDED.display_name,
             role = EXCLUDED.role,
             points = EXCLUDED.points,
             hair = EXCLUDED.hair,
             hair_color = EXCLUDED.hair_color,
             eyes = EXCLUDED.eyes,
             eye_color = EXCLUDED.eye_color,
             skin = EXCLUDED.skin,
             outfit = EXCLUDED.outfit,
             outfit_color = EXCLUDED.outfit_color,
             accessory = EXCLUDED.accessory,
             last_active_at = EXCLUDED.last_active_at",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.display_name)
    .bind(user.role.as_str())
    .bind(user.points)
    .bind(&user.avatar.hair)
    .bind(&user.avatar.hair_color)
    .bind(&user.avatar.eyes)
    .bind(&user.avatar.eye_color)
    .bind(&user.avatar.skin)
    .bind(&user.avatar.outfit)
    .bind(&user.avatar.outfit_color)
    .bind(&user.avatar.accessory)
    .bind(user.joined_at)
    .bind(user.last_active_at)
    .execute(executor)
    .await?;
    Ok(())
}

async fn insert_transaction<'e, E>(
    executor: E,
    transaction: &PointTransaction,
) -> Result<(), StoreError>
where
    E: sqlx::PgExecutor<'e>,
{
    sqlx::query(
        "INSERT INTO point_transactions (id, user_id, teacher_id, points_change, reason, created_at)
         VALUES ($1, $2, $3, $4, $5, $6)",
    )
    .bind(&transaction.id)
    .bind(&transaction.user_id)
    .bind(&transaction.teacher_id)
    .bind(transaction.points_change)
    .bind(&transaction.reason)
    .bind(transaction.created_at)
    .execute(executor)
    .await?;
    Ok(())
}

#[async_trait]
impl RosterTier for PostgresTier {
    fn name(&self) -> &'static str {
        "postgres"
    }

    async fn load(&self) -> Result<RosterData, StoreError> {
        let query = format!("SELECT {USER_COLUMNS} FROM users ORDER BY joined_at ASC, id ASC");
        let user_rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        if user_rows.is_empty() {
            return Err(StoreError::NoData);
        }
        let users = user_rows
            .iter()
            .map(user_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        // created_at ascending with the time-ordered id as tie-break
        // reconstructs append order.
        let query = format!(
            "SELECT {TRANSACTION_COLUMNS} FROM point_transactions ORDER BY created_at ASC, id ASC"
        );
        let tx_rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        let transactions = tx_rows
            .iter()
            .map(transaction_from_row)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(RosterData { users, transactions })
    }

    async fn upsert_user(&self, user: &User) -> Result<(), StoreError> {
        insert_user(&self.pool, user).await
    }

    async fn append_transaction(
        &self,
        transaction: &PointTransaction,
    ) -> Result<(), StoreError> {
        insert_transaction(&self.pool, transaction).await
    }

    async fn replace_all(&self, data: &RosterData) -> Result<(), StoreError> {
        let mut db_tx = self.pool.begin().await?;
        sqlx::query("DELETE FROM point_transactions")
            .execute(&mut *db_tx)
            .await?;
        sqlx::query("DELETE FROM users").execute(&mut *db_tx).await?;
        for user in &data.users {
            insert_user(&mut *db_tx, user).await?;
        }
        for transaction in &data.transactions {
            insert_transaction(&mut *db_tx, transaction).await?;
        }
        db_tx.commit().await?;
        Ok(())
    }
}
