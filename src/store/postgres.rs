//! Postgres-backed user record store
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::warn;

use super::UserStore;
use crate::error::{AccountError, Result};
use crate::models::{NewUserRecord, UserPatch, UserRecord};

/// Postgres unique violation (the users_email_key constraint)
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct PgUserStore {
    pool: PgPool,
}

impl PgUserStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_insert_error(err: sqlx::Error) -> AccountError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            return AccountError::DuplicateEmail;
        }
    }
    err.into()
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn find_by_identity_id(&self, identity_id: &str) -> Result<Option<UserRecord>> {
        let record =
            sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE identity_id = $1")
                .bind(identity_id)
                .fetch_optional(&self.pool)
                .await?;

        Ok(record)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<UserRecord>> {
        let record = sqlx::query_as::<_, UserRecord>("SELECT * FROM users WHERE email = $1")
            .bind(email)
            .fetch_optional(&self.pool)
            .await?;

        Ok(record)
    }

    async fn insert(&self, record: NewUserRecord) -> Result<UserRecord> {
        let record = sqlx::query_as::<_, UserRecord>(
            r#"
            INSERT INTO users (identity_id, email, name, picture, provider, verified, is_admin, identity)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING *
            "#,
        )
        .bind(record.identity_id)
        .bind(record.email)
        .bind(record.name)
        .bind(record.picture)
        .bind(record.provider)
        .bind(record.verified)
        .bind(record.is_admin)
        .bind(record.identity)
        .fetch_one(&self.pool)
        .await
        .map_err(map_insert_error)?;

        Ok(record)
    }

    async fn update(&self, identity_id: &str, patch: UserPatch) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET
                verified = COALESCE($2, verified),
                picture = COALESCE($3, picture),
                identity = COALESCE($4, identity),
                updated_at = CURRENT_TIMESTAMP
            WHERE identity_id = $1
            "#,
        )
        .bind(identity_id)
        .bind(patch.verified)
        .bind(patch.picture)
        .bind(patch.identity)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            warn!(identity_id = %identity_id, "update matched no user record");
        }

        Ok(())
    }

    async fn delete(&self, identity_id: &str) -> Result<()> {
        sqlx::query("DELETE FROM users WHERE identity_id = $1")
            .bind(identity_id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }
}
