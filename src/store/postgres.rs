use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use uuid::Uuid;

use super::{user_not_found, CredentialStore, ImageSlot, NewUser, UserRecord};
use crate::error::AppError;

const USER_COLUMNS: &str = "id, username, email, full_name, avatar_url, cover_image_url, \
     password_hash, refresh_token_hash, created_at, updated_at";

/// `users` table backed store
#[derive(Clone)]
pub struct PostgresCredentialStore {
    pool: PgPool,
}

impl PostgresCredentialStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PostgresCredentialStore {
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE username = $1 OR email = $2 LIMIT 1",
            USER_COLUMNS
        ))
        .bind(username)
        .bind(email)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
        let user = sqlx::query_as::<_, UserRecord>(&format!(
            "SELECT {} FROM users WHERE id = $1",
            USER_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(user)
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, AppError> {
        let now = Utc::now();
        let record = sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            INSERT INTO users
                (id, username, email, full_name, avatar_url, cover_image_url, password_hash, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(Uuid::new_v4())
        .bind(&user.username)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.avatar_url)
        .bind(&user.cover_image_url)
        .bind(&user.password_hash)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(record)
    }

    async fn update_refresh_token(&self, id: Uuid, digest: Option<&str>) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users SET refresh_token_hash = $1, updated_at = $2 WHERE id = $3",
        )
        .bind(digest)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(user_not_found());
        }
        Ok(())
    }

    async fn replace_refresh_token(
        &self,
        id: Uuid,
        expected: &str,
        new: &str,
    ) -> Result<bool, AppError> {
        // Single conditional UPDATE: of two concurrent rotations only one matches.
        let result = sqlx::query(
            r#"
            UPDATE users
            SET refresh_token_hash = $1, updated_at = $2
            WHERE id = $3 AND refresh_token_hash = $4
            "#,
        )
        .bind(new)
        .bind(Utc::now())
        .bind(id)
        .bind(expected)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        let result = sqlx::query(
            "UPDATE users SET password_hash = $1, updated_at = $2 WHERE id = $3",
        )
        .bind(password_hash)
        .bind(Utc::now())
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(user_not_found());
        }
        Ok(())
    }

    async fn update_account_details(
        &self,
        id: Uuid,
        full_name: &str,
        email: &str,
    ) -> Result<UserRecord, AppError> {
        sqlx::query_as::<_, UserRecord>(&format!(
            r#"
            UPDATE users SET full_name = $1, email = $2, updated_at = $3
            WHERE id = $4
            RETURNING {}
            "#,
            USER_COLUMNS
        ))
        .bind(full_name)
        .bind(email)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(user_not_found)
    }

    async fn update_image(
        &self,
        id: Uuid,
        slot: ImageSlot,
        url: &str,
    ) -> Result<UserRecord, AppError> {
        let column = match slot {
            ImageSlot::Avatar => "avatar_url",
            ImageSlot::CoverImage => "cover_image_url",
        };

        sqlx::query_as::<_, UserRecord>(&format!(
            "UPDATE users SET {} = $1, updated_at = $2 WHERE id = $3 RETURNING {}",
            column, USER_COLUMNS
        ))
        .bind(url)
        .bind(Utc::now())
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(user_not_found)
    }
}
