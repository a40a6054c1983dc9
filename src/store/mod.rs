/// Credential Store
///
/// Persistence seam for user records. Each session operation reads one
/// record, decides, and writes back; the only conditional write is the
/// refresh-token rotation in `replace_refresh_token`.

mod memory;
mod postgres;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;

pub use memory::InMemoryCredentialStore;
pub use postgres::PostgresCredentialStore;

/// Persisted user record
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRecord {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
    /// bcrypt digest, never plaintext
    pub password_hash: String,
    /// SHA-256 digest of the one refresh token currently accepted
    pub refresh_token_hash: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Projection of a user safe to return to callers
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct PublicUser {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub avatar_url: Option<String>,
    pub cover_image_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRecord> for PublicUser {
    fn from(record: UserRecord) -> Self {
        Self {
            id: record.id,
            username: record.username,
            email: record.email,
            full_name: record.full_name,
            avatar_url: record.avatar_url,
            cover_image_url: record.cover_image_url,
            created_at: record.created_at,
            updated_at: record.updated_at,
        }
    }
}

/// Input for creating a user; `password_hash` must already be hashed and
/// the image URLs already hosted
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password_hash: String,
    pub avatar_url: String,
    pub cover_image_url: Option<String>,
}

/// Which profile image a URL belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageSlot {
    Avatar,
    CoverImage,
}

impl ImageSlot {
    pub fn field_name(self) -> &'static str {
        match self {
            ImageSlot::Avatar => "avatar",
            ImageSlot::CoverImage => "cover image",
        }
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Find a user whose username equals `username` or whose email equals `email`
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<UserRecord>, AppError>;

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError>;

    /// Insert a user; `Conflict` if the username or email is taken
    async fn create(&self, user: NewUser) -> Result<UserRecord, AppError>;

    /// Unconditionally set (or clear) the refresh-token digest
    async fn update_refresh_token(&self, id: Uuid, digest: Option<&str>) -> Result<(), AppError>;

    /// Set the digest to `new` only if it still equals `expected`.
    /// Returns whether the swap happened.
    async fn replace_refresh_token(
        &self,
        id: Uuid,
        expected: &str,
        new: &str,
    ) -> Result<bool, AppError>;

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), AppError>;

    async fn update_account_details(
        &self,
        id: Uuid,
        full_name: &str,
        email: &str,
    ) -> Result<UserRecord, AppError>;

    async fn update_image(&self, id: Uuid, slot: ImageSlot, url: &str)
        -> Result<UserRecord, AppError>;
}

pub(crate) fn user_not_found() -> AppError {
    AppError::NotFound("User does not exist".to_string())
}
