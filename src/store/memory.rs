use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use super::{user_not_found, CredentialStore, ImageSlot, NewUser, UserRecord};
use crate::error::AppError;

/// Process-local store with the same uniqueness and compare-and-swap
/// guarantees as the Postgres store
#[derive(Default)]
pub struct InMemoryCredentialStore {
    users: Mutex<HashMap<Uuid, UserRecord>>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn users(&self) -> Result<MutexGuard<'_, HashMap<Uuid, UserRecord>>, AppError> {
        self.users
            .lock()
            .map_err(|_| AppError::Internal("credential store lock poisoned".to_string()))
    }

    fn modify<F>(&self, id: Uuid, f: F) -> Result<UserRecord, AppError>
    where
        F: FnOnce(&mut UserRecord),
    {
        let mut users = self.users()?;
        let record = users.get_mut(&id).ok_or_else(user_not_found)?;
        f(record);
        record.updated_at = Utc::now();
        Ok(record.clone())
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn find_by_username_or_email(
        &self,
        username: &str,
        email: &str,
    ) -> Result<Option<UserRecord>, AppError> {
        let users = self.users()?;
        Ok(users
            .values()
            .find(|u| u.username == username || u.email == email)
            .cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<UserRecord>, AppError> {
        Ok(self.users()?.get(&id).cloned())
    }

    async fn create(&self, user: NewUser) -> Result<UserRecord, AppError> {
        let mut users = self.users()?;
        if users
            .values()
            .any(|u| u.username == user.username || u.email == user.email)
        {
            return Err(AppError::Conflict(
                "User with email or username already exists".to_string(),
            ));
        }

        let now = Utc::now();
        let record = UserRecord {
            id: Uuid::new_v4(),
            username: user.username,
            email: user.email,
            full_name: user.full_name,
            avatar_url: Some(user.avatar_url),
            cover_image_url: user.cover_image_url,
            password_hash: user.password_hash,
            refresh_token_hash: None,
            created_at: now,
            updated_at: now,
        };
        users.insert(record.id, record.clone());
        Ok(record)
    }

    async fn update_refresh_token(&self, id: Uuid, digest: Option<&str>) -> Result<(), AppError> {
        self.modify(id, |u| u.refresh_token_hash = digest.map(str::to_string))?;
        Ok(())
    }

    async fn replace_refresh_token(
        &self,
        id: Uuid,
        expected: &str,
        new: &str,
    ) -> Result<bool, AppError> {
        let mut users = self.users()?;
        let record = users.get_mut(&id).ok_or_else(user_not_found)?;
        if record.refresh_token_hash.as_deref() != Some(expected) {
            return Ok(false);
        }
        record.refresh_token_hash = Some(new.to_string());
        record.updated_at = Utc::now();
        Ok(true)
    }

    async fn update_password_hash(&self, id: Uuid, password_hash: &str) -> Result<(), AppError> {
        self.modify(id, |u| u.password_hash = password_hash.to_string())?;
        Ok(())
    }

    async fn update_account_details(
        &self,
        id: Uuid,
        full_name: &str,
        email: &str,
    ) -> Result<UserRecord, AppError> {
        let mut users = self.users()?;
        if users.values().any(|u| u.id != id && u.email == email) {
            return Err(AppError::Conflict("Email is already in use".to_string()));
        }
        let record = users.get_mut(&id).ok_or_else(user_not_found)?;
        record.full_name = full_name.to_string();
        record.email = email.to_string();
        record.updated_at = Utc::now();
        Ok(record.clone())
    }

    async fn update_image(
        &self,
        id: Uuid,
        slot: ImageSlot,
        url: &str,
    ) -> Result<UserRecord, AppError> {
        self.modify(id, |u| match slot {
            ImageSlot::Avatar => u.avatar_url = Some(url.to_string()),
            ImageSlot::CoverImage => u.cover_image_url = Some(url.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_user(username: &str, email: &str) -> NewUser {
        NewUser {
            username: username.to_string(),
            email: email.to_string(),
            full_name: "Test User".to_string(),
            password_hash: "$2b$10$digest".to_string(),
            avatar_url: "https://media.test/avatar.png".to_string(),
            cover_image_url: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = InMemoryCredentialStore::new();
        let created = store.create(new_user("u1", "e1@x.com")).await.unwrap();

        let by_email = store.find_by_username_or_email("", "e1@x.com").await.unwrap();
        let by_name = store.find_by_username_or_email("u1", "").await.unwrap();
        let by_id = store.find_by_id(created.id).await.unwrap();

        assert_eq!(by_email.unwrap().id, created.id);
        assert_eq!(by_name.unwrap().id, created.id);
        assert_eq!(by_id.unwrap().id, created.id);
    }

    #[tokio::test]
    async fn test_duplicate_username_or_email_conflicts() {
        let store = InMemoryCredentialStore::new();
        store.create(new_user("u1", "e1@x.com")).await.unwrap();

        assert!(matches!(
            store.create(new_user("u1", "other@x.com")).await,
            Err(AppError::Conflict(_))
        ));
        assert!(matches!(
            store.create(new_user("other", "e1@x.com")).await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_replace_refresh_token_is_conditional() {
        let store = InMemoryCredentialStore::new();
        let user = store.create(new_user("u1", "e1@x.com")).await.unwrap();
        store.update_refresh_token(user.id, Some("first")).await.unwrap();

        assert!(store.replace_refresh_token(user.id, "first", "second").await.unwrap());
        assert!(!store.replace_refresh_token(user.id, "first", "third").await.unwrap());

        let stored = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(stored.refresh_token_hash.as_deref(), Some("second"));
    }

    #[tokio::test]
    async fn test_update_email_conflict() {
        let store = InMemoryCredentialStore::new();
        let first = store.create(new_user("u1", "e1@x.com")).await.unwrap();
        store.create(new_user("u2", "e2@x.com")).await.unwrap();

        assert!(matches!(
            store.update_account_details(first.id, "Name", "e2@x.com").await,
            Err(AppError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn test_update_unknown_user_is_not_found() {
        let store = InMemoryCredentialStore::new();
        assert!(matches!(
            store.update_password_hash(Uuid::new_v4(), "digest").await,
            Err(AppError::NotFound(_))
        ));
    }
}
