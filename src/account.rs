/// Account Service
///
/// Registration and profile maintenance. Images go through the media host
/// first; a user record is created or changed only once a URL is in hand.

use std::sync::Arc;

use crate::auth::compute_password_hash;
use crate::error::{AppError, ValidationError};
use crate::media_client::{MediaFile, MediaUploader};
use crate::session::AuthContext;
use crate::store::{CredentialStore, ImageSlot, NewUser, PublicUser};
use crate::validators::{is_valid_email, is_valid_full_name, is_valid_password, is_valid_username};

/// Registration input as submitted by the caller
#[derive(Debug, Clone)]
pub struct Registration {
    pub username: String,
    pub email: String,
    pub full_name: String,
    pub password: String,
    /// Required
    pub avatar: Option<MediaFile>,
    pub cover_image: Option<MediaFile>,
}

pub struct AccountService {
    store: Arc<dyn CredentialStore>,
    uploader: Arc<dyn MediaUploader>,
}

impl AccountService {
    pub fn new(store: Arc<dyn CredentialStore>, uploader: Arc<dyn MediaUploader>) -> Self {
        Self { store, uploader }
    }

    #[tracing::instrument(name = "register", skip_all)]
    pub async fn register(&self, registration: Registration) -> Result<PublicUser, AppError> {
        let username = is_valid_username(&registration.username)?;
        let email = is_valid_email(&registration.email)?;
        let full_name = is_valid_full_name(&registration.full_name)?;
        is_valid_password("password", &registration.password)?;

        let avatar = registration
            .avatar
            .filter(|file| !file.bytes.is_empty())
            .ok_or(ValidationError::EmptyField(ImageSlot::Avatar.field_name()))?;

        if self
            .store
            .find_by_username_or_email(&username, &email)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "User with email or username already exists".to_string(),
            ));
        }

        let avatar_url = self.upload(ImageSlot::Avatar, avatar).await?;
        let cover_image_url = match registration.cover_image.filter(|file| !file.bytes.is_empty()) {
            Some(file) => Some(self.upload(ImageSlot::CoverImage, file).await?),
            None => None,
        };

        let password_hash = compute_password_hash(registration.password).await?;
        let user = self
            .store
            .create(NewUser {
                username,
                email,
                full_name,
                password_hash,
                avatar_url,
                cover_image_url,
            })
            .await?;

        tracing::info!(user_id = %user.id, "User registered");
        Ok(user.into())
    }

    pub async fn update_account_details(
        &self,
        ctx: &AuthContext,
        full_name: &str,
        email: &str,
    ) -> Result<PublicUser, AppError> {
        let full_name = is_valid_full_name(full_name)?;
        let email = is_valid_email(email)?;

        let user = self
            .store
            .update_account_details(ctx.user_id(), &full_name, &email)
            .await?;

        tracing::info!(user_id = %user.id, "Account details updated");
        Ok(user.into())
    }

    pub async fn update_image(
        &self,
        ctx: &AuthContext,
        slot: ImageSlot,
        file: MediaFile,
    ) -> Result<PublicUser, AppError> {
        if file.bytes.is_empty() {
            return Err(ValidationError::EmptyField(slot.field_name()).into());
        }

        let url = self.upload(slot, file).await?;
        let user = self.store.update_image(ctx.user_id(), slot, &url).await?;

        tracing::info!(user_id = %user.id, field = slot.field_name(), "Profile image updated");
        Ok(user.into())
    }

    /// Upload failures surface as a validation error on the image field
    async fn upload(&self, slot: ImageSlot, file: MediaFile) -> Result<String, AppError> {
        let uploaded = self.uploader.upload(file).await.map_err(|e| {
            tracing::error!(field = slot.field_name(), error = %e, "Media upload failed");
            AppError::from(ValidationError::UploadFailed(slot.field_name()))
        })?;

        Ok(uploaded.url)
    }
}
