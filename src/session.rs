/// Session Lifecycle
///
/// Login, refresh, logout, password change and access-token authentication.
/// A user has at most one accepted refresh token at a time: every login and
/// every refresh replaces it, logout clears it.

use std::sync::Arc;

use uuid::Uuid;

use crate::auth::{
    compute_password_hash, hash_token, matches_stored, verify_password_hash, TokenPair,
    TokenService,
};
use crate::error::{AppError, ValidationError};
use crate::store::{user_not_found, CredentialStore, PublicUser, UserRecord};
use crate::validators::is_valid_password;

/// Identity resolved from a verified access token
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user: PublicUser,
}

impl AuthContext {
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }
}

#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub tokens: TokenPair,
    pub user: PublicUser,
}

pub struct SessionController {
    store: Arc<dyn CredentialStore>,
    tokens: TokenService,
}

impl SessionController {
    pub fn new(store: Arc<dyn CredentialStore>, tokens: TokenService) -> Self {
        Self { store, tokens }
    }

    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Verify credentials, issue a token pair and make its refresh token the only accepted one
    #[tracing::instrument(name = "login", skip(self, password))]
    pub async fn login(&self, identifier: &str, password: &str) -> Result<LoginOutcome, AppError> {
        let identifier = identifier.trim().to_lowercase();
        if identifier.is_empty() {
            return Err(ValidationError::EmptyField("username or email").into());
        }
        is_valid_password("password", password)?;

        let user = self
            .store
            .find_by_username_or_email(&identifier, &identifier)
            .await?
            .ok_or_else(user_not_found)?;

        let password_valid =
            verify_password_hash(password.to_string(), user.password_hash.clone()).await?;
        if !password_valid {
            tracing::warn!(user_id = %user.id, "Login rejected: wrong password");
            return Err(AppError::InvalidCredentials);
        }

        let tokens = self.rotate(&user).await?;
        tracing::info!(user_id = %user.id, "User logged in");

        Ok(LoginOutcome {
            tokens,
            user: user.into(),
        })
    }

    /// Exchange the currently accepted refresh token for a new pair
    #[tracing::instrument(name = "refresh", skip_all)]
    pub async fn refresh(&self, presented: Option<&str>) -> Result<TokenPair, AppError> {
        let presented = presented
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AppError::Unauthorized)?;

        let claims = self.tokens.verify_refresh_token(presented)?;
        let user = self
            .store
            .find_by_id(claims.user_id()?)
            .await?
            .ok_or(AppError::InvalidToken)?;

        if !matches_stored(presented, user.refresh_token_hash.as_deref()) {
            tracing::warn!(user_id = %user.id, "Refresh rejected: token is not the current one");
            return Err(AppError::TokenExpiredOrReused);
        }

        let tokens = self.tokens.issue_pair(&user)?;
        let swapped = self
            .store
            .replace_refresh_token(user.id, &hash_token(presented), &hash_token(&tokens.refresh_token))
            .await?;
        if !swapped {
            tracing::warn!(user_id = %user.id, "Refresh rejected: lost rotation race");
            return Err(AppError::TokenExpiredOrReused);
        }

        tracing::info!(user_id = %user.id, "Session refreshed");
        Ok(tokens)
    }

    /// Clear the accepted refresh token so no previously issued one can be used
    pub async fn logout(&self, ctx: &AuthContext) -> Result<(), AppError> {
        self.store.update_refresh_token(ctx.user_id(), None).await?;
        tracing::info!(user_id = %ctx.user_id(), "User logged out");
        Ok(())
    }

    /// Outstanding tokens stay valid after a password change.
    pub async fn change_password(
        &self,
        ctx: &AuthContext,
        old_password: &str,
        new_password: &str,
    ) -> Result<(), AppError> {
        is_valid_password("old password", old_password)?;
        is_valid_password("new password", new_password)?;

        let user = self
            .store
            .find_by_id(ctx.user_id())
            .await?
            .ok_or_else(user_not_found)?;

        if !verify_password_hash(old_password.to_string(), user.password_hash).await? {
            tracing::warn!(user_id = %user.id, "Password change rejected: wrong old password");
            return Err(AppError::InvalidCredentials);
        }

        let new_hash = compute_password_hash(new_password.to_string()).await?;
        self.store.update_password_hash(user.id, &new_hash).await?;

        tracing::info!(user_id = %user.id, "Password changed");
        Ok(())
    }

    /// Resolve the caller behind an access token
    pub async fn authenticate(&self, token: Option<&str>) -> Result<AuthContext, AppError> {
        let token = token
            .map(str::trim)
            .filter(|token| !token.is_empty())
            .ok_or(AppError::Unauthorized)?;

        let claims = self.tokens.verify_access_token(token)?;
        let user = self
            .store
            .find_by_id(claims.user_id()?)
            .await?
            .ok_or_else(user_not_found)?;

        Ok(AuthContext { user: user.into() })
    }

    async fn rotate(&self, user: &UserRecord) -> Result<TokenPair, AppError> {
        let tokens = self.tokens.issue_pair(user)?;
        self.store
            .update_refresh_token(user.id, Some(&hash_token(&tokens.refresh_token)))
            .await?;
        Ok(tokens)
    }
}
