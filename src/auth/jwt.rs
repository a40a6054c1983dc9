/// JWT Token Issuing and Verification
///
/// Access and refresh tokens are signed with distinct secrets. Keys are
/// derived once from `JwtSettings` when the service is built.

use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::auth::claims::{AccessClaims, RefreshClaims};
use crate::configuration::JwtSettings;
use crate::error::AppError;
use crate::store::UserRecord;

/// Signing and verification keys for one secret
#[derive(Clone)]
struct JwtKeys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl JwtKeys {
    fn new(secret: &str) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
        }
    }
}

/// Freshly issued access + refresh token pair
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

/// Issues and verifies session tokens
#[derive(Clone)]
pub struct TokenService {
    access: JwtKeys,
    refresh: JwtKeys,
    settings: JwtSettings,
}

impl TokenService {
    pub fn new(settings: JwtSettings) -> Self {
        Self {
            access: JwtKeys::new(&settings.access_secret),
            refresh: JwtKeys::new(&settings.refresh_secret),
            settings,
        }
    }

    /// Access token lifetime in seconds
    pub fn access_token_expiry(&self) -> i64 {
        self.settings.access_token_expiry
    }

    pub fn refresh_token_expiry(&self) -> i64 {
        self.settings.refresh_token_expiry
    }

    pub fn issue_access_token(&self, user: &UserRecord) -> Result<String, AppError> {
        let claims = AccessClaims::new(
            user.id,
            user.email.clone(),
            user.username.clone(),
            self.settings.access_token_expiry,
            self.settings.issuer.clone(),
        );
        sign(&claims, &self.access.encoding)
    }

    pub fn issue_refresh_token(&self, user: &UserRecord) -> Result<String, AppError> {
        let claims = RefreshClaims::new(
            user.id,
            self.settings.refresh_token_expiry,
            self.settings.issuer.clone(),
        );
        sign(&claims, &self.refresh.encoding)
    }

    pub fn issue_pair(&self, user: &UserRecord) -> Result<TokenPair, AppError> {
        Ok(TokenPair {
            access_token: self.issue_access_token(user)?,
            refresh_token: self.issue_refresh_token(user)?,
        })
    }

    pub fn verify_access_token(&self, token: &str) -> Result<AccessClaims, AppError> {
        verify(token, &self.access.decoding, &self.settings.issuer)
    }

    pub fn verify_refresh_token(&self, token: &str) -> Result<RefreshClaims, AppError> {
        verify(token, &self.refresh.decoding, &self.settings.issuer)
    }
}

fn sign<C: Serialize>(claims: &C, key: &EncodingKey) -> Result<String, AppError> {
    encode(&Header::default(), claims, key)
        .map_err(|e| AppError::Internal(format!("Token generation failed: {}", e)))
}

/// Check signature, expiry and issuer; any failure is `InvalidToken`
fn verify<C: DeserializeOwned>(token: &str, key: &DecodingKey, issuer: &str) -> Result<C, AppError> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.set_issuer(&[issuer]);
    validation.leeway = 0;

    decode::<C>(token, key, &validation)
        .map(|data| data.claims)
        .map_err(|e| {
            tracing::warn!("JWT validation error: {}", e);
            AppError::InvalidToken
        })
}
