/// JWT Claims structures
///
/// Access tokens carry the user's identity (id, email, username); refresh
/// tokens carry only the user id. Both embed a random `jti` so two tokens
/// issued for the same user within the same second still differ.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Claims for short-lived access tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AccessClaims {
    /// Subject (user ID as UUID string)
    pub sub: String,
    pub email: String,
    pub username: String,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    pub iss: String,
    pub jti: String,
}

/// Claims for long-lived refresh tokens
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct RefreshClaims {
    pub sub: String,
    pub exp: i64,
    pub iat: i64,
    pub iss: String,
    pub jti: String,
}

impl AccessClaims {
    pub fn new(
        user_id: Uuid,
        email: String,
        username: String,
        expiry_seconds: i64,
        issuer: String,
    ) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            email,
            username,
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
            jti: Uuid::new_v4().to_string(),
        }
    }

    /// Extract user ID from claims
    ///
    /// # Errors
    /// A signed token whose subject is not a UUID is treated as invalid
    pub fn user_id(&self) -> Result<Uuid, AppError> {
        parse_subject(&self.sub)
    }
}

impl RefreshClaims {
    pub fn new(user_id: Uuid, expiry_seconds: i64, issuer: String) -> Self {
        let now = chrono::Utc::now().timestamp();
        Self {
            sub: user_id.to_string(),
            exp: now + expiry_seconds,
            iat: now,
            iss: issuer,
            jti: Uuid::new_v4().to_string(),
        }
    }

    pub fn user_id(&self) -> Result<Uuid, AppError> {
        parse_subject(&self.sub)
    }
}

fn parse_subject(sub: &str) -> Result<Uuid, AppError> {
    Uuid::parse_str(sub).map_err(|_| AppError::InvalidToken)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_claims_creation() {
        let user_id = Uuid::new_v4();
        let claims = AccessClaims::new(
            user_id,
            "test@example.com".to_string(),
            "tester".to_string(),
            3600,
            "test".to_string(),
        );

        assert_eq!(claims.sub, user_id.to_string());
        assert_eq!(claims.email, "test@example.com");
        assert_eq!(claims.username, "tester");
        assert_eq!(claims.exp - claims.iat, 3600);
        assert_eq!(claims.user_id().unwrap(), user_id);
    }

    #[test]
    fn test_refresh_claims_have_unique_ids() {
        let user_id = Uuid::new_v4();
        let first = RefreshClaims::new(user_id, 60, "test".to_string());
        let second = RefreshClaims::new(user_id, 60, "test".to_string());

        assert_ne!(first.jti, second.jti);
    }

    #[test]
    fn test_invalid_subject_is_invalid_token() {
        let mut claims = RefreshClaims::new(Uuid::new_v4(), 60, "test".to_string());
        claims.sub = "invalid-uuid".to_string();

        assert!(matches!(claims.user_id(), Err(AppError::InvalidToken)));
    }
}
