/// Password Hashing and Verification
///
/// bcrypt with a per-hash random salt embedded in the digest. The async
/// wrappers move the work off the request executor.
///
/// bcrypt only reads the first 72 bytes of its input, so longer passwords
/// are refused here rather than silently truncated.

use bcrypt::{hash, verify};

use crate::error::{AppError, ValidationError};

const HASH_COST: u32 = 10;

/// Longest password bcrypt hashes in full
pub const MAX_PASSWORD_BYTES: usize = 72;

/// Hash a password using bcrypt
///
/// # Errors
/// Validation error past `MAX_PASSWORD_BYTES`, internal error if bcrypt fails
pub fn hash_password(password: &str) -> Result<String, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(ValidationError::TooManyBytes("password", MAX_PASSWORD_BYTES).into());
    }

    hash(password, HASH_COST)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))
}

/// Verify a password against its hash
///
/// A wrong password is `Ok(false)`; only a malformed digest is an error.
/// Nothing longer than `MAX_PASSWORD_BYTES` was ever hashed, so it never matches.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, AppError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Ok(false);
    }

    verify(password, hash)
        .map_err(|e| AppError::Internal(format!("Password verification failed: {}", e)))
}

pub async fn compute_password_hash(password: String) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing task failed: {}", e)))?
}

pub async fn verify_password_hash(password: String, hash: String) -> Result<bool, AppError> {
    tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password verification task failed: {}", e)))?
}
