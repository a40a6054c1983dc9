/// Authentication module
///
/// Handles JWT issuing/verification, password hashing,
/// and refresh token digests.

mod claims;
mod jwt;
mod password;
mod refresh_token;

pub use claims::{AccessClaims, RefreshClaims};
pub use jwt::{TokenPair, TokenService};
pub use password::{
    compute_password_hash, hash_password, verify_password, verify_password_hash, MAX_PASSWORD_BYTES,
};
pub use refresh_token::{hash_token, matches_stored};
