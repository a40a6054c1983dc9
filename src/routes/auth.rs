/// Authentication Routes
///
/// Registration, login, token refresh, logout and password change.

use actix_multipart::{Multipart, MultipartError};
use actix_web::cookie::{time::Duration, Cookie};
use actix_web::{http::StatusCode, web, HttpRequest, HttpResponse};
use futures::TryStreamExt;
use serde::{Deserialize, Serialize};

use super::users::image_file;
use crate::account::{AccountService, Registration};
use crate::auth::TokenPair;
use crate::error::{AppError, ValidationError};
use crate::middleware::{refresh_token_cookie, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE};
use crate::response::ApiResponse;
use crate::session::{AuthContext, SessionController};
use crate::store::{ImageSlot, PublicUser};

/// Per-part ceiling for multipart registration bodies
const MAX_PART_BYTES: usize = 5 * 1024 * 1024;

/// Login by email or username
#[derive(Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: String,
}

impl LoginRequest {
    /// Email wins over username; blank values count as absent
    fn identifier(&self) -> Option<&str> {
        non_blank(&self.email).or_else(|| non_blank(&self.username))
    }
}

fn non_blank(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

#[derive(Deserialize, Default)]
pub struct RefreshRequest {
    pub refresh_token: Option<String>,
}

#[derive(Deserialize)]
pub struct ChangePasswordRequest {
    pub old_password: String,
    pub new_password: String,
}

/// Tokens returned alongside the cookies
#[derive(Serialize)]
pub struct TokenResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<PublicUser>,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

fn token_cookie(name: &'static str, value: String, max_age_seconds: i64) -> Cookie<'static> {
    Cookie::build(name, value)
        .http_only(true)
        .secure(true)
        .path("/")
        .max_age(Duration::seconds(max_age_seconds))
        .finish()
}

fn removal_cookie(name: &'static str) -> Cookie<'static> {
    let mut cookie = Cookie::build(name, "")
        .http_only(true)
        .secure(true)
        .path("/")
        .finish();
    cookie.make_removal();
    cookie
}

fn token_response(
    sessions: &SessionController,
    tokens: TokenPair,
    user: Option<PublicUser>,
    message: &str,
) -> HttpResponse {
    let access_cookie = token_cookie(
        ACCESS_TOKEN_COOKIE,
        tokens.access_token.clone(),
        sessions.tokens().access_token_expiry(),
    );
    let refresh_cookie = token_cookie(
        REFRESH_TOKEN_COOKIE,
        tokens.refresh_token.clone(),
        sessions.tokens().refresh_token_expiry(),
    );

    let body = ApiResponse::new(
        StatusCode::OK,
        TokenResponse {
            user,
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            token_type: "Bearer".to_string(),
            expires_in: sessions.tokens().access_token_expiry(),
        },
        message,
    );

    body.builder()
        .cookie(access_cookie)
        .cookie(refresh_cookie)
        .json(body)
}

fn malformed(err: MultipartError) -> AppError {
    ValidationError::MalformedBody(err.to_string()).into()
}

fn text_field(field: &'static str, bytes: Vec<u8>) -> Result<String, AppError> {
    String::from_utf8(bytes).map_err(|_| ValidationError::InvalidFormat(field).into())
}

/// Collect the multipart registration form. Unknown parts are ignored;
/// missing text parts stay empty and fail validation downstream.
async fn read_registration(mut payload: Multipart) -> Result<Registration, AppError> {
    let mut registration = Registration {
        username: String::new(),
        email: String::new(),
        full_name: String::new(),
        password: String::new(),
        avatar: None,
        cover_image: None,
    };

    while let Some(mut field) = payload.try_next().await.map_err(malformed)? {
        let name = field
            .content_disposition()
            .get_name()
            .unwrap_or_default()
            .to_string();
        let content_type = field.content_type().map(|mime| mime.to_string());

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(malformed)? {
            if bytes.len() + chunk.len() > MAX_PART_BYTES {
                return Err(ValidationError::MalformedBody(format!(
                    "{} exceeds {} bytes",
                    name, MAX_PART_BYTES
                ))
                .into());
            }
            bytes.extend_from_slice(&chunk);
        }

        match name.as_str() {
            "username" => registration.username = text_field("username", bytes)?,
            "email" => registration.email = text_field("email", bytes)?,
            "full_name" => registration.full_name = text_field("full name", bytes)?,
            "password" => registration.password = text_field("password", bytes)?,
            "avatar" => {
                registration.avatar =
                    Some(image_file(content_type.as_deref(), bytes, ImageSlot::Avatar)?)
            }
            "cover_image" => {
                registration.cover_image =
                    Some(image_file(content_type.as_deref(), bytes, ImageSlot::CoverImage)?)
            }
            other => tracing::debug!(part = other, "Ignoring unknown registration part"),
        }
    }

    Ok(registration)
}

/// POST /api/v1/users/register
///
/// `multipart/form-data` with `username`, `email`, `full_name`, `password`,
/// a required `avatar` image and an optional `cover_image`.
///
/// # Errors
/// - 400: Validation errors (missing field or avatar, bad email/username, upload failure)
/// - 409: Username or email already registered
pub async fn register(
    payload: Multipart,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse, AppError> {
    let registration = read_registration(payload).await?;
    let user = accounts.register(registration).await?;

    Ok(ApiResponse::new(StatusCode::CREATED, user, "User registered successfully").into_response())
}

/// POST /api/v1/users/login
///
/// # Errors
/// - 400: Neither email nor username supplied
/// - 401: Wrong password
/// - 404: No such user
pub async fn login(
    form: web::Json<LoginRequest>,
    sessions: web::Data<SessionController>,
) -> Result<HttpResponse, AppError> {
    let identifier = form.identifier().unwrap_or_default();
    let outcome = sessions.login(identifier, &form.password).await?;

    tracing::info!(user_id = %outcome.user.id, "Login succeeded");

    Ok(token_response(
        &sessions,
        outcome.tokens,
        Some(outcome.user),
        "User logged in successfully",
    ))
}

/// POST /api/v1/users/refresh-token
///
/// Takes the refresh token from the `refreshToken` cookie or the JSON body.
/// The presented token is rotated out: replaying it afterwards fails.
///
/// # Errors
/// - 401: Missing, invalid, expired, or already rotated refresh token
pub async fn refresh(
    req: HttpRequest,
    body: Option<web::Json<RefreshRequest>>,
    sessions: web::Data<SessionController>,
) -> Result<HttpResponse, AppError> {
    let presented = refresh_token_cookie(&req)
        .or_else(|| body.and_then(|b| b.into_inner().refresh_token));

    let tokens = sessions.refresh(presented.as_deref()).await?;

    Ok(token_response(&sessions, tokens, None, "Access token refreshed"))
}

/// POST /api/v1/users/logout
pub async fn logout(
    ctx: AuthContext,
    sessions: web::Data<SessionController>,
) -> Result<HttpResponse, AppError> {
    sessions.logout(&ctx).await?;

    let body = ApiResponse::new(StatusCode::OK, serde_json::json!({}), "User logged out");
    Ok(body
        .builder()
        .cookie(removal_cookie(ACCESS_TOKEN_COOKIE))
        .cookie(removal_cookie(REFRESH_TOKEN_COOKIE))
        .json(body))
}

/// POST /api/v1/users/change-password
///
/// # Errors
/// - 401: Old password does not match
pub async fn change_password(
    ctx: AuthContext,
    form: web::Json<ChangePasswordRequest>,
    sessions: web::Data<SessionController>,
) -> Result<HttpResponse, AppError> {
    sessions
        .change_password(&ctx, &form.old_password, &form.new_password)
        .await?;

    tracing::info!(user_id = %ctx.user_id(), "Password change completed");

    Ok(ApiResponse::new(StatusCode::OK, serde_json::json!({}), "Password changed successfully")
        .into_response())
}
