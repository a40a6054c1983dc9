/// Profile Routes
///
/// All handlers here require an authenticated caller.

use actix_web::{http::header, http::StatusCode, web, HttpRequest, HttpResponse};
use serde::Deserialize;

use crate::account::AccountService;
use crate::error::{AppError, ValidationError};
use crate::media_client::MediaFile;
use crate::response::ApiResponse;
use crate::session::AuthContext;
use crate::store::ImageSlot;

#[derive(Deserialize)]
pub struct UpdateAccountRequest {
    pub full_name: String,
    pub email: String,
}

/// GET /api/v1/users/current-user
pub async fn current_user(ctx: AuthContext) -> HttpResponse {
    ApiResponse::new(StatusCode::OK, ctx.user, "Current user fetched successfully").into_response()
}

/// PATCH /api/v1/users/update-account
///
/// # Errors
/// - 400: Invalid full name or email
/// - 409: Email already belongs to another user
pub async fn update_account(
    ctx: AuthContext,
    form: web::Json<UpdateAccountRequest>,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse, AppError> {
    let user = accounts
        .update_account_details(&ctx, &form.full_name, &form.email)
        .await?;

    Ok(ApiResponse::new(StatusCode::OK, user, "Account details updated successfully").into_response())
}

/// PATCH /api/v1/users/avatar
///
/// Raw image bytes in the body, type in `Content-Type`.
pub async fn update_avatar(
    ctx: AuthContext,
    req: HttpRequest,
    body: web::Bytes,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse, AppError> {
    let file = media_file(&req, body, ImageSlot::Avatar)?;
    let user = accounts.update_image(&ctx, ImageSlot::Avatar, file).await?;

    Ok(ApiResponse::new(StatusCode::OK, user, "Avatar updated successfully").into_response())
}

/// PATCH /api/v1/users/cover-image
pub async fn update_cover_image(
    ctx: AuthContext,
    req: HttpRequest,
    body: web::Bytes,
    accounts: web::Data<AccountService>,
) -> Result<HttpResponse, AppError> {
    let file = media_file(&req, body, ImageSlot::CoverImage)?;
    let user = accounts.update_image(&ctx, ImageSlot::CoverImage, file).await?;

    Ok(ApiResponse::new(StatusCode::OK, user, "Cover image updated successfully").into_response())
}

fn media_file(req: &HttpRequest, body: web::Bytes, slot: ImageSlot) -> Result<MediaFile, AppError> {
    let content_type = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|h| h.to_str().ok());

    image_file(content_type, body.to_vec(), slot)
}

/// Checks an uploaded image and names it after the slot it fills
pub(crate) fn image_file(
    content_type: Option<&str>,
    bytes: Vec<u8>,
    slot: ImageSlot,
) -> Result<MediaFile, AppError> {
    let content_type = content_type
        .map(|h| h.trim().to_ascii_lowercase())
        .unwrap_or_default();

    let subtype = content_type
        .strip_prefix("image/")
        .filter(|s| !s.is_empty())
        .ok_or(ValidationError::InvalidFormat(slot.field_name()))?;

    if bytes.is_empty() {
        return Err(ValidationError::EmptyField(slot.field_name()).into());
    }

    let stem = match slot {
        ImageSlot::Avatar => "avatar",
        ImageSlot::CoverImage => "cover-image",
    };
    let extension = subtype.split(&[';', '+'][..]).next().unwrap_or("bin");
    let file_name = format!("{}.{}", stem, extension);

    Ok(MediaFile {
        bytes,
        file_name,
        content_type,
    })
}
