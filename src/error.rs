/// Error Handling Module
///
/// One error type flows through the whole request path:
/// 1. Field-level validation failures (`ValidationError`)
/// 2. The application taxonomy (`AppError`) with an explicit `ErrorKind`
/// 3. The kind -> HTTP status mapping table
/// 4. Rendering into the uniform failure envelope with structured logging

use actix_web::{error::ResponseError, http::StatusCode, HttpResponse};
use serde::Serialize;

/// ============================================================================
/// 1. FIELD VALIDATION
/// ============================================================================

/// Validation errors for input data
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    EmptyField(&'static str),
    #[error("{0} is too short (minimum {1} characters)")]
    TooShort(&'static str, usize),
    #[error("{0} is too long (maximum {1} characters)")]
    TooLong(&'static str, usize),
    #[error("{0} is too long (maximum {1} bytes)")]
    TooManyBytes(&'static str, usize),
    #[error("{0} has invalid format")]
    InvalidFormat(&'static str),
    #[error("{0} contains suspicious content")]
    SuspiciousContent(&'static str),
    #[error("malformed request body: {0}")]
    MalformedBody(String),
    #[error("{0} upload failed")]
    UploadFailed(&'static str),
}

/// Failures reported by the media upload collaborator
#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("empty upload")]
    EmptyUpload,
    #[error("upload request failed: {0}")]
    Request(String),
    #[error("media service rejected upload: {0}")]
    Rejected(String),
    #[error("unexpected media service response: {0}")]
    InvalidResponse(String),
}

/// ============================================================================
/// 2. APPLICATION ERROR TAXONOMY
/// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error("Invalid user credentials")]
    InvalidCredentials,
    #[error("{0}")]
    NotFound(String),
    #[error("Unauthorized request")]
    Unauthorized,
    #[error("Invalid or expired token")]
    InvalidToken,
    #[error("Refresh token is expired or used")]
    TokenExpiredOrReused,
    #[error("{0}")]
    Conflict(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Discriminant of `AppError`, carrying the status-code mapping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    InvalidCredentials,
    NotFound,
    Unauthorized,
    InvalidToken,
    TokenExpiredOrReused,
    Conflict,
    Internal,
}

/// ============================================================================
/// 3. STATUS MAPPING
/// ============================================================================

impl ErrorKind {
    pub fn status_code(self) -> StatusCode {
        match self {
            ErrorKind::Validation => StatusCode::BAD_REQUEST,
            ErrorKind::InvalidCredentials
            | ErrorKind::Unauthorized
            | ErrorKind::InvalidToken
            | ErrorKind::TokenExpiredOrReused => StatusCode::UNAUTHORIZED,
            ErrorKind::NotFound => StatusCode::NOT_FOUND,
            ErrorKind::Conflict => StatusCode::CONFLICT,
            ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code for client-side handling
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::InvalidCredentials => "INVALID_CREDENTIALS",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::Unauthorized => "UNAUTHORIZED",
            ErrorKind::InvalidToken => "INVALID_TOKEN",
            ErrorKind::TokenExpiredOrReused => "TOKEN_EXPIRED_OR_REUSED",
            ErrorKind::Conflict => "CONFLICT",
            ErrorKind::Internal => "INTERNAL_ERROR",
        }
    }
}

impl AppError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            AppError::Validation(_) => ErrorKind::Validation,
            AppError::InvalidCredentials => ErrorKind::InvalidCredentials,
            AppError::NotFound(_) => ErrorKind::NotFound,
            AppError::Unauthorized => ErrorKind::Unauthorized,
            AppError::InvalidToken => ErrorKind::InvalidToken,
            AppError::TokenExpiredOrReused => ErrorKind::TokenExpiredOrReused,
            AppError::Conflict(_) => ErrorKind::Conflict,
            AppError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Message safe to hand back to the caller
    pub fn public_message(&self) -> String {
        match self {
            AppError::Internal(_) => "Internal server error".to_string(),
            other => other.to_string(),
        }
    }

    fn log(&self, error_id: &str) {
        match self {
            AppError::Internal(msg) => {
                tracing::error!(error_id = error_id, error = %msg, "Internal error");
            }
            AppError::InvalidCredentials
            | AppError::InvalidToken
            | AppError::TokenExpiredOrReused => {
                tracing::warn!(error_id = error_id, error = %self, "Authentication error");
            }
            other => {
                tracing::info!(
                    error_id = error_id,
                    code = other.kind().code(),
                    error = %other,
                    "Request rejected"
                );
            }
        }
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        match &err {
            sqlx::Error::RowNotFound => AppError::NotFound("Record not found".to_string()),
            sqlx::Error::Database(db_err) if db_err.code().as_deref() == Some("23505") => {
                AppError::Conflict("User with email or username already exists".to_string())
            }
            _ => AppError::Internal(format!("Database error: {}", err)),
        }
    }
}

/// ============================================================================
/// 4. HTTP RESPONSE MAPPING
/// ============================================================================

/// Failure envelope
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    /// Human-readable error message
    pub message: String,
    /// Error code for client-side handling
    pub code: String,
    pub status: u16,
    /// Unique error ID for correlating with server logs
    pub error_id: String,
    pub timestamp: String,
}

impl ErrorResponse {
    pub fn new(error_id: String, message: String, code: &str, status: u16) -> Self {
        Self {
            success: false,
            message,
            code: code.to_string(),
            status,
            error_id,
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

impl ResponseError for AppError {
    fn status_code(&self) -> StatusCode {
        self.kind().status_code()
    }

    fn error_response(&self) -> HttpResponse {
        let error_id = uuid::Uuid::new_v4().to_string();
        self.log(&error_id);

        let kind = self.kind();
        let status = kind.status_code();
        HttpResponse::build(status).json(ErrorResponse::new(
            error_id,
            self.public_message(),
            kind.code(),
            status.as_u16(),
        ))
    }
}
