/// Access-token authentication
///
/// `AuthContext` is an extractor: handlers that take it as an argument only
/// run once the presented access token has been verified and resolved to a
/// stored user.

use actix_web::{dev::Payload, http::header, web, FromRequest, HttpRequest};
use futures::future::LocalBoxFuture;

use crate::error::AppError;
use crate::session::{AuthContext, SessionController};

pub const ACCESS_TOKEN_COOKIE: &str = "accessToken";
pub const REFRESH_TOKEN_COOKIE: &str = "refreshToken";

/// Access token from the `accessToken` cookie, else from `Authorization: Bearer`
pub fn access_token_from(req: &HttpRequest) -> Option<String> {
    if let Some(cookie) = req.cookie(ACCESS_TOKEN_COOKIE) {
        if !cookie.value().is_empty() {
            return Some(cookie.value().to_string());
        }
    }

    req.headers()
        .get(header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "))
        .map(|token| token.trim().to_string())
}

pub fn refresh_token_cookie(req: &HttpRequest) -> Option<String> {
    req.cookie(REFRESH_TOKEN_COOKIE)
        .map(|cookie| cookie.value().to_string())
        .filter(|value| !value.is_empty())
}

impl FromRequest for AuthContext {
    type Error = AppError;
    type Future = LocalBoxFuture<'static, Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        let token = access_token_from(req);
        let sessions = req.app_data::<web::Data<SessionController>>().cloned();

        Box::pin(async move {
            let sessions = sessions.ok_or_else(|| {
                AppError::Internal("session controller is not registered".to_string())
            })?;

            let ctx = sessions.authenticate(token.as_deref()).await?;
            tracing::debug!(user_id = %ctx.user_id(), "Access token validated");
            Ok(ctx)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::cookie::Cookie;
    use actix_web::test::TestRequest;

    #[test]
    fn test_bearer_header() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Bearer abc.def.ghi"))
            .to_http_request();

        assert_eq!(access_token_from(&req).as_deref(), Some("abc.def.ghi"));
    }

    #[test]
    fn test_cookie_takes_precedence() {
        let req = TestRequest::default()
            .cookie(Cookie::new(ACCESS_TOKEN_COOKIE, "from-cookie"))
            .insert_header((header::AUTHORIZATION, "Bearer from-header"))
            .to_http_request();

        assert_eq!(access_token_from(&req).as_deref(), Some("from-cookie"));
    }

    #[test]
    fn test_non_bearer_scheme_ignored() {
        let req = TestRequest::default()
            .insert_header((header::AUTHORIZATION, "Basic dXNlcjpwYXNz"))
            .to_http_request();

        assert!(access_token_from(&req).is_none());
    }

    #[test]
    fn test_refresh_cookie() {
        let req = TestRequest::default()
            .cookie(Cookie::new(REFRESH_TOKEN_COOKIE, "r1"))
            .to_http_request();

        assert_eq!(refresh_token_cookie(&req).as_deref(), Some("r1"));
        assert!(refresh_token_cookie(&TestRequest::default().to_http_request()).is_none());
    }
}
