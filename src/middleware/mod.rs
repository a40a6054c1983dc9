/// Middleware module
///
/// Request logging and the access-token authentication extractor.

mod authentication;
mod request_logger;

pub use authentication::{
    access_token_from, refresh_token_cookie, ACCESS_TOKEN_COOKIE, REFRESH_TOKEN_COOKIE,
};
pub use request_logger::RequestLogger;
