/// Success envelope shared by all handlers
use actix_web::{http::StatusCode, HttpResponse, HttpResponseBuilder};
use serde::Serialize;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status_code: u16,
    pub data: T,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data,
            message: message.into(),
            success: status.as_u16() < 400,
        }
    }

    /// Builder preset with this envelope's status, for attaching cookies before the body
    pub fn builder(&self) -> HttpResponseBuilder {
        HttpResponse::build(StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK))
    }

    pub fn into_response(self) -> HttpResponse {
        self.builder().json(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_flag_follows_status() {
        let ok = ApiResponse::new(StatusCode::CREATED, (), "created");
        assert!(ok.success);
        assert_eq!(ok.status_code, 201);

        let bad = ApiResponse::new(StatusCode::BAD_REQUEST, (), "bad");
        assert!(!bad.success);
    }

    #[test]
    fn test_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::new(StatusCode::OK, 5, "fine")).unwrap();
        assert_eq!(body["status_code"], 200);
        assert_eq!(body["data"], 5);
        assert_eq!(body["message"], "fine");
        assert_eq!(body["success"], true);
    }
}
