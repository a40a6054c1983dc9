use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::configuration::MediaSettings;
use crate::error::MediaError;

/// File handed to the media host
#[derive(Debug, Clone)]
pub struct MediaFile {
    pub bytes: Vec<u8>,
    pub content_type: String,
    pub file_name: String,
}

/// Result of a successful upload
#[derive(Debug, Clone)]
pub struct UploadedMedia {
    pub url: String,
}

#[async_trait]
pub trait MediaUploader: Send + Sync {
    async fn upload(&self, file: MediaFile) -> Result<UploadedMedia, MediaError>;
}

/// Signed-upload client for Cloudinary
#[derive(Clone)]
pub struct CloudinaryClient {
    http_client: reqwest::Client,
    base_url: String,
    cloud_name: String,
    api_key: String,
    api_secret: String,
}

#[derive(Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
    url: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: ErrorMessage,
}

#[derive(Deserialize)]
struct ErrorMessage {
    message: String,
}

impl CloudinaryClient {
    pub fn new(settings: &MediaSettings) -> Result<Self, MediaError> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()
            .map_err(|e| MediaError::Request(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: settings.base_url.trim_end_matches('/').to_string(),
            cloud_name: settings.cloud_name.clone(),
            api_key: settings.api_key.clone(),
            api_secret: settings.api_secret.clone(),
        })
    }

    fn upload_url(&self) -> String {
        format!("{}/{}/auto/upload", self.base_url, self.cloud_name)
    }
}

/// SHA-256 over the alphabetically sorted `key=value` pairs followed by the secret
fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));
    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    let mut hasher = Sha256::new();
    hasher.update(to_sign.as_bytes());
    hasher.update(api_secret.as_bytes());
    format!("{:x}", hasher.finalize())
}

#[async_trait]
impl MediaUploader for CloudinaryClient {
    async fn upload(&self, file: MediaFile) -> Result<UploadedMedia, MediaError> {
        if file.bytes.is_empty() {
            return Err(MediaError::EmptyUpload);
        }

        let timestamp = chrono::Utc::now().timestamp().to_string();
        let signature = sign_params(&[("timestamp", timestamp.clone())], &self.api_secret);

        let part = reqwest::multipart::Part::bytes(file.bytes)
            .file_name(file.file_name)
            .mime_str(&file.content_type)
            .map_err(|e| MediaError::Request(format!("invalid content type: {}", e)))?;

        let form = reqwest::multipart::Form::new()
            .part("file", part)
            .text("api_key", self.api_key.clone())
            .text("timestamp", timestamp)
            .text("signature", signature)
            .text("signature_algorithm", "sha256");

        let response = self
            .http_client
            .post(self.upload_url())
            .multipart(form)
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to reach media service: {}", e);
                MediaError::Request(e.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .json::<ErrorBody>()
                .await
                .map(|body| body.error.message)
                .unwrap_or_else(|_| status.to_string());
            tracing::error!(status = %status, "Media service rejected upload: {}", message);
            return Err(MediaError::Rejected(message));
        }

        let body: UploadResponse = response
            .json()
            .await
            .map_err(|e| MediaError::InvalidResponse(e.to_string()))?;

        let url = body
            .secure_url
            .or(body.url)
            .ok_or_else(|| MediaError::InvalidResponse("missing url".to_string()))?;

        tracing::info!(url = %url, "File uploaded to media service");
        Ok(UploadedMedia { url })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings() -> MediaSettings {
        MediaSettings {
            cloud_name: "demo".to_string(),
            api_key: "key".to_string(),
            api_secret: "secret".to_string(),
            base_url: "https://api.cloudinary.com/v1_1/".to_string(),
            timeout_seconds: 5,
        }
    }

    #[test]
    fn test_upload_url() {
        let client = CloudinaryClient::new(&settings()).unwrap();
        assert_eq!(client.upload_url(), "https://api.cloudinary.com/v1_1/demo/auto/upload");
    }

    #[test]
    fn test_signature_is_order_independent() {
        let a = sign_params(&[("timestamp", "1".into()), ("folder", "x".into())], "secret");
        let b = sign_params(&[("folder", "x".into()), ("timestamp", "1".into())], "secret");

        assert_eq!(a, b);
        assert_eq!(a.len(), 64);
    }

    #[test]
    fn test_signature_depends_on_secret() {
        let params = [("timestamp", "1700000000".to_string())];
        assert_ne!(sign_params(&params, "one"), sign_params(&params, "two"));
    }

    #[tokio::test]
    async fn test_empty_upload_rejected_without_request() {
        let client = CloudinaryClient::new(&settings()).unwrap();
        let result = client
            .upload(MediaFile {
                bytes: vec![],
                content_type: "image/png".to_string(),
                file_name: "avatar.png".to_string(),
            })
            .await;

        assert!(matches!(result, Err(MediaError::EmptyUpload)));
    }
}
