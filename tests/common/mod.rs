//! Shared setup for integration tests
//!
//! Spawns the real server on a random port, backed by the in-memory
//! credential store and a stub media uploader.

#![allow(dead_code)]

use std::net::TcpListener;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use account_service::configuration::JwtSettings;
use account_service::error::MediaError;
use account_service::media_client::{MediaFile, MediaUploader, UploadedMedia};
use account_service::startup::run;
use account_service::store::InMemoryCredentialStore;
use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};

/// Uploader that answers with a predictable URL, or fails when told to
#[derive(Default)]
pub struct StubUploader {
    pub fail: AtomicBool,
}

#[async_trait]
impl MediaUploader for StubUploader {
    async fn upload(&self, file: MediaFile) -> Result<UploadedMedia, MediaError> {
        if self.fail.load(Ordering::SeqCst) {
            return Err(MediaError::Rejected("stub failure".to_string()));
        }
        Ok(UploadedMedia {
            url: format!("https://media.test/{}", file.file_name),
        })
    }
}

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryCredentialStore>,
    pub uploader: Arc<StubUploader>,
    pub client: reqwest::Client,
}

pub fn jwt_settings() -> JwtSettings {
    JwtSettings {
        access_secret: "integration-access-secret-32-characters".to_string(),
        access_token_expiry: 900,
        refresh_secret: "integration-refresh-secret-32-characters".to_string(),
        refresh_token_expiry: 864_000,
        issuer: "account_service".to_string(),
    }
}

impl TestApp {
    pub async fn spawn() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();

        let store = Arc::new(InMemoryCredentialStore::new());
        let uploader = Arc::new(StubUploader::default());
        let server = run(listener, store.clone(), uploader.clone(), jwt_settings())
            .expect("Failed to bind address");
        let _ = tokio::spawn(server);

        TestApp {
            address: format!("http://127.0.0.1:{}", port),
            store,
            uploader,
            client: reqwest::Client::new(),
        }
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/api/v1/users{}", self.address, path)
    }

    pub async fn post_json(&self, path: &str, body: &Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .json(body)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn post_form(&self, path: &str, form: Form) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .multipart(form)
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn register(&self, username: &str, email: &str, password: &str) -> reqwest::Response {
        self.post_form(
            "/register",
            registration_form(username, email, password).part("avatar", image_part("me.png", "image/png")),
        )
        .await
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.post_json("/login", &json!({ "email": email, "password": password }))
            .await
    }

    pub async fn refresh(&self, refresh_token: &str) -> reqwest::Response {
        self.post_json("/refresh-token", &json!({ "refresh_token": refresh_token }))
            .await
    }

    /// Register + login, returning (access_token, refresh_token)
    pub async fn signed_in_user(&self, username: &str, email: &str, password: &str) -> (String, String) {
        assert_eq!(201, self.register(username, email, password).await.status().as_u16());
        let response = self.login(email, password).await;
        assert_eq!(200, response.status().as_u16());
        tokens(&response.json::<Value>().await.unwrap())
    }
}

pub fn tokens(body: &Value) -> (String, String) {
    (
        body["data"]["access_token"].as_str().unwrap().to_string(),
        body["data"]["refresh_token"].as_str().unwrap().to_string(),
    )
}

/// Text parts of a registration form, without any images
pub fn registration_form(username: &str, email: &str, password: &str) -> Form {
    Form::new()
        .text("username", username.to_string())
        .text("email", email.to_string())
        .text("full_name", "Test User")
        .text("password", password.to_string())
}

pub fn image_part(file_name: &str, mime: &str) -> Part {
    Part::bytes(vec![0x89, 0x50, 0x4e, 0x47])
        .file_name(file_name.to_string())
        .mime_str(mime)
        .expect("Invalid mime type")
}
