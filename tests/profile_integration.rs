mod common;

use std::sync::atomic::Ordering;

use account_service::store::CredentialStore;
use common::TestApp;
use serde_json::{json, Value};

#[tokio::test]
async fn current_user_with_bearer_token() {
    let app = TestApp::spawn().await;
    let (access, _) = app.signed_in_user("u1", "e1@x.com", "pw1").await;

    let response = app
        .client
        .get(app.url("/current-user"))
        .bearer_auth(&access)
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["username"], "u1");
    assert!(body["data"].get("password_hash").is_none());
}

#[tokio::test]
async fn current_user_with_cookie() {
    let app = TestApp::spawn().await;
    let (access, _) = app.signed_in_user("u1", "e1@x.com", "pw1").await;

    let response = app
        .client
        .get(app.url("/current-user"))
        .header("Cookie", format!("accessToken={}", access))
        .send()
        .await
        .unwrap();

    assert_eq!(200, response.status().as_u16());
}

#[tokio::test]
async fn refresh_token_is_not_an_access_token() {
    let app = TestApp::spawn().await;
    let (_, refresh_token) = app.signed_in_user("u1", "e1@x.com", "pw1").await;

    let response = app
        .client
        .get(app.url("/current-user"))
        .bearer_auth(&refresh_token)
        .send()
        .await
        .unwrap();

    assert_eq!(401, response.status().as_u16());
}

#[tokio::test]
async fn update_account_details() {
    let app = TestApp::spawn().await;
    let (access, _) = app.signed_in_user("u1", "e1@x.com", "pw1").await;
    app.register("u2", "e2@x.com", "pw2").await;

    let taken = app
        .client
        .patch(app.url("/update-account"))
        .bearer_auth(&access)
        .json(&json!({"full_name": "New Name", "email": "e2@x.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(409, taken.status().as_u16());

    let response = app
        .client
        .patch(app.url("/update-account"))
        .bearer_auth(&access)
        .json(&json!({"full_name": "New Name", "email": "New@x.com"}))
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["full_name"], "New Name");
    assert_eq!(body["data"]["email"], "new@x.com");
}

#[tokio::test]
async fn avatar_upload_updates_record() {
    let app = TestApp::spawn().await;
    let (access, _) = app.signed_in_user("u1", "e1@x.com", "pw1").await;

    let response = app
        .client
        .patch(app.url("/avatar"))
        .bearer_auth(&access)
        .header("Content-Type", "image/png")
        .body(vec![0x89, 0x50, 0x4e, 0x47])
        .send()
        .await
        .unwrap();
    assert_eq!(200, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["data"]["avatar_url"], "https://media.test/avatar.png");
}

#[tokio::test]
async fn failed_upload_does_not_touch_record() {
    let app = TestApp::spawn().await;
    let (access, _) = app.signed_in_user("u1", "e1@x.com", "pw1").await;
    app.uploader.fail.store(true, Ordering::SeqCst);

    let response = app
        .client
        .patch(app.url("/cover-image"))
        .bearer_auth(&access)
        .header("Content-Type", "image/jpeg")
        .body(vec![0xff, 0xd8, 0xff])
        .send()
        .await
        .unwrap();
    assert_eq!(400, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let stored = app
        .store
        .find_by_username_or_email("u1", "e1@x.com")
        .await
        .unwrap()
        .unwrap();
    assert!(stored.cover_image_url.is_none());
}

#[tokio::test]
async fn avatar_requires_image_content_type() {
    let app = TestApp::spawn().await;
    let (access, _) = app.signed_in_user("u1", "e1@x.com", "pw1").await;

    let response = app
        .client
        .patch(app.url("/avatar"))
        .bearer_auth(&access)
        .header("Content-Type", "text/plain")
        .body("not an image")
        .send()
        .await
        .unwrap();

    assert_eq!(400, response.status().as_u16());
}

#[tokio::test]
async fn profile_routes_require_authentication() {
    let app = TestApp::spawn().await;

    let response = app.client.get(app.url("/current-user")).send().await.unwrap();
    assert_eq!(401, response.status().as_u16());

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");
}
