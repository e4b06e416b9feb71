//! Login, token handling and account status.

use http::StatusCode;
use serde_json::json;

use agency_entity::user::UserRole;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_health() {
    let app = TestApp::new().await;
    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["success"], true);
    assert_eq!(response.body["data"]["database"], "connected");
}

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new().await;
    app.create_user("desk1", "password123", UserRole::Staff).await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "desk1", "password": "password123" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let data = &response.body["data"];
    assert!(data["token"].as_str().is_some_and(|t| !t.is_empty()));
    assert_eq!(data["user"]["username"], "desk1");
    assert_eq!(data["user"]["role"], "staff");
    assert!(data["user"].get("password_hash").is_none());
    assert!(data["user"]["last_login"].is_string());
}

#[tokio::test]
async fn test_login_invalid_password() {
    let app = TestApp::new().await;
    app.create_user("desk2", "password123", UserRole::Staff).await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "desk2", "password": "wrongpassword" })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_login_missing_fields() {
    let app = TestApp::new().await;

    let response = app
        .request("POST", "/api/auth/login", Some(json!({ "username": "", "password": "" })), None)
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = response.body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["password", "username"]);
}

#[tokio::test]
async fn test_me_requires_token() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/auth/me", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app
        .request("GET", "/api/auth/me", None, Some("not-a-jwt"))
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_me_authenticated() {
    let app = TestApp::new().await;
    let token = app.user_token("meuser", UserRole::Manager).await;

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["username"], "meuser");
    assert_eq!(response.body["data"]["role"], "manager");
}

#[tokio::test]
async fn test_disabled_user_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.user_token("boss", UserRole::Admin).await;
    let user_id = app.create_user("leaver", "password123", UserRole::Staff).await;
    let leaver = app.login("leaver", "password123").await;

    let response = app
        .request(
            "PATCH",
            &format!("/api/users/{user_id}/status"),
            Some(json!({ "status": "inactive" })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // Existing tokens stop working and new logins fail.
    let response = app.request("GET", "/api/auth/me", None, Some(&leaver)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(json!({ "username": "leaver", "password": "password123" })),
            None,
        )
        .await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
