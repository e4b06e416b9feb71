//! Role-based access across the API, users and settings.

use http::StatusCode;
use serde_json::json;

use agency_entity::user::UserRole;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_staff_cannot_create_batches() {
    let app = TestApp::new().await;
    let staff = app.user_token("staff1", UserRole::Staff).await;

    let response = app
        .request(
            "POST",
            "/api/ticket-batches",
            Some(json!({
                "country": "KSA",
                "airline": "Emirates",
                "flightDate": "2026-12-01",
                "buyingPrice": 15000,
                "quantity": 3,
                "agentName": "Acme",
            })),
            Some(&staff),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    assert_eq!(response.body["success"], false);

    let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM ticket_batches")
        .fetch_one(app.db.pool())
        .await
        .unwrap();
    assert_eq!(count, 0);
}

#[tokio::test]
async fn test_profit_views_need_view_profit() {
    let app = TestApp::new().await;
    let manager = app.user_token("manager1", UserRole::Manager).await;
    let admin = app.user_token("admin1", UserRole::Admin).await;

    for path in ["/api/ticket-batches", "/api/financial/summary", "/api/financial/countries"] {
        let response = app.request("GET", path, None, Some(&manager)).await;
        assert_eq!(response.status, StatusCode::FORBIDDEN, "{path}");
        let response = app.request("GET", path, None, Some(&admin)).await;
        assert_eq!(response.status, StatusCode::OK, "{path}");
    }

    let response = app
        .request("GET", "/api/financial/today", None, Some(&manager))
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
async fn test_financial_summary_after_a_sale() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let tickets = app.stock(&admin, 4).await;
    app.book(&admin, &tickets[0], "full").await;

    let response = app
        .request("GET", "/api/financial/summary", None, Some(&admin))
        .await;
    let data = &response.body["data"];
    assert_eq!(data["total_investment"], 60000);
    assert_eq!(data["total_revenue"], 20000);
    assert_eq!(data["total_profit"], 5000);
    assert_eq!(data["inventory_utilization"], 25.0);

    let response = app
        .request("GET", "/api/financial/countries", None, Some(&admin))
        .await;
    let ksa = response.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["country_code"] == "KSA")
        .cloned()
        .unwrap();
    assert_eq!(ksa["tickets_sold"], 1);
    assert_eq!(ksa["tickets_available"], 3);
}

#[tokio::test]
async fn test_user_administration() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let manager = app.user_token("manager1", UserRole::Manager).await;

    let response = app.request("GET", "/api/users", None, Some(&manager)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let body = json!({
        "username": "newdesk",
        "password": "secret99",
        "name": "New Desk",
        "role": "staff",
    });
    let response = app
        .request("POST", "/api/users", Some(body.clone()), Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let user_id = response.body["data"]["id"].as_str().unwrap().to_string();

    let response = app.request("POST", "/api/users", Some(body), Some(&admin)).await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = app
        .request(
            "PUT",
            &format!("/api/users/{user_id}"),
            Some(json!({ "role": "manager" })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["role"], "manager");

    let me = app.request("GET", "/api/auth/me", None, Some(&admin)).await;
    let admin_id = me.body["data"]["id"].as_str().unwrap();
    let response = app
        .request("DELETE", &format!("/api/users/{admin_id}"), None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request("DELETE", &format!("/api/users/{user_id}"), None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app
        .request("GET", &format!("/api/users/{user_id}"), None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_settings_access() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let staff = app.user_token("staff1", UserRole::Staff).await;

    let response = app.request("GET", "/api/settings", None, Some(&staff)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["minimum_markup_percent"], "5");

    let update = json!({ "settings": { "company_name": "Crescent Travels" } });
    let response = app
        .request("PUT", "/api/settings", Some(update.clone()), Some(&staff))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("PUT", "/api/settings", Some(update), Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["company_name"], "Crescent Travels");

    let response = app
        .request("GET", "/api/settings/logs/activity?limit=5", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"][0]["action"], "settings.update");

    let response = app
        .request("GET", "/api/settings/logs/activity", None, Some(&staff))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_export_is_a_download() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let tickets = app.stock(&admin, 1).await;
    app.book(&admin, &tickets[0], "full").await;

    let response = app
        .request("GET", "/api/settings/export/data?format=csv", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(
        response.headers["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/csv")
    );
    let disposition = response.headers["content-disposition"].to_str().unwrap();
    assert!(disposition.starts_with("attachment; filename=\"bookings-"));
    assert!(response.text.contains("Jane Roe"));

    let response = app
        .request("GET", "/api/settings/export/data", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.is_array());

    let response = app
        .request("GET", "/api/settings/export/data?format=xml", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_error_details_follow_config() {
    let mut config = agency_core::config::AppConfig::default();
    config.server.expose_error_details = true;
    let app = TestApp::with_config(config).await;
    let admin = app.user_token("admin1", UserRole::Admin).await;

    let response = app
        .request("GET", "/api/tickets/missing", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
    assert!(response.body["stack"].is_string());

    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let response = app
        .request("GET", "/api/tickets/missing", None, Some(&admin))
        .await;
    assert!(response.body.get("stack").is_none());
}

#[tokio::test]
async fn test_reference_data() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let staff = app.user_token("staff1", UserRole::Staff).await;

    let response = app.request("GET", "/api/countries", None, None).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);

    let response = app.request("GET", "/api/countries", None, Some(&staff)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"].as_array().unwrap().len() >= 9);

    let response = app
        .request("POST", "/api/airlines", Some(json!({ "name": "Air Blue" })), Some(&staff))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "POST",
            "/api/airlines",
            Some(json!({ "name": "Air Blue", "code": "PA" })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED);

    let response = app.request("GET", "/api/airlines", None, Some(&staff)).await;
    let names: Vec<&str> = response.body["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|a| a["name"].as_str().unwrap())
        .collect();
    assert!(names.contains(&"Air Blue"));
}
