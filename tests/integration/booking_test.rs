//! Booking lifecycle over HTTP.

use chrono::{DateTime, Duration, Utc};
use http::StatusCode;
use serde_json::json;

use agency_entity::user::UserRole;

use crate::helpers::TestApp;

fn timestamp(value: &serde_json::Value) -> DateTime<Utc> {
    value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s).ok())
        .map(|t| t.with_timezone(&Utc))
        .expect("timestamp")
}

#[tokio::test]
async fn test_partial_payment_holds_for_a_day() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let staff = app.user_token("staff1", UserRole::Staff).await;
    let tickets = app.stock(&admin, 1).await;

    let response = app.book(&staff, &tickets[0], "partial").await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

    let booking = &response.body["data"];
    assert_eq!(booking["status"], "pending");
    assert_eq!(booking["partial_amount"], 5000);
    let hold = timestamp(&booking["expires_at"]) - timestamp(&booking["created_at"]);
    assert!((hold - Duration::hours(24)).num_seconds().abs() <= 5);

    let ticket = app
        .request("GET", &format!("/api/tickets/{}", tickets[0]), None, Some(&staff))
        .await;
    assert_eq!(ticket.body["data"]["status"], "locked");
    assert!(ticket.body["data"]["locked_until"].is_string());
}

#[tokio::test]
async fn test_booking_an_unavailable_ticket_fails() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let tickets = app.stock(&admin, 1).await;

    let first = app.book(&admin, &tickets[0], "full").await;
    assert_eq!(first.status, StatusCode::CREATED);
    assert_eq!(first.body["data"]["status"], "confirmed");

    let second = app.book(&admin, &tickets[0], "full").await;
    assert_eq!(second.status, StatusCode::CONFLICT);
    assert_eq!(second.body["success"], false);
}

#[tokio::test]
async fn test_price_below_minimum_markup_is_rejected() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let tickets = app.stock(&admin, 1).await;

    let response = app
        .request(
            "POST",
            "/api/bookings",
            Some(json!({
                "ticketId": tickets[0],
                "agentInfo": { "name": "Desk" },
                "passengerInfo": { "name": "Jane Roe" },
                "sellingPrice": 15000,
                "paymentType": "full",
                "paymentMethod": "cash",
            })),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let ticket = app
        .request("GET", &format!("/api/tickets/{}", tickets[0]), None, Some(&admin))
        .await;
    assert_eq!(ticket.body["data"]["status"], "available");
}

#[tokio::test]
async fn test_nested_booking_fields_are_validated() {
    let app = TestApp::new().await;
    let staff = app.user_token("staff1", UserRole::Staff).await;

    let response = app
        .request(
            "POST",
            "/api/bookings",
            Some(json!({
                "ticketId": "",
                "agentInfo": { "name": "", "email": "not-an-email" },
                "passengerInfo": { "name": "" },
                "sellingPrice": 0,
                "paymentType": "full",
                "paymentMethod": "cash",
            })),
            Some(&staff),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let fields: Vec<&str> = response.body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert!(fields.contains(&"agentInfo.name"));
    assert!(fields.contains(&"agentInfo.email"));
    assert!(fields.contains(&"passengerInfo.name"));
    assert!(fields.contains(&"sellingPrice"));
    assert!(fields.contains(&"ticketId"));
}

#[tokio::test]
async fn test_confirmation_is_idempotent() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let staff = app.user_token("staff1", UserRole::Staff).await;
    let manager = app.user_token("manager1", UserRole::Manager).await;
    let tickets = app.stock(&admin, 1).await;

    let booking = app.book(&staff, &tickets[0], "partial").await;
    let path = format!(
        "/api/bookings/{}/status",
        booking.body["data"]["id"].as_str().unwrap()
    );

    let response = app
        .request("PATCH", &path, Some(json!({ "status": "confirmed" })), Some(&staff))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let first = app
        .request("PATCH", &path, Some(json!({ "status": "confirmed" })), Some(&manager))
        .await;
    assert_eq!(first.status, StatusCode::OK);
    assert_eq!(first.body["data"]["status"], "confirmed");
    assert!(first.body["data"]["expires_at"].is_null());

    let second = app
        .request("PATCH", &path, Some(json!({ "status": "confirmed" })), Some(&manager))
        .await;
    assert_eq!(second.status, StatusCode::OK);
    assert_eq!(second.body["data"]["confirmed_at"], first.body["data"]["confirmed_at"]);

    let ticket = app
        .request("GET", &format!("/api/tickets/{}", tickets[0]), None, Some(&admin))
        .await;
    assert_eq!(ticket.body["data"]["status"], "sold");
}

#[tokio::test]
async fn test_cancel_releases_ticket() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let staff = app.user_token("staff1", UserRole::Staff).await;
    let tickets = app.stock(&admin, 1).await;

    let booking = app.book(&staff, &tickets[0], "partial").await;
    let id = booking.body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "PATCH",
            &format!("/api/bookings/{id}/status"),
            Some(json!({ "status": "cancelled" })),
            Some(&staff),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "cancelled");

    let ticket = app
        .request("GET", &format!("/api/tickets/{}", tickets[0]), None, Some(&staff))
        .await;
    assert_eq!(ticket.body["data"]["status"], "available");
    assert!(ticket.body["data"]["locked_until"].is_null());
}

#[tokio::test]
async fn test_expired_hold_is_released() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let staff = app.user_token("staff1", UserRole::Staff).await;
    let tickets = app.stock(&admin, 1).await;

    let booking = app.book(&staff, &tickets[0], "partial").await;
    let id = booking.body["data"]["id"].as_str().unwrap().to_string();

    sqlx::query("UPDATE bookings SET expires_at = ? WHERE id = ?")
        .bind(Utc::now() - Duration::hours(1))
        .bind(&id)
        .execute(app.db.pool())
        .await
        .unwrap();

    // Reads see the expiry before any sweep.
    let response = app
        .request("GET", &format!("/api/bookings/{id}"), None, Some(&staff))
        .await;
    assert_eq!(response.body["data"]["effective_status"], "expired");

    let response = app
        .request(
            "PATCH",
            &format!("/api/bookings/{id}/status"),
            Some(json!({ "status": "confirmed" })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = app
        .request("POST", "/api/tickets/maintenance/release-expired", None, Some(&staff))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("POST", "/api/tickets/maintenance/release-expired", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["expired_bookings"], 1);
    assert_eq!(response.body["data"]["released_tickets"], 1);

    let ticket = app
        .request("GET", &format!("/api/tickets/{}", tickets[0]), None, Some(&staff))
        .await;
    assert_eq!(ticket.body["data"]["status"], "available");
}

#[tokio::test]
async fn test_staff_only_see_their_own_bookings() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let alice = app.user_token("alice", UserRole::Staff).await;
    let bob = app.user_token("bob", UserRole::Staff).await;
    let tickets = app.stock(&admin, 2).await;

    let mine = app.book(&alice, &tickets[0], "partial").await;
    app.book(&bob, &tickets[1], "partial").await;

    let response = app.request("GET", "/api/bookings", None, Some(&alice)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["total"], 1);
    assert_eq!(response.body["data"]["bookings"][0]["id"], mine.body["data"]["id"]);

    let response = app.request("GET", "/api/bookings", None, Some(&admin)).await;
    assert_eq!(response.body["data"]["total"], 2);

    let response = app
        .request("GET", "/api/bookings?status=confirmed", None, Some(&admin))
        .await;
    assert_eq!(response.body["data"]["total"], 0);

    let other = mine.body["data"]["id"].as_str().unwrap();
    let response = app
        .request("GET", &format!("/api/bookings/{other}"), None, Some(&bob))
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
