//! Umrah records, instalments and group seat assignment.

use http::StatusCode;
use serde_json::json;

use agency_entity::user::UserRole;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_instalments_reduce_the_balance() {
    let app = TestApp::new().await;
    let staff = app.user_token("staff1", UserRole::Staff).await;

    let response = app
        .request(
            "POST",
            "/api/umrah/without-transport",
            Some(json!({
                "passenger_name": "Yusuf Ali",
                "departure_date": "2026-11-20",
                "total_amount": 150000,
                "amount_paid": 50000,
            })),
            Some(&staff),
        )
        .await;
    assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);
    assert_eq!(response.body["data"]["remaining_amount"], 100000);
    let id = response.body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "POST",
            &format!("/api/umrah/without-transport/{id}/payment"),
            Some(json!({ "amount": 25000, "payment_date": "2026-10-01" })),
            Some(&staff),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["amount_paid"], 75000);
    assert_eq!(response.body["data"]["remaining_amount"], 75000);
    assert_eq!(response.body["data"]["last_payment_date"], "2026-10-01");

    let response = app
        .request(
            "POST",
            &format!("/api/umrah/without-transport/{id}/payment"),
            Some(json!({ "amount": 0 })),
            Some(&staff),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = app
        .request(
            "POST",
            &format!("/api/umrah/without-transport/{id}/payment"),
            Some(json!({ "amount": 80000 })),
            Some(&staff),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_transport_record_lifecycle() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let staff = app.user_token("staff1", UserRole::Staff).await;

    let mut record = json!({
        "passenger_name": "Maryam Khan",
        "departure_date": "2026-11-20",
        "transport_type": "bus",
        "transport_from": "Jeddah",
        "transport_to": "Makkah",
    });
    let response = app
        .request("POST", "/api/umrah/with-transport", Some(record.clone()), Some(&staff))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let id = response.body["data"]["id"].as_str().unwrap().to_string();
    let path = format!("/api/umrah/with-transport/{id}");

    record["transport_to"] = json!("Madinah");
    let response = app.request("PUT", &path, Some(record), Some(&staff)).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["transport_to"], "Madinah");

    let response = app
        .request("GET", "/api/umrah/with-transport", None, Some(&staff))
        .await;
    assert_eq!(response.body["data"]["total"], 1);

    let response = app.request("DELETE", &path, None, Some(&staff)).await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);
    let response = app.request("DELETE", &path, None, Some(&admin)).await;
    assert_eq!(response.status, StatusCode::OK);
    let response = app.request("GET", &path, None, Some(&admin)).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_group_seats_are_assigned_until_full() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let staff = app.user_token("staff1", UserRole::Staff).await;

    let group = json!({
        "group_name": "November Group",
        "airline_name": "Saudia",
        "departure_date": "2026-11-20",
        "total_tickets": 2,
        "buying_price": 90000,
    });
    let response = app
        .request("POST", "/api/umrah/group-tickets", Some(group.clone()), Some(&staff))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request("POST", "/api/umrah/group-tickets", Some(group), Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let group_id = response.body["data"]["id"].as_str().unwrap().to_string();

    for name in ["First", "Second"] {
        let response = app
            .request(
                "POST",
                "/api/umrah/group-tickets/auto-assign",
                Some(json!({ "departure_date": "2026-11-20", "passenger_name": name })),
                Some(&staff),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED);
        assert_eq!(response.body["data"]["group_ticket_id"], group_id.as_str());
    }

    let response = app
        .request(
            "POST",
            "/api/umrah/group-tickets/auto-assign",
            Some(json!({ "departure_date": "2026-11-20", "passenger_name": "Third" })),
            Some(&staff),
        )
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = app
        .request("GET", "/api/umrah/group-tickets", None, Some(&staff))
        .await;
    assert_eq!(response.body["data"][0]["remaining_tickets"], 0);

    let response = app
        .request(
            "GET",
            &format!("/api/umrah/group-tickets/{group_id}/bookings"),
            None,
            Some(&staff),
        )
        .await;
    assert_eq!(response.body["data"].as_array().unwrap().len(), 2);
}
