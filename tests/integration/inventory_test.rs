//! Batch intake, ticket listing, ticket transitions and the dashboard.

use http::StatusCode;
use serde_json::json;

use agency_entity::user::UserRole;

use crate::helpers::TestApp;

#[tokio::test]
async fn test_batch_intake_expands_into_tickets() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;

    let tickets = app.stock(&admin, 3).await;
    assert_eq!(tickets.len(), 3);

    let response = app.request("GET", "/api/tickets", None, Some(&admin)).await;
    assert_eq!(response.status, StatusCode::OK);
    let listed = response.body["data"]["tickets"].as_array().unwrap();
    assert_eq!(listed.len(), 3);
    assert_eq!(response.body["data"]["total"], 3);
    for ticket in listed {
        assert_eq!(ticket["status"], "available");
        assert!(ticket["selling_price"].as_i64().unwrap() >= 18000);
        assert_eq!(ticket["buying_price"], 15000);
        assert_eq!(ticket["country_code"], "KSA");
    }

    let response = app
        .request("GET", "/api/ticket-batches", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let batch = &response.body["data"]["items"][0];
    assert_eq!(batch["sold"], 0);
    assert_eq!(batch["available"], 3);
    assert_eq!(batch["quantity"], 3);
}

#[tokio::test]
async fn test_ticket_filters() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let tickets = app.stock(&admin, 2).await;
    app.book(&admin, &tickets[0], "full").await;

    let response = app
        .request("GET", "/api/tickets?status=available", None, Some(&admin))
        .await;
    assert_eq!(response.body["data"]["total"], 1);

    let response = app
        .request("GET", "/api/tickets?country=UAE", None, Some(&admin))
        .await;
    assert_eq!(response.body["data"]["total"], 0);

    let response = app
        .request("GET", "/api/tickets?status=reserved", None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_staff_sees_no_buying_price() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let staff = app.user_token("staff1", UserRole::Staff).await;
    let tickets = app.stock(&admin, 1).await;

    let response = app
        .request("GET", &format!("/api/tickets/{}", tickets[0]), None, Some(&staff))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"].get("buying_price").is_none());

    let response = app
        .request("GET", "/api/tickets/dashboard/stats", None, Some(&staff))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["totalTickets"], 1);
    assert!(response.body["data"].get("estimatedProfit").is_none());
}

#[tokio::test]
async fn test_sale_shows_on_dashboard() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let staff = app.user_token("staff1", UserRole::Staff).await;
    let tickets = app.stock(&admin, 2).await;

    let before = app
        .request("GET", "/api/tickets/dashboard/stats", None, Some(&admin))
        .await;
    let sold_before = before.body["data"]["soldTickets"].as_i64().unwrap();
    let profit_before = before.body["data"]["estimatedProfit"].as_i64().unwrap();

    // A staff full-payment booking only holds the ticket.
    let booking = app.book(&staff, &tickets[0], "full").await;
    assert_eq!(booking.status, StatusCode::CREATED);
    assert_eq!(booking.body["data"]["status"], "pending");

    let response = app
        .request(
            "PATCH",
            &format!("/api/tickets/{}/status", tickets[0]),
            Some(json!({ "status": "sold" })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "sold");

    let after = app
        .request("GET", "/api/tickets/dashboard/stats", None, Some(&admin))
        .await;
    assert_eq!(after.body["data"]["soldTickets"].as_i64().unwrap(), sold_before + 1);
    assert_eq!(
        after.body["data"]["estimatedProfit"].as_i64().unwrap(),
        profit_before + (20000 - 15000)
    );

    let booking_id = booking.body["data"]["id"].as_str().unwrap();
    let response = app
        .request("GET", &format!("/api/bookings/{booking_id}"), None, Some(&admin))
        .await;
    assert_eq!(response.body["data"]["status"], "confirmed");
}

#[tokio::test]
async fn test_illegal_ticket_transition() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let tickets = app.stock(&admin, 1).await;
    let path = format!("/api/tickets/{}/status", tickets[0]);

    let response = app
        .request("PATCH", &path, Some(json!({ "status": "sold" })), Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("PATCH", &path, Some(json!({ "status": "locked" })), Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = app
        .request("PATCH", &path, Some(json!({ "status": "flying" })), Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_batch_validation_lists_every_field() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;

    let response = app
        .request(
            "POST",
            "/api/ticket-batches",
            Some(json!({
                "country": "",
                "airline": "",
                "flightDate": "soon",
                "buyingPrice": 0,
                "quantity": 0,
                "agentName": "",
            })),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    let fields: Vec<&str> = response.body["errors"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["field"].as_str().unwrap())
        .collect();
    assert_eq!(
        fields,
        ["agentName", "airline", "buyingPrice", "country", "flightDate", "quantity"]
    );
}

#[tokio::test]
async fn test_malformed_json_is_a_bad_request() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;

    let response = app
        .request(
            "POST",
            "/api/ticket-batches",
            Some(json!({ "country": "KSA" })),
            Some(&admin),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
async fn test_batch_with_sales_cannot_be_deleted() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let tickets = app.stock(&admin, 2).await;
    app.book(&admin, &tickets[0], "full").await;

    let response = app.request("GET", "/api/ticket-batches", None, Some(&admin)).await;
    let batch_id = response.body["data"]["items"][0]["id"].as_str().unwrap().to_string();

    let response = app
        .request("DELETE", &format!("/api/ticket-batches/{batch_id}"), None, Some(&admin))
        .await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    let response = app
        .request(
            "PUT",
            &format!("/api/ticket-batches/{batch_id}"),
            Some(json!({ "remarks": "Refund pending" })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["remarks"], "Refund pending");
}

#[tokio::test]
async fn test_optimal_price_and_validation() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let tickets = app.stock(&admin, 1).await;

    let response = app
        .request(
            "GET",
            "/api/financial/optimal-price?buyingPrice=10000&countryCode=UAE",
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["minimumPrice"], 10500);
    assert!(response.body["data"]["optimalPrice"].as_i64().unwrap() >= 10500);

    let response = app
        .request(
            "POST",
            "/api/financial/validate-booking",
            Some(json!({ "ticketId": tickets[0], "sellingPrice": 15000 })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["valid"], false);
    assert!(response.body["data"]["error"].is_string());

    let response = app
        .request(
            "POST",
            "/api/financial/validate-booking",
            Some(json!({ "ticketId": tickets[0], "sellingPrice": 15750 })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.body["data"]["valid"], true);
    assert!(response.body["data"].get("error").is_none());
}

#[tokio::test]
async fn test_oversized_prices_are_rejected() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;
    let tickets = app.stock(&admin, 1).await;

    let response = app
        .request(
            "POST",
            "/api/financial/validate-booking",
            Some(json!({ "ticketId": tickets[0], "sellingPrice": 200_000_000_000_000_000_i64 })),
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);
    assert_eq!(response.body["errors"][0]["field"], "sellingPrice");

    let response = app
        .request(
            "GET",
            "/api/financial/optimal-price?buyingPrice=9000000000000000000&countryCode=KSA",
            None,
            Some(&admin),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.body["success"], false);

    let ticket = app
        .request("GET", &format!("/api/tickets/{}", tickets[0]), None, Some(&admin))
        .await;
    assert_eq!(ticket.body["data"]["status"], "available");
}

#[tokio::test]
async fn test_malformed_query_is_a_bad_request() {
    let app = TestApp::new().await;
    let admin = app.user_token("admin1", UserRole::Admin).await;

    for path in [
        "/api/bookings?limit=abc",
        "/api/tickets?offset=-1",
        "/api/financial/optimal-price?buyingPrice=cheap&countryCode=KSA",
    ] {
        let response = app.request("GET", path, None, Some(&admin)).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST, "{path}");
        assert_eq!(response.body["success"], false, "{path}");
        assert!(response.body["message"].is_string(), "{path}");
    }
}
