//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use http::{Request, StatusCode};
use serde_json::{Value, json};
use tower::ServiceExt;

use agency_api::{AppState, build_app};
use agency_core::config::AppConfig;
use agency_database::{DatabasePool, run_migrations};
use agency_entity::user::UserRole;
use agency_service::user::CreateUserRequest;

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Wired application state, for direct service access
    pub state: AppState,
    /// Database handle for direct queries
    pub db: DatabasePool,
}

impl TestApp {
    /// Create a new test application on a fresh database
    pub async fn new() -> Self {
        Self::with_config(AppConfig::default()).await
    }

    pub async fn with_config(config: AppConfig) -> Self {
        let db = DatabasePool::in_memory()
            .await
            .expect("Failed to open test database");
        run_migrations(db.pool())
            .await
            .expect("Failed to run migrations");

        let state = AppState::new(config, db.clone());
        let router = build_app(state.clone());

        Self { router, state, db }
    }

    /// Create a user and return their ID
    pub async fn create_user(&self, username: &str, password: &str, role: UserRole) -> String {
        self.state
            .user_service
            .insert(CreateUserRequest {
                username: username.to_string(),
                password: password.to_string(),
                name: format!("{username} test"),
                email: None,
                phone: None,
                role,
            })
            .await
            .expect("Failed to create test user")
            .id
    }

    /// Create a user with `role` and return their bearer token
    pub async fn user_token(&self, username: &str, role: UserRole) -> String {
        self.create_user(username, "password123", role).await;
        self.login(username, "password123").await
    }

    /// Login and return the JWT
    pub async fn login(&self, username: &str, password: &str) -> String {
        let response = self
            .request(
                "POST",
                "/api/auth/login",
                Some(json!({ "username": username, "password": password })),
                None,
            )
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.body["data"]["token"]
            .as_str()
            .expect("No token in login response")
            .to_string()
    }

    /// Record a KSA/Emirates batch at 15000 and return the ticket IDs
    pub async fn stock(&self, token: &str, quantity: i64) -> Vec<String> {
        let response = self
            .request(
                "POST",
                "/api/ticket-batches",
                Some(json!({
                    "country": "KSA",
                    "airline": "Emirates",
                    "flightDate": "2026-12-01",
                    "flightTime": "09:30",
                    "buyingPrice": 15000,
                    "quantity": quantity,
                    "agentName": "Acme",
                })),
                Some(token),
            )
            .await;
        assert_eq!(response.status, StatusCode::CREATED, "{:?}", response.body);

        let batch_id = response.body["data"]["batch"]["id"]
            .as_str()
            .expect("No batch id")
            .to_string();
        let detail = self
            .request("GET", &format!("/api/ticket-batches/{batch_id}"), None, Some(token))
            .await;
        detail.body["data"]["tickets"]
            .as_array()
            .expect("No tickets in batch")
            .iter()
            .map(|t| t["id"].as_str().expect("No ticket id").to_string())
            .collect()
    }

    /// Book `ticket_id` at 20000
    pub async fn book(&self, token: &str, ticket_id: &str, payment_type: &str) -> TestResponse {
        let mut body = json!({
            "ticketId": ticket_id,
            "agentInfo": { "name": "Desk" },
            "passengerInfo": { "name": "Jane Roe", "passport": "AB123456" },
            "sellingPrice": 20000,
            "paymentType": payment_type,
            "paymentMethod": "cash",
        });
        if payment_type == "partial" {
            body["partialAmount"] = json!(5000);
        }
        self.request("POST", "/api/bookings", Some(body), Some(token))
            .await
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {token}"));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let headers = response.headers().clone();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let text = String::from_utf8_lossy(&body_bytes).to_string();
        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse {
            status,
            headers,
            body,
            text,
        }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Response headers
    pub headers: http::HeaderMap,
    /// Parsed JSON body (`Null` when not JSON)
    pub body: Value,
    /// Raw body text
    pub text: String,
}
