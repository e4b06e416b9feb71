//! Route definitions for the back office HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`.

use std::time::Duration;

use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::StatusCode,
    middleware as axum_middleware,
    routing::{get, patch, post},
};
use tower_http::compression::CompressionLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// JSON bodies are small; anything past this is rejected with 413.
const MAX_BODY_BYTES: usize = 1024 * 1024;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        .merge(health_routes())
        .merge(auth_routes())
        .merge(reference_routes())
        .merge(ticket_routes())
        .merge(batch_routes())
        .merge(booking_routes())
        .merge(financial_routes())
        .merge(user_routes())
        .merge(settings_routes())
        .merge(umrah_routes());

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);
    let timeout = Duration::from_secs(state.config.server.request_timeout_seconds);

    Router::new()
        .nest("/api", api_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::error_details::expose_error_details,
        ))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            timeout,
        ))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}

fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/me", get(handlers::auth::me))
}

/// Countries and airlines
fn reference_routes() -> Router<AppState> {
    Router::new()
        .route("/countries", get(handlers::reference::list_countries))
        .route(
            "/airlines",
            get(handlers::reference::list_airlines).post(handlers::reference::create_airline),
        )
}

fn ticket_routes() -> Router<AppState> {
    Router::new()
        .route("/tickets", get(handlers::ticket::list_tickets))
        .route(
            "/tickets/dashboard/stats",
            get(handlers::ticket::dashboard_stats),
        )
        .route(
            "/tickets/maintenance/release-expired",
            post(handlers::ticket::release_expired),
        )
        .route("/tickets/{id}", get(handlers::ticket::get_ticket))
        .route("/tickets/{id}/status", patch(handlers::ticket::update_status))
}

fn batch_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/ticket-batches",
            get(handlers::batch::list_batches).post(handlers::batch::create_batch),
        )
        .route(
            "/ticket-batches/{id}",
            get(handlers::batch::get_batch)
                .put(handlers::batch::update_batch)
                .delete(handlers::batch::delete_batch),
        )
}

fn booking_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/bookings",
            get(handlers::booking::list_bookings).post(handlers::booking::create_booking),
        )
        .route(
            "/bookings/{id}",
            get(handlers::booking::get_booking).delete(handlers::booking::delete_booking),
        )
        .route(
            "/bookings/{id}/status",
            patch(handlers::booking::update_status),
        )
}

fn financial_routes() -> Router<AppState> {
    Router::new()
        .route("/financial/summary", get(handlers::financial::summary))
        .route("/financial/countries", get(handlers::financial::countries))
        .route("/financial/today", get(handlers::financial::today))
        .route(
            "/financial/optimal-price",
            get(handlers::financial::optimal_price),
        )
        .route(
            "/financial/validate-booking",
            post(handlers::financial::validate_booking),
        )
}

/// User administration
fn user_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/users",
            get(handlers::user::list_users).post(handlers::user::create_user),
        )
        .route(
            "/users/{id}",
            get(handlers::user::get_user)
                .put(handlers::user::update_user)
                .delete(handlers::user::delete_user),
        )
        .route("/users/{id}/status", patch(handlers::user::set_status))
}

fn settings_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/settings",
            get(handlers::settings::get_settings).put(handlers::settings::update_settings),
        )
        .route(
            "/settings/export/data",
            get(handlers::settings::export_data),
        )
        .route(
            "/settings/logs/activity",
            get(handlers::settings::activity_log),
        )
}

/// Umrah records and group tickets
fn umrah_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/umrah/with-transport",
            get(handlers::umrah::list_with_transport).post(handlers::umrah::create_with_transport),
        )
        .route(
            "/umrah/with-transport/{id}",
            get(handlers::umrah::get_with_transport)
                .put(handlers::umrah::update_with_transport)
                .delete(handlers::umrah::delete_with_transport),
        )
        .route(
            "/umrah/without-transport",
            get(handlers::umrah::list_without_transport)
                .post(handlers::umrah::create_without_transport),
        )
        .route(
            "/umrah/without-transport/{id}",
            get(handlers::umrah::get_without_transport)
                .put(handlers::umrah::update_without_transport)
                .delete(handlers::umrah::delete_without_transport),
        )
        .route(
            "/umrah/without-transport/{id}/payment",
            post(handlers::umrah::record_payment),
        )
        .route(
            "/umrah/group-tickets",
            get(handlers::umrah::list_group_tickets).post(handlers::umrah::create_group_ticket),
        )
        .route(
            "/umrah/group-tickets/auto-assign",
            post(handlers::umrah::auto_assign),
        )
        .route(
            "/umrah/group-tickets/{id}/bookings",
            get(handlers::umrah::group_bookings),
        )
}
