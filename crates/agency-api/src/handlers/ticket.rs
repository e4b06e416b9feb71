//! Ticket listing, status changes, dashboard and manual expiry sweep.

use axum::extract::{Path, State};

use agency_auth::rbac::Permission;
use agency_core::error::AppError;
use agency_core::types::pagination::PageRequest;
use agency_core::types::response::ApiResponse;
use agency_entity::ticket::{TicketFilter, TicketStatus, TicketView};
use agency_service::SweepReport;
use agency_service::financial::DashboardStats;

use crate::dto::request::{StatusRequest, TicketQuery};
use crate::dto::response::TicketList;
use crate::extractors::{AuthUser, QueryParams, ValidatedJson};
use crate::state::AppState;

/// GET /api/tickets
pub async fn list_tickets(
    State(state): State<AppState>,
    auth: AuthUser,
    QueryParams(query): QueryParams<TicketQuery>,
) -> Result<ApiResponse<TicketList>, AppError> {
    let status = query
        .status
        .as_deref()
        .filter(|s| !s.is_empty())
        .map(str::parse::<TicketStatus>)
        .transpose()?;
    let filter = TicketFilter {
        country: query.country.filter(|c| !c.is_empty()),
        status,
        airline: query.airline.filter(|a| !a.is_empty()),
    };
    let page = PageRequest::new(query.limit, query.offset);

    let tickets = state.ticket_service.list_tickets(&auth, filter, page).await?;
    Ok(ApiResponse::ok(tickets.into()))
}

/// GET /api/tickets/:id
pub async fn get_ticket(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
) -> Result<ApiResponse<TicketView>, AppError> {
    Ok(ApiResponse::ok(state.ticket_service.get_ticket(&auth, &id).await?))
}

/// PATCH /api/tickets/:id/status
pub async fn update_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<String>,
    ValidatedJson(req): ValidatedJson<StatusRequest>,
) -> Result<ApiResponse<TicketView>, AppError> {
    let ticket = state
        .ticket_service
        .update_status(&auth, &id, &req.status)
        .await?;
    Ok(ApiResponse::with_message(ticket, "Ticket status updated"))
}

/// GET /api/tickets/dashboard/stats
pub async fn dashboard_stats(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<DashboardStats>, AppError> {
    Ok(ApiResponse::ok(state.financial_service.dashboard(&auth).await?))
}

/// POST /api/tickets/maintenance/release-expired
pub async fn release_expired(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<ApiResponse<SweepReport>, AppError> {
    state
        .rbac
        .require_permission(&auth.role, Permission::OverrideLocks)?;
    let report = state.sweeper.sweep_once().await?;
    tracing::info!(
        user_id = %auth.user_id,
        expired_bookings = report.expired_bookings,
        released_tickets = report.released_tickets,
        "Manual expiry sweep"
    );
    Ok(ApiResponse::with_message(report, "Expired holds released"))
}
