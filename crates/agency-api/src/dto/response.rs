//! Response DTOs.

use serde::Serialize;

use agency_core::types::pagination::PageResponse;
use agency_entity::booking::BookingView;
use agency_entity::ticket::TicketView;

/// `GET /health` payload.
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
    pub version: &'static str,
    pub uptime_seconds: u64,
}

/// `GET /tickets` payload.
#[derive(Debug, Clone, Serialize)]
pub struct TicketList {
    pub tickets: Vec<TicketView>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
    pub has_more: bool,
}

impl From<PageResponse<TicketView>> for TicketList {
    fn from(page: PageResponse<TicketView>) -> Self {
        Self {
            tickets: page.items,
            total: page.total,
            limit: page.limit,
            offset: page.offset,
            has_more: page.has_more,
        }
    }
}

/// `GET /bookings` payload.
#[derive(Debug, Clone, Serialize)]
pub struct BookingList {
    pub bookings: Vec<BookingView>,
    pub total: u64,
    pub limit: u32,
    pub offset: u32,
    pub has_more: bool,
}

impl From<PageResponse<BookingView>> for BookingList {
    fn from(page: PageResponse<BookingView>) -> Self {
        Self {
            bookings: page.items,
            total: page.total,
            limit: page.limit,
            offset: page.offset,
            has_more: page.has_more,
        }
    }
}

/// `GET /financial/optimal-price` payload.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimalPriceResponse {
    pub buying_price: i64,
    pub country_code: String,
    pub optimal_price: i64,
    /// Lowest price a booking would accept.
    pub minimum_price: i64,
}
