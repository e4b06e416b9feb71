//! Request DTOs with validation.
//!
//! Inventory and booking bodies use the camelCase field names of the web
//! client; the rest follow the entity field names.

use std::collections::BTreeMap;

use serde::Deserialize;
use validator::Validate;

use agency_entity::batch::{CreateBatch, UpdateBatch};
use agency_entity::booking::PaymentType;
use agency_entity::user::UserRole;
use agency_service::booking::CreateBookingRequest;
use agency_service::user::CreateUserRequest;

/// Login request body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// New airline.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateAirlineRequest {
    #[validate(length(min = 1, max = 100, message = "Airline name is required"))]
    pub name: String,
    #[validate(length(min = 2, max = 3, message = "Airline code must be 2 or 3 characters"))]
    pub code: Option<String>,
}

/// `{status}` body of the status endpoints.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StatusRequest {
    #[validate(length(min = 1, message = "Status is required"))]
    pub status: String,
}

/// Purchase intake body.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBatchRequest {
    #[validate(length(min = 1, message = "Country is required"))]
    pub country: String,
    #[validate(length(min = 1, message = "Airline is required"))]
    pub airline: String,
    #[validate(length(equal = 10, message = "Flight date must be YYYY-MM-DD"))]
    pub flight_date: String,
    pub flight_time: Option<String>,
    #[validate(range(
        min = 1,
        max = 1_000_000_000,
        message = "Buying price must be between 1 and 1000000000"
    ))]
    pub buying_price: i64,
    #[validate(range(min = 1, max = 1000, message = "Quantity must be between 1 and 1000"))]
    pub quantity: i64,
    #[validate(length(min = 1, message = "Agent name is required"))]
    pub agent_name: String,
    pub agent_contact: Option<String>,
    pub agent_address: Option<String>,
    pub remarks: Option<String>,
}

impl From<CreateBatchRequest> for CreateBatch {
    fn from(req: CreateBatchRequest) -> Self {
        Self {
            country_code: req.country,
            airline_name: req.airline,
            flight_date: req.flight_date,
            flight_time: req.flight_time,
            buying_price: req.buying_price,
            quantity: req.quantity,
            agent_name: req.agent_name,
            agent_contact: req.agent_contact,
            agent_address: req.agent_address,
            remarks: req.remarks,
        }
    }
}

/// Editable batch metadata.
#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateBatchRequest {
    #[validate(length(min = 1, message = "Agent name cannot be blank"))]
    pub agent_name: Option<String>,
    pub agent_contact: Option<String>,
    pub agent_address: Option<String>,
    pub remarks: Option<String>,
}

impl From<UpdateBatchRequest> for UpdateBatch {
    fn from(req: UpdateBatchRequest) -> Self {
        Self {
            agent_name: req.agent_name,
            agent_contact: req.agent_contact,
            agent_address: req.agent_address,
            remarks: req.remarks,
        }
    }
}

/// Selling agent of a booking.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct AgentInfo {
    #[validate(length(min = 1, message = "Agent name is required"))]
    pub name: String,
    #[validate(email(message = "Agent email is invalid"))]
    pub email: Option<String>,
    pub phone: Option<String>,
}

/// Travelling passenger of a booking.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct PassengerInfo {
    #[validate(length(min = 1, message = "Passenger name is required"))]
    pub name: String,
    pub passport: Option<String>,
    pub phone: Option<String>,
    #[validate(email(message = "Passenger email is invalid"))]
    pub email: Option<String>,
    #[validate(range(min = 1, message = "Passenger count must be at least 1"))]
    pub pax_count: Option<i64>,
}

/// Booking body.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingBody {
    #[validate(length(min = 1, message = "Ticket is required"))]
    pub ticket_id: String,
    #[validate(nested)]
    pub agent_info: AgentInfo,
    #[validate(nested)]
    pub passenger_info: PassengerInfo,
    #[validate(range(
        min = 1,
        max = 1_000_000_000,
        message = "Selling price must be between 1 and 1000000000"
    ))]
    pub selling_price: i64,
    pub payment_type: PaymentType,
    #[validate(range(
        min = 1,
        max = 1_000_000_000,
        message = "Partial amount must be between 1 and 1000000000"
    ))]
    pub partial_amount: Option<i64>,
    #[validate(length(min = 1, message = "Payment method is required"))]
    pub payment_method: String,
    pub comments: Option<String>,
}

impl From<CreateBookingBody> for CreateBookingRequest {
    fn from(body: CreateBookingBody) -> Self {
        Self {
            ticket_id: body.ticket_id,
            agent_name: body.agent_info.name,
            agent_email: body.agent_info.email,
            agent_phone: body.agent_info.phone,
            passenger_name: body.passenger_info.name,
            passenger_passport: body.passenger_info.passport,
            passenger_phone: body.passenger_info.phone,
            passenger_email: body.passenger_info.email,
            pax_count: body.passenger_info.pax_count,
            selling_price: body.selling_price,
            payment_type: body.payment_type,
            partial_amount: body.partial_amount,
            payment_method: body.payment_method,
            comments: body.comments,
        }
    }
}

/// Price check for a prospective booking.
#[derive(Debug, Clone, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ValidateBookingRequest {
    #[validate(length(min = 1, message = "Ticket is required"))]
    pub ticket_id: String,
    #[validate(range(max = 1_000_000_000, message = "Selling price cannot exceed 1000000000"))]
    pub selling_price: i64,
}

/// Create user request (admin).
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateUserBody {
    #[validate(length(min = 3, max = 50, message = "Username must be 3 to 50 characters"))]
    pub username: String,
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,
    #[validate(email(message = "Email is invalid"))]
    pub email: Option<String>,
    pub phone: Option<String>,
    pub role: UserRole,
}

impl From<CreateUserBody> for CreateUserRequest {
    fn from(body: CreateUserBody) -> Self {
        Self {
            username: body.username,
            password: body.password,
            name: body.name,
            email: body.email,
            phone: body.phone,
            role: body.role,
        }
    }
}

/// `PUT /settings` body.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateSettingsRequest {
    #[validate(length(min = 1, message = "No settings provided"))]
    pub settings: BTreeMap<String, String>,
}

/// Umrah instalment.
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct PaymentRequest {
    #[validate(range(
        min = 1,
        max = 1_000_000_000,
        message = "Payment amount must be between 1 and 1000000000"
    ))]
    pub amount: i64,
    pub payment_date: Option<String>,
}

// ── Query strings ────────────────────────────────────────────

/// `GET /tickets` filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TicketQuery {
    pub country: Option<String>,
    pub status: Option<String>,
    pub airline: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// `GET /bookings` filters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BookingQuery {
    pub status: Option<String>,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
}

/// `GET /financial/optimal-price` parameters.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OptimalPriceQuery {
    pub buying_price: i64,
    pub country_code: String,
}

/// `GET /settings/export/data` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExportQuery {
    pub format: Option<String>,
}

/// `GET /settings/logs/activity` parameters.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ActivityQuery {
    pub limit: Option<i64>,
    pub user_id: Option<String>,
}
