//! Umrah packages that include ground transport.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// A pilgrim record with transport arrangements.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct UmrahWithTransport {
    pub id: String,
    pub passenger_name: String,
    pub pnr: Option<String>,
    pub passport_number: Option<String>,
    pub mobile: Option<String>,
    pub agent_name: Option<String>,
    pub departure_date: String,
    pub return_date: Option<String>,
    /// Bus, car, train...
    pub transport_type: Option<String>,
    pub transport_from: Option<String>,
    pub transport_to: Option<String>,
    pub remarks: Option<String>,
    pub created_by: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Writable fields of a transport package. Updates replace every field.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UmrahTransportInput {
    pub passenger_name: String,
    pub pnr: Option<String>,
    pub passport_number: Option<String>,
    pub mobile: Option<String>,
    pub agent_name: Option<String>,
    pub departure_date: String,
    pub return_date: Option<String>,
    pub transport_type: Option<String>,
    pub transport_from: Option<String>,
    pub transport_to: Option<String>,
    pub remarks: Option<String>,
}
