//! Booking export rendering.

use std::str::FromStr;

use serde::Serialize;

use agency_core::error::AppError;
use agency_database::repositories::booking::BookingExportRow;

/// Supported export formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Csv,
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "csv" => Ok(Self::Csv),
            other => Err(AppError::validation(format!(
                "Unsupported export format '{other}' (expected csv or json)"
            ))),
        }
    }
}

/// A rendered export, ready to be sent as a download.
#[derive(Debug, Clone, Serialize)]
pub struct ExportFile {
    pub filename: String,
    pub content_type: &'static str,
    pub body: String,
}

const CSV_HEADER: [&str; 16] = [
    "id",
    "status",
    "passenger_name",
    "passenger_passport",
    "agent_name",
    "flight_number",
    "airline_name",
    "country_code",
    "flight_date",
    "selling_price",
    "buying_price",
    "payment_type",
    "partial_amount",
    "payment_method",
    "confirmed_at",
    "created_at",
];

/// Render the rows in `format`.
pub fn render(rows: &[BookingExportRow], format: ExportFormat, stamp: &str) -> Result<ExportFile, AppError> {
    match format {
        ExportFormat::Json => Ok(ExportFile {
            filename: format!("bookings-{stamp}.json"),
            content_type: "application/json",
            body: serde_json::to_string_pretty(rows)?,
        }),
        ExportFormat::Csv => Ok(ExportFile {
            filename: format!("bookings-{stamp}.csv"),
            content_type: "text/csv; charset=utf-8",
            body: to_csv(rows),
        }),
    }
}

fn to_csv(rows: &[BookingExportRow]) -> String {
    let mut out = CSV_HEADER.join(",");
    out.push('\n');
    for row in rows {
        let fields = [
            row.id.clone(),
            row.status.to_string(),
            row.passenger_name.clone(),
            row.passenger_passport.clone().unwrap_or_default(),
            row.agent_name.clone(),
            row.flight_number.clone(),
            row.airline_name.clone(),
            row.country_code.clone(),
            row.flight_date.clone(),
            row.selling_price.to_string(),
            row.buying_price.to_string(),
            row.payment_type.clone(),
            row.partial_amount.map(|a| a.to_string()).unwrap_or_default(),
            row.payment_method.clone(),
            row.confirmed_at.map(|t| t.to_rfc3339()).unwrap_or_default(),
            row.created_at.to_rfc3339(),
        ];
        let line: Vec<String> = fields.iter().map(|f| escape(f)).collect();
        out.push_str(&line.join(","));
        out.push('\n');
    }
    out
}

/// Quote a field when it contains a separator, quote or line break.
fn escape(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agency_entity::booking::BookingStatus;
    use chrono::Utc;

    fn row(passenger: &str) -> BookingExportRow {
        BookingExportRow {
            id: "b1".into(),
            status: BookingStatus::Confirmed,
            passenger_name: passenger.into(),
            passenger_passport: None,
            agent_name: "Acme".into(),
            flight_number: "EK001".into(),
            airline_name: "Emirates".into(),
            country_code: "KSA".into(),
            flight_date: "2026-12-01".into(),
            selling_price: 20_000,
            buying_price: 15_000,
            payment_type: "full".into(),
            partial_amount: None,
            payment_method: "cash".into(),
            confirmed_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_escape() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("Roe, Jane"), "\"Roe, Jane\"");
        assert_eq!(escape("say \"hi\""), "\"say \"\"hi\"\"\"");
    }

    #[test]
    fn test_csv_has_header_and_rows() {
        let file = render(&[row("Roe, Jane")], ExportFormat::Csv, "x").unwrap();
        let mut lines = file.body.lines();
        assert!(lines.next().unwrap().starts_with("id,status,passenger_name"));
        assert!(lines.next().unwrap().starts_with("b1,confirmed,\"Roe, Jane\","));
        assert_eq!(file.filename, "bookings-x.csv");
    }

    #[test]
    fn test_format_parsing() {
        assert_eq!("CSV".parse::<ExportFormat>().unwrap(), ExportFormat::Csv);
        assert!("xml".parse::<ExportFormat>().is_err());
    }
}
