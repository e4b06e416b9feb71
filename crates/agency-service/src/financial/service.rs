//! Financial reporting and booking price validation.

use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use sqlx::SqliteConnection;
use tracing::warn;

use agency_auth::rbac::{Permission, RbacEnforcer};
use agency_core::error::AppError;
use agency_database::DatabasePool;
use agency_database::repositories::financial::{CountryTotals, DailySales, FinancialTotals};
use agency_database::repositories::{FinancialRepository, TicketRepository};
use agency_entity::ticket::{Ticket, TicketStatus};

use super::calculator::{
    check_amount, meets_minimum_markup, minimum_selling_price, optimal_selling_price, percentage,
};
use crate::context::RequestContext;

/// Store-wide financial summary.
#[derive(Debug, Clone, Serialize)]
pub struct FinancialSummary {
    #[serde(flatten)]
    pub totals: FinancialTotals,
    pub total_profit: i64,
    pub profit_margin: f64,
    pub roi: f64,
    pub inventory_utilization: f64,
}

impl From<FinancialTotals> for FinancialSummary {
    fn from(totals: FinancialTotals) -> Self {
        let total_profit = totals.total_revenue - totals.total_cost;
        Self {
            total_profit,
            profit_margin: percentage(total_profit, totals.total_revenue),
            roi: percentage(total_profit, totals.total_investment),
            inventory_utilization: percentage(totals.sold_tickets, totals.total_tickets_bought),
            totals,
        }
    }
}

/// Financial figures of one destination country.
#[derive(Debug, Clone, Serialize)]
pub struct CountryFinancials {
    #[serde(flatten)]
    pub totals: CountryTotals,
    pub total_profit: i64,
    pub profit_margin: f64,
    pub roi: f64,
    pub inventory_utilization: f64,
}

impl From<CountryTotals> for CountryFinancials {
    fn from(totals: CountryTotals) -> Self {
        let total_profit = totals.total_revenue - totals.total_cost;
        Self {
            total_profit,
            profit_margin: percentage(total_profit, totals.total_revenue),
            roi: percentage(total_profit, totals.total_investment),
            inventory_utilization: percentage(totals.tickets_sold, totals.tickets_bought),
            totals,
        }
    }
}

/// Dashboard counters. Money figures are present only for callers allowed
/// to see profit.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_tickets: i64,
    pub available_tickets: i64,
    pub booked_tickets: i64,
    pub locked_tickets: i64,
    pub sold_tickets: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_investment: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_revenue: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_profit: Option<i64>,
}

/// Outcome of a booking price check, as returned to clients.
#[derive(Debug, Clone, Serialize)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Detailed outcome of checking a prospective booking.
#[derive(Debug, Clone)]
pub enum BookingCheck {
    /// The ticket can be sold at the price.
    Accepted(Ticket),
    TicketNotFound,
    NotAvailable(TicketStatus),
    NonPositivePrice,
    BelowMinimum { minimum: i64 },
}

impl BookingCheck {
    fn message(&self) -> Option<String> {
        match self {
            Self::Accepted(_) => None,
            Self::TicketNotFound => Some("Ticket not found".to_string()),
            Self::NotAvailable(status) => Some(format!("Ticket is not available (status: {status})")),
            Self::NonPositivePrice => Some("Selling price must be greater than zero".to_string()),
            Self::BelowMinimum { minimum } => Some(format!(
                "Selling price is below the minimum of {minimum}"
            )),
        }
    }

    /// Client-facing form.
    pub fn to_result(&self) -> ValidationResult {
        let error = self.message();
        ValidationResult {
            valid: error.is_none(),
            error,
        }
    }

    /// The accepted ticket, or the matching error kind: 404 for a missing
    /// ticket, 409 for a held one, 400 for a bad price.
    pub fn into_ticket(self) -> Result<Ticket, AppError> {
        let message = self.message().unwrap_or_default();
        match self {
            Self::Accepted(ticket) => Ok(ticket),
            Self::TicketNotFound => Err(AppError::not_found(message)),
            Self::NotAvailable(_) => Err(AppError::conflict(message)),
            Self::NonPositivePrice | Self::BelowMinimum { .. } => {
                Err(AppError::validation(message))
            }
        }
    }
}

/// Read-only financial calculator.
#[derive(Debug, Clone)]
pub struct FinancialService {
    db: DatabasePool,
    financial_repo: Arc<FinancialRepository>,
    ticket_repo: Arc<TicketRepository>,
    rbac: Arc<RbacEnforcer>,
}

impl FinancialService {
    /// Creates a new financial service.
    pub fn new(
        db: DatabasePool,
        financial_repo: Arc<FinancialRepository>,
        ticket_repo: Arc<TicketRepository>,
        rbac: Arc<RbacEnforcer>,
    ) -> Self {
        Self {
            db,
            financial_repo,
            ticket_repo,
            rbac,
        }
    }

    /// Investment, revenue, profit and inventory ratios.
    pub async fn summary(&self, ctx: &RequestContext) -> Result<FinancialSummary, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ViewProfit)?;
        Ok(self.financial_repo.totals().await?.into())
    }

    /// The summary broken down per country.
    pub async fn countries(&self, ctx: &RequestContext) -> Result<Vec<CountryFinancials>, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ViewProfit)?;
        let rows = self.financial_repo.country_totals().await?;
        Ok(rows.into_iter().map(CountryFinancials::from).collect())
    }

    /// Sales confirmed on the current UTC day.
    pub async fn today(&self, ctx: &RequestContext) -> Result<DailySales, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ViewTickets)?;
        let date = Utc::now().format("%Y-%m-%d").to_string();
        self.financial_repo.sales_on(&date).await
    }

    /// Suggested selling price for a new ticket.
    pub async fn optimal_price(
        &self,
        ctx: &RequestContext,
        buying_price: i64,
        country_code: &str,
    ) -> Result<i64, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::CreateBatches)?;
        if buying_price <= 0 {
            return Err(AppError::validation("Buying price must be greater than zero"));
        }
        check_amount("Buying price", buying_price)?;
        let mut conn = self.db.pool().acquire().await?;
        Ok(self.optimal_price_in(&mut conn, buying_price, country_code).await)
    }

    /// Suggested selling price, reading history on a caller-owned
    /// connection. A failed history lookup falls back to the default
    /// markup.
    pub async fn optimal_price_in(
        &self,
        conn: &mut SqliteConnection,
        buying_price: i64,
        country_code: &str,
    ) -> i64 {
        let average = match self
            .financial_repo
            .country_average_price(conn, country_code)
            .await
        {
            Ok(average) => average,
            Err(e) => {
                warn!(country = %country_code, error = %e, "Price history unavailable, using fallback markup");
                None
            }
        };
        optimal_selling_price(buying_price, average)
    }

    /// Whether a ticket may be booked at `selling_price`.
    pub async fn validate_booking(
        &self,
        ctx: &RequestContext,
        ticket_id: &str,
        selling_price: i64,
    ) -> Result<ValidationResult, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::CreateBookings)?;
        check_amount("Selling price", selling_price)?;
        let mut conn = self.db.pool().acquire().await?;
        let check = self.check_booking(&mut conn, ticket_id, selling_price).await?;
        Ok(check.to_result())
    }

    /// Checks a prospective booking on a caller-owned connection.
    pub async fn check_booking(
        &self,
        conn: &mut SqliteConnection,
        ticket_id: &str,
        selling_price: i64,
    ) -> Result<BookingCheck, AppError> {
        let Some(ticket) = self.ticket_repo.find_by_id_in(conn, ticket_id).await? else {
            return Ok(BookingCheck::TicketNotFound);
        };
        if ticket.status != TicketStatus::Available {
            return Ok(BookingCheck::NotAvailable(ticket.status));
        }
        if selling_price <= 0 {
            return Ok(BookingCheck::NonPositivePrice);
        }
        let buying_price = self
            .ticket_repo
            .buying_price(conn, ticket_id)
            .await?
            .unwrap_or_default();
        if !meets_minimum_markup(selling_price, buying_price) {
            return Ok(BookingCheck::BelowMinimum {
                minimum: minimum_selling_price(buying_price),
            });
        }
        Ok(BookingCheck::Accepted(ticket))
    }

    /// Dashboard counters; money figures need `view_profit`.
    pub async fn dashboard(&self, ctx: &RequestContext) -> Result<DashboardStats, AppError> {
        self.rbac.require_permission(&ctx.role, Permission::ViewTickets)?;
        let stats = self.financial_repo.inventory_stats().await?;
        let show_money = self.rbac.has_permission(&ctx.role, Permission::ViewProfit);

        Ok(DashboardStats {
            total_tickets: stats.total_tickets,
            available_tickets: stats.available_tickets,
            booked_tickets: stats.booked_tickets,
            locked_tickets: stats.locked_tickets,
            sold_tickets: stats.sold_tickets,
            total_investment: show_money.then_some(stats.total_investment),
            estimated_revenue: show_money.then_some(stats.estimated_revenue),
            estimated_profit: show_money.then_some(stats.estimated_profit),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn totals() -> FinancialTotals {
        FinancialTotals {
            total_investment: 45_000,
            total_tickets_bought: 3,
            total_revenue: 20_000,
            total_cost: 15_000,
            confirmed_bookings: 1,
            available_tickets: 2,
            booked_tickets: 0,
            locked_tickets: 0,
            sold_tickets: 1,
        }
    }

    #[test]
    fn test_summary_ratios() {
        let summary = FinancialSummary::from(totals());
        assert_eq!(summary.total_profit, 5_000);
        assert_eq!(summary.profit_margin, 25.0);
        assert_eq!(summary.roi, 11.11);
        assert_eq!(summary.inventory_utilization, 33.33);
    }

    #[test]
    fn test_empty_store_reports_zero_ratios() {
        let summary = FinancialSummary::from(FinancialTotals::default());
        assert_eq!(summary.profit_margin, 0.0);
        assert_eq!(summary.roi, 0.0);
        assert_eq!(summary.inventory_utilization, 0.0);
    }

    #[test]
    fn test_check_maps_to_error_kinds() {
        use agency_core::error::ErrorKind;
        let err = BookingCheck::TicketNotFound.into_ticket().unwrap_err();
        assert_eq!(err.kind, ErrorKind::NotFound);
        let err = BookingCheck::NotAvailable(TicketStatus::Sold)
            .into_ticket()
            .unwrap_err();
        assert_eq!(err.kind, ErrorKind::Conflict);
        let check = BookingCheck::BelowMinimum { minimum: 15_750 };
        assert!(!check.to_result().valid);
        assert_eq!(check.into_ticket().unwrap_err().kind, ErrorKind::Validation);
    }
}
