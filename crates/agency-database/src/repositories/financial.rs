//! Read-only aggregate queries behind the financial calculator.

use serde::Serialize;
use sqlx::{FromRow, SqliteConnection, SqlitePool};

use agency_core::result::AppResult;

use super::db_error;

/// Store-wide totals.
#[derive(Debug, Clone, Default, Serialize, FromRow)]
pub struct FinancialTotals {
    pub total_investment: i64,
    pub total_tickets_bought: i64,
    pub total_revenue: i64,
    pub total_cost: i64,
    pub confirmed_bookings: i64,
    pub available_tickets: i64,
    pub booked_tickets: i64,
    pub locked_tickets: i64,
    pub sold_tickets: i64,
}

/// Totals for one country.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct CountryTotals {
    pub country_code: String,
    pub country_name: String,
    pub country_flag: Option<String>,
    pub total_investment: i64,
    pub tickets_bought: i64,
    pub total_revenue: i64,
    pub total_cost: i64,
    pub tickets_sold: i64,
    pub tickets_available: i64,
}

/// Sales confirmed on one calendar day.
#[derive(Debug, Clone, Default, Serialize, FromRow)]
pub struct DailySales {
    pub count: i64,
    pub amount: i64,
}

/// Inventory figures shown on the dashboard.
#[derive(Debug, Clone, Default, Serialize, FromRow)]
pub struct InventoryStats {
    pub total_tickets: i64,
    pub available_tickets: i64,
    pub booked_tickets: i64,
    pub locked_tickets: i64,
    pub sold_tickets: i64,
    pub total_investment: i64,
    pub estimated_revenue: i64,
    pub estimated_profit: i64,
}

/// Price a sold ticket went for: its confirmed booking, else its list price.
const EFFECTIVE_SALE_PRICE: &str = "COALESCE((SELECT bk.selling_price FROM bookings bk
        WHERE bk.ticket_id = t.id AND bk.status = 'confirmed'
        ORDER BY bk.confirmed_at DESC LIMIT 1), t.selling_price)";

/// Repository for financial aggregates. Never writes.
#[derive(Debug, Clone)]
pub struct FinancialRepository {
    pool: SqlitePool,
}

impl FinancialRepository {
    /// Create a new financial repository.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Investment, revenue and inventory totals across the store.
    pub async fn totals(&self) -> AppResult<FinancialTotals> {
        sqlx::query_as::<_, FinancialTotals>(
            "SELECT
                (SELECT COALESCE(SUM(buying_price * quantity), 0) FROM ticket_batches) AS total_investment,
                (SELECT COALESCE(SUM(quantity), 0) FROM ticket_batches) AS total_tickets_bought,
                (SELECT COALESCE(SUM(selling_price), 0) FROM bookings WHERE status = 'confirmed') AS total_revenue,
                (SELECT COALESCE(SUM(b.buying_price), 0) FROM bookings bk
                    JOIN tickets t ON t.id = bk.ticket_id
                    JOIN ticket_batches b ON b.id = t.batch_id
                    WHERE bk.status = 'confirmed') AS total_cost,
                (SELECT COUNT(*) FROM bookings WHERE status = 'confirmed') AS confirmed_bookings,
                (SELECT COUNT(*) FROM tickets WHERE status = 'available') AS available_tickets,
                (SELECT COUNT(*) FROM tickets WHERE status = 'booked') AS booked_tickets,
                (SELECT COUNT(*) FROM tickets WHERE status = 'locked') AS locked_tickets,
                (SELECT COUNT(*) FROM tickets WHERE status = 'sold') AS sold_tickets",
        )
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to compute financial totals"))
    }

    /// Per-country totals. Every country is listed, with zeros when it has
    /// no purchases or sales.
    pub async fn country_totals(&self) -> AppResult<Vec<CountryTotals>> {
        sqlx::query_as::<_, CountryTotals>(
            "SELECT c.code AS country_code, c.name AS country_name, c.flag AS country_flag,
                    COALESCE(inv.investment, 0) AS total_investment,
                    COALESCE(inv.bought, 0) AS tickets_bought,
                    COALESCE(s.revenue, 0) AS total_revenue,
                    COALESCE(s.cost, 0) AS total_cost,
                    COALESCE(s.sold, 0) AS tickets_sold,
                    COALESCE(a.available, 0) AS tickets_available
             FROM countries c
             LEFT JOIN (
                 SELECT country_code, SUM(buying_price * quantity) AS investment, SUM(quantity) AS bought
                 FROM ticket_batches GROUP BY country_code
             ) inv ON inv.country_code = c.code
             LEFT JOIN (
                 SELECT b.country_code, SUM(bk.selling_price) AS revenue,
                        SUM(b.buying_price) AS cost, COUNT(*) AS sold
                 FROM bookings bk
                 JOIN tickets t ON t.id = bk.ticket_id
                 JOIN ticket_batches b ON b.id = t.batch_id
                 WHERE bk.status = 'confirmed'
                 GROUP BY b.country_code
             ) s ON s.country_code = c.code
             LEFT JOIN (
                 SELECT b.country_code, COUNT(*) AS available
                 FROM tickets t JOIN ticket_batches b ON b.id = t.batch_id
                 WHERE t.status = 'available'
                 GROUP BY b.country_code
             ) a ON a.country_code = c.code
             ORDER BY c.name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(db_error("Failed to compute country financials"))
    }

    /// Bookings confirmed on `date` (`YYYY-MM-DD`, compared against the
    /// ISO date prefix of `confirmed_at`).
    pub async fn sales_on(&self, date: &str) -> AppResult<DailySales> {
        sqlx::query_as::<_, DailySales>(
            "SELECT COUNT(*) AS count, COALESCE(SUM(selling_price), 0) AS amount
             FROM bookings
             WHERE status = 'confirmed' AND substr(confirmed_at, 1, 10) = ?",
        )
        .bind(date)
        .fetch_one(&self.pool)
        .await
        .map_err(db_error("Failed to compute daily sales"))
    }

    /// Average confirmed selling price for a country, if it has any sales.
    pub async fn country_average_price(
        &self,
        conn: &mut SqliteConnection,
        country_code: &str,
    ) -> AppResult<Option<f64>> {
        sqlx::query_scalar::<_, Option<f64>>(
            "SELECT AVG(bk.selling_price)
             FROM bookings bk
             JOIN tickets t ON t.id = bk.ticket_id
             JOIN ticket_batches b ON b.id = t.batch_id
             WHERE bk.status = 'confirmed' AND UPPER(b.country_code) = UPPER(?)",
        )
        .bind(country_code)
        .fetch_one(conn)
        .await
        .map_err(db_error("Failed to compute country average price"))
    }

    /// Ticket counts and estimated figures for the dashboard.
    pub async fn inventory_stats(&self) -> AppResult<InventoryStats> {
        let sql = format!(
            "SELECT
                (SELECT COUNT(*) FROM tickets) AS total_tickets,
                (SELECT COUNT(*) FROM tickets WHERE status = 'available') AS available_tickets,
                (SELECT COUNT(*) FROM tickets WHERE status = 'booked') AS booked_tickets,
                (SELECT COUNT(*) FROM tickets WHERE status = 'locked') AS locked_tickets,
                (SELECT COUNT(*) FROM tickets WHERE status = 'sold') AS sold_tickets,
                (SELECT COALESCE(SUM(buying_price * quantity), 0) FROM ticket_batches) AS total_investment,
                (SELECT COALESCE(SUM({EFFECTIVE_SALE_PRICE}), 0)
                    FROM tickets t WHERE t.status = 'sold') AS estimated_revenue,
                (SELECT COALESCE(SUM({EFFECTIVE_SALE_PRICE} - b.buying_price), 0)
                    FROM tickets t JOIN ticket_batches b ON b.id = t.batch_id
                    WHERE t.status = 'sold') AS estimated_profit"
        );
        sqlx::query_as::<_, InventoryStats>(&sql)
            .fetch_one(&self.pool)
            .await
            .map_err(db_error("Failed to compute dashboard stats"))
    }
}
