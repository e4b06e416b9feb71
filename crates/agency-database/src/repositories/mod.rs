//! Repository implementations for all back-office entities.

pub mod activity;
pub mod batch;
pub mod booking;
pub mod financial;
pub mod group_ticket;
pub mod reference;
pub mod setting;
pub mod ticket;
pub mod umrah;
pub mod user;

pub use activity::ActivityRepository;
pub use batch::BatchRepository;
pub use booking::BookingRepository;
pub use financial::FinancialRepository;
pub use group_ticket::GroupTicketRepository;
pub use reference::ReferenceRepository;
pub use setting::SettingRepository;
pub use ticket::TicketRepository;
pub use umrah::UmrahRepository;
pub use user::UserRepository;

use agency_core::error::{AppError, ErrorKind};

/// Map a driver error at the repository boundary.
///
/// Constraint violations keep their classification (conflict, validation).
/// Store faults are logged and prefixed with `context`.
pub(crate) fn db_error(context: &'static str) -> impl FnOnce(sqlx::Error) -> AppError {
    move |e| {
        let err = AppError::from(e);
        if err.kind == ErrorKind::Database {
            tracing::error!(context, error = %err.diagnostic(), "Store fault");
            AppError {
                message: format!("{context}: {}", err.message),
                ..err
            }
        } else {
            err
        }
    }
}

/// Generate a new opaque identifier.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
pub(crate) mod test_support {
    use chrono::Utc;
    use sqlx::SqlitePool;

    use agency_entity::batch::{CreateBatch, TicketBatch};
    use agency_entity::ticket::NewTicket;
    use agency_entity::user::{CreateUser, User, UserRole};

    use super::{BatchRepository, TicketRepository, UserRepository};
    use crate::{DatabasePool, run_migrations};

    /// Migrated in-memory database.
    pub async fn pool() -> SqlitePool {
        let db = DatabasePool::in_memory().await.unwrap();
        run_migrations(db.pool()).await.unwrap();
        db.into_pool()
    }

    pub async fn user(pool: &SqlitePool) -> User {
        UserRepository::new(pool.clone())
            .create(&CreateUser {
                username: "owner".into(),
                password_hash: "x".into(),
                name: "Owner".into(),
                email: None,
                phone: None,
                role: UserRole::Admin,
            })
            .await
            .unwrap()
    }

    /// A KSA batch of `quantity` tickets priced at 20 000 over a 15 000 cost.
    pub async fn batch(pool: &SqlitePool, user: &User, quantity: i64) -> TicketBatch {
        let mut conn = pool.acquire().await.unwrap();
        let now = Utc::now();
        let batch = BatchRepository::new(pool.clone())
            .insert(
                &mut conn,
                &CreateBatch {
                    country_code: "KSA".into(),
                    airline_name: "Emirates".into(),
                    flight_date: "2026-12-01".into(),
                    flight_time: None,
                    buying_price: 15_000,
                    quantity,
                    agent_name: "Acme".into(),
                    agent_contact: None,
                    agent_address: None,
                    remarks: None,
                },
                &user.id,
                now,
            )
            .await
            .unwrap();
        let tickets: Vec<NewTicket> = (1..=quantity)
            .map(|n| NewTicket {
                batch_id: batch.id.clone(),
                flight_number: format!("EK{n:03}"),
                selling_price: 20_000,
                aircraft: None,
                seat_class: "economy".into(),
            })
            .collect();
        TicketRepository::new(pool.clone())
            .insert_many(&mut conn, &tickets, now)
            .await
            .unwrap();
        batch
    }
}
