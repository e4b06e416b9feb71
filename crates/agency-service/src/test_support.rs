//! Service wiring over a migrated in-memory database.

use std::path::Path;
use std::sync::Arc;

use agency_auth::password::{PasswordHasher, PasswordValidator};
use agency_auth::rbac::RbacEnforcer;
use agency_core::config::{AuthConfig, DatabaseConfig};
use agency_database::repositories::{
    ActivityRepository, BatchRepository, BookingRepository, FinancialRepository,
    GroupTicketRepository, ReferenceRepository, SettingRepository, TicketRepository,
    UmrahRepository, UserRepository,
};
use agency_database::{DatabasePool, run_migrations};
use agency_entity::batch::CreateBatch;
use agency_entity::booking::PaymentType;
use agency_entity::ticket::Ticket;
use agency_entity::user::{CreateUser, UserRole};

use crate::booking::CreateBookingRequest;
use crate::{
    AdminUserService, BatchService, BookingService, ExpirySweeper, FinancialService,
    GroupTicketService, RequestContext, SettingsService, TicketService, UmrahService,
};

pub struct Fixture {
    pub db: DatabasePool,
    pub ticket_repo: Arc<TicketRepository>,
    pub batches: BatchService,
    pub tickets: TicketService,
    pub bookings: BookingService,
    pub financial: Arc<FinancialService>,
    pub sweeper: ExpirySweeper,
    pub umrah: UmrahService,
    pub groups: GroupTicketService,
    pub settings: SettingsService,
    pub users: AdminUserService,
}

impl Fixture {
    pub async fn new() -> Self {
        Self::with_db(DatabasePool::in_memory().await.unwrap()).await
    }

    /// Fixture over a WAL database file with a multi-connection pool.
    pub async fn on_disk(path: &Path) -> Self {
        let config = DatabaseConfig {
            url: format!("sqlite://{}", path.display()),
            max_connections: 8,
            ..DatabaseConfig::default()
        };
        Self::with_db(DatabasePool::connect(&config).await.unwrap()).await
    }

    async fn with_db(db: DatabasePool) -> Self {
        run_migrations(db.pool()).await.unwrap();
        let pool = db.pool().clone();

        let rbac = Arc::new(RbacEnforcer::new());
        let ticket_repo = Arc::new(TicketRepository::new(pool.clone()));
        let booking_repo = Arc::new(BookingRepository::new(pool.clone()));
        let activity_repo = Arc::new(ActivityRepository::new(pool.clone()));
        let financial = Arc::new(FinancialService::new(
            db.clone(),
            Arc::new(FinancialRepository::new(pool.clone())),
            ticket_repo.clone(),
            rbac.clone(),
        ));
        let auth_config = AuthConfig::default();

        Self {
            batches: BatchService::new(
                db.clone(),
                Arc::new(BatchRepository::new(pool.clone())),
                ticket_repo.clone(),
                Arc::new(ReferenceRepository::new(pool.clone())),
                activity_repo.clone(),
                financial.clone(),
                rbac.clone(),
            ),
            tickets: TicketService::new(
                db.clone(),
                ticket_repo.clone(),
                booking_repo.clone(),
                activity_repo.clone(),
                rbac.clone(),
            ),
            bookings: BookingService::new(
                db.clone(),
                booking_repo.clone(),
                ticket_repo.clone(),
                activity_repo.clone(),
                financial.clone(),
                rbac.clone(),
            ),
            sweeper: ExpirySweeper::new(
                db.clone(),
                booking_repo.clone(),
                ticket_repo.clone(),
                activity_repo.clone(),
            ),
            umrah: UmrahService::new(
                db.clone(),
                Arc::new(UmrahRepository::new(pool.clone())),
                activity_repo.clone(),
                rbac.clone(),
            ),
            groups: GroupTicketService::new(
                db.clone(),
                Arc::new(GroupTicketRepository::new(pool.clone())),
                activity_repo.clone(),
                rbac.clone(),
            ),
            settings: SettingsService::new(
                db.clone(),
                Arc::new(SettingRepository::new(pool.clone())),
                booking_repo.clone(),
                activity_repo.clone(),
                rbac.clone(),
            ),
            users: AdminUserService::new(
                Arc::new(UserRepository::new(pool.clone())),
                activity_repo,
                Arc::new(PasswordHasher::new()),
                Arc::new(PasswordValidator::new(&auth_config)),
                rbac,
            ),
            financial,
            ticket_repo,
            db,
        }
    }

    /// Insert a user with `role` and return their context.
    pub async fn login_as(&self, username: &str, role: UserRole) -> RequestContext {
        let user = UserRepository::new(self.db.pool().clone())
            .create(&CreateUser {
                username: username.into(),
                password_hash: "x".into(),
                name: username.into(),
                email: None,
                phone: None,
                role,
            })
            .await
            .unwrap();
        RequestContext::for_user(&user)
    }

    /// Record a KSA/Emirates batch and return its tickets.
    pub async fn stock(&self, admin: &RequestContext, quantity: i64) -> Vec<Ticket> {
        let created = self
            .batches
            .create_batch(admin, ksa_batch(quantity))
            .await
            .unwrap();
        self.ticket_repo.list_by_batch(&created.batch.id).await.unwrap()
    }

    pub async fn ticket(&self, id: &str) -> Ticket {
        self.ticket_repo.find_by_id(id).await.unwrap().unwrap()
    }
}

pub fn ksa_batch(quantity: i64) -> CreateBatch {
    CreateBatch {
        country_code: "KSA".into(),
        airline_name: "Emirates".into(),
        flight_date: "2026-12-01".into(),
        flight_time: Some("09:30".into()),
        buying_price: 15_000,
        quantity,
        agent_name: "Wholesale Co".into(),
        agent_contact: None,
        agent_address: None,
        remarks: None,
    }
}

pub fn booking_request(ticket_id: &str, price: i64, payment_type: PaymentType) -> CreateBookingRequest {
    CreateBookingRequest {
        ticket_id: ticket_id.into(),
        agent_name: "Desk".into(),
        agent_email: None,
        agent_phone: None,
        passenger_name: "Jane Roe".into(),
        passenger_passport: Some("AB123456".into()),
        passenger_phone: None,
        passenger_email: None,
        pax_count: None,
        selling_price: price,
        payment_type,
        partial_amount: (payment_type == PaymentType::Partial).then_some(5_000),
        payment_method: "cash".into(),
        comments: None,
    }
}
