//! Application state shared across all handlers and middleware.

use std::sync::Arc;
use std::time::Instant;

use agency_auth::jwt::{JwtDecoder, JwtEncoder};
use agency_auth::password::{PasswordHasher, PasswordValidator};
use agency_auth::rbac::RbacEnforcer;
use agency_core::config::AppConfig;
use agency_database::DatabasePool;
use agency_database::repositories::{
    ActivityRepository, BatchRepository, BookingRepository, FinancialRepository,
    GroupTicketRepository, ReferenceRepository, SettingRepository, TicketRepository,
    UmrahRepository, UserRepository,
};
use agency_service::{
    AdminUserService, AuthService, BatchService, BookingService, ExpirySweeper, FinancialService,
    GroupTicketService, ReferenceService, SettingsService, TicketService, UmrahService,
};

/// Application state containing all shared dependencies.
///
/// Passed to every Axum handler via `State<AppState>`.
/// All fields are `Arc`-wrapped or pool handles, so cloning is cheap.
#[derive(Debug, Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────
    /// Application configuration
    pub config: Arc<AppConfig>,
    /// Process start, for the health endpoint
    pub started_at: Instant,

    // ── Infrastructure ───────────────────────────────────────
    /// SQLite connection pool
    pub db: DatabasePool,
    /// Role-based access control enforcer
    pub rbac: Arc<RbacEnforcer>,

    // ── Services ─────────────────────────────────────────────
    pub auth_service: Arc<AuthService>,
    pub user_service: Arc<AdminUserService>,
    pub reference_service: Arc<ReferenceService>,
    pub ticket_service: Arc<TicketService>,
    pub batch_service: Arc<BatchService>,
    pub booking_service: Arc<BookingService>,
    pub financial_service: Arc<FinancialService>,
    pub settings_service: Arc<SettingsService>,
    pub umrah_service: Arc<UmrahService>,
    pub group_service: Arc<GroupTicketService>,
    /// Expired-hold sweeper, run in the background and on demand
    pub sweeper: Arc<ExpirySweeper>,
}

impl AppState {
    /// Wires repositories, auth components and services over `db`.
    pub fn new(config: AppConfig, db: DatabasePool) -> Self {
        let pool = db.pool().clone();

        // ── Repositories ─────────────────────────────────────────
        let user_repo = Arc::new(UserRepository::new(pool.clone()));
        let reference_repo = Arc::new(ReferenceRepository::new(pool.clone()));
        let batch_repo = Arc::new(BatchRepository::new(pool.clone()));
        let ticket_repo = Arc::new(TicketRepository::new(pool.clone()));
        let booking_repo = Arc::new(BookingRepository::new(pool.clone()));
        let financial_repo = Arc::new(FinancialRepository::new(pool.clone()));
        let setting_repo = Arc::new(SettingRepository::new(pool.clone()));
        let activity_repo = Arc::new(ActivityRepository::new(pool.clone()));
        let umrah_repo = Arc::new(UmrahRepository::new(pool.clone()));
        let group_repo = Arc::new(GroupTicketRepository::new(pool));

        // ── Auth ─────────────────────────────────────────────────
        let rbac = Arc::new(RbacEnforcer::new());
        let hasher = Arc::new(PasswordHasher::new());
        let validator = Arc::new(PasswordValidator::new(&config.auth));
        let encoder = Arc::new(JwtEncoder::new(&config.auth));
        let decoder = Arc::new(JwtDecoder::new(&config.auth));

        // ── Services ─────────────────────────────────────────────
        let auth_service = Arc::new(AuthService::new(
            Arc::clone(&user_repo),
            Arc::clone(&hasher),
            encoder,
            decoder,
        ));
        let user_service = Arc::new(AdminUserService::new(
            Arc::clone(&user_repo),
            Arc::clone(&activity_repo),
            hasher,
            validator,
            Arc::clone(&rbac),
        ));
        let financial_service = Arc::new(FinancialService::new(
            db.clone(),
            financial_repo,
            Arc::clone(&ticket_repo),
            Arc::clone(&rbac),
        ));
        let reference_service = Arc::new(ReferenceService::new(
            Arc::clone(&reference_repo),
            Arc::clone(&rbac),
        ));
        let batch_service = Arc::new(BatchService::new(
            db.clone(),
            batch_repo,
            Arc::clone(&ticket_repo),
            reference_repo,
            Arc::clone(&activity_repo),
            Arc::clone(&financial_service),
            Arc::clone(&rbac),
        ));
        let ticket_service = Arc::new(TicketService::new(
            db.clone(),
            Arc::clone(&ticket_repo),
            Arc::clone(&booking_repo),
            Arc::clone(&activity_repo),
            Arc::clone(&rbac),
        ));
        let booking_service = Arc::new(BookingService::new(
            db.clone(),
            Arc::clone(&booking_repo),
            Arc::clone(&ticket_repo),
            Arc::clone(&activity_repo),
            Arc::clone(&financial_service),
            Arc::clone(&rbac),
        ));
        let settings_service = Arc::new(SettingsService::new(
            db.clone(),
            setting_repo,
            Arc::clone(&booking_repo),
            Arc::clone(&activity_repo),
            Arc::clone(&rbac),
        ));
        let umrah_service = Arc::new(UmrahService::new(
            db.clone(),
            umrah_repo,
            Arc::clone(&activity_repo),
            Arc::clone(&rbac),
        ));
        let group_service = Arc::new(GroupTicketService::new(
            db.clone(),
            group_repo,
            Arc::clone(&activity_repo),
            Arc::clone(&rbac),
        ));
        let sweeper = Arc::new(ExpirySweeper::new(
            db.clone(),
            booking_repo,
            ticket_repo,
            activity_repo,
        ));

        Self {
            config: Arc::new(config),
            started_at: Instant::now(),
            db,
            rbac,
            auth_service,
            user_service,
            reference_service,
            ticket_service,
            batch_service,
            booking_service,
            financial_service,
            settings_service,
            umrah_service,
            group_service,
            sweeper,
        }
    }
}
