pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod flash;
pub mod handlers;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod services;

// Make test_utils available for both unit tests and integration tests
pub mod test_utils;

use config::ServerConfig;
use repositories::{SqliteRunRepository, SqliteUserRepository};
use services::{AuthService, EmailService, ReportService, RunService};
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth_service: Arc<AuthService>,
    pub run_service: Arc<RunService>,
    pub report_service: Arc<ReportService>,
}

impl AppState {
    /// Wires the SQLite repositories into the services.
    pub fn new(
        pool: sqlx::SqlitePool,
        config: ServerConfig,
        email_service: Arc<dyn EmailService>,
    ) -> Self {
        let user_repository = Arc::new(SqliteUserRepository::new(pool.clone()));
        let run_repository = Arc::new(SqliteRunRepository::new(pool.clone()));

        let report_service = ReportService::new(
            run_repository.clone(),
            email_service,
            config.report_scope,
            config.report_sender.clone(),
        );

        Self {
            auth_service: Arc::new(AuthService::new(user_repository)),
            run_service: Arc::new(RunService::new(run_repository, config.run_access)),
            report_service: Arc::new(report_service),
        }
    }
}
