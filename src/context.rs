//! Application context and dependency injection.

use crate::{
    account::AccountManager,
    checkin::CheckinManager,
    config::ServerConfig,
    db,
    error::AppResult,
    session::SessionSigner,
};
use sqlx::SqlitePool;
use std::sync::Arc;

/// Application context holding all shared services.
/// Handlers receive it through axum state rather than ambient globals.
#[derive(Clone)]
pub struct AppContext {
    pub config: Arc<ServerConfig>,
    pub db: SqlitePool,
    pub accounts: Arc<AccountManager>,
    pub checkins: Arc<CheckinManager>,
    pub sessions: Arc<SessionSigner>,
}

impl AppContext {
    /// Create a new application context from configuration
    pub async fn new(config: ServerConfig) -> AppResult<Self> {
        config.validate()?;

        let db = db::create_pool(&config.storage.database, db::DatabaseOptions::default()).await?;

        // Schema must exist before any query runs
        db::run_migrations(&db).await?;
        db::test_connection(&db).await?;

        let accounts = Arc::new(AccountManager::new(db.clone()));
        let checkins = Arc::new(CheckinManager::new(db.clone()));
        let sessions = Arc::new(SessionSigner::new(
            config.session.secret.clone(),
            config.session.ttl_hours,
        ));

        Ok(Self {
            config: Arc::new(config),
            db,
            accounts,
            checkins,
            sessions,
        })
    }

    /// Service base URL
    pub fn service_url(&self) -> String {
        format!(
            "http://{}:{}",
            self.config.service.hostname, self.config.service.port
        )
    }
}
