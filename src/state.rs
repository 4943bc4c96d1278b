use std::sync::Arc;

use crate::auth::TokenSigner;
use crate::config::{AppConfig, StoreBackend};
use crate::db;
use crate::service::{PatientService, StaffService};
use crate::store::{MemoryStore, RecordStore, SqliteStore};

/// Shared handler state / 共享应用状态
pub struct AppState {
    pub patients: PatientService,
    pub staff: StaffService,
    pub tokens: Arc<TokenSigner>,
}

impl AppState {
    pub fn new(store: Arc<dyn RecordStore>, tokens: TokenSigner, bcrypt_cost: u32) -> Self {
        let tokens = Arc::new(tokens);
        Self {
            patients: PatientService::new(store.clone()),
            staff: StaffService::new(store, tokens.clone(), bcrypt_cost),
            tokens,
        }
    }

    /// Build the state from configuration, opening and migrating the database
    /// when the SQLite backend is selected
    pub async fn from_config(config: &AppConfig, database_url: &str) -> anyhow::Result<Self> {
        let store: Arc<dyn RecordStore> = match config.database.backend {
            StoreBackend::Sqlite => {
                let pool = db::connect(database_url, config.database.max_connections).await?;
                db::run_migrations(&pool).await?;
                Arc::new(SqliteStore::new(pool))
            }
            StoreBackend::Memory => {
                tracing::warn!("Using in-memory store; records are lost on shutdown");
                Arc::new(MemoryStore::new())
            }
        };
        tracing::info!("Record store backend: {}", store.backend_name());

        let tokens = TokenSigner::new(
            &config.auth.jwt_secret,
            chrono::Duration::hours(config.auth.token_ttl_hours),
        );
        Ok(Self::new(store, tokens, config.auth.bcrypt_cost))
    }
}
