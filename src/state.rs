use crate::config::AppConfig;
use crate::remote::{DocumentStore, RemoteStore};
use sqlx::SqlitePool;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub config: Arc<AppConfig>,
    pub remote: Arc<dyn RemoteStore>,
}

impl AppState {
    pub async fn init() -> anyhow::Result<Self> {
        let config = Arc::new(AppConfig::from_env()?);
        let db = crate::db::connect(&config.database_url).await?;
        let remote = Arc::new(DocumentStore::new(&config.remote)?) as Arc<dyn RemoteStore>;
        Ok(Self { db, config, remote })
    }

    pub fn from_parts(db: SqlitePool, config: Arc<AppConfig>, remote: Arc<dyn RemoteStore>) -> Self {
        Self { db, config, remote }
    }
}
