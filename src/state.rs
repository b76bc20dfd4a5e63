use std::sync::Arc;

use crate::auth::repo::{InMemoryUserRepository, PgUserRepository, UserRepository};
use crate::config::AppConfig;
use crate::db;
use crate::stations::{
    memory::InMemoryStationRepository,
    repo::{PgStationRepository, StationRepository},
};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    pub stations: Arc<dyn StationRepository>,
    pub users: Arc<dyn UserRepository>,
}

impl AppState {
    /// Wires the SQL repositories when a database is configured, in-memory
    /// tables otherwise.
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let Some(url) = config.database_url.clone() else {
            tracing::warn!("DATABASE_URL not set; using in-memory store, data is lost on exit");
            return Ok(Self::in_memory(Arc::new(config)));
        };

        let pool = db::connect(&url).await?;
        db::migrate(&pool).await;

        Ok(Self::from_parts(
            Arc::new(config),
            Arc::new(PgStationRepository::new(pool.clone())),
            Arc::new(PgUserRepository::new(pool)),
        ))
    }

    pub fn in_memory(config: Arc<AppConfig>) -> Self {
        Self::from_parts(
            config,
            Arc::new(InMemoryStationRepository::new()),
            Arc::new(InMemoryUserRepository::new()),
        )
    }

    pub fn from_parts(
        config: Arc<AppConfig>,
        stations: Arc<dyn StationRepository>,
        users: Arc<dyn UserRepository>,
    ) -> Self {
        Self {
            config,
            stations,
            users,
        }
    }

    /// Empty in-memory tables with fixed JWT settings.
    #[cfg(test)]
    pub fn fake() -> Self {
        use crate::config::{IngestConfig, JwtConfig};

        let config = Arc::new(AppConfig {
            database_url: None,
            jwt: JwtConfig {
                secret: "test".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
            ingest: IngestConfig::default(),
            seed_user: None,
        });

        Self::in_memory(config)
    }
}
