//! Data model, persistence and the attendance, scoring and reveal engines of
//! the IT-week event service.

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

pub mod changes;
pub mod dto;
pub mod error;
pub mod models;
pub mod repository;
pub mod services;
pub mod store;

use changes::ChangeFeed;
use error::Result;

/// PostgreSQL-backed store shared by the web server and the admin CLI.
#[derive(Debug, Clone)]
pub struct Database {
    pool: PgPool,
    changes: ChangeFeed,
}

impl Database {
    pub async fn new(database_url: &str) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        Ok(Self::from_pool(pool))
    }

    pub fn from_pool(pool: PgPool) -> Self {
        Self {
            pool,
            changes: ChangeFeed::new(),
        }
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    pub async fn run_migrations(&self) -> Result<()> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }
}
