//! Repository layer for database operations

pub mod copies;
pub mod patrons;
pub mod titles;

use sqlx::{Pool, Postgres};

use crate::error::AppResult;

/// Main repository struct holding database connection pool
#[derive(Clone)]
pub struct Repository {
    pub pool: Pool<Postgres>,
    pub copies: copies::CopyStore,
    pub titles: titles::TitlesRepository,
    pub patrons: patrons::PatronsRepository,
}

impl Repository {
    /// Create a new repository with the given database pool
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self {
            copies: copies::CopyStore::new(pool.clone()),
            titles: titles::TitlesRepository::new(pool.clone()),
            patrons: patrons::PatronsRepository::new(pool.clone()),
            pool,
        }
    }

    /// Verify database connectivity, used by the readiness probe
    pub async fn ping(&self) -> AppResult<()> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }
}
