//! Patrons repository for database operations
//!
//! Narrow read-only contract: circulation needs the account status and
//! the grade designation that feeds the due-date policy, nothing more.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::patron::Patron,
};

#[derive(Clone)]
pub struct PatronsRepository {
    pool: Pool<Postgres>,
}

impl PatronsRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get patron by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Patron> {
        sqlx::query_as::<_, Patron>("SELECT * FROM patrons WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::PatronNotFound(id))
    }
}
