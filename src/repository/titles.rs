//! Titles repository for database operations
//!
//! Narrow read-only contract: circulation consults a title's `active`
//! flag before permitting new checkouts and never writes title rows.

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::title::Title,
};

#[derive(Clone)]
pub struct TitlesRepository {
    pool: Pool<Postgres>,
}

impl TitlesRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get title by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Title> {
        sqlx::query_as::<_, Title>("SELECT * FROM titles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::TitleNotFound(id))
    }
}
