//! Title (catalog entry) model and availability summary
//!
//! Titles are catalog metadata owned by an external module; the
//! circulation core only reads them and never mutates anything beyond
//! what the `active` flag already expresses. Retiring a title flips
//! `active` to false, which blocks new checkouts.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Catalog title referenced by circulation records
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Title {
    pub id: i32,
    pub title: String,
    pub author: Option<String>,
    /// External identifier (ISBN or equivalent)
    pub identification: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Per-title copy counts grouped by state class
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct TitleAvailability {
    pub title_id: i32,
    pub total_copies: i64,
    pub available_copies: i64,
    pub borrowed_copies: i64,
}
