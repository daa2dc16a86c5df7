//! Patron (borrower) model
//!
//! Identity management is external; circulation only needs the account
//! status gate and the grade designation that feeds due-date policy.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Patron account status codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[repr(i16)]
pub enum PatronStatus {
    Active = 0,
    Suspended = 1,
    Banned = 2,
}

impl From<i16> for PatronStatus {
    fn from(v: i16) -> Self {
        match v {
            1 => PatronStatus::Suspended,
            2 => PatronStatus::Banned,
            _ => PatronStatus::Active,
        }
    }
}

impl From<PatronStatus> for i16 {
    fn from(s: PatronStatus) -> Self {
        s as i16
    }
}

impl std::fmt::Display for PatronStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            PatronStatus::Active => "Active",
            PatronStatus::Suspended => "Suspended",
            PatronStatus::Banned => "Banned",
        };
        write!(f, "{}", label)
    }
}

/// Patron record as read from storage
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Patron {
    pub id: i32,
    pub name: String,
    pub status: PatronStatus,
    /// Academic grade designation, feeds due-date policy
    pub grade: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Snapshot of a patron's live loan situation, read before checkout
#[derive(Debug, Clone, Copy, Default)]
pub struct PatronLoanSummary {
    /// Copies held in Borrowed or Overdue state
    pub active_loans: i64,
    /// Copies held in Overdue state
    pub overdue_loans: i64,
    /// Whether the patron already holds a live copy of the target title
    pub holds_title: bool,
}
