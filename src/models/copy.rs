//! Copy (physical lendable instance) model and loan state machine
//!
//! A `Copy` row is both the inventory slot and the loan transaction
//! record: stocking creates it in `Available`, checkout claims it, and
//! a terminal state (`Returned`, `Lost`, `Damaged`) closes the
//! transaction while keeping the row for history. At most one
//! non-terminal row may exist per (title_id, copy_number); the schema
//! enforces this with a partial unique index.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;

/// Copy lifecycle state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[repr(i16)]
pub enum CopyState {
    Available = 0,
    Borrowed = 1,
    Overdue = 2,
    /// Completed loan retained as history
    Returned = 3,
    Lost = 4,
    Damaged = 5,
}

impl CopyState {
    /// A live state represents an open loan transaction
    pub fn is_live(self) -> bool {
        matches!(self, CopyState::Borrowed | CopyState::Overdue)
    }

    /// Terminal states close the loan transaction for this row
    pub fn is_terminal(self) -> bool {
        matches!(self, CopyState::Returned | CopyState::Lost | CopyState::Damaged)
    }

    /// Checkout precondition: the slot's current transaction must be
    /// absent, still `Available`, or already closed.
    pub fn claimable(prev: Option<CopyState>) -> bool {
        match prev {
            None => true,
            Some(CopyState::Available) => true,
            Some(s) => s.is_terminal(),
        }
    }
}

impl From<i16> for CopyState {
    fn from(v: i16) -> Self {
        match v {
            1 => CopyState::Borrowed,
            2 => CopyState::Overdue,
            3 => CopyState::Returned,
            4 => CopyState::Lost,
            5 => CopyState::Damaged,
            _ => CopyState::Available,
        }
    }
}

impl From<CopyState> for i16 {
    fn from(s: CopyState) -> Self {
        s as i16
    }
}

impl std::fmt::Display for CopyState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            CopyState::Available => "Available",
            CopyState::Borrowed => "Borrowed",
            CopyState::Overdue => "Overdue",
            CopyState::Returned => "Returned",
            CopyState::Lost => "Lost",
            CopyState::Damaged => "Damaged",
        };
        write!(f, "{}", label)
    }
}

/// Condition reported on return, decides the closing state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ConditionCode {
    Normal,
    Damaged,
    Lost,
}

impl ConditionCode {
    pub fn closing_state(self) -> CopyState {
        match self {
            ConditionCode::Normal => CopyState::Returned,
            ConditionCode::Damaged => CopyState::Damaged,
            ConditionCode::Lost => CopyState::Lost,
        }
    }
}

/// Loan type, decides the base due-date offset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[repr(i16)]
#[serde(rename_all = "lowercase")]
pub enum LoanType {
    Standard = 0,
    Weekend = 1,
    Vacation = 2,
    Research = 3,
}

impl LoanType {
    /// Parse a loan type code; unknown codes fall back to standard
    pub fn from_code(code: &str) -> Self {
        match code.to_ascii_lowercase().as_str() {
            "weekend" => LoanType::Weekend,
            "vacation" => LoanType::Vacation,
            "research" => LoanType::Research,
            _ => LoanType::Standard,
        }
    }

    /// Base loan duration in days
    pub fn base_days(self) -> i64 {
        match self {
            LoanType::Standard => 14,
            LoanType::Weekend => 3,
            LoanType::Vacation => 30,
            LoanType::Research => 21,
        }
    }
}

impl Default for LoanType {
    fn default() -> Self {
        LoanType::Standard
    }
}

/// Copy model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Copy {
    pub id: i32,
    pub title_id: i32,
    /// Identifies the physical item within its title, starts at 1
    pub copy_number: i32,
    pub borrower_id: Option<i32>,
    pub state: CopyState,
    pub loan_type: Option<LoanType>,
    pub loan_start: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub returned_at: Option<DateTime<Utc>>,
    pub renewal_count: i16,
    pub max_renewals: i16,
    /// Free-text actor labels for audit display
    pub checked_out_by: Option<String>,
    pub returned_by: Option<String>,
    pub condition_notes: Option<String>,
    /// Optimistic concurrency token, bumped on every write
    pub version: i32,
    pub created_at: DateTime<Utc>,
}

/// Checkout command handled by the circulation service
#[derive(Debug, Clone)]
pub struct CheckoutCopy {
    pub title_id: i32,
    pub copy_number: i32,
    pub patron_id: i32,
    pub loan_type: LoanType,
    /// Operator override; skips the policy engine when set
    pub due_date: Option<DateTime<Utc>>,
    pub checked_out_by: Option<String>,
}

/// Return command handled by the circulation service
#[derive(Debug, Clone)]
pub struct ReturnCopy {
    pub copy_id: i32,
    pub returned_by: Option<String>,
    pub condition: ConditionCode,
    pub notes: Option<String>,
}
