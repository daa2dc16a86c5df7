//! Business-rule gate guarding loan creation
//!
//! Pure check over a snapshot of the patron's live loans. Rules run in
//! order and the first failure wins; the success value carries the
//! counts and limits so callers can present actionable detail either
//! way.

use serde::Serialize;

use crate::{
    config::CirculationConfig,
    error::{AppError, AppResult},
    models::patron::PatronLoanSummary,
};

/// Outcome of a passed rule check, echoing counts and limits
#[derive(Debug, Clone, Copy, Serialize)]
pub struct RuleCheck {
    pub active_loans: i64,
    pub max_active_loans: i64,
    pub overdue_loans: i64,
    pub max_overdue_loans: i64,
}

/// Apply the checkout business rules, in order:
/// 1. active-loan cap
/// 2. overdue cap
/// 3. duplicate-title guard
pub fn check_checkout(
    summary: &PatronLoanSummary,
    config: &CirculationConfig,
) -> AppResult<RuleCheck> {
    if summary.active_loans >= config.max_loans_per_patron {
        return Err(AppError::TooManyActiveLoans {
            active: summary.active_loans,
            limit: config.max_loans_per_patron,
        });
    }

    if summary.overdue_loans >= config.max_overdue_allowed {
        return Err(AppError::TooManyOverdueLoans {
            overdue: summary.overdue_loans,
            limit: config.max_overdue_allowed,
        });
    }

    if summary.holds_title {
        return Err(AppError::DuplicateTitleLoan);
    }

    Ok(RuleCheck {
        active_loans: summary.active_loans,
        max_active_loans: config.max_loans_per_patron,
        overdue_loans: summary.overdue_loans,
        max_overdue_loans: config.max_overdue_allowed,
    })
}
