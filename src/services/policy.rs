//! Due-date policy engine
//!
//! Pure functions only: no clock reads and no storage access. The
//! caller supplies `now` so results are reproducible.

use chrono::{DateTime, Datelike, Duration, Utc, Weekday};

use crate::models::copy::LoanType;

/// Extra days granted to final-year / post-secondary patrons
const GRADE_EXTENSION_DAYS: i64 = 7;

/// Grade markers that qualify for the extension, matched
/// case-insensitively as substrings of the grade designation
const GRADE_MARKERS: [&str; 5] = ["senior", "final", "graduate", "postgrad", "faculty"];

/// Compute the due date for a new checkout.
///
/// Base offset by loan type, plus the grade extension when it applies,
/// then a single Sunday-avoidance step: a due date landing on Sunday is
/// advanced one day to Monday. The advance is applied once, after all
/// offsets; advancing a Sunday always yields Monday so it cannot need
/// reapplying.
pub fn compute_due_date(
    loan_type: LoanType,
    grade: Option<&str>,
    now: DateTime<Utc>,
) -> DateTime<Utc> {
    let mut due = now + Duration::days(loan_type.base_days());

    if grade.map(qualifies_for_extension).unwrap_or(false) {
        due += Duration::days(GRADE_EXTENSION_DAYS);
    }

    if due.weekday() == Weekday::Sun {
        due += Duration::days(1);
    }

    due
}

/// Compute the due date for a renewal: caller-supplied days added to
/// the existing due date, independent of loan type
pub fn compute_renewal_due_date(current_due: DateTime<Utc>, additional_days: i64) -> DateTime<Utc> {
    current_due + Duration::days(additional_days)
}

fn qualifies_for_extension(grade: &str) -> bool {
    let grade = grade.to_lowercase();
    GRADE_MARKERS.iter().any(|marker| grade.contains(marker))
}
