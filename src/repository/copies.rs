//! Copy store: the single write path for circulation records
//!
//! All Copy mutation flows through here, either from the circulation
//! service or from the overdue sweeper. The one strict serialization
//! point is `claim`: the partial unique index on
//! `(title_id, copy_number) WHERE state IN (0, 1, 2)` guarantees that
//! two concurrent checkouts of the same slot cannot both succeed.

use chrono::{DateTime, Utc};
use sqlx::{Pool, Postgres, Row};

use crate::{
    error::{AppError, AppResult},
    models::{
        copy::{CheckoutCopy, Copy, CopyState},
        patron::PatronLoanSummary,
        title::TitleAvailability,
    },
};

/// Postgres unique-violation SQLSTATE
const UNIQUE_VIOLATION: &str = "23505";

#[derive(Clone)]
pub struct CopyStore {
    pool: Pool<Postgres>,
}

impl CopyStore {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get copy record by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Copy> {
        sqlx::query_as::<_, Copy>("SELECT * FROM copies WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::CopyNotFound(id))
    }

    /// Add a copy to inventory, creating the slot in Available state
    pub async fn add_to_inventory(&self, title_id: i32, copy_number: i32) -> AppResult<Copy> {
        let result = sqlx::query_as::<_, Copy>(
            r#"
            INSERT INTO copies (title_id, copy_number, state)
            VALUES ($1, $2, 0)
            RETURNING *
            "#,
        )
        .bind(title_id)
        .bind(copy_number)
        .fetch_one(&self.pool)
        .await;

        match result {
            Ok(copy) => Ok(copy),
            Err(e) if is_unique_violation(&e) => Err(AppError::InvalidInput(format!(
                "Copy #{} of title {} already exists",
                copy_number, title_id
            ))),
            Err(e) => Err(e.into()),
        }
    }

    /// Atomically open a loan transaction on a slot.
    ///
    /// First tries to claim the slot's Available row with a conditional
    /// update. When every prior transaction is terminal (or the slot has
    /// never existed) a fresh Borrowed row is inserted instead; the
    /// partial unique index turns a lost race into a unique violation,
    /// surfaced as `CopyUnavailable`.
    pub async fn claim(
        &self,
        checkout: &CheckoutCopy,
        due_at: DateTime<Utc>,
        max_renewals: i16,
        now: DateTime<Utc>,
    ) -> AppResult<Copy> {
        let claimed = sqlx::query_as::<_, Copy>(
            r#"
            UPDATE copies
            SET state = 1, borrower_id = $3, loan_type = $4, loan_start = $5,
                due_at = $6, renewal_count = 0, max_renewals = $7,
                checked_out_by = $8, returned_at = NULL, returned_by = NULL,
                condition_notes = NULL, version = version + 1
            WHERE title_id = $1 AND copy_number = $2 AND state = 0
            RETURNING *
            "#,
        )
        .bind(checkout.title_id)
        .bind(checkout.copy_number)
        .bind(checkout.patron_id)
        .bind(checkout.loan_type)
        .bind(now)
        .bind(due_at)
        .bind(max_renewals)
        .bind(&checkout.checked_out_by)
        .fetch_optional(&self.pool)
        .await?;

        if let Some(copy) = claimed {
            return Ok(copy);
        }

        // No Available row. A live row means the slot is taken; all-terminal
        // (or absent) means we open a fresh transaction record.
        let live: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM copies WHERE title_id = $1 AND copy_number = $2 AND state IN (1, 2))",
        )
        .bind(checkout.title_id)
        .bind(checkout.copy_number)
        .fetch_one(&self.pool)
        .await?;

        if live {
            return Err(AppError::CopyUnavailable);
        }

        let inserted = sqlx::query_as::<_, Copy>(
            r#"
            INSERT INTO copies (title_id, copy_number, borrower_id, state, loan_type,
                                loan_start, due_at, renewal_count, max_renewals, checked_out_by)
            VALUES ($1, $2, $3, 1, $4, $5, $6, 0, $7, $8)
            RETURNING *
            "#,
        )
        .bind(checkout.title_id)
        .bind(checkout.copy_number)
        .bind(checkout.patron_id)
        .bind(checkout.loan_type)
        .bind(now)
        .bind(due_at)
        .bind(max_renewals)
        .bind(&checkout.checked_out_by)
        .fetch_one(&self.pool)
        .await;

        match inserted {
            Ok(copy) => Ok(copy),
            Err(e) if is_unique_violation(&e) => Err(AppError::CopyUnavailable),
            Err(e) => Err(e.into()),
        }
    }

    /// Close a live transaction (return, loss or damage).
    ///
    /// Optimistic write: succeeds only against the version the caller
    /// read; returns the updated row or None when the version moved.
    pub async fn close(
        &self,
        copy_id: i32,
        expected_version: i32,
        state: CopyState,
        returned_by: Option<&str>,
        notes: Option<&str>,
        now: DateTime<Utc>,
    ) -> AppResult<Option<Copy>> {
        let updated = sqlx::query_as::<_, Copy>(
            r#"
            UPDATE copies
            SET state = $3, returned_at = $4, returned_by = $5,
                condition_notes = $6, version = version + 1
            WHERE id = $1 AND version = $2 AND state IN (1, 2)
            RETURNING *
            "#,
        )
        .bind(copy_id)
        .bind(expected_version)
        .bind(state)
        .bind(now)
        .bind(returned_by)
        .bind(notes)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Extend a live transaction's due date.
    ///
    /// An Overdue copy goes back to Borrowed; the renewal counter is
    /// owned by this single write path so the ceiling is enforced
    /// centrally. Optimistic write, same contract as `close`.
    pub async fn extend(
        &self,
        copy_id: i32,
        expected_version: i32,
        new_due_at: DateTime<Utc>,
        new_renewal_count: i16,
    ) -> AppResult<Option<Copy>> {
        let updated = sqlx::query_as::<_, Copy>(
            r#"
            UPDATE copies
            SET state = 1, due_at = $3, renewal_count = $4, version = version + 1
            WHERE id = $1 AND version = $2 AND state IN (1, 2)
            RETURNING *
            "#,
        )
        .bind(copy_id)
        .bind(expected_version)
        .bind(new_due_at)
        .bind(new_renewal_count)
        .fetch_optional(&self.pool)
        .await?;

        Ok(updated)
    }

    /// Snapshot a patron's live loans for the business-rule gate
    pub async fn patron_summary(
        &self,
        patron_id: i32,
        title_id: i32,
    ) -> AppResult<PatronLoanSummary> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS active_loans,
                   COUNT(*) FILTER (WHERE state = 2) AS overdue_loans,
                   COALESCE(BOOL_OR(title_id = $2), false) AS holds_title
            FROM copies
            WHERE borrower_id = $1 AND state IN (1, 2)
            "#,
        )
        .bind(patron_id)
        .bind(title_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(PatronLoanSummary {
            active_loans: row.get("active_loans"),
            overdue_loans: row.get("overdue_loans"),
            holds_title: row.get("holds_title"),
        })
    }

    /// Live loans held by a patron, oldest first
    pub async fn live_by_patron(&self, patron_id: i32) -> AppResult<Vec<Copy>> {
        let copies = sqlx::query_as::<_, Copy>(
            "SELECT * FROM copies WHERE borrower_id = $1 AND state IN (1, 2) ORDER BY loan_start",
        )
        .bind(patron_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(copies)
    }

    /// All copies currently in Overdue state, most overdue first
    pub async fn overdue_all(&self) -> AppResult<Vec<Copy>> {
        let copies =
            sqlx::query_as::<_, Copy>("SELECT * FROM copies WHERE state = 2 ORDER BY due_at")
                .fetch_all(&self.pool)
                .await?;
        Ok(copies)
    }

    /// Transition one chunk of stale Borrowed rows to Overdue.
    ///
    /// Returns the number of rows transitioned; the sweeper keeps
    /// calling until a chunk comes back short. No field other than the
    /// state (and the version token) changes.
    pub async fn mark_overdue_chunk(&self, now: DateTime<Utc>, chunk_size: i64) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE copies
            SET state = 2, version = version + 1
            WHERE id IN (
                SELECT id FROM copies
                WHERE state = 1 AND due_at < $1
                ORDER BY id
                LIMIT $2
            )
            "#,
        )
        .bind(now)
        .bind(chunk_size)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Patron-scoped variant of the overdue transition, run before any
    /// read whose outcome depends on current overdue status
    pub async fn mark_overdue_for_patron(
        &self,
        patron_id: i32,
        now: DateTime<Utc>,
    ) -> AppResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE copies
            SET state = 2, version = version + 1
            WHERE borrower_id = $1 AND state = 1 AND due_at < $2
            "#,
        )
        .bind(patron_id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    /// Per-title copy counts grouped by state class.
    ///
    /// A slot counts toward the total when its latest record is not
    /// Lost/Damaged; a live record counts it as borrowed.
    pub async fn availability(&self, title_id: i32) -> AppResult<TitleAvailability> {
        let row = sqlx::query(
            r#"
            SELECT COUNT(*) AS total_copies,
                   COUNT(*) FILTER (WHERE state IN (1, 2)) AS borrowed_copies
            FROM (
                SELECT DISTINCT ON (copy_number) copy_number, state
                FROM copies
                WHERE title_id = $1
                ORDER BY copy_number, id DESC
            ) latest
            WHERE state NOT IN (4, 5)
            "#,
        )
        .bind(title_id)
        .fetch_one(&self.pool)
        .await?;

        let total_copies: i64 = row.get("total_copies");
        let borrowed_copies: i64 = row.get("borrowed_copies");

        Ok(TitleAvailability {
            title_id,
            total_copies,
            available_copies: total_copies - borrowed_copies,
            borrowed_copies,
        })
    }
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if db.code().as_deref() == Some(UNIQUE_VIOLATION))
}
