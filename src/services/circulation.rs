//! Circulation service: checkout, return and renewal orchestration
//!
//! The only component besides the sweeper that writes Copy records.
//! Each operation is a single atomic write; return and renew use the
//! version token with one retry before surfacing
//! `ConcurrentModification`.

use std::sync::Arc;

use chrono::Utc;

use crate::{
    config::CirculationConfig,
    error::{AppError, AppResult},
    models::{
        copy::{CheckoutCopy, Copy, ReturnCopy},
        patron::PatronStatus,
    },
    repository::Repository,
    services::{
        audit::{AuditEvent, AuditSink},
        policy, rules,
        sweeper::OverdueSweeper,
    },
};

#[derive(Clone)]
pub struct CirculationService {
    repository: Repository,
    config: CirculationConfig,
    audit: Arc<dyn AuditSink>,
    sweeper: OverdueSweeper,
}

impl CirculationService {
    pub fn new(
        repository: Repository,
        config: CirculationConfig,
        audit: Arc<dyn AuditSink>,
        sweeper: OverdueSweeper,
    ) -> Self {
        Self {
            repository,
            config,
            audit,
            sweeper,
        }
    }

    /// Check out a copy to a patron.
    ///
    /// Validates the reference entities, applies the business-rule gate
    /// against a fresh (pre-swept) loan snapshot, computes the due date
    /// and performs the atomic claim on the slot.
    pub async fn checkout(&self, checkout: CheckoutCopy) -> AppResult<Copy> {
        let now = Utc::now();

        if checkout.copy_number < 1 {
            return Err(AppError::InvalidInput(
                "copy_number must be at least 1".to_string(),
            ));
        }
        if let Some(due) = checkout.due_date {
            if due <= now {
                return Err(AppError::InvalidInput(
                    "due_date must be in the future".to_string(),
                ));
            }
        }

        // A retired or unknown title blocks checkout the same way
        let title = match self.repository.titles.get_by_id(checkout.title_id).await {
            Ok(title) => title,
            Err(AppError::TitleNotFound(_)) => return Err(AppError::TitleInactive),
            Err(e) => return Err(e),
        };
        if !title.active {
            return Err(AppError::TitleInactive);
        }

        let patron = match self.repository.patrons.get_by_id(checkout.patron_id).await {
            Ok(patron) => patron,
            Err(AppError::PatronNotFound(_)) => return Err(AppError::PatronInactive),
            Err(e) => return Err(e),
        };
        match patron.status {
            PatronStatus::Active => {}
            PatronStatus::Banned => return Err(AppError::PatronBanned),
            PatronStatus::Suspended => return Err(AppError::PatronInactive),
        }

        // The overdue cap reads stored state; reconcile this patron first
        self.repository
            .copies
            .mark_overdue_for_patron(checkout.patron_id, now)
            .await?;

        let summary = self
            .repository
            .copies
            .patron_summary(checkout.patron_id, checkout.title_id)
            .await?;
        let check = rules::check_checkout(&summary, &self.config)?;
        tracing::debug!(
            patron_id = checkout.patron_id,
            active_loans = check.active_loans,
            max_active_loans = check.max_active_loans,
            overdue_loans = check.overdue_loans,
            max_overdue_loans = check.max_overdue_loans,
            "Checkout passed the business-rule gate"
        );

        let due_at = checkout.due_date.unwrap_or_else(|| {
            policy::compute_due_date(checkout.loan_type, patron.grade.as_deref(), now)
        });

        let copy = self
            .repository
            .copies
            .claim(&checkout, due_at, self.config.max_renewals, now)
            .await?;

        self.emit(AuditEvent::Checkout {
            copy_id: copy.id,
            title_id: copy.title_id,
            copy_number: copy.copy_number,
            patron_id: checkout.patron_id,
            due_at,
        });

        Ok(copy)
    }

    /// Return a borrowed copy, closing the loan transaction.
    ///
    /// The condition code decides the closing state; the borrower is
    /// retained on the row for history.
    pub async fn return_copy(&self, request: ReturnCopy) -> AppResult<Copy> {
        let now = Utc::now();
        let state = request.condition.closing_state();

        let copy = self.fetch_live(request.copy_id).await?;
        let closed = self
            .repository
            .copies
            .close(
                copy.id,
                copy.version,
                state,
                request.returned_by.as_deref(),
                request.notes.as_deref(),
                now,
            )
            .await?;

        let closed = match closed {
            Some(copy) => copy,
            None => {
                // Version moved under us; retry once against the fresh row
                let fresh = self.fetch_live(request.copy_id).await?;
                self.repository
                    .copies
                    .close(
                        fresh.id,
                        fresh.version,
                        state,
                        request.returned_by.as_deref(),
                        request.notes.as_deref(),
                        now,
                    )
                    .await?
                    .ok_or(AppError::ConcurrentModification)?
            }
        };

        self.emit(AuditEvent::Return {
            copy_id: closed.id,
            patron_id: closed.borrower_id,
            condition: request.condition,
        });

        Ok(closed)
    }

    /// Renew a live loan, extending the due date.
    ///
    /// Fails with `RenewalLimitReached` at the ceiling, leaving the due
    /// date and renewal count untouched. An Overdue copy goes back to
    /// Borrowed on success.
    pub async fn renew(&self, copy_id: i32, additional_days: Option<i64>) -> AppResult<Copy> {
        let days = additional_days.unwrap_or(self.config.renewal_days);
        if days < 1 {
            return Err(AppError::InvalidInput(
                "additional_days must be at least 1".to_string(),
            ));
        }

        let copy = self.fetch_live(copy_id).await?;
        let renewed = match self.try_renew(&copy, days).await? {
            Some(copy) => copy,
            None => {
                let fresh = self.fetch_live(copy_id).await?;
                self.try_renew(&fresh, days)
                    .await?
                    .ok_or(AppError::ConcurrentModification)?
            }
        };

        self.emit(AuditEvent::Renew {
            copy_id: renewed.id,
            renewal_count: renewed.renewal_count,
            due_at: renewed.due_at.unwrap_or_default(),
        });

        Ok(renewed)
    }

    /// Live loans for a patron, pre-swept so overdue status is current
    pub async fn patron_loans(&self, patron_id: i32) -> AppResult<Vec<Copy>> {
        self.repository.patrons.get_by_id(patron_id).await?;
        self.repository
            .copies
            .mark_overdue_for_patron(patron_id, Utc::now())
            .await?;
        self.repository.copies.live_by_patron(patron_id).await
    }

    /// Current overdue listing, behind a full sweep
    pub async fn overdue_loans(&self) -> AppResult<Vec<Copy>> {
        self.sweeper.sweep().await?;
        self.repository.copies.overdue_all().await
    }

    /// Add a copy to inventory (initial stocking or later addition)
    pub async fn add_copy(&self, title_id: i32, copy_number: i32) -> AppResult<Copy> {
        if copy_number < 1 {
            return Err(AppError::InvalidInput(
                "copy_number must be at least 1".to_string(),
            ));
        }
        self.repository.titles.get_by_id(title_id).await?;
        self.repository
            .copies
            .add_to_inventory(title_id, copy_number)
            .await
    }

    async fn fetch_live(&self, copy_id: i32) -> AppResult<Copy> {
        let copy = match self.repository.copies.get_by_id(copy_id).await {
            Ok(copy) => copy,
            Err(AppError::CopyNotFound(_)) => return Err(AppError::NotCurrentlyBorrowed),
            Err(e) => return Err(e),
        };
        if !copy.state.is_live() {
            return Err(AppError::NotCurrentlyBorrowed);
        }
        Ok(copy)
    }

    async fn try_renew(&self, copy: &Copy, days: i64) -> AppResult<Option<Copy>> {
        if copy.renewal_count >= copy.max_renewals {
            return Err(AppError::RenewalLimitReached {
                renewals: copy.renewal_count,
                limit: copy.max_renewals,
            });
        }
        let due_at = copy
            .due_at
            .ok_or_else(|| AppError::Internal("live copy has no due date".to_string()))?;
        let new_due = policy::compute_renewal_due_date(due_at, days);
        self.repository
            .copies
            .extend(copy.id, copy.version, new_due, copy.renewal_count + 1)
            .await
    }

    /// Fire-and-forget audit; a sink failure never affects the mutation
    fn emit(&self, event: AuditEvent) {
        let sink = self.audit.clone();
        tokio::spawn(async move {
            if let Err(e) = sink.record(event).await {
                tracing::warn!("Audit sink failed: {}", e);
            }
        });
    }
}
