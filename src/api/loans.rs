//! Loan management endpoints

use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::{
    error::AppResult,
    models::copy::{CheckoutCopy, ConditionCode, Copy, LoanType, ReturnCopy},
};

/// Checkout request
#[derive(Deserialize, ToSchema)]
pub struct CheckoutRequest {
    /// Title ID
    pub title_id: i32,
    /// Copy number within the title
    pub copy_number: i32,
    /// Borrowing patron ID
    pub patron_id: i32,
    /// Loan type code (standard, weekend, vacation, research)
    pub loan_type: Option<String>,
    /// Explicit due date override, skips the policy engine
    pub due_date: Option<DateTime<Utc>>,
    /// Actor label recorded for audit display
    pub checked_out_by: Option<String>,
}

/// Return request
#[derive(Deserialize, ToSchema)]
pub struct ReturnRequest {
    /// Actor label recorded for audit display
    pub returned_by: Option<String>,
    /// Condition of the copy on return; defaults to normal
    pub condition: Option<ConditionCode>,
    /// Free-text condition notes
    pub notes: Option<String>,
}

/// Renewal request
#[derive(Deserialize, ToSchema)]
pub struct RenewRequest {
    /// Days added to the current due date; defaults to the configured value
    pub additional_days: Option<i64>,
}

/// Sweep response
#[derive(Serialize, ToSchema)]
pub struct SweepResponse {
    /// Number of copies transitioned to Overdue
    pub transitioned: u64,
}

/// Check out a copy to a patron
#[utoipa::path(
    post,
    path = "/loans",
    tag = "loans",
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Copy checked out", body = Copy),
        (status = 400, description = "Invalid request"),
        (status = 409, description = "Copy not available"),
        (status = 422, description = "Business rule or precondition violated")
    )
)]
pub async fn create_loan(
    State(state): State<crate::AppState>,
    Json(request): Json<CheckoutRequest>,
) -> AppResult<(StatusCode, Json<Copy>)> {
    let checkout = CheckoutCopy {
        title_id: request.title_id,
        copy_number: request.copy_number,
        patron_id: request.patron_id,
        loan_type: request
            .loan_type
            .as_deref()
            .map(LoanType::from_code)
            .unwrap_or_default(),
        due_date: request.due_date,
        checked_out_by: request.checked_out_by,
    };

    let copy = state.services.circulation.checkout(checkout).await?;
    Ok((StatusCode::CREATED, Json(copy)))
}

/// Return a borrowed copy
#[utoipa::path(
    post,
    path = "/loans/{id}/return",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Copy ID")
    ),
    request_body = ReturnRequest,
    responses(
        (status = 200, description = "Copy returned", body = Copy),
        (status = 409, description = "Modified concurrently"),
        (status = 422, description = "Copy not currently borrowed")
    )
)]
pub async fn return_loan(
    State(state): State<crate::AppState>,
    Path(copy_id): Path<i32>,
    Json(request): Json<ReturnRequest>,
) -> AppResult<Json<Copy>> {
    let copy = state
        .services
        .circulation
        .return_copy(ReturnCopy {
            copy_id,
            returned_by: request.returned_by,
            condition: request.condition.unwrap_or(ConditionCode::Normal),
            notes: request.notes,
        })
        .await?;

    Ok(Json(copy))
}

/// Renew a loan
#[utoipa::path(
    post,
    path = "/loans/{id}/renew",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Copy ID")
    ),
    request_body = RenewRequest,
    responses(
        (status = 200, description = "Loan renewed", body = Copy),
        (status = 409, description = "Modified concurrently"),
        (status = 422, description = "Renewal limit reached or not borrowed")
    )
)]
pub async fn renew_loan(
    State(state): State<crate::AppState>,
    Path(copy_id): Path<i32>,
    Json(request): Json<RenewRequest>,
) -> AppResult<Json<Copy>> {
    let copy = state
        .services
        .circulation
        .renew(copy_id, request.additional_days)
        .await?;

    Ok(Json(copy))
}

/// Get live loans for a patron
#[utoipa::path(
    get,
    path = "/patrons/{id}/loans",
    tag = "loans",
    params(
        ("id" = i32, Path, description = "Patron ID")
    ),
    responses(
        (status = 200, description = "Patron's live loans", body = Vec<Copy>),
        (status = 404, description = "Patron not found")
    )
)]
pub async fn get_patron_loans(
    State(state): State<crate::AppState>,
    Path(patron_id): Path<i32>,
) -> AppResult<Json<Vec<Copy>>> {
    let loans = state.services.circulation.patron_loans(patron_id).await?;
    Ok(Json(loans))
}

/// List all currently overdue copies
#[utoipa::path(
    get,
    path = "/loans/overdue",
    tag = "loans",
    responses(
        (status = 200, description = "Overdue copies, most overdue first", body = Vec<Copy>)
    )
)]
pub async fn list_overdue(
    State(state): State<crate::AppState>,
) -> AppResult<Json<Vec<Copy>>> {
    let loans = state.services.circulation.overdue_loans().await?;
    Ok(Json(loans))
}

/// Trigger an overdue sweep on demand
#[utoipa::path(
    post,
    path = "/loans/sweep",
    tag = "loans",
    responses(
        (status = 200, description = "Sweep completed", body = SweepResponse)
    )
)]
pub async fn trigger_sweep(
    State(state): State<crate::AppState>,
) -> AppResult<Json<SweepResponse>> {
    let transitioned = state.services.sweeper.sweep().await?;
    Ok(Json(SweepResponse { transitioned }))
}
