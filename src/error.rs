//! Error types for the circulation server

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Application error codes exposed to API clients
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum ErrorCode {
    Success = 0,
    Failure = 1,
    DbFailure = 2,
    NoSuchTitle = 3,
    NoSuchPatron = 4,
    NoSuchCopy = 5,
    BadValue = 6,
    TitleInactive = 7,
    PatronInactive = 8,
    PatronBanned = 9,
    CopyUnavailable = 10,
    MaxLoansReached = 11,
    MaxOverdueReached = 12,
    DuplicateTitleLoan = 13,
    NotBorrowed = 14,
    MaxRenewalsReached = 15,
    ConcurrentModification = 16,
}

/// Main application error type
///
/// Business-rule and state-machine violations are expected outcomes and
/// carry the data a caller needs to present actionable detail; only
/// `Storage` and `Internal` are treated as faults.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Title with id {0} not found")]
    TitleNotFound(i32),

    #[error("Patron with id {0} not found")]
    PatronNotFound(i32),

    #[error("Copy with id {0} not found")]
    CopyNotFound(i32),

    #[error("Title is not active")]
    TitleInactive,

    #[error("Patron is not active")]
    PatronInactive,

    #[error("Patron is banned")]
    PatronBanned,

    #[error("Copy is not available")]
    CopyUnavailable,

    #[error("Maximum active loans reached ({active}/{limit})")]
    TooManyActiveLoans { active: i64, limit: i64 },

    #[error("Maximum overdue loans reached ({overdue}/{limit})")]
    TooManyOverdueLoans { overdue: i64, limit: i64 },

    #[error("Patron already holds a copy of this title")]
    DuplicateTitleLoan,

    #[error("Copy is not currently borrowed")]
    NotCurrentlyBorrowed,

    #[error("Maximum renewals reached ({renewals}/{limit})")]
    RenewalLimitReached { renewals: i16, limit: i16 },

    #[error("Record was modified concurrently, retry the operation")]
    ConcurrentModification,

    #[error("Storage error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("Internal server error: {0}")]
    Internal(String),
}

/// Error response body
#[derive(Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub code: u32,
    pub error: String,
    pub message: String,
}

impl AppError {
    fn code(&self) -> ErrorCode {
        match self {
            AppError::InvalidInput(_) => ErrorCode::BadValue,
            AppError::TitleNotFound(_) => ErrorCode::NoSuchTitle,
            AppError::PatronNotFound(_) => ErrorCode::NoSuchPatron,
            AppError::CopyNotFound(_) => ErrorCode::NoSuchCopy,
            AppError::TitleInactive => ErrorCode::TitleInactive,
            AppError::PatronInactive => ErrorCode::PatronInactive,
            AppError::PatronBanned => ErrorCode::PatronBanned,
            AppError::CopyUnavailable => ErrorCode::CopyUnavailable,
            AppError::TooManyActiveLoans { .. } => ErrorCode::MaxLoansReached,
            AppError::TooManyOverdueLoans { .. } => ErrorCode::MaxOverdueReached,
            AppError::DuplicateTitleLoan => ErrorCode::DuplicateTitleLoan,
            AppError::NotCurrentlyBorrowed => ErrorCode::NotBorrowed,
            AppError::RenewalLimitReached { .. } => ErrorCode::MaxRenewalsReached,
            AppError::ConcurrentModification => ErrorCode::ConcurrentModification,
            AppError::Storage(_) => ErrorCode::DbFailure,
            AppError::Internal(_) => ErrorCode::Failure,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let code = self.code();
        let (status, message) = match &self {
            AppError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
            AppError::TitleNotFound(_)
            | AppError::PatronNotFound(_)
            | AppError::CopyNotFound(_) => (StatusCode::NOT_FOUND, self.to_string()),
            AppError::TitleInactive
            | AppError::PatronInactive
            | AppError::PatronBanned
            | AppError::TooManyActiveLoans { .. }
            | AppError::TooManyOverdueLoans { .. }
            | AppError::DuplicateTitleLoan
            | AppError::NotCurrentlyBorrowed
            | AppError::RenewalLimitReached { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, self.to_string())
            }
            AppError::CopyUnavailable | AppError::ConcurrentModification => {
                (StatusCode::CONFLICT, self.to_string())
            }
            AppError::Storage(e) => {
                tracing::error!("Storage error: {:?}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Storage error".to_string(),
                )
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse {
            code: code as u32,
            error: format!("{:?}", code),
            message,
        });

        (status, body).into_response()
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
