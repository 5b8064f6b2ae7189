use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

/// Errors surfaced by the tokenscan API client. Closed set so callers can
/// match exhaustively; the chore treats every variant as transient.
#[derive(Error, Debug)]
pub enum ClientError {
    #[error("tokenscan transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("tokenscan rejected credentials: {0}")]
    Unauthorized(String),

    #[error("tokenscan provider error ({status}): {message}")]
    Provider { status: u16, message: String },
}

/// Errors from the payments cache boundary. `NoPayments` is an expected
/// condition (empty cache), not a fault.
#[derive(Error, Debug)]
pub enum DbError {
    #[error("no payments in the database")]
    NoPayments,

    #[error("payments database error: {0}")]
    Storage(#[from] sqlx::Error),

    #[error("corrupt payment row: {0}")]
    Corrupt(String),
}

/// Monetary contract violations. Unlike the transient client/db errors
/// these indicate a programming defect and are never retried.
#[derive(Error, Debug)]
pub enum AmountError {
    #[error("incompatible currency units: {left} vs {right}")]
    IncompatibleUnit {
        left: &'static str,
        right: &'static str,
    },

    #[error("decimal value carries more precision than {currency} can hold")]
    PrecisionLoss { currency: &'static str },

    #[error("value not representable in fixed-point range")]
    Unrepresentable,
}

/// Per-tick reconciliation failures. All of these end the tick early and
/// are retried on the next interval from recomputed state.
#[derive(Error, Debug)]
pub enum ChoreError {
    #[error("payments cache error: {0}")]
    Db(#[from] DbError),

    #[error("ledger source error: {0}")]
    Client(#[from] ClientError),

    #[error("amount conversion error: {0}")]
    Amount(#[from] AmountError),

    /// Pending rows were deleted but the replacement batch failed to land.
    /// The rows are reconstructible on the next successful tick, but their
    /// absence is user-visible in the meantime.
    #[error("pending set dropped without replacement: {0}")]
    PendingSetDropped(DbError),
}

/// Top-level error type for the HTTP surface.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("database error: {0}")]
    Db(#[from] DbError),

    #[error("upstream error: {0}")]
    Client(#[from] ClientError),

    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(String),
}

impl From<AmountError> for AppError {
    fn from(error: AmountError) -> Self {
        AppError::Internal(format!("amount conversion: {}", error))
    }
}

/// API error response structure
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub error_code: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_code, message) = match &self {
            AppError::Client(ClientError::Unauthorized(_)) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_UNAUTHORIZED",
                "Upstream provider rejected our credentials".to_string(),
            ),
            AppError::Client(ClientError::Provider { status, .. }) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_ERROR",
                format!("Upstream provider returned status {}", status),
            ),
            AppError::Client(ClientError::Transport(_)) => (
                StatusCode::BAD_GATEWAY,
                "UPSTREAM_UNREACHABLE",
                "Upstream provider could not be reached".to_string(),
            ),
            AppError::Db(DbError::NoPayments) => (
                StatusCode::NOT_FOUND,
                "NO_PAYMENTS",
                "No payments recorded".to_string(),
            ),
            AppError::Db(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "DATABASE_ERROR",
                "A database error occurred".to_string(),
            ),
            AppError::InvalidInput(msg) => {
                (StatusCode::BAD_REQUEST, "INVALID_INPUT", msg.clone())
            }
            AppError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_ERROR",
                "An internal error occurred".to_string(),
            ),
        };

        let body = Json(ErrorResponse {
            error: message,
            error_code: error_code.to_string(),
        });

        (status, body).into_response()
    }
}

/// Result type alias for the HTTP surface.
pub type AppResult<T> = Result<T, AppError>;
