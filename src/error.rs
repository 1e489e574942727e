use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use serde_json::json;
use thiserror::Error;

/// Failures raised by the persistence layer.
#[derive(Error, Debug)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Duplicate record")]
    Duplicate,

    /// A stored value could not be decoded into its domain type.
    #[error("Corrupt record: {0}")]
    Corrupt(String),

    #[error("Database error: {0}")]
    Database(sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

impl From<sqlx::Error> for StoreError {
    fn from(e: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &e {
            if db_err.is_unique_violation() {
                return StoreError::Duplicate;
            }
        }
        StoreError::Database(e)
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Errors surfaced by the attendance, payroll and settings operations.
#[derive(Error, Debug)]
pub enum PolicyError {
    #[error("You have already checked in today.")]
    AlreadyCheckedIn,

    #[error("You have not checked in today.")]
    NotCheckedIn,

    #[error("You have already checked out today.")]
    AlreadyCheckedOut,

    #[error("Check-out time precedes check-in time")]
    CheckOutBeforeCheckIn,

    #[error("User not found")]
    UserNotFound,

    #[error("Record not found")]
    RecordNotFound,

    #[error("User {user_id} has no usable salary: {reason}")]
    InvalidSalary { user_id: u64, reason: String },

    #[error("{0}")]
    Validation(String),

    #[error(transparent)]
    Storage(#[from] StoreError),
}

pub type PolicyResult<T> = Result<T, PolicyError>;

impl ResponseError for PolicyError {
    fn status_code(&self) -> StatusCode {
        match self {
            PolicyError::AlreadyCheckedIn
            | PolicyError::NotCheckedIn
            | PolicyError::AlreadyCheckedOut
            | PolicyError::CheckOutBeforeCheckIn
            | PolicyError::Validation(_) => StatusCode::BAD_REQUEST,
            PolicyError::UserNotFound | PolicyError::RecordNotFound => StatusCode::NOT_FOUND,
            PolicyError::InvalidSalary { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            PolicyError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        let message = match self {
            PolicyError::Storage(e) => {
                tracing::error!(error = %e, "Storage failure");
                "Internal Server Error".to_string()
            }
            other => other.to_string(),
        };

        HttpResponse::build(self.status_code()).json(json!({ "message": message }))
    }
}
