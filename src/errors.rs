//! Centralized error handling.
//!
//! Provides a unified error type for the entire application,
//! with automatic HTTP response conversion.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use sea_orm::{sqlx, DbErr, RuntimeErr, SqlErr};
use serde::Serialize;
use thiserror::Error;

/// Application error types
#[derive(Error, Debug)]
pub enum AppError {
    // Store session
    #[error("Cannot reach the store: {0}")]
    Connection(String),

    #[error("Store rejected the supplied credentials")]
    Authentication,

    #[error("Failed to release the store handle: {0}")]
    Close(String),

    #[error("Schema provisioning failed: {0}")]
    Schema(String),

    #[error("Store became unavailable: {0}")]
    StoreUnavailable(String),

    // Resource errors
    #[error("A user with this email already exists")]
    DuplicateEmail,

    #[error("Resource not found")]
    NotFound,

    // Validation
    #[error("{0}")]
    Validation(String),

    // External service errors
    #[error("Database error")]
    Database(DbErr),

    // Internal
    #[error("Internal server error")]
    Internal(String),
}

/// Error response body
#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: ErrorBody,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    code: String,
    message: String,
}

impl AppError {
    /// Get error code for client
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Connection(_) => "STORE_CONNECTION_ERROR",
            AppError::Authentication => "STORE_AUTHENTICATION_ERROR",
            AppError::Close(_) => "STORE_CLOSE_ERROR",
            AppError::Schema(_) => "SCHEMA_ERROR",
            AppError::StoreUnavailable(_) => "STORE_UNAVAILABLE",
            AppError::DuplicateEmail => "DUPLICATE_EMAIL",
            AppError::NotFound => "NOT_FOUND",
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Get HTTP status code
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::DuplicateEmail => StatusCode::CONFLICT,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Connection(_) | AppError::Authentication | AppError::StoreUnavailable(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            AppError::Close(_)
            | AppError::Schema(_)
            | AppError::Database(_)
            | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get user-facing message (hides store details and credentials)
    pub fn user_message(&self) -> String {
        match self {
            AppError::Validation(msg) => msg.clone(),
            AppError::Connection(_) | AppError::StoreUnavailable(_) | AppError::Authentication => {
                "The data store is temporarily unavailable".to_string()
            }
            AppError::Close(_) | AppError::Schema(_) | AppError::Database(_) => {
                "A database error occurred".to_string()
            }
            AppError::Internal(_) => "An internal error occurred".to_string(),
            AppError::DuplicateEmail | AppError::NotFound => self.to_string(),
        }
    }

    /// Record the server-side detail that the response body hides.
    fn log(&self) {
        match self {
            AppError::Connection(detail) | AppError::StoreUnavailable(detail) => {
                tracing::error!(detail = %detail, "Store unavailable");
            }
            AppError::Authentication => tracing::error!("Store rejected credentials"),
            AppError::Close(detail) | AppError::Schema(detail) => {
                tracing::error!(detail = %detail, "Store error");
            }
            AppError::Database(e) => tracing::error!("Database error: {:?}", e),
            AppError::Internal(msg) => tracing::error!("Internal error: {}", msg),
            AppError::DuplicateEmail | AppError::NotFound | AppError::Validation(_) => {}
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        self.log();
        let status = self.status();
        let body = ErrorResponse {
            error: ErrorBody {
                code: self.code().to_string(),
                message: self.user_message(),
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<DbErr> for AppError {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
            return AppError::DuplicateEmail;
        }
        if is_connection_loss(&err) {
            return AppError::StoreUnavailable(err.to_string());
        }
        match err {
            DbErr::RecordNotFound(_) => AppError::NotFound,
            other => AppError::Database(other),
        }
    }
}

/// Whether a store error means the connection itself went away.
fn is_connection_loss(err: &DbErr) -> bool {
    match err {
        DbErr::ConnectionAcquire(_) | DbErr::Conn(_) => true,
        DbErr::Exec(RuntimeErr::SqlxError(e)) | DbErr::Query(RuntimeErr::SqlxError(e)) => {
            matches!(
                e,
                sqlx::Error::Io(_)
                    | sqlx::Error::Tls(_)
                    | sqlx::Error::PoolTimedOut
                    | sqlx::Error::PoolClosed
                    | sqlx::Error::WorkerCrashed
            )
        }
        _ => false,
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }

    pub fn schema(msg: impl Into<String>) -> Self {
        AppError::Schema(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(AppError::DuplicateEmail.status(), StatusCode::CONFLICT);
        assert_eq!(AppError::NotFound.status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::validation("bad").status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            AppError::StoreUnavailable("gone".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(AppError::Authentication.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(
            AppError::schema("no privilege").status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_store_details_not_leaked() {
        let err = AppError::Connection("password authentication failed for user app".into());
        let message = err.user_message();
        assert!(!message.contains("password"));
        assert!(!message.contains("app"));
    }

    #[tokio::test]
    async fn test_response_body_hides_store_detail() {
        let response =
            AppError::StoreUnavailable("pool closed for user app".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(body.contains("STORE_UNAVAILABLE"));
        assert!(!body.contains("pool closed"));
    }

    #[test]
    fn test_db_err_classification() {
        let lost = AppError::from(DbErr::Conn(RuntimeErr::Internal("reset by peer".into())));
        assert!(matches!(lost, AppError::StoreUnavailable(_)));

        let missing = AppError::from(DbErr::RecordNotFound("users".into()));
        assert!(matches!(missing, AppError::NotFound));

        let other = AppError::from(DbErr::Custom("boom".into()));
        assert!(matches!(other, AppError::Database(_)));
    }

    #[test]
    fn test_option_ext() {
        let none: Option<i32> = None;
        assert!(matches!(none.ok_or_not_found(), Err(AppError::NotFound)));
        assert_eq!(Some(3).ok_or_not_found().unwrap(), 3);
    }
}
