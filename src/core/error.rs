use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use thiserror::Error;

use crate::shared::types::MessageResponse;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Database(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Validation(_) | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Conflict(_) => StatusCode::CONFLICT,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = match self {
            AppError::Database(ref e) => {
                tracing::error!("Database error: {:?}", e);
                ("Database error occurred".to_string(), None)
            }
            AppError::Internal(ref msg) => {
                tracing::error!("Internal error: {}", msg);
                ("Internal server error".to_string(), None)
            }
            AppError::Validation(msg) => (msg.clone(), Some(vec![msg])),
            AppError::NotFound(msg) | AppError::BadRequest(msg) | AppError::Conflict(msg) => {
                (msg, None)
            }
        };

        let body = Json(MessageResponse { message, errors });

        (status, body).into_response()
    }
}

/// Convert a database error into a more specific AppError.
///
/// PostgreSQL reports unique violations as `23505` and foreign key violations
/// as `23503`; both are caller mistakes rather than server faults.
pub fn handle_db_error(e: sqlx::Error) -> AppError {
    if let sqlx::Error::Database(db_err) = &e {
        if db_err.code() == Some(std::borrow::Cow::Borrowed("23505")) {
            let message = match db_err.constraint() {
                Some(constraint) if constraint.contains("unique_slug") => {
                    "A doc with this unique slug already exists.".to_string()
                }
                Some(constraint) if constraint.contains("slug") => {
                    "A category with this slug already exists.".to_string()
                }
                _ => "Record already exists.".to_string(),
            };
            return AppError::Conflict(message);
        }

        if db_err.code() == Some(std::borrow::Cow::Borrowed("23503")) {
            return AppError::BadRequest("Referenced record does not exist.".to_string());
        }
    }

    tracing::error!("Database error: {:?}", e);
    AppError::Database(e)
}

pub type Result<T> = std::result::Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::NotFound("Doc not found".into()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            AppError::Validation("bad".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Conflict("dup".into()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            AppError::Database(sqlx::Error::RowNotFound).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_non_database_error_stays_internal() {
        let err = handle_db_error(sqlx::Error::PoolTimedOut);
        assert!(matches!(err, AppError::Database(_)));
    }
}
