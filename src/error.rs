// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};

use crate::database::DatabaseError;
use crate::validation::{FieldViolation, Location};

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    Validation(Vec<FieldViolation>),

    // 404 Not Found
    NotFound(String),

    // 500 Internal Server Error
    Internal(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::Validation(_) => 400,
            ApiError::NotFound(_) => 404,
            ApiError::Internal(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::Validation(errors) => json!({ "errors": errors }),
            ApiError::NotFound(msg) | ApiError::Internal(msg) | ApiError::ServiceUnavailable(msg) => {
                json!({ "error": msg })
            }
        }
    }
}

impl ApiError {
    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn internal(message: impl Into<String>) -> Self {
        ApiError::Internal(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }

    /// A single violation on the request body as a whole
    pub fn malformed_body(message: impl Into<String>) -> Self {
        ApiError::Validation(vec![FieldViolation::new("body", Location::Body, message)])
    }
}

impl From<DatabaseError> for ApiError {
    fn from(err: DatabaseError) -> Self {
        match err {
            DatabaseError::Unavailable(msg) => {
                tracing::error!("Database unavailable: {}", msg);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx_err) if is_connection_error(&sqlx_err) => {
                tracing::error!("Database connection error: {}", sqlx_err);
                ApiError::service_unavailable("Database temporarily unavailable")
            }
            DatabaseError::Sqlx(sqlx_err) => {
                // Log the real error but return generic message
                tracing::error!("SQLx error: {}", sqlx_err);
                ApiError::internal("Database error occurred")
            }
            other => {
                tracing::error!("Database error: {}", other);
                ApiError::internal("An error occurred while processing your request")
            }
        }
    }
}

fn is_connection_error(err: &sqlx::Error) -> bool {
    matches!(
        err,
        sqlx::Error::Io(_) | sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Tls(_)
    )
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::Validation(errors) => write!(f, "{} validation error(s)", errors.len()),
            ApiError::NotFound(msg) | ApiError::Internal(msg) | ApiError::ServiceUnavailable(msg) => {
                write!(f, "{}", msg)
            }
        }
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_render_as_a_list() {
        let err = ApiError::Validation(vec![
            FieldViolation::new("name", Location::Body, "Product name must not be empty"),
            FieldViolation::new("price", Location::Body, "Invalid price value"),
        ]);

        assert_eq!(err.status_code(), 400);
        assert_eq!(
            err.to_json(),
            json!({
                "errors": [
                    { "field": "name", "location": "body", "message": "Product name must not be empty" },
                    { "field": "price", "location": "body", "message": "Invalid price value" }
                ]
            })
        );
    }

    #[test]
    fn not_found_renders_error_key() {
        let err = ApiError::not_found("Product not found");
        assert_eq!(err.status_code(), 404);
        assert_eq!(err.to_json(), json!({ "error": "Product not found" }));
    }

    #[test]
    fn database_errors_hide_details() {
        let err: ApiError = DatabaseError::Sqlx(sqlx::Error::RowNotFound).into();
        assert_eq!(err.status_code(), 500);
        assert_eq!(err.to_json(), json!({ "error": "Database error occurred" }));

        let err: ApiError = DatabaseError::Sqlx(sqlx::Error::PoolTimedOut).into();
        assert_eq!(err.status_code(), 503);

        let err: ApiError = DatabaseError::Unavailable("connection refused".into()).into();
        assert_eq!(err.status_code(), 503);
    }
}
