//! Error types for web handlers.
//!
//! This module bridges [`TicketError`] and HTTP responses, implementing
//! Axum's `IntoResponse` trait.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use std::fmt;
use ticketdesk_core::TicketError;

/// Application error type for web handlers.
///
/// Carries the HTTP status, a stable machine-readable code, and a
/// user-facing message. The optional `source` is logged for 5xx responses
/// and never sent to the client.
///
/// # Examples
///
/// ```
/// use axum::http::StatusCode;
/// use ticketdesk_core::{TicketError, TicketStatus};
/// use ticketdesk_web::AppError;
///
/// let err = AppError::from(TicketError::TicketStatusNotAllowed {
///     status: TicketStatus::Closed,
/// });
/// assert_eq!(err.status(), StatusCode::METHOD_NOT_ALLOWED);
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// HTTP status of the response.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        self.status
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// User-facing message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 405 Method Not Allowed error.
    ///
    /// Used for workflow rejections: the request is well formed but the
    /// ticket's status forbids it.
    #[must_use]
    pub fn method_not_allowed(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::METHOD_NOT_ALLOWED,
            message.into(),
            "METHOD_NOT_ALLOWED".to_string(),
        )
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(StatusCode::CONFLICT, message.into(), "CONFLICT".to_string())
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }

    /// Create a 503 Service Unavailable error.
    #[must_use]
    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::SERVICE_UNAVAILABLE,
            message.into(),
            "SERVICE_UNAVAILABLE".to_string(),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log internal errors
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

impl From<TicketError> for AppError {
    fn from(err: TicketError) -> Self {
        let message = err.to_string();
        match err {
            TicketError::StatusTransitionNotAllowed { .. }
            | TicketError::TicketStatusNotAllowed { .. } => Self::method_not_allowed(message),
            TicketError::NotFound { kind, id } => Self::not_found(kind, id),
            TicketError::Validation(message) => Self::validation(message),
            TicketError::VersionConflict { .. } => Self::conflict(message),
            err @ TicketError::StoreUnavailable(_) => {
                Self::unavailable("Service temporarily unavailable")
                    .with_source(anyhow::Error::new(err))
            }
            err @ TicketError::Serialization(_) => {
                Self::internal("An internal error occurred").with_source(anyhow::Error::new(err))
            }
        }
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ticketdesk_core::{EntityKind, TicketId, TicketStatus};

    #[test]
    fn test_error_display() {
        let err = AppError::validation("title is required");
        assert_eq!(err.to_string(), "[VALIDATION_ERROR] title is required");
    }

    #[test]
    fn test_workflow_rejections_are_405() {
        let transition = AppError::from(TicketError::StatusTransitionNotAllowed {
            from: TicketStatus::Closed,
            to: TicketStatus::Open,
        });
        let closed = AppError::from(TicketError::TicketStatusNotAllowed {
            status: TicketStatus::Closed,
        });

        assert_eq!(transition.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            transition.message,
            "Status transition not allowed: from `closed` to `open`"
        );
        assert_eq!(closed.status, StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(closed.code, "METHOD_NOT_ALLOWED");
    }

    #[test]
    fn test_not_found() {
        let err = AppError::from(TicketError::not_found(EntityKind::Ticket, "123"));
        assert_eq!(err.to_string(), "[NOT_FOUND] ticket with id 123 not found");
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_remaining_mappings() {
        let cases = [
            (
                TicketError::Validation("bad".into()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                TicketError::VersionConflict {
                    id: TicketId::new(),
                    expected: 3,
                },
                StatusCode::CONFLICT,
            ),
            (
                TicketError::StoreUnavailable("db down".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                TicketError::Serialization("bad row".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(AppError::from(err).status, expected);
        }
    }

    #[test]
    fn test_store_detail_is_not_exposed() {
        let err = AppError::from(TicketError::StoreUnavailable("password=hunter2".into()));
        assert!(!err.message.contains("hunter2"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[tokio::test]
    async fn test_response_body_is_json() {
        let response = AppError::from(TicketError::TicketStatusNotAllowed {
            status: TicketStatus::Closed,
        })
        .into_response();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["code"], "METHOD_NOT_ALLOWED");
    }
}
