//! HTTP error types for the Scaffy server.
//!
//! Handler failures are rendered as the "Page Error" card rather than a bare
//! status line, so a visitor always has a way back.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use scaffy_core::error::{ErrorKind, SiteError};

use crate::routes::page;

/// Text shown when a failure carries no message of its own.
pub const GENERIC_PAGE_MESSAGE: &str = "This page encountered an error. Please try navigating back.";

/// Page-level error returned from HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum PageError {
    /// No route matched.
    #[error("not found")]
    NotFound,

    /// The request could not be understood.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Credentials missing or rejected.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// An upstream collaborator could not be reached.
    #[error("upstream unavailable: {0}")]
    Upstream(String),

    /// Anything else. The detail is logged, never shown.
    #[error("internal error: {0}")]
    Internal(String),
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let (status, heading, message) = match self {
            Self::NotFound => (
                StatusCode::NOT_FOUND,
                "Page Not Found",
                "We couldn't find the page you were looking for.".to_owned(),
            ),
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, "Page Error", msg),
            Self::Unauthorized(msg) => (StatusCode::UNAUTHORIZED, "Page Error", msg),
            Self::Upstream(msg) => {
                tracing::warn!(error = %msg, "upstream failure");
                (StatusCode::BAD_GATEWAY, "Page Error", msg)
            }
            Self::Internal(msg) => {
                tracing::error!(error = %msg, "page internal error");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Page Error",
                    GENERIC_PAGE_MESSAGE.to_owned(),
                )
            }
        };

        let message = if message.trim().is_empty() {
            GENERIC_PAGE_MESSAGE.to_owned()
        } else {
            message
        };

        (status, Html(page::error_page(status, heading, &message))).into_response()
    }
}

impl From<SiteError> for PageError {
    fn from(err: SiteError) -> Self {
        let message = err.message().to_owned();
        match err.kind() {
            ErrorKind::Validation => Self::BadRequest(message),
            ErrorKind::Auth => Self::Unauthorized(message),
            ErrorKind::Network => Self::Upstream(message),
            ErrorKind::Generic => match err.status() {
                Some(400) => Self::BadRequest(message),
                Some(401 | 403) => Self::Unauthorized(message),
                Some(404) => Self::NotFound,
                _ => Self::Internal(message),
            },
        }
    }
}
