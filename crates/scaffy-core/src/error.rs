//! Error types for `scaffy-core`.
//!
//! [`SiteError`] is the single error shape that flows through the form
//! pipeline. It is a tagged enum rather than a hierarchy: callers branch on
//! the variant (or on [`SiteError::kind`]) and only [`SiteError::Validation`]
//! carries a field name for inline display.
//!
//! Anything a caller might raise (a typed error, a foreign error, a bare
//! message) is funnelled through [`Raised`] and normalized by
//! [`handle_error`], which logs it and optionally emits a notice.

use crate::notice::{Notice, Notifier};

/// Message used when a raised value carries no usable description.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

/// Default message for [`SiteError::Network`].
pub const NETWORK_ERROR_MESSAGE: &str = "Network connection failed";

/// Default message for [`SiteError::Auth`].
pub const AUTH_ERROR_MESSAGE: &str = "Authentication failed";

/// Application error, discriminated by kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SiteError {
    /// User input problem, attributable to a form field.
    #[error("{message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// Connectivity failure. Carries no status.
    #[error("{message}")]
    Network { message: String },

    /// Credential rejection.
    #[error("{message}")]
    Auth { message: String },

    /// Anything else, with an optional machine-readable code and status.
    #[error("{message}")]
    Generic {
        message: String,
        code: Option<String>,
        status: Option<u16>,
    },
}

/// The discriminant of a [`SiteError`], for logging and coarse branching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Validation,
    Network,
    Auth,
    Generic,
}

impl ErrorKind {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Validation => "validation",
            Self::Network => "network",
            Self::Auth => "auth",
            Self::Generic => "generic",
        }
    }
}

impl SiteError {
    /// A validation failure for `field`.
    #[must_use]
    pub fn validation(message: impl Into<String>, field: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    #[must_use]
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network {
            message: message.into(),
        }
    }

    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// A generic error with no code or status.
    #[must_use]
    pub fn generic(message: impl Into<String>) -> Self {
        Self::Generic {
            message: message.into(),
            code: None,
            status: None,
        }
    }

    #[must_use]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Validation { .. } => ErrorKind::Validation,
            Self::Network { .. } => ErrorKind::Network,
            Self::Auth { .. } => ErrorKind::Auth,
            Self::Generic { .. } => ErrorKind::Generic,
        }
    }

    /// The human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        match self {
            Self::Validation { message, .. }
            | Self::Network { message }
            | Self::Auth { message }
            | Self::Generic { message, .. } => message,
        }
    }

    /// The offending field, for validation errors only.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        match self {
            Self::Validation { field, .. } => field.as_deref(),
            Self::Network { .. } | Self::Auth { .. } | Self::Generic { .. } => None,
        }
    }

    /// Machine-readable error code.
    #[must_use]
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Validation { .. } => Some("VALIDATION_ERROR"),
            Self::Network { .. } => Some("NETWORK_ERROR"),
            Self::Auth { .. } => Some("AUTH_ERROR"),
            Self::Generic { code, .. } => code.as_deref(),
        }
    }

    /// HTTP-equivalent status. Network failures have none.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Validation { .. } => Some(400),
            Self::Network { .. } => None,
            Self::Auth { .. } => Some(401),
            Self::Generic { status, .. } => *status,
        }
    }
}

/// A value raised somewhere in the pipeline, before normalization.
#[derive(Debug)]
pub enum Raised {
    /// Already a typed application error.
    Site(SiteError),
    /// Some other error type.
    Foreign(Box<dyn std::error::Error + Send + Sync>),
    /// A bare message.
    Message(String),
    /// Nothing usable was raised.
    Unknown,
}

impl Raised {
    /// Wrap a foreign error.
    pub fn foreign<E>(err: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::Foreign(Box::new(err))
    }

    /// Collapse into a [`SiteError`].
    ///
    /// Typed errors pass through unchanged; foreign errors and messages become
    /// [`SiteError::Generic`] with the same text.
    #[must_use]
    pub fn normalize(self) -> SiteError {
        match self {
            Self::Site(err) => err,
            Self::Foreign(err) => SiteError::generic(err.to_string()),
            Self::Message(msg) => SiteError::generic(msg),
            Self::Unknown => SiteError::generic(UNEXPECTED_ERROR_MESSAGE),
        }
    }
}

impl From<SiteError> for Raised {
    fn from(err: SiteError) -> Self {
        Self::Site(err)
    }
}

impl From<String> for Raised {
    fn from(msg: String) -> Self {
        Self::Message(msg)
    }
}

impl From<&str> for Raised {
    fn from(msg: &str) -> Self {
        Self::Message(msg.to_owned())
    }
}

impl From<Box<dyn std::error::Error + Send + Sync>> for Raised {
    fn from(err: Box<dyn std::error::Error + Send + Sync>) -> Self {
        Self::Foreign(err)
    }
}

impl From<serde_json::Error> for Raised {
    fn from(err: serde_json::Error) -> Self {
        Self::foreign(err)
    }
}

impl From<serde_json::Error> for SiteError {
    fn from(err: serde_json::Error) -> Self {
        Self::Generic {
            message: err.to_string(),
            code: Some("SERIALIZATION_ERROR".to_owned()),
            status: None,
        }
    }
}

/// Normalize `error`, log it, and optionally tell the user.
///
/// When `show_feedback` is set a destructive notice titled "Error" carrying
/// the normalized message is sent to `notifier`. The normalized error is
/// returned so the caller can inspect it further.
pub fn handle_error<N>(notifier: &N, error: impl Into<Raised>, show_feedback: bool) -> SiteError
where
    N: Notifier + ?Sized,
{
    let normalized = error.into().normalize();

    tracing::error!(
        kind = normalized.kind().as_str(),
        code = normalized.code().unwrap_or("-"),
        field = normalized.field().unwrap_or("-"),
        error = %normalized,
        "error handled"
    );

    if show_feedback {
        notifier.notify(Notice::destructive("Error", normalized.message()));
    }

    normalized
}
