//! Classified errors returned by every client call.
//!
//! A call fails with exactly one [`Error`] variant regardless of which HTTP
//! stack sits underneath. Callers branch on the variant (or on
//! [`Error::kind`]) instead of re-parsing status codes or bodies.

use thiserror::Error;

/// Result type for client operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Errors that can occur when calling the BlackRoad API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Missing credential at construction time, or HTTP 401.
    #[error("authentication error: {0}")]
    Authentication(String),

    /// HTTP 404. Carries the endpoint that was requested.
    #[error("not found: {0}")]
    NotFound(String),

    /// HTTP 429 after the attempt budget ran out.
    #[error("rate limit exceeded, retry after {retry_after} seconds")]
    RateLimit { retry_after: u64 },

    /// HTTP 422. Carries the response body.
    #[error("validation error: {0}")]
    Validation(String),

    /// Transport failure, timeout, cancellation, or an undecodable success body.
    #[error("connection error: {0}")]
    Connection(String),

    /// Any other non-2xx status. A `status` of 0 means no HTTP status was seen.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },
}

/// Discriminator over [`Error`] variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Authentication,
    NotFound,
    RateLimit,
    Validation,
    Connection,
    Api,
}

impl ErrorKind {
    /// Stable machine-readable code for this kind.
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Authentication => "AUTH_ERROR",
            ErrorKind::NotFound => "NOT_FOUND",
            ErrorKind::RateLimit => "RATE_LIMIT",
            ErrorKind::Validation => "VALIDATION_ERROR",
            ErrorKind::Connection => "CONNECTION_ERROR",
            ErrorKind::Api => "API_ERROR",
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.code())
    }
}

impl Error {
    pub fn connection(message: impl Into<String>) -> Self {
        Self::Connection(message.into())
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Authentication(_) => ErrorKind::Authentication,
            Error::NotFound(_) => ErrorKind::NotFound,
            Error::RateLimit { .. } => ErrorKind::RateLimit,
            Error::Validation(_) => ErrorKind::Validation,
            Error::Connection(_) => ErrorKind::Connection,
            Error::Api { .. } => ErrorKind::Api,
        }
    }

    /// The HTTP status this error was classified from, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::NotFound(_) => Some(404),
            Error::RateLimit { .. } => Some(429),
            Error::Validation(_) => Some(422),
            Error::Api { status, .. } if *status != 0 => Some(*status),
            // A missing credential is also an authentication error, so 401 is not implied.
            _ => None,
        }
    }

    /// Server-suggested delay in seconds for rate-limit errors.
    pub fn retry_after(&self) -> Option<u64> {
        match self {
            Error::RateLimit { retry_after } => Some(*retry_after),
            _ => None,
        }
    }
}
