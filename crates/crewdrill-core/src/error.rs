//! Backend error types.
//!
//! These errors represent failures when talking to the hosted backend.
//! Defined in `crewdrill-core` so callers can classify a failure (inline
//! authentication message versus generic backend error) without string
//! matching.

use thiserror::Error;

/// Errors that can occur when interacting with the backend.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Wrong email/password combination.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// The account exists but has been deactivated by an administrator.
    #[error("this account has been deactivated")]
    AccountInactive,

    /// Signup rejected because the email is already registered.
    #[error("an account already exists for {0}")]
    AlreadyRegistered(String),

    /// The auth service throttled the request (e.g. signup email quota).
    #[error("the server is busy, retry after {retry_after_ms}ms")]
    RateLimited { retry_after_ms: u64 },

    /// The requested row does not exist.
    #[error("{entity} not found")]
    NotFound { entity: &'static str },

    /// Password reset needs the backend's admin API, which requires a
    /// configured service key.
    #[error("password reset requires a configured service key")]
    ServiceKeyRequired,

    /// The backend returned an error response.
    #[error("backend error (HTTP {status}): {message}")]
    ApiError { status: u16, message: String },

    /// The request timed out.
    #[error("request timed out after {0}s")]
    Timeout(u64),

    /// A network error occurred.
    #[error("network error: {0}")]
    Network(String),
}

impl BackendError {
    /// Whether this failure should be shown to the user as-is (inline
    /// message) rather than collapsed into a generic error line.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            BackendError::InvalidCredentials
                | BackendError::AccountInactive
                | BackendError::AlreadyRegistered(_)
        )
    }

    /// The retry-after delay in milliseconds, if the backend provided one.
    pub fn retry_after_ms(&self) -> Option<u64> {
        match self {
            BackendError::RateLimited { retry_after_ms } => Some(*retry_after_ms),
            _ => None,
        }
    }
}
