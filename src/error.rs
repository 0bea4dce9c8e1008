//! Core error types.

/// Error surfaced by the session-tracking and quota core.
///
/// Every operation either fully succeeds or fails with one of these;
/// there is no partial-success state. The only internal retry is the
/// bounded insert-collision loop in
/// [`SessionTracker::record_login`](crate::SessionTracker::record_login).
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// Account, package, or open session missing.
    #[error("not found: {0}")]
    NotFound(String),

    /// Duplicate session key, or key collisions exhausted the login retry
    /// budget.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Unparseable or unsupported package grant duration.
    #[error("validation: {0}")]
    Validation(String),

    /// Backend error (database, network, etc.).
    #[error("backend error: {0}")]
    Backend(String),
}

impl CoreError {
    /// Create a not-found error from any displayable value.
    #[inline]
    pub fn not_found<E: std::fmt::Display>(what: E) -> Self {
        Self::NotFound(what.to_string())
    }

    /// Create a backend error from any error type.
    #[inline]
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        Self::Backend(err.to_string())
    }

    /// Create a validation error from any displayable value.
    #[inline]
    pub fn validation<E: std::fmt::Display>(what: E) -> Self {
        Self::Validation(what.to_string())
    }
}
