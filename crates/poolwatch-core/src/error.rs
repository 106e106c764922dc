use thiserror::Error;

/// Unified error type for the poolwatch core layer.
///
/// Wraps the transport-level [`poolwatch_api::Error`] and adds the
/// failures that only exist above the wire: validation of response
/// shapes, session persistence, and session-state violations.
#[derive(Debug, Error)]
pub enum CoreError {
    /// Error from the HTTP adapter.
    #[error("API error: {0}")]
    Api(#[from] poolwatch_api::Error),

    /// A response parsed but violated a structural expectation
    /// (e.g. a page envelope without a `records` array).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Loading or saving the persisted session failed.
    #[error("Session persistence error: {0}")]
    Persistence(String),

    /// An operation that requires an authenticated session was called
    /// without one.
    #[error("Not authenticated")]
    NotAuthenticated,
}

impl CoreError {
    /// Stable code string for UI-facing classification, mirroring
    /// [`poolwatch_api::Error::code_str`].
    pub fn code_str(&self) -> &'static str {
        match self {
            Self::Api(e) => e.code_str(),
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Persistence(_) => "PERSISTENCE_ERROR",
            Self::NotAuthenticated => "UNAUTHORIZED",
        }
    }

    /// Returns `true` if the underlying cause is an expired session.
    pub fn is_auth_expired(&self) -> bool {
        match self {
            Self::Api(e) => e.is_auth_expired(),
            Self::NotAuthenticated => true,
            _ => false,
        }
    }
}
