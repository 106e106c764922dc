use thiserror::Error;

/// Top-level error type for the `poolwatch-api` crate.
///
/// Splits failures into three families the way callers need to branch on
/// them: transport (no usable HTTP response), HTTP status (the server
/// answered with a non-2xx status), and business (the server answered
/// 200 but the envelope carried a non-success code).
#[derive(Debug, Error)]
pub enum Error {
    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, timeout, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    // ── HTTP status ─────────────────────────────────────────────────
    /// 401 — session expired or token invalid. The adapter has already
    /// cleared the in-memory token and signalled the unauthorized channel.
    #[error("Unauthorized -- re-authentication required")]
    Unauthorized,

    /// 403 — authenticated but not allowed.
    #[error("Forbidden: insufficient permissions")]
    Forbidden,

    /// 404 — resource does not exist.
    #[error("Not found")]
    NotFound,

    /// 500 — server-side failure.
    #[error("Internal server error: {message}")]
    Internal { message: String },

    /// Any other non-2xx status. Carries the backend message when the
    /// error body parsed as an envelope.
    #[error("Request failed (HTTP {status}): {message}")]
    Request {
        status: u16,
        message: String,
        code: Option<i64>,
    },

    // ── Business ────────────────────────────────────────────────────
    /// Envelope `code != 200` inside an HTTP 200 response. This is a
    /// business-logic rejection, not a transport failure.
    #[error("Business error {code}: {message}")]
    Business { code: i64, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Stable code string for UI-facing error classification.
    pub fn code_str(&self) -> &'static str {
        match self {
            Self::Transport(e) if e.is_connect() || e.is_timeout() => "NETWORK_ERROR",
            Self::Transport(_) | Self::Request { .. } => "REQUEST_ERROR",
            Self::InvalidUrl(_) => "INVALID_URL",
            Self::Unauthorized => "UNAUTHORIZED",
            Self::Forbidden => "FORBIDDEN",
            Self::NotFound => "NOT_FOUND",
            Self::Internal { .. } => "INTERNAL_ERROR",
            Self::Business { .. } => "BUSINESS_ERROR",
            Self::Deserialization { .. } => "PARSE_ERROR",
        }
    }

    /// Returns `true` if this error means the session is no longer valid
    /// and re-authentication might resolve it.
    pub fn is_auth_expired(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Returns `true` if no HTTP response was received at all.
    pub fn is_network(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_connect() || e.is_timeout() || e.is_request())
    }

    /// The business error code, if this is a business rejection.
    pub fn business_code(&self) -> Option<i64> {
        match self {
            Self::Business { code, .. } => Some(*code),
            _ => None,
        }
    }
}
