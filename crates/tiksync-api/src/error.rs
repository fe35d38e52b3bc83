use thiserror::Error;

/// Top-level error type for the `tiksync-api` crate.
///
/// Covers every failure mode of the transport collaborator:
/// authentication, HTTP transport, router-side rejections, and lookups
/// of entries that do not exist. `tiksync-core` maps these into domain
/// errors.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Router rejected the credentials (HTTP 401).
    #[error("Authentication failed: {message}")]
    Authentication { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS handshake or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Router ──────────────────────────────────────────────────────
    /// Non-success status returned by the router, with its message.
    #[error("Router error (HTTP {status}): {message}")]
    Router { status: u16, message: String },

    /// No entry under `path` has `field == value`.
    #[error("No entry at {path} with {field}={value}")]
    NotFound {
        path: String,
        field: String,
        value: String,
    },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },
}

impl Error {
    /// Returns `true` if this is a transient error worth retrying on the
    /// next poll cycle.
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Transport(e) => e.is_timeout() || e.is_connect(),
            Self::Timeout { .. } => true,
            Self::Router { status, .. } => *status >= 500,
            _ => false,
        }
    }

    /// Returns `true` if the router does not know the requested entry or path.
    pub fn is_not_found(&self) -> bool {
        match self {
            Self::NotFound { .. } | Self::Router { status: 404, .. } => true,
            Self::Transport(e) => e.status() == Some(reqwest::StatusCode::NOT_FOUND),
            _ => false,
        }
    }
}
