// ── Core error types ──
//
// User-facing errors from tiksync-core. Consumers never see HTTP status
// codes or JSON parse failures directly; the `From<tiksync_api::Error>`
// impl translates transport-layer errors into domain variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to router at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("Router disconnected")]
    RouterDisconnected,

    #[error("Router request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    /// A raw record did not fit its typed model.
    #[error("Malformed {entity_type} record {key}: {message}")]
    Malformed {
        entity_type: String,
        key: String,
        message: String,
    },

    /// An `upload/download` rate spec with the wrong number of parts.
    #[error("Malformed rate spec {spec:?}: expected upload/download")]
    MalformedRateSpec { spec: String },

    // ── Operation errors ─────────────────────────────────────────────
    #[error("Operation rejected: {message}")]
    Rejected { message: String },

    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<tiksync_api::Error> for CoreError {
    fn from(err: tiksync_api::Error) -> Self {
        match err {
            tiksync_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailed { message }
            }
            tiksync_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            tiksync_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            tiksync_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            tiksync_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            tiksync_api::Error::Router {
                status: 404,
                message,
            } => CoreError::NotFound {
                entity_type: "resource".into(),
                identifier: message,
            },
            tiksync_api::Error::Router { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            tiksync_api::Error::NotFound { path, field, value } => CoreError::NotFound {
                entity_type: path,
                identifier: format!("{field}={value}"),
            },
            tiksync_api::Error::Deserialization { message, body: _ } => {
                CoreError::Internal(format!("Deserialization error: {message}"))
            }
        }
    }
}
