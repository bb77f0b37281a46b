// ── Core error types ──
//
// Errors surfaced by netpulse-core. Expected source outages never show
// up here: controller and probe failures become `None`/`down` values in
// the snapshot. What remains are missing sessions, malformed payloads,
// result-store failures and bad configuration.

use std::path::PathBuf;

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Controller ───────────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailure { message: String },

    #[error("No controller session -- authenticate first")]
    AuthRequired,

    #[error("{source_name} unavailable: {reason}")]
    SourceUnavailable { source_name: String, reason: String },

    #[error("Malformed response: {message}")]
    MalformedResponse { message: String },

    // ── Result store ─────────────────────────────────────────────────
    #[error("Snapshot already exists at {}", path.display())]
    SnapshotExists { path: PathBuf },

    #[error("Invalid namespace '{namespace}': use letters, digits, '-' or '_'")]
    InvalidNamespace { namespace: String },

    #[error("Result store I/O error at {}: {source}", path.display())]
    Storage {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // ── Configuration ────────────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },
}

impl CoreError {
    pub(crate) fn storage(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Storage {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn malformed(message: impl Into<String>) -> Self {
        Self::MalformedResponse {
            message: message.into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<netpulse_api::Error> for CoreError {
    fn from(err: netpulse_api::Error) -> Self {
        if err.is_timeout() {
            return CoreError::SourceUnavailable {
                source_name: "controller".into(),
                reason: "request timed out".into(),
            };
        }
        match err {
            netpulse_api::Error::Authentication { message } => {
                CoreError::AuthenticationFailure { message }
            }
            netpulse_api::Error::AuthRequired => CoreError::AuthRequired,
            netpulse_api::Error::SessionExpired => CoreError::SourceUnavailable {
                source_name: "controller".into(),
                reason: "session expired -- re-authentication required".into(),
            },
            netpulse_api::Error::Transport(e) => CoreError::SourceUnavailable {
                source_name: "controller".into(),
                reason: e.to_string(),
            },
            netpulse_api::Error::Api { status, message } => CoreError::SourceUnavailable {
                source_name: "controller".into(),
                reason: format!("HTTP {status}: {message}"),
            },
            netpulse_api::Error::Deserialization { message, body: _ } => {
                CoreError::MalformedResponse { message }
            }
            netpulse_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            netpulse_api::Error::Tls(msg) => CoreError::Config {
                message: format!("TLS setup failed: {msg}"),
            },
        }
    }
}
