//! CLI error types with miette diagnostics.
//!
//! Maps `CoreError` and `ConfigError` into user-facing errors with
//! actionable help text and stable exit codes.

use miette::Diagnostic;
use thiserror::Error;

use netpulse_config::ConfigError;
use netpulse_core::{CoreError, OverallStatus};

/// Process exit codes.
pub mod exit_code {
    pub const GENERAL: i32 = 1;
    pub const USAGE: i32 = 2;
    pub const AUTH: i32 = 3;
    pub const NOT_FOUND: i32 = 4;
    pub const CONNECTION: i32 = 7;
    pub const DEGRADED: i32 = 10;
}

#[derive(Debug, Error, Diagnostic)]
pub enum CliError {
    // ── Controller ───────────────────────────────────────────────────
    #[error("Authentication with the controller at {url} failed")]
    #[diagnostic(
        code(netpulse::auth_failed),
        help(
            "Verify controller_username and controller_password.\n\
             Run: netpulse config show"
        )
    )]
    AuthFailed { url: String },

    #[error("{source_name} unavailable: {reason}")]
    #[diagnostic(
        code(netpulse::controller_unavailable),
        help(
            "Check that the controller is reachable and responding.\n\
             Use -v for request details, or --backend simulated to work offline."
        )
    )]
    ControllerUnavailable { source_name: String, reason: String },

    #[error("{resource_type} '{identifier}' not found")]
    #[diagnostic(
        code(netpulse::not_found),
        help("Run: netpulse {list_command} to see available {resource_type}s")
    )]
    NotFound {
        resource_type: String,
        identifier: String,
        list_command: String,
    },

    // ── Health ───────────────────────────────────────────────────────
    #[error("Network status is {status}")]
    #[diagnostic(
        code(netpulse::degraded),
        help("Run: netpulse status for the full snapshot")
    )]
    Degraded { status: OverallStatus },

    // ── Configuration ────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(netpulse::config),
        help("Run: netpulse config show to inspect the merged configuration")
    )]
    Config(#[from] ConfigError),

    #[error("Invalid value for {field}: {reason}")]
    #[diagnostic(code(netpulse::validation))]
    Validation { field: String, reason: String },

    // ── Storage / IO ─────────────────────────────────────────────────
    #[error(transparent)]
    #[diagnostic(
        code(netpulse::storage),
        help("Check that --results-dir points at a writable directory")
    )]
    Storage(CoreError),

    #[error("Serialization failed: {0}")]
    #[diagnostic(code(netpulse::serialization))]
    Serialization(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl CliError {
    /// Map this error to an exit code for process termination.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::AuthFailed { .. } => exit_code::AUTH,
            Self::ControllerUnavailable { .. } => exit_code::CONNECTION,
            Self::NotFound { .. } => exit_code::NOT_FOUND,
            Self::Degraded { .. } => exit_code::DEGRADED,
            Self::Config(_) | Self::Validation { .. } => exit_code::USAGE,
            Self::Storage(_) | Self::Serialization(_) | Self::Io(_) => exit_code::GENERAL,
        }
    }
}

// ── CoreError → CliError mapping ─────────────────────────────────────

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::AuthenticationFailure { .. } | CoreError::AuthRequired => {
                CliError::AuthFailed {
                    url: "(configured controller)".into(),
                }
            }
            CoreError::SourceUnavailable {
                source_name,
                reason,
            } => CliError::ControllerUnavailable {
                source_name,
                reason,
            },
            CoreError::MalformedResponse { message } => CliError::ControllerUnavailable {
                source_name: "controller".into(),
                reason: format!("malformed response: {message}"),
            },
            CoreError::InvalidNamespace { namespace } => CliError::Validation {
                field: "namespace".into(),
                reason: format!("'{namespace}' may only contain letters, digits, '-' or '_'"),
            },
            CoreError::Config { message } => CliError::Validation {
                field: "controller".into(),
                reason: message,
            },
            err @ (CoreError::SnapshotExists { .. }
            | CoreError::Storage { .. }
            | CoreError::Serialization(_)) => CliError::Storage(err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_codes_by_category() {
        let auth: CliError = CoreError::AuthRequired.into();
        assert_eq!(auth.exit_code(), exit_code::AUTH);

        let down: CliError = CoreError::SourceUnavailable {
            source_name: "controller".into(),
            reason: "timed out".into(),
        }
        .into();
        assert_eq!(down.exit_code(), exit_code::CONNECTION);

        let config: CliError = ConfigError::Validation {
            field: "ping_count".into(),
            reason: "must be at least 1".into(),
        }
        .into();
        assert_eq!(config.exit_code(), exit_code::USAGE);

        let degraded = CliError::Degraded {
            status: OverallStatus::Degraded,
        };
        assert_eq!(degraded.exit_code(), exit_code::DEGRADED);

        let exists: CliError = CoreError::SnapshotExists {
            path: "results/snapshot_20250101_000000.json".into(),
        }
        .into();
        assert_eq!(exists.exit_code(), exit_code::GENERAL);
    }
}
