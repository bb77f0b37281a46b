// ── Runtime configuration ──
//
// Typed settings the core consumes. They never touch disk: the config
// crate loads and validates files and environment, then hands these in.

use std::path::PathBuf;
use std::time::Duration;

use netpulse_api::{ControllerClient, ControllerPlatform, Credentials, TlsMode, TransportConfig};
use secrecy::SecretString;
use url::Url;

use crate::error::CoreError;

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(PathBuf),
    /// Skip verification (self-signed lab controllers). Default.
    #[default]
    DangerAcceptInvalid,
}

/// How to reach and authenticate with the controller.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    pub url: Url,
    pub username: String,
    pub password: SecretString,
    pub platform: ControllerPlatform,
    pub tls: TlsVerification,
    /// Upper bound for every HTTP request.
    pub timeout: Duration,
}

impl ControllerConfig {
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: match &self.tls {
                TlsVerification::SystemDefaults => TlsMode::System,
                TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
                TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
            },
            timeout: self.timeout,
        }
    }

    /// Build the REST client. Fails only on TLS setup problems.
    pub fn build_client(&self) -> Result<ControllerClient, CoreError> {
        let credentials = Credentials::new(
            self.url.clone(),
            self.username.clone(),
            self.password.clone(),
        );
        Ok(ControllerClient::new(
            credentials,
            self.platform,
            &self.transport(),
        )?)
    }
}

/// Tunnel probe tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeConfig {
    /// Upper bound for each executor call.
    pub timeout: Duration,
    /// Echo requests per connectivity test.
    pub ping_count: u32,
    /// Tunnel interface inspected on each router.
    pub interface: String,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(5),
            ping_count: 5,
            interface: "Tunnel0".into(),
        }
    }
}

/// Aggregator-owned retry policy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AggregatorConfig {
    /// Authentication attempts per snapshot (at least one is always made).
    pub auth_attempts: u32,
    /// Pause between failed authentication attempts.
    pub auth_backoff: Duration,
}

impl Default for AggregatorConfig {
    fn default() -> Self {
        Self {
            auth_attempts: 1,
            auth_backoff: Duration::from_secs(1),
        }
    }
}
