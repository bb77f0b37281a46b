//! Layered configuration for netpulse.
//!
//! Settings are merged from built-in sandbox defaults, an optional TOML
//! file, an optional `config.env` dotenv file, plain environment variables
//! (`CONTROLLER_URL`, `HQ_ROUTER_IP`, ...), `NETPULSE_*` variables and
//! finally CLI overrides. [`Settings::resolve`] validates the merged result
//! into the typed runtime configuration `netpulse_core` consumes.

use std::net::IpAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
    value::{Dict, Value},
};
use netpulse_api::ControllerPlatform;
use netpulse_core::{
    AggregatorConfig, ControllerConfig, EndpointRole, LocalNetwork, ProbeConfig, TlsVerification,
    TunnelEndpoint, TunnelTopology,
};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;
use url::Url;

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("failed to read {path}: {source}")]
    DotEnv {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Validation {
        field: field.into(),
        reason: reason.into(),
    }
}

// ── Backend selection ───────────────────────────────────────────────

/// Which controller source backs the aggregator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// The controller's REST API.
    #[default]
    Live,
    /// In-process sandbox data, no network access.
    Simulated,
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Live => "live",
            Self::Simulated => "simulated",
        })
    }
}

// ── Settings ────────────────────────────────────────────────────────

/// Environment variables read without the `NETPULSE_` prefix.
pub const PLAIN_ENV_KEYS: &[&str] = &[
    "controller_url",
    "controller_username",
    "controller_password",
    "hq_router_ip",
    "branch_router_ip",
    "hq_local_network",
    "branch_local_network",
];

const REDACTED: &str = "********";

/// Flat, string-friendly settings as they appear in files and the
/// environment. Every key has a default pointing at the public sandbox.
#[derive(Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    pub controller_url: String,
    pub controller_username: String,
    pub controller_password: String,
    /// `dnac` or `generic`.
    pub controller_platform: String,

    pub verify_tls: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,
    pub timeout_secs: u64,

    pub hq_router_ip: String,
    pub branch_router_ip: String,
    /// Empty when the endpoint has no tunnel address to report.
    pub hq_tunnel_ip: String,
    pub branch_tunnel_ip: String,
    pub hq_local_network: String,
    pub branch_local_network: String,
    pub hq_probe_host: String,
    pub branch_probe_host: String,
    pub tunnel_interface: String,

    pub probe_timeout_secs: u64,
    pub ping_count: u32,
    pub auth_attempts: u32,
    pub auth_backoff_secs: u64,
    /// Zero disables the snapshot cache.
    pub cache_ttl_secs: u64,

    pub backend: Backend,
    pub results_dir: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        let topology = TunnelTopology::default();
        let probe = ProbeConfig::default();
        let aggregator = AggregatorConfig::default();
        let ip = |addr: Option<IpAddr>| addr.map(|a| a.to_string()).unwrap_or_default();
        let net = |net: Option<LocalNetwork>| net.map(|n| n.to_string()).unwrap_or_default();

        Self {
            controller_url: "https://sandboxdnac2.cisco.com".into(),
            controller_username: "devnetuser".into(),
            controller_password: "Cisco123!".into(),
            controller_platform: ControllerPlatform::DnaCenter.to_string(),
            verify_tls: false,
            ca_cert: None,
            timeout_secs: 30,
            hq_router_ip: topology.local.router_ip.to_string(),
            branch_router_ip: topology.remote.router_ip.to_string(),
            hq_tunnel_ip: ip(topology.local.tunnel_ip),
            branch_tunnel_ip: ip(topology.remote.tunnel_ip),
            hq_local_network: net(topology.local.local_network),
            branch_local_network: net(topology.remote.local_network),
            hq_probe_host: topology.local.probe_host.to_string(),
            branch_probe_host: topology.remote.probe_host.to_string(),
            tunnel_interface: probe.interface,
            probe_timeout_secs: probe.timeout.as_secs(),
            ping_count: probe.ping_count,
            auth_attempts: aggregator.auth_attempts,
            auth_backoff_secs: aggregator.auth_backoff.as_secs(),
            cache_ttl_secs: 30,
            backend: Backend::default(),
            results_dir: default_results_dir(),
        }
    }
}

impl std::fmt::Debug for Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Settings")
            .field("controller_url", &self.controller_url)
            .field("controller_username", &self.controller_username)
            .field("controller_password", &REDACTED)
            .field("controller_platform", &self.controller_platform)
            .field("backend", &self.backend)
            .field("results_dir", &self.results_dir)
            .finish_non_exhaustive()
    }
}

impl Settings {
    /// A copy safe to print: the password is masked.
    pub fn redacted(&self) -> Self {
        Self {
            controller_password: REDACTED.into(),
            ..self.clone()
        }
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Validate into the typed runtime configuration.
    pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
        let controller = ControllerConfig {
            url: parse_controller_url(&self.controller_url)?,
            username: non_empty("controller_username", &self.controller_username)?.to_owned(),
            password: SecretString::from(self.controller_password.clone()),
            platform: parse_platform(&self.controller_platform)?,
            tls: self.tls_verification(),
            timeout: non_zero_secs("timeout_secs", self.timeout_secs)?,
        };

        let topology = TunnelTopology {
            local: endpoint(
                "hq",
                EndpointRole::Local,
                &self.hq_router_ip,
                &self.hq_tunnel_ip,
                &self.hq_local_network,
                &self.hq_probe_host,
            )?,
            remote: endpoint(
                "branch",
                EndpointRole::Remote,
                &self.branch_router_ip,
                &self.branch_tunnel_ip,
                &self.branch_local_network,
                &self.branch_probe_host,
            )?,
        };

        if self.ping_count == 0 {
            return Err(invalid("ping_count", "must be at least 1"));
        }
        let probe = ProbeConfig {
            timeout: non_zero_secs("probe_timeout_secs", self.probe_timeout_secs)?,
            ping_count: self.ping_count,
            interface: non_empty("tunnel_interface", &self.tunnel_interface)?.to_owned(),
        };

        if self.auth_attempts == 0 {
            return Err(invalid("auth_attempts", "must be at least 1"));
        }
        let aggregator = AggregatorConfig {
            auth_attempts: self.auth_attempts,
            auth_backoff: Duration::from_secs(self.auth_backoff_secs),
        };

        Ok(ResolvedConfig {
            backend: self.backend,
            controller,
            topology,
            probe,
            aggregator,
            cache_ttl: Duration::from_secs(self.cache_ttl_secs),
            results_dir: self.results_dir.clone(),
        })
    }

    fn tls_verification(&self) -> TlsVerification {
        match (&self.ca_cert, self.verify_tls) {
            (_, false) => TlsVerification::DangerAcceptInvalid,
            (Some(path), true) => TlsVerification::CustomCa(path.clone()),
            (None, true) => TlsVerification::SystemDefaults,
        }
    }
}

/// Everything a netpulse process needs, validated.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    pub backend: Backend,
    pub controller: ControllerConfig,
    pub topology: TunnelTopology,
    pub probe: ProbeConfig,
    pub aggregator: AggregatorConfig,
    pub cache_ttl: Duration,
    pub results_dir: PathBuf,
}

// ── Validation helpers ──────────────────────────────────────────────

fn non_empty<'a>(field: &str, value: &'a str) -> Result<&'a str, ConfigError> {
    let value = value.trim();
    if value.is_empty() {
        Err(invalid(field, "must not be empty"))
    } else {
        Ok(value)
    }
}

fn non_zero_secs(field: &str, secs: u64) -> Result<Duration, ConfigError> {
    if secs == 0 {
        Err(invalid(field, "must be greater than zero"))
    } else {
        Ok(Duration::from_secs(secs))
    }
}

fn parse_controller_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|e| invalid("controller_url", e.to_string()))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(invalid(
            "controller_url",
            format!("unsupported scheme '{other}', expected http or https"),
        )),
    }
}

fn parse_platform(raw: &str) -> Result<ControllerPlatform, ConfigError> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "dnac" | "dna-center" | "catalyst" => Ok(ControllerPlatform::DnaCenter),
        "generic" => Ok(ControllerPlatform::Generic),
        other => Err(invalid(
            "controller_platform",
            format!("unknown platform '{other}', expected dnac or generic"),
        )),
    }
}

fn parse_ip(field: &str, raw: &str) -> Result<IpAddr, ConfigError> {
    raw.trim()
        .parse()
        .map_err(|_| invalid(field, format!("'{raw}' is not an IP address")))
}

fn endpoint(
    name: &str,
    role: EndpointRole,
    router_ip: &str,
    tunnel_ip: &str,
    local_network: &str,
    probe_host: &str,
) -> Result<TunnelEndpoint, ConfigError> {
    let field = |key: &str| format!("{name}_{key}");

    let router_ip = parse_ip(&field("router_ip"), router_ip)?;
    let tunnel_ip = if tunnel_ip.trim().is_empty() {
        None
    } else {
        Some(parse_ip(&field("tunnel_ip"), tunnel_ip)?)
    };
    let local_network = if local_network.trim().is_empty() {
        None
    } else {
        Some(
            local_network
                .parse::<LocalNetwork>()
                .map_err(|reason| invalid(&field("local_network"), reason))?,
        )
    };
    let probe_host = parse_ip(&field("probe_host"), probe_host)?;

    if let Some(network) = local_network {
        if !network.contains(probe_host) {
            return Err(invalid(
                &field("probe_host"),
                format!("{probe_host} is outside {network}"),
            ));
        }
    }

    Ok(TunnelEndpoint {
        name: name.into(),
        role,
        router_ip,
        tunnel_ip,
        local_network,
        probe_host,
    })
}

// ── Loading ─────────────────────────────────────────────────────────

/// Values given on the command line. `None` leaves the lower layers alone.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Overrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub controller_username: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verify_tls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<Backend>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results_dir: Option<PathBuf>,
}

/// Where to look for each layer.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// TOML file; `None` means [`config_path`].
    pub config_file: Option<PathBuf>,
    /// Dotenv file; `None` means `config.env` in the working directory.
    pub env_file: Option<PathBuf>,
    pub overrides: Overrides,
}

/// Canonical config file path (`$XDG_CONFIG_HOME/netpulse/config.toml`).
pub fn config_path() -> PathBuf {
    ProjectDirs::from("dev", "netpulse", "netpulse").map_or_else(
        || {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".into());
            PathBuf::from(home)
                .join(".config")
                .join("netpulse")
                .join("config.toml")
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

/// Default snapshot history directory under the user data dir.
pub fn default_results_dir() -> PathBuf {
    ProjectDirs::from("dev", "netpulse", "netpulse").map_or_else(
        || PathBuf::from("results"),
        |dirs| dirs.data_dir().join("results"),
    )
}

/// Merge every layer into [`Settings`]. Missing files are skipped.
pub fn load_settings(options: &LoadOptions) -> Result<Settings, ConfigError> {
    let config_file = options.config_file.clone().unwrap_or_else(config_path);
    let env_file = options
        .env_file
        .clone()
        .unwrap_or_else(|| PathBuf::from("config.env"));
    debug!(config = %config_file.display(), env = %env_file.display(), "loading settings");

    let figment = Figment::new()
        .merge(Serialized::defaults(Settings::default()))
        .merge(Toml::file(&config_file))
        .merge(Serialized::defaults(dotenv_layer(&env_file)?))
        .merge(Env::raw().only(PLAIN_ENV_KEYS))
        .merge(Env::prefixed("NETPULSE_"))
        .merge(Serialized::defaults(&options.overrides));

    Ok(figment.extract()?)
}

/// Load and validate in one step.
pub fn load(options: &LoadOptions) -> Result<ResolvedConfig, ConfigError> {
    load_settings(options)?.resolve()
}

/// Read a dotenv file into a figment dictionary without touching the
/// process environment. Keys may carry the `NETPULSE_` prefix; unknown
/// keys are ignored.
fn dotenv_layer(path: &Path) -> Result<Dict, ConfigError> {
    let mut dict = Dict::new();
    if !path.is_file() {
        return Ok(dict);
    }

    let dotenv_err = |source| ConfigError::DotEnv {
        path: path.to_path_buf(),
        source,
    };
    let known = known_keys();
    for item in dotenvy::from_path_iter(path).map_err(dotenv_err)? {
        let (key, raw) = item.map_err(dotenv_err)?;
        let key = key.to_ascii_lowercase();
        let key = key.strip_prefix("netpulse_").unwrap_or(&key).to_owned();
        if known.contains(&key) {
            let value: Value = raw.parse().unwrap_or_else(|never| match never {});
            dict.insert(key, value);
        }
    }
    debug!(path = %path.display(), keys = dict.len(), "read dotenv file");
    Ok(dict)
}

fn known_keys() -> Vec<String> {
    let mut keys: Vec<String> = match Value::serialize(Settings::default()) {
        Ok(Value::Dict(_, dict)) => dict.into_keys().collect(),
        _ => Vec::new(),
    };
    // Skipped when unset, so absent from the serialized defaults
    keys.push("ca_cert".to_owned());
    keys
}
