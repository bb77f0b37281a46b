// ── Tunnel probing ──
//
// `TunnelProbe` reports tunnel state per router and end-to-end
// connectivity. `CliTunnelProbe` implements it over any
// `CommandExecutor`: it runs router show commands, bounds each call by a
// timeout and parses the transcript. Probe failures never propagate:
// they come back as `down`/`failed` values carrying the reason.

mod cli;
pub mod parse;
mod scripted;
pub mod transcripts;

use std::future::Future;
use std::net::IpAddr;

use thiserror::Error;

use crate::model::{ConnectivityTest, TunnelState};

pub use cli::CliTunnelProbe;
pub use parse::PingStats;
pub use scripted::ScriptedExecutor;

/// Router commands issued by the probe.
pub mod commands {
    use std::net::IpAddr;

    pub const IKEV2_SA: &str = "show crypto ikev2 sa";
    pub const IPSEC_SA: &str = "show crypto ipsec sa";

    pub fn show_interface(name: &str) -> String {
        format!("show interfaces {name}")
    }

    pub fn ping(destination: IpAddr, count: u32) -> String {
        format!("ping {destination} repeat {count}")
    }
}

/// Why a single probe command produced no usable output.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProbeError {
    #[error("{target} unreachable: {reason}")]
    Unreachable { target: IpAddr, reason: String },

    #[error("'{command}' failed on {target}: {reason}")]
    CommandFailed {
        target: IpAddr,
        command: String,
        reason: String,
    },

    #[error("'{command}' on {target} timed out after {timeout_ms}ms")]
    Timeout {
        target: IpAddr,
        command: String,
        timeout_ms: u128,
    },

    #[error("unparseable output from '{command}': {reason}")]
    Parse { command: String, reason: String },
}

/// Runs one CLI command on a network device and returns its transcript.
///
/// A real SSH-backed executor and the scripted lab executor both sit
/// behind this seam.
pub trait CommandExecutor: Send + Sync {
    fn run(
        &self,
        target: IpAddr,
        command: &str,
    ) -> impl Future<Output = Result<String, ProbeError>> + Send;
}

/// Tunnel state and reachability for a pair of endpoints.
///
/// Implementations never fail: problems surface as `Down` statuses or a
/// `Failed` connectivity test with the error recorded.
pub trait TunnelProbe: Send + Sync {
    /// Handshake parameters and rekey metadata for the peering at `router_ip`.
    fn handshake_state(&self, router_ip: IpAddr) -> impl Future<Output = TunnelState> + Send;

    /// Security association status with packet and byte counters.
    fn session_counters(&self, router_ip: IpAddr) -> impl Future<Output = TunnelState> + Send;

    /// Tunnel interface status, line protocol, MTU and bandwidth.
    fn interface_state(&self, router_ip: IpAddr) -> impl Future<Output = TunnelState> + Send;

    /// Reachability test from `source_ip` to `destination_ip`.
    fn probe_connectivity(
        &self,
        source_ip: IpAddr,
        destination_ip: IpAddr,
    ) -> impl Future<Output = ConnectivityTest> + Send;
}
