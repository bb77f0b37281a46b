// ── Site-to-site tunnel domain types ──
//
// A tunnel is described by two endpoints (the local and the remote
// router). Probing each endpoint produces a `TunnelState`; probing the
// hosts behind them produces one `ConnectivityTest`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr};
use std::str::FromStr;
use std::time::Duration;

// ── Link status ─────────────────────────────────────────────────────

/// Up/down state of a handshake, security association or interface.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum LinkStatus {
    Up,
    Down,
    /// Not probed yet.
    #[default]
    Unknown,
}

impl LinkStatus {
    pub fn is_up(self) -> bool {
        self == Self::Up
    }
}

// ── Local network ───────────────────────────────────────────────────

/// An IP network in CIDR notation (`192.168.1.0/24`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct LocalNetwork {
    network: IpAddr,
    prefix: u8,
}

impl LocalNetwork {
    pub fn new(network: IpAddr, prefix: u8) -> Result<Self, String> {
        let max = if network.is_ipv4() { 32 } else { 128 };
        if prefix > max {
            return Err(format!("prefix /{prefix} exceeds /{max} for {network}"));
        }
        Ok(Self { network, prefix })
    }

    pub fn network(&self) -> IpAddr {
        self.network
    }

    pub fn prefix(&self) -> u8 {
        self.prefix
    }

    /// Whether `ip` falls inside this network. Mixed address families never match.
    pub fn contains(&self, ip: IpAddr) -> bool {
        match (self.network, ip) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                let mask = u32::MAX
                    .checked_shl(32 - u32::from(self.prefix))
                    .unwrap_or(0);
                u32::from(net) & mask == u32::from(ip) & mask
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                let mask = u128::MAX
                    .checked_shl(128 - u32::from(self.prefix))
                    .unwrap_or(0);
                u128::from(net) & mask == u128::from(ip) & mask
            }
            _ => false,
        }
    }
}

impl fmt::Display for LocalNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.network, self.prefix)
    }
}

impl FromStr for LocalNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (addr, prefix) = s
            .trim()
            .split_once('/')
            .ok_or_else(|| format!("expected CIDR notation like 192.168.1.0/24, got '{s}'"))?;
        let network: IpAddr = addr
            .parse()
            .map_err(|e| format!("invalid network address '{addr}': {e}"))?;
        let prefix: u8 = prefix
            .parse()
            .map_err(|e| format!("invalid prefix length '{prefix}': {e}"))?;
        Self::new(network, prefix)
    }
}

impl TryFrom<String> for LocalNetwork {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<LocalNetwork> for String {
    fn from(net: LocalNetwork) -> Self {
        net.to_string()
    }
}

// ── Endpoints ───────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum EndpointRole {
    Local,
    Remote,
}

/// One side of the site-to-site tunnel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelEndpoint {
    /// Key under which this endpoint's state appears in a snapshot (`hq`, `branch`).
    pub name: String,
    pub role: EndpointRole,
    pub router_ip: IpAddr,
    pub tunnel_ip: Option<IpAddr>,
    pub local_network: Option<LocalNetwork>,
    /// Representative host behind the router, used for connectivity tests.
    pub probe_host: IpAddr,
}

/// The pair of endpoints that make up the monitored tunnel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelTopology {
    pub local: TunnelEndpoint,
    pub remote: TunnelEndpoint,
}

impl TunnelTopology {
    pub fn endpoints(&self) -> [&TunnelEndpoint; 2] {
        [&self.local, &self.remote]
    }
}

impl Default for TunnelTopology {
    /// HQ/branch lab topology: routers on documentation addresses, a /30
    /// tunnel network and one /24 LAN behind each site.
    fn default() -> Self {
        let v4 = |a, b, c, d| IpAddr::V4(Ipv4Addr::new(a, b, c, d));
        Self {
            local: TunnelEndpoint {
                name: "hq".into(),
                role: EndpointRole::Local,
                router_ip: v4(203, 0, 113, 2),
                tunnel_ip: Some(v4(10, 0, 0, 1)),
                local_network: Some(LocalNetwork {
                    network: v4(192, 168, 1, 0),
                    prefix: 24,
                }),
                probe_host: v4(192, 168, 1, 10),
            },
            remote: TunnelEndpoint {
                name: "branch".into(),
                role: EndpointRole::Remote,
                router_ip: v4(203, 0, 113, 6),
                tunnel_ip: Some(v4(10, 0, 0, 2)),
                local_network: Some(LocalNetwork {
                    network: v4(192, 168, 2, 0),
                    prefix: 24,
                }),
                probe_host: v4(192, 168, 2, 10),
            },
        }
    }
}

// ── Tunnel state ────────────────────────────────────────────────────

/// Merged view of one endpoint's handshake, SA counters and interface.
///
/// Each probe fills in the fields it can see; [`merge`](Self::merge)
/// overlays them. A probe that fails sets its status to `Down` and records
/// why in `errors`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TunnelState {
    // Handshake (IKE)
    pub handshake_status: LinkStatus,
    pub peer_ip: Option<IpAddr>,
    pub encryption_alg: Option<String>,
    pub integrity_alg: Option<String>,
    pub dh_group: Option<u16>,
    pub uptime: Option<Duration>,
    pub last_rekey: Option<DateTime<Utc>>,

    // Security association (IPsec)
    pub session_status: LinkStatus,
    pub packets_in: Option<u64>,
    pub packets_out: Option<u64>,
    pub bytes_in: Option<u64>,
    pub bytes_out: Option<u64>,

    // Tunnel interface
    pub interface: Option<String>,
    pub interface_status: LinkStatus,
    pub line_protocol: LinkStatus,
    pub tunnel_ip: Option<IpAddr>,
    pub mtu: Option<u32>,
    pub bandwidth_kbps: Option<u64>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<String>,
}

fn overlay<T>(slot: &mut Option<T>, value: Option<T>) {
    if value.is_some() {
        *slot = value;
    }
}

fn overlay_status(slot: &mut LinkStatus, value: LinkStatus) {
    if value != LinkStatus::Unknown {
        *slot = value;
    }
}

impl TunnelState {
    /// Result of a handshake probe that could not complete.
    pub fn handshake_failed(error: impl fmt::Display) -> Self {
        Self {
            handshake_status: LinkStatus::Down,
            errors: vec![format!("handshake: {error}")],
            ..Self::default()
        }
    }

    /// Result of a session-counter probe that could not complete.
    pub fn session_failed(error: impl fmt::Display) -> Self {
        Self {
            session_status: LinkStatus::Down,
            errors: vec![format!("session: {error}")],
            ..Self::default()
        }
    }

    /// Result of an interface probe that could not complete.
    pub fn interface_failed(error: impl fmt::Display) -> Self {
        Self {
            interface_status: LinkStatus::Down,
            line_protocol: LinkStatus::Down,
            errors: vec![format!("interface: {error}")],
            ..Self::default()
        }
    }

    /// Overlay `other` onto `self`. Known statuses and present fields in
    /// `other` win; errors accumulate.
    pub fn merge(&mut self, other: TunnelState) {
        overlay_status(&mut self.handshake_status, other.handshake_status);
        overlay(&mut self.peer_ip, other.peer_ip);
        overlay(&mut self.encryption_alg, other.encryption_alg);
        overlay(&mut self.integrity_alg, other.integrity_alg);
        overlay(&mut self.dh_group, other.dh_group);
        overlay(&mut self.uptime, other.uptime);
        overlay(&mut self.last_rekey, other.last_rekey);

        overlay_status(&mut self.session_status, other.session_status);
        overlay(&mut self.packets_in, other.packets_in);
        overlay(&mut self.packets_out, other.packets_out);
        overlay(&mut self.bytes_in, other.bytes_in);
        overlay(&mut self.bytes_out, other.bytes_out);

        overlay(&mut self.interface, other.interface);
        overlay_status(&mut self.interface_status, other.interface_status);
        overlay_status(&mut self.line_protocol, other.line_protocol);
        overlay(&mut self.tunnel_ip, other.tunnel_ip);
        overlay(&mut self.mtu, other.mtu);
        overlay(&mut self.bandwidth_kbps, other.bandwidth_kbps);

        self.errors.extend(other.errors);
    }

    /// Handshake and security association are both up.
    pub fn is_established(&self) -> bool {
        self.handshake_status.is_up() && self.session_status.is_up()
    }

    /// Whether any detail beyond bare statuses was observed.
    pub fn has_detail(&self) -> bool {
        self.peer_ip.is_some()
            || self.encryption_alg.is_some()
            || self.integrity_alg.is_some()
            || self.dh_group.is_some()
            || self.uptime.is_some()
            || self.last_rekey.is_some()
            || self.packets_in.is_some()
            || self.packets_out.is_some()
            || self.bytes_in.is_some()
            || self.bytes_out.is_some()
            || self.interface.is_some()
            || self.tunnel_ip.is_some()
            || self.mtu.is_some()
            || self.bandwidth_kbps.is_some()
    }

    /// True when this state only records a failed probe, i.e. the router
    /// was never actually observed.
    pub fn is_probe_failure(&self) -> bool {
        !self.errors.is_empty() && !self.has_detail()
    }
}

// ── Connectivity ────────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, strum::Display, strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ConnectivityStatus {
    Success,
    Failed,
}

/// Round-trip times of a reachability test, in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoundTrip {
    pub min_ms: u32,
    pub avg_ms: u32,
    pub max_ms: u32,
}

/// Result of a reachability test between the hosts behind the two routers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectivityTest {
    pub source_ip: IpAddr,
    pub destination_ip: IpAddr,
    pub status: ConnectivityStatus,
    pub packets_sent: u32,
    pub packets_received: u32,
    pub rtt_min_ms: Option<u32>,
    pub rtt_avg_ms: Option<u32>,
    pub rtt_max_ms: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl ConnectivityTest {
    /// Build a test result from observed statistics.
    ///
    /// Success requires every packet back and a complete set of RTT samples.
    pub fn from_stats(
        source_ip: IpAddr,
        destination_ip: IpAddr,
        packets_sent: u32,
        packets_received: u32,
        rtt: Option<RoundTrip>,
    ) -> Self {
        let status = if packets_sent > 0 && packets_received == packets_sent && rtt.is_some() {
            ConnectivityStatus::Success
        } else {
            ConnectivityStatus::Failed
        };
        Self {
            source_ip,
            destination_ip,
            status,
            packets_sent,
            packets_received,
            rtt_min_ms: rtt.map(|r| r.min_ms),
            rtt_avg_ms: rtt.map(|r| r.avg_ms),
            rtt_max_ms: rtt.map(|r| r.max_ms),
            error: None,
        }
    }

    /// A test that never produced statistics.
    pub fn failed(
        source_ip: IpAddr,
        destination_ip: IpAddr,
        packets_sent: u32,
        error: impl fmt::Display,
    ) -> Self {
        Self {
            source_ip,
            destination_ip,
            status: ConnectivityStatus::Failed,
            packets_sent,
            packets_received: 0,
            rtt_min_ms: None,
            rtt_avg_ms: None,
            rtt_max_ms: None,
            error: Some(error.to_string()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == ConnectivityStatus::Success
    }

    /// Whether the test actually ran (as opposed to the probe failing).
    pub fn was_executed(&self) -> bool {
        self.error.is_none()
    }

    /// Packet loss in percent; 100 when nothing was sent.
    pub fn packet_loss_pct(&self) -> f64 {
        if self.packets_sent == 0 {
            return 100.0;
        }
        let lost = self.packets_sent.saturating_sub(self.packets_received);
        f64::from(lost) * 100.0 / f64::from(self.packets_sent)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn local_network_parse_and_contains() {
        let net: LocalNetwork = "192.168.1.0/24".parse().unwrap();
        assert!(net.contains(ip("192.168.1.10")));
        assert!(!net.contains(ip("192.168.2.10")));
        assert!(!net.contains(ip("::1")));
        assert_eq!(net.to_string(), "192.168.1.0/24");
    }

    #[test]
    fn local_network_edges() {
        let all: LocalNetwork = "0.0.0.0/0".parse().unwrap();
        assert!(all.contains(ip("8.8.8.8")));
        let host: LocalNetwork = "10.0.0.1/32".parse().unwrap();
        assert!(host.contains(ip("10.0.0.1")));
        assert!(!host.contains(ip("10.0.0.2")));
        let v6: LocalNetwork = "fd00::/8".parse().unwrap();
        assert!(v6.contains(ip("fd12::1")));
    }

    #[test]
    fn local_network_rejects_garbage() {
        assert!("192.168.1.0".parse::<LocalNetwork>().is_err());
        assert!("192.168.1.0/33".parse::<LocalNetwork>().is_err());
        assert!("not-an-ip/24".parse::<LocalNetwork>().is_err());
        assert!(serde_json::from_str::<LocalNetwork>("\"10.0.0.0/99\"").is_err());
    }

    #[test]
    fn default_topology_hosts_sit_inside_their_networks() {
        let topology = TunnelTopology::default();
        for endpoint in topology.endpoints() {
            let net = endpoint.local_network.unwrap();
            assert!(net.contains(endpoint.probe_host), "{}", endpoint.name);
        }
    }

    #[test]
    fn merge_overlays_known_values_and_keeps_errors() {
        let mut state = TunnelState {
            handshake_status: LinkStatus::Up,
            encryption_alg: Some("AES-CBC-256".into()),
            ..TunnelState::default()
        };
        state.merge(TunnelState {
            session_status: LinkStatus::Up,
            packets_in: Some(125_000),
            ..TunnelState::default()
        });
        state.merge(TunnelState::interface_failed("timed out"));

        assert_eq!(state.handshake_status, LinkStatus::Up);
        assert_eq!(state.encryption_alg.as_deref(), Some("AES-CBC-256"));
        assert_eq!(state.packets_in, Some(125_000));
        assert_eq!(state.interface_status, LinkStatus::Down);
        assert_eq!(state.errors, vec!["interface: timed out".to_owned()]);
        assert!(state.is_established());
    }

    #[test]
    fn probe_failure_detection() {
        assert!(TunnelState::handshake_failed("refused").is_probe_failure());
        // An observed-but-down handshake is data, not a failure
        let observed = TunnelState {
            handshake_status: LinkStatus::Down,
            ..TunnelState::default()
        };
        assert!(!observed.is_probe_failure());
    }

    #[test]
    fn connectivity_requires_full_delivery() {
        let rtt = Some(RoundTrip {
            min_ms: 4,
            avg_ms: 5,
            max_ms: 7,
        });
        let (src, dst) = (ip("192.168.1.10"), ip("192.168.2.10"));

        let ok = ConnectivityTest::from_stats(src, dst, 5, 5, rtt);
        assert!(ok.is_success());
        assert!(ok.packet_loss_pct().abs() < f64::EPSILON);

        let lossy = ConnectivityTest::from_stats(src, dst, 5, 3, rtt);
        assert_eq!(lossy.status, ConnectivityStatus::Failed);
        assert!((lossy.packet_loss_pct() - 40.0).abs() < f64::EPSILON);

        let no_rtt = ConnectivityTest::from_stats(src, dst, 5, 5, None);
        assert_eq!(no_rtt.status, ConnectivityStatus::Failed);

        let nothing_sent = ConnectivityTest::from_stats(src, dst, 0, 0, rtt);
        assert_eq!(nothing_sent.status, ConnectivityStatus::Failed);
    }

    #[test]
    fn failed_connectivity_records_error() {
        let test = ConnectivityTest::failed(ip("192.168.1.10"), ip("192.168.2.10"), 5, "timeout");
        assert!(!test.was_executed());
        assert_eq!(test.error.as_deref(), Some("timeout"));
        assert!((test.packet_loss_pct() - 100.0).abs() < f64::EPSILON);
    }
}
