// ── Health snapshot ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::device::Device;
use super::health::{ClientHealthScore, NetworkHealthScore};
use super::tunnel::{ConnectivityTest, TunnelState};

/// Classification of a snapshot as a whole.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::Display,
    strum::EnumString,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum OverallStatus {
    /// Controller answered and the tunnel is fully up.
    Active,
    /// Partial data, or some sub-status reported a failure.
    Degraded,
    /// Neither source produced any data.
    Inactive,
}

/// Point-in-time view of the hybrid network, built by the aggregator.
///
/// `None` means the source was unavailable; an empty device list means the
/// controller answered with zero devices. Consumers must keep these apart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HealthSnapshot {
    pub timestamp: DateTime<Utc>,
    pub overall_status: OverallStatus,
    pub controller_authenticated: bool,
    pub devices: Option<Vec<Device>>,
    pub network_health: Option<NetworkHealthScore>,
    pub client_health: Option<ClientHealthScore>,
    /// Per-endpoint tunnel state, keyed by endpoint name.
    pub tunnel: BTreeMap<String, TunnelState>,
    pub connectivity: ConnectivityTest,
}

impl HealthSnapshot {
    pub fn is_active(&self) -> bool {
        self.overall_status == OverallStatus::Active
    }

    pub fn device_count(&self) -> Option<usize> {
        self.devices.as_ref().map(Vec::len)
    }
}
