// ── API-to-domain type conversions ──
//
// Bridges raw controller responses into canonical domain types.
// Devices convert infallibly (missing fields stay `None`); health entries
// are validated because out-of-range scores are a malformed response.

use std::collections::HashSet;
use std::net::IpAddr;

use netpulse_api::models::{
    ClientHealthEntry, ClientScoreDetail, NetworkDevice, NetworkHealthEntry,
};
use tracing::debug;

use crate::error::CoreError;
use crate::model::{
    ClientHealthScore, Device, MacAddress, NetworkHealthScore, Percentage, Reachability,
};

// ── Helpers ──────────────────────────────────────────────────────────

/// Parse an optional IP string, dropping blanks and garbage.
fn parse_ip(raw: Option<&str>) -> Option<IpAddr> {
    raw.map(str::trim)
        .filter(|s| !s.is_empty())
        .and_then(|s| s.parse().ok())
}

/// Drop empty strings, which some controllers use instead of null.
fn non_empty(raw: Option<String>) -> Option<String> {
    raw.filter(|s| !s.trim().is_empty())
}

fn percentage(field: &str, value: Option<f64>) -> Result<Percentage, CoreError> {
    let value = value.ok_or_else(|| CoreError::malformed(format!("missing {field} score")))?;
    Percentage::new(value).ok_or_else(|| {
        CoreError::malformed(format!("{field} score out of range [0, 100]: {value}"))
    })
}

fn optional_percentage(field: &str, value: Option<f64>) -> Result<Option<Percentage>, CoreError> {
    value.map(|v| percentage(field, Some(v))).transpose()
}

// ── Device ───────────────────────────────────────────────────────────

impl From<NetworkDevice> for Device {
    fn from(d: NetworkDevice) -> Self {
        Device {
            id: non_empty(d.id),
            hostname: non_empty(d.hostname),
            device_type: non_empty(d.device_type).or_else(|| non_empty(d.platform_id)),
            family: non_empty(d.family),
            role: non_empty(d.role),
            management_ip: parse_ip(d.management_ip_address.as_deref()),
            mac_address: non_empty(d.mac_address).map(MacAddress::new),
            reachability: Reachability::from_controller(d.reachability_status.as_deref()),
            software_version: non_empty(d.software_version),
            serial_number: non_empty(d.serial_number),
            uptime: non_empty(d.up_time),
        }
    }
}

/// Remove repeated devices by identity key, keeping the first occurrence
/// and the controller's ordering. Devices without any key are kept as-is.
pub fn dedupe_devices(devices: Vec<Device>) -> Vec<Device> {
    let before = devices.len();
    let mut seen = HashSet::new();
    let devices: Vec<Device> = devices
        .into_iter()
        .filter(|device| device.key().is_none_or(|key| seen.insert(key)))
        .collect();
    if devices.len() != before {
        debug!(
            dropped = before - devices.len(),
            "dropped duplicate devices from inventory"
        );
    }
    devices
}

// ── Health ───────────────────────────────────────────────────────────

impl TryFrom<NetworkHealthEntry> for NetworkHealthScore {
    type Error = CoreError;

    fn try_from(entry: NetworkHealthEntry) -> Result<Self, Self::Error> {
        Ok(NetworkHealthScore {
            overall: percentage("overall", entry.overall_health_score)?,
            connectivity: optional_percentage("connectivity", entry.connectivity)?,
            performance: optional_percentage("performance", entry.performance)?,
            security: optional_percentage("security", entry.security)?,
            availability: optional_percentage("availability", entry.availability)?,
        })
    }
}

impl TryFrom<ClientHealthEntry> for ClientHealthScore {
    type Error = CoreError;

    fn try_from(entry: ClientHealthEntry) -> Result<Self, Self::Error> {
        if entry.total_clients.is_none() {
            let all = entry
                .score_detail
                .as_deref()
                .unwrap_or_default()
                .iter()
                .find(|d| d.category_value() == Some("ALL"));
            if let Some(all) = all {
                return client_health_from_detail(all);
            }
        }

        let total_clients = entry
            .total_clients
            .ok_or_else(|| CoreError::malformed("missing totalClients"))?;
        let healthy_clients = entry.healthy_clients.unwrap_or(0);
        let unhealthy_clients = entry
            .unhealthy_clients
            .unwrap_or_else(|| total_clients.saturating_sub(healthy_clients));
        let score = optional_percentage("client", entry.health_score)?;

        client_health(total_clients, healthy_clients, unhealthy_clients, score)
    }
}

/// Catalyst Center layout: the `ALL` node carries the total and the score,
/// the `GOOD`/`FAIR`/`POOR` bands beneath it carry the split.
fn client_health_from_detail(all: &ClientScoreDetail) -> Result<ClientHealthScore, CoreError> {
    let total_clients = all
        .client_count
        .ok_or_else(|| CoreError::malformed("missing clientCount for ALL clients"))?;

    let (mut healthy_clients, mut unhealthy_clients) = (0_u64, 0_u64);
    let mut pending: Vec<&ClientScoreDetail> = all.children().iter().collect();
    while let Some(node) = pending.pop() {
        let count = node.client_count.unwrap_or(0);
        match node.category_value() {
            Some("GOOD") => healthy_clients = healthy_clients.saturating_add(count),
            Some("FAIR" | "POOR") => unhealthy_clients = unhealthy_clients.saturating_add(count),
            _ => pending.extend(node.children()),
        }
    }

    // -1 means no data; fall back to the counts
    let score = all.score_value.and_then(Percentage::new);
    client_health(total_clients, healthy_clients, unhealthy_clients, score)
}

fn client_health(
    total_clients: u64,
    healthy_clients: u64,
    unhealthy_clients: u64,
    score: Option<Percentage>,
) -> Result<ClientHealthScore, CoreError> {
    if healthy_clients.saturating_add(unhealthy_clients) > total_clients {
        return Err(CoreError::malformed(format!(
            "client counts exceed total: {healthy_clients} healthy + \
             {unhealthy_clients} unhealthy > {total_clients}"
        )));
    }

    let score = match score {
        Some(score) => score,
        None => ClientHealthScore::derived_score(healthy_clients, total_clients)
            .ok_or_else(|| CoreError::malformed("cannot derive client score"))?,
    };

    Ok(ClientHealthScore {
        total_clients,
        healthy_clients,
        unhealthy_clients,
        score,
    })
}
