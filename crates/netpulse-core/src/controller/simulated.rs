// In-process controller for lab and offline use.
//
// Serves a fixed sandbox inventory and health scores behind the same
// `ControllerSource` contract as the live client, including session
// handling: queries before a successful `authenticate()` fail with
// `AuthRequired`.

use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use tracing::{debug, warn};

use super::ControllerSource;
use crate::error::CoreError;
use crate::model::{
    ClientHealthScore, Device, MacAddress, NetworkHealthScore, Percentage, Reachability,
};

/// Simulated controller with configurable outages.
#[derive(Debug)]
pub struct SimulatedController {
    accept_credentials: bool,
    devices: Option<Vec<Device>>,
    network_health: Option<NetworkHealthScore>,
    client_health: Option<ClientHealthScore>,
    authenticated: AtomicBool,
    auth_calls: AtomicUsize,
}

impl Default for SimulatedController {
    fn default() -> Self {
        Self::sandbox()
    }
}

impl SimulatedController {
    /// Healthy HQ/branch lab: two routers, two switches, good scores.
    pub fn sandbox() -> Self {
        Self {
            accept_credentials: true,
            devices: Some(sandbox_devices()),
            network_health: sandbox_network_health(),
            client_health: sandbox_client_health(),
            authenticated: AtomicBool::new(false),
            auth_calls: AtomicUsize::new(0),
        }
    }

    /// Reject every authentication attempt, as with a wrong password.
    #[must_use]
    pub fn rejecting_credentials(mut self) -> Self {
        self.accept_credentials = false;
        self
    }

    /// Replace the inventory; `None` simulates an inventory outage.
    #[must_use]
    pub fn with_devices(mut self, devices: Option<Vec<Device>>) -> Self {
        self.devices = devices;
        self
    }

    /// Replace the network health; `None` simulates an outage.
    #[must_use]
    pub fn with_network_health(mut self, health: Option<NetworkHealthScore>) -> Self {
        self.network_health = health;
        self
    }

    /// Replace the client health; `None` simulates an outage.
    #[must_use]
    pub fn with_client_health(mut self, health: Option<ClientHealthScore>) -> Self {
        self.client_health = health;
        self
    }

    /// Drop the current session, as a controller-side expiry would.
    pub fn expire_session(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
    }

    /// Number of `authenticate()` calls so far.
    pub fn auth_calls(&self) -> usize {
        self.auth_calls.load(Ordering::SeqCst)
    }

    fn require_session(&self) -> Result<(), CoreError> {
        if self.authenticated.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(CoreError::AuthRequired)
        }
    }

    fn serve<T: Clone>(
        &self,
        query: &'static str,
        data: Option<&T>,
    ) -> Result<Option<T>, CoreError> {
        self.require_session()?;
        if data.is_none() {
            warn!(query, "simulated controller query unavailable");
        }
        Ok(data.cloned())
    }
}

impl ControllerSource for SimulatedController {
    async fn authenticate(&self) -> bool {
        self.auth_calls.fetch_add(1, Ordering::SeqCst);
        self.authenticated.store(self.accept_credentials, Ordering::SeqCst);
        if self.accept_credentials {
            debug!("simulated controller authenticated");
        } else {
            warn!("simulated controller rejected credentials");
        }
        self.accept_credentials
    }

    async fn list_devices(&self) -> Result<Option<Vec<Device>>, CoreError> {
        self.serve("list_devices", self.devices.as_ref())
    }

    async fn get_device(&self, id: &str) -> Result<Option<Device>, CoreError> {
        self.require_session()?;
        let Some(devices) = &self.devices else {
            warn!(query = "get_device", "simulated controller query unavailable");
            return Ok(None);
        };
        let found = devices
            .iter()
            .find(|d| d.id.as_deref() == Some(id))
            .cloned();
        if found.is_none() {
            debug!(id, "simulated device not found");
        }
        Ok(found)
    }

    async fn get_network_health(&self) -> Result<Option<NetworkHealthScore>, CoreError> {
        self.serve("get_network_health", self.network_health.as_ref())
    }

    async fn get_client_health(&self) -> Result<Option<ClientHealthScore>, CoreError> {
        self.serve("get_client_health", self.client_health.as_ref())
    }
}

// ── Sandbox data ─────────────────────────────────────────────────────

/// Hostname, type, role, management IP and software version of each lab device.
const LAB_DEVICES: [(&str, &str, &str, [u8; 4], &str); 4] = [
    ("HQ-Router", "Cisco CSR1000v", "BORDER ROUTER", [203, 0, 113, 2], "16.12.04"),
    ("Branch-Router", "Cisco CSR1000v", "BORDER ROUTER", [203, 0, 113, 6], "16.12.04"),
    ("HQ-Switch", "Cisco vIOS-L2", "ACCESS", [192, 168, 1, 1], "15.2(4)S"),
    ("Branch-Switch", "Cisco vIOS-L2", "ACCESS", [192, 168, 2, 1], "15.2(4)S"),
];

/// The four lab devices: a router and a switch at each site.
pub(crate) fn sandbox_devices() -> Vec<Device> {
    (1u8..)
        .zip(LAB_DEVICES)
        .map(|(index, (hostname, device_type, role, ip, version))| {
            let family = if role == "ACCESS" {
                "Switches and Hubs"
            } else {
                "Routers"
            };
            Device {
                id: Some(format!("device-{index}")),
                hostname: Some(hostname.to_owned()),
                device_type: Some(device_type.to_owned()),
                family: Some(family.to_owned()),
                role: Some(role.to_owned()),
                management_ip: Some(IpAddr::V4(Ipv4Addr::from(ip))),
                mac_address: Some(MacAddress::new(format!(
                    "00:50:56:12:34:{:02x}",
                    0x55 + index
                ))),
                reachability: Reachability::Reachable,
                software_version: Some(version.to_owned()),
                serial_number: None,
                uptime: None,
            }
        })
        .collect()
}

fn sandbox_network_health() -> Option<NetworkHealthScore> {
    Some(NetworkHealthScore {
        overall: Percentage::new(98.5)?,
        connectivity: Percentage::new(98.5),
        performance: Percentage::new(95.2),
        security: Percentage::new(99.1),
        availability: Percentage::new(99.8),
    })
}

fn sandbox_client_health() -> Option<ClientHealthScore> {
    Some(ClientHealthScore {
        total_clients: 15,
        healthy_clients: 14,
        unhealthy_clients: 1,
        score: Percentage::new(93.3)?,
    })
}
