// ── Device domain types ──

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::IpAddr;
use std::str::FromStr;

/// MAC address, normalized to lowercase colon-separated format (aa:bb:cc:dd:ee:ff).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MacAddress(String);

impl MacAddress {
    /// Create a normalized MAC address from colon- or dash-separated input.
    pub fn new(raw: impl AsRef<str>) -> Self {
        Self(raw.as_ref().trim().to_lowercase().replace('-', ":"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for MacAddress {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for MacAddress {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self::new(s))
    }
}

/// Controller-reported reachability of a managed device.
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
pub enum Reachability {
    Reachable,
    Unreachable,
    #[default]
    Unknown,
}

impl Reachability {
    /// Lenient parse of the controller's free-form status string.
    pub fn from_controller(raw: Option<&str>) -> Self {
        raw.and_then(|s| s.trim().parse().ok()).unwrap_or_default()
    }
}

/// Identity of a device within one inventory.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum DeviceKey {
    /// Controller-assigned id.
    Id(String),
    /// Fallback when the controller omits the id.
    ManagementIp(IpAddr),
}

impl fmt::Display for DeviceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Id(id) => f.write_str(id),
            Self::ManagementIp(ip) => write!(f, "{ip}"),
        }
    }
}

/// A network device managed by the controller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: Option<String>,
    pub hostname: Option<String>,
    pub device_type: Option<String>,
    pub family: Option<String>,
    pub role: Option<String>,
    pub management_ip: Option<IpAddr>,
    pub mac_address: Option<MacAddress>,
    pub reachability: Reachability,
    pub software_version: Option<String>,
    pub serial_number: Option<String>,
    pub uptime: Option<String>,
}

impl Device {
    /// The identity key: controller id, or management IP when the id is absent.
    pub fn key(&self) -> Option<DeviceKey> {
        match (&self.id, self.management_ip) {
            (Some(id), _) => Some(DeviceKey::Id(id.clone())),
            (None, Some(ip)) => Some(DeviceKey::ManagementIp(ip)),
            (None, None) => None,
        }
    }

    /// Best human-readable label for tables and logs.
    pub fn display_name(&self) -> String {
        if let Some(hostname) = &self.hostname {
            return hostname.clone();
        }
        self.key()
            .map_or_else(|| "<unnamed>".to_owned(), |key| key.to_string())
    }

    pub fn is_reachable(&self) -> bool {
        self.reachability == Reachability::Reachable
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn bare() -> Device {
        Device {
            id: None,
            hostname: None,
            device_type: None,
            family: None,
            role: None,
            management_ip: None,
            mac_address: None,
            reachability: Reachability::Unknown,
            software_version: None,
            serial_number: None,
            uptime: None,
        }
    }

    #[test]
    fn mac_address_normalizes() {
        let mac: MacAddress = "00-50-56-AB-CD-EF".parse().unwrap();
        assert_eq!(mac.as_str(), "00:50:56:ab:cd:ef");
    }

    #[test]
    fn reachability_is_lenient() {
        assert_eq!(
            Reachability::from_controller(Some("Reachable")),
            Reachability::Reachable
        );
        assert_eq!(
            Reachability::from_controller(Some("UNREACHABLE")),
            Reachability::Unreachable
        );
        assert_eq!(
            Reachability::from_controller(Some("Ping Reachable")),
            Reachability::Unknown
        );
        assert_eq!(Reachability::from_controller(None), Reachability::Unknown);
    }

    #[test]
    fn key_prefers_id_then_management_ip() {
        let mut device = bare();
        assert_eq!(device.key(), None);

        device.management_ip = Some("192.168.1.1".parse().unwrap());
        assert_eq!(
            device.key(),
            Some(DeviceKey::ManagementIp("192.168.1.1".parse().unwrap()))
        );

        device.id = Some("device-1".into());
        assert_eq!(device.key(), Some(DeviceKey::Id("device-1".into())));
    }

    #[test]
    fn display_name_falls_back_to_key() {
        let mut device = bare();
        assert_eq!(device.display_name(), "<unnamed>");
        device.management_ip = Some("10.0.0.1".parse().unwrap());
        assert_eq!(device.display_name(), "10.0.0.1");
        device.hostname = Some("HQ-Router".into());
        assert_eq!(device.display_name(), "HQ-Router");
    }
}
