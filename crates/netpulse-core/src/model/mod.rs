// ── Domain model ──
//
// Canonical types the aggregator produces and every consumer reads.
// Wire types from `netpulse-api` are mapped into these by `convert`.

pub mod device;
pub mod health;
pub mod snapshot;
pub mod tunnel;

pub use device::{Device, DeviceKey, MacAddress, Reachability};
pub use health::{ClientHealthScore, NetworkHealthScore, Percentage};
pub use snapshot::{HealthSnapshot, OverallStatus};
pub use tunnel::{
    ConnectivityStatus, ConnectivityTest, EndpointRole, LinkStatus, LocalNetwork, RoundTrip,
    TunnelEndpoint, TunnelState, TunnelTopology,
};
