//! Health aggregation core between `netpulse-api` and presentation consumers.
//!
//! This crate owns the domain model and the logic that turns two unreliable
//! backends into one consistent view of a hybrid network:
//!
//! - **[`ControllerSource`]**: capability for the network controller
//!   (device inventory, network and client health). Implemented by the live
//!   [`netpulse_api::ControllerClient`] and by [`SimulatedController`].
//!   Outages surface as `None`, never as errors, except for a missing session.
//!
//! - **[`TunnelProbe`]**: capability for site-to-site tunnel state.
//!   [`CliTunnelProbe`] drives any [`CommandExecutor`] and parses router CLI
//!   transcripts; [`ScriptedExecutor`] backs it with canned lab output.
//!
//! - **[`HealthAggregator`]**: runs both sources concurrently, merges the
//!   results into an immutable [`HealthSnapshot`] and classifies it as
//!   active, degraded or inactive. An optional [`SnapshotCache`] serves
//!   recent snapshots to interactive consumers.
//!
//! - **[`ResultStore`]**: timestamped JSON history of snapshots and exported
//!   documents.

pub mod aggregator;
pub mod cache;
pub mod config;
pub mod controller;
pub mod convert;
pub mod error;
pub mod model;
pub mod probe;
pub mod store;

// ── Primary re-exports ──────────────────────────────────────────────
pub use aggregator::{DeviceLookup, HealthAggregator};
pub use cache::SnapshotCache;
pub use config::{AggregatorConfig, ControllerConfig, ProbeConfig, TlsVerification};
pub use controller::{ControllerSource, SimulatedController};
pub use error::CoreError;
pub use probe::{CliTunnelProbe, CommandExecutor, ProbeError, ScriptedExecutor, TunnelProbe};
pub use store::{HistoryEntry, ResultStore};

// Re-export model types at the crate root for ergonomics.
pub use model::{
    ClientHealthScore, ConnectivityStatus, ConnectivityTest, Device, DeviceKey, EndpointRole,
    HealthSnapshot, LinkStatus, LocalNetwork, MacAddress, NetworkHealthScore, OverallStatus,
    Percentage, Reachability, RoundTrip, TunnelEndpoint, TunnelState, TunnelTopology,
};
