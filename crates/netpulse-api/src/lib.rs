// netpulse-api: async client for network-controller REST APIs.
//
// Token-based session auth, device inventory and health score endpoints.
// Everything here speaks wire types; `netpulse-core` maps them into the
// domain model and decides what an outage means for a snapshot.

pub mod auth;
pub mod controller;
pub mod error;
pub mod transport;

pub use auth::{ControllerPlatform, Credentials};
pub use controller::client::ControllerClient;
pub use controller::models;
pub use error::Error;
pub use transport::{TlsMode, TransportConfig};
