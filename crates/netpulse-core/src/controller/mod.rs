// ── Controller capability ──
//
// `ControllerSource` is what the aggregator needs from a network
// controller. The live REST client and the simulated sandbox both
// implement it, so backend selection never branches inside the
// aggregation logic.

mod live;
pub(crate) mod simulated;

use std::future::Future;

use crate::error::CoreError;
use crate::model::{ClientHealthScore, Device, NetworkHealthScore};

pub use simulated::SimulatedController;

/// Read-only access to a network controller.
///
/// Query methods return `Ok(None)` when the source is unavailable
/// (transport error, non-success status, malformed payload) and
/// `Ok(Some(_))` with possibly-empty data on success. The only error is
/// [`CoreError::AuthRequired`]: no session exists and only
/// [`authenticate`](Self::authenticate) can fix that.
pub trait ControllerSource: Send + Sync {
    /// Exchange credentials for a session. Never fails; `false` leaves
    /// no usable session behind.
    fn authenticate(&self) -> impl Future<Output = bool> + Send;

    fn list_devices(&self) -> impl Future<Output = Result<Option<Vec<Device>>, CoreError>> + Send;

    fn get_device(&self, id: &str)
    -> impl Future<Output = Result<Option<Device>, CoreError>> + Send;

    fn get_network_health(
        &self,
    ) -> impl Future<Output = Result<Option<NetworkHealthScore>, CoreError>> + Send;

    fn get_client_health(
        &self,
    ) -> impl Future<Output = Result<Option<ClientHealthScore>, CoreError>> + Send;
}
