// Controller inventory and health endpoints
//
// Read-only queries: device inventory, single device, network health and
// client health. All require a session and return unwrapped payloads.

use tracing::debug;

use crate::controller::client::ControllerClient;
use crate::controller::models::{ClientHealthEntry, NetworkDevice, NetworkHealthEntry, OneOrMany};
use crate::error::Error;

impl ControllerClient {
    /// List every device in the inventory.
    ///
    /// `GET {intent}/network-device`
    pub async fn list_devices(&self) -> Result<Vec<NetworkDevice>, Error> {
        let url = self.intent_url("network-device")?;
        debug!("listing devices");
        self.get(url).await
    }

    /// Fetch a single device by its controller-assigned id.
    ///
    /// `GET {intent}/network-device/{id}`
    pub async fn get_device(&self, id: &str) -> Result<NetworkDevice, Error> {
        let mut url = self.intent_url("network-device")?;
        url.path_segments_mut()
            .map_err(|()| Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase))?
            .push(id);
        debug!(id, "fetching device");
        self.get(url).await
    }

    /// Fetch the overall network health score.
    ///
    /// `GET {intent}/network-health`
    ///
    /// Accepts a single object or a time series; the newest entry wins.
    pub async fn get_network_health(&self) -> Result<NetworkHealthEntry, Error> {
        let url = self.intent_url("network-health")?;
        debug!("fetching network health");
        let payload: OneOrMany<NetworkHealthEntry> = self.get(url).await?;
        payload.into_latest().ok_or_else(|| Error::Deserialization {
            message: "network-health response contained no entries".into(),
            body: String::new(),
        })
    }

    /// Fetch the client health summary.
    ///
    /// `GET {intent}/client-health`
    pub async fn get_client_health(&self) -> Result<ClientHealthEntry, Error> {
        let url = self.intent_url("client-health")?;
        debug!("fetching client health");
        let payload: OneOrMany<ClientHealthEntry> = self.get(url).await?;
        payload.into_latest().ok_or_else(|| Error::Deserialization {
            message: "client-health response contained no entries".into(),
            body: String::new(),
        })
    }
}
