// ControllerSource over the REST client.
//
// Maps wire results into the availability contract: data, `None` for an
// outage (logged at warn), or `AuthRequired` when no session exists.

use netpulse_api::ControllerClient;
use tracing::warn;

use super::ControllerSource;
use crate::convert::dedupe_devices;
use crate::error::CoreError;
use crate::model::{ClientHealthScore, Device, NetworkHealthScore};

/// Collapse an API result into the availability contract.
fn availability<T>(
    query: &'static str,
    result: Result<T, netpulse_api::Error>,
) -> Result<Option<T>, CoreError> {
    match result {
        Ok(value) => Ok(Some(value)),
        Err(netpulse_api::Error::AuthRequired) => Err(CoreError::AuthRequired),
        Err(e) => {
            let error = CoreError::from(e);
            warn!(query, %error, "controller query unavailable");
            Ok(None)
        }
    }
}

/// Validate a converted payload; a malformed one counts as unavailable.
fn validated<T>(query: &'static str, converted: Result<T, CoreError>) -> Option<T> {
    match converted {
        Ok(value) => Some(value),
        Err(e) => {
            warn!(query, error = %e, "discarding malformed controller payload");
            None
        }
    }
}

impl ControllerSource for ControllerClient {
    async fn authenticate(&self) -> bool {
        ControllerClient::authenticate(self).await
    }

    async fn list_devices(&self) -> Result<Option<Vec<Device>>, CoreError> {
        let devices = availability("list_devices", ControllerClient::list_devices(self).await)?;
        Ok(devices.map(|raw| dedupe_devices(raw.into_iter().map(Device::from).collect())))
    }

    async fn get_device(&self, id: &str) -> Result<Option<Device>, CoreError> {
        let device = availability("get_device", ControllerClient::get_device(self, id).await)?;
        Ok(device.map(Device::from))
    }

    async fn get_network_health(&self) -> Result<Option<NetworkHealthScore>, CoreError> {
        let entry = availability(
            "get_network_health",
            ControllerClient::get_network_health(self).await,
        )?;
        Ok(entry.and_then(|e| validated("get_network_health", NetworkHealthScore::try_from(e))))
    }

    async fn get_client_health(&self) -> Result<Option<ClientHealthScore>, CoreError> {
        let entry = availability(
            "get_client_health",
            ControllerClient::get_client_health(self).await,
        )?;
        Ok(entry.and_then(|e| validated("get_client_health", ClientHealthScore::try_from(e))))
    }
}
