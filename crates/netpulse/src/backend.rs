//! Controller backend selection.
//!
//! `ControllerBackend` is chosen once from configuration and handed to the
//! aggregator; nothing downstream knows which variant it holds.

use std::sync::Arc;

use netpulse_api::ControllerClient;
use netpulse_config::{Backend, ResolvedConfig};
use netpulse_core::{
    CliTunnelProbe, ClientHealthScore, ControllerSource, CoreError, Device, HealthAggregator,
    NetworkHealthScore, ScriptedExecutor, SimulatedController, SnapshotCache,
};

use crate::error::CliError;

/// The aggregator as wired by the CLI.
pub type Aggregator = HealthAggregator<ControllerBackend, CliTunnelProbe<ScriptedExecutor>>;

pub enum ControllerBackend {
    Live(ControllerClient),
    Simulated(SimulatedController),
}

impl ControllerBackend {
    pub fn from_config(config: &ResolvedConfig) -> Result<Self, CliError> {
        Ok(match config.backend {
            Backend::Live => Self::Live(config.controller.build_client()?),
            Backend::Simulated => Self::Simulated(SimulatedController::sandbox()),
        })
    }
}

impl ControllerSource for ControllerBackend {
    async fn authenticate(&self) -> bool {
        match self {
            Self::Live(c) => ControllerSource::authenticate(c).await,
            Self::Simulated(c) => c.authenticate().await,
        }
    }

    async fn list_devices(&self) -> Result<Option<Vec<Device>>, CoreError> {
        match self {
            Self::Live(c) => ControllerSource::list_devices(c).await,
            Self::Simulated(c) => c.list_devices().await,
        }
    }

    async fn get_device(&self, id: &str) -> Result<Option<Device>, CoreError> {
        match self {
            Self::Live(c) => ControllerSource::get_device(c, id).await,
            Self::Simulated(c) => c.get_device(id).await,
        }
    }

    async fn get_network_health(&self) -> Result<Option<NetworkHealthScore>, CoreError> {
        match self {
            Self::Live(c) => ControllerSource::get_network_health(c).await,
            Self::Simulated(c) => c.get_network_health().await,
        }
    }

    async fn get_client_health(&self) -> Result<Option<ClientHealthScore>, CoreError> {
        match self {
            Self::Live(c) => ControllerSource::get_client_health(c).await,
            Self::Simulated(c) => c.get_client_health().await,
        }
    }
}

/// Wire controller, lab tunnel probe and snapshot cache from configuration.
///
/// Tunnel state always comes from the scripted lab executor: no router
/// transport is configured.
pub fn build_aggregator(config: &ResolvedConfig) -> Result<Aggregator, CliError> {
    let controller = ControllerBackend::from_config(config)?;
    let executor = ScriptedExecutor::lab(&config.topology, &config.probe);
    let probe = CliTunnelProbe::new(executor, config.probe.clone());
    Ok(HealthAggregator::new(
        controller,
        probe,
        config.topology.clone(),
        config.aggregator.clone(),
    )
    .with_cache(Arc::new(SnapshotCache::new(config.cache_ttl))))
}
