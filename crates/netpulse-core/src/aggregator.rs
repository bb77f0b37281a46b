// ── Health aggregator ──
//
// Combines the controller and the tunnel probe into one snapshot. The two
// phases run concurrently and never abort each other: each source's
// failure only shows up as missing or `down` data and a demoted status.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::Utc;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::cache::SnapshotCache;
use crate::config::AggregatorConfig;
use crate::controller::ControllerSource;
use crate::error::CoreError;
use crate::model::{
    ClientHealthScore, ConnectivityTest, Device, HealthSnapshot, NetworkHealthScore,
    OverallStatus, TunnelEndpoint, TunnelState, TunnelTopology,
};
use crate::probe::TunnelProbe;

/// What the controller phase produced.
#[derive(Debug, Clone, Default)]
pub(crate) struct ControllerReport {
    pub authenticated: bool,
    pub devices: Option<Vec<Device>>,
    pub network_health: Option<NetworkHealthScore>,
    pub client_health: Option<ClientHealthScore>,
}

impl ControllerReport {
    /// Every controller query answered.
    fn is_complete(&self) -> bool {
        self.authenticated
            && self.devices.is_some()
            && self.network_health.is_some()
            && self.client_health.is_some()
    }

    /// At least one controller query answered.
    fn has_data(&self) -> bool {
        self.devices.is_some() || self.network_health.is_some() || self.client_health.is_some()
    }
}

/// What the tunnel phase produced.
#[derive(Debug, Clone)]
pub(crate) struct TunnelReport {
    pub states: BTreeMap<String, TunnelState>,
    pub connectivity: ConnectivityTest,
    /// At least one probe command got an answer from a router.
    pub reached: bool,
}

impl TunnelReport {
    fn is_healthy(&self) -> bool {
        !self.states.is_empty()
            && self.states.values().all(TunnelState::is_established)
            && self.connectivity.is_success()
    }

    fn has_data(&self) -> bool {
        self.reached || self.connectivity.was_executed()
    }
}

/// Classify a snapshot from its two phases.
///
/// - `Active`: the controller answered every query, both endpoints have
///   handshake and SA up, and the connectivity test succeeded.
/// - `Inactive`: neither source produced any data.
/// - `Degraded`: anything in between.
pub(crate) fn classify(controller: &ControllerReport, tunnel: &TunnelReport) -> OverallStatus {
    if controller.is_complete() && tunnel.is_healthy() {
        OverallStatus::Active
    } else if !controller.has_data() && !tunnel.has_data() {
        OverallStatus::Inactive
    } else {
        OverallStatus::Degraded
    }
}

/// Outcome of [`HealthAggregator::device`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceLookup {
    Found(Device),
    /// The controller answered and has no device with that id.
    Missing,
    /// The controller could not be asked; `authenticated` is false when
    /// no session was obtained.
    Unavailable { authenticated: bool },
}

/// Keep data, drop errors with a warning.
fn settle<T>(query: &'static str, result: Result<Option<T>, CoreError>) -> Option<T> {
    match result {
        Ok(value) => value,
        Err(e) => {
            warn!(query, error = %e, "controller query failed");
            None
        }
    }
}

/// Orchestrates one controller and one tunnel probe.
///
/// Cheap to share behind an `Arc`: concurrent `snapshot()` calls are
/// safe, and session refresh is serialized so one call never invalidates
/// another's in-flight token.
pub struct HealthAggregator<C, P> {
    controller: C,
    probe: P,
    topology: TunnelTopology,
    config: AggregatorConfig,
    cache: Option<Arc<SnapshotCache>>,
    session_guard: Mutex<()>,
}

impl<C: ControllerSource, P: TunnelProbe> HealthAggregator<C, P> {
    pub fn new(
        controller: C,
        probe: P,
        topology: TunnelTopology,
        config: AggregatorConfig,
    ) -> Self {
        Self {
            controller,
            probe,
            topology,
            config,
            cache: None,
            session_guard: Mutex::new(()),
        }
    }

    /// Serve [`current`](Self::current) from `cache`.
    #[must_use]
    pub fn with_cache(mut self, cache: Arc<SnapshotCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn controller(&self) -> &C {
        &self.controller
    }

    pub fn probe(&self) -> &P {
        &self.probe
    }

    pub fn topology(&self) -> &TunnelTopology {
        &self.topology
    }

    pub fn cache(&self) -> Option<&Arc<SnapshotCache>> {
        self.cache.as_ref()
    }

    /// Compute a fresh snapshot. Never fails: outages degrade the status.
    pub async fn snapshot(&self) -> HealthSnapshot {
        let (controller, tunnel) = tokio::join!(self.gather_controller(), self.gather_tunnel());
        let overall_status = classify(&controller, &tunnel);

        info!(
            status = %overall_status,
            authenticated = controller.authenticated,
            devices = ?controller.devices.as_ref().map(Vec::len),
            connectivity = %tunnel.connectivity.status,
            "health snapshot complete"
        );

        HealthSnapshot {
            timestamp: Utc::now(),
            overall_status,
            controller_authenticated: controller.authenticated,
            devices: controller.devices,
            network_health: controller.network_health,
            client_health: controller.client_health,
            tunnel: tunnel.states,
            connectivity: tunnel.connectivity,
        }
    }

    /// The cached snapshot when fresh, otherwise a new one (which is cached).
    pub async fn current(&self) -> Arc<HealthSnapshot> {
        if let Some(hit) = self.cache.as_ref().and_then(|c| c.get()) {
            debug!("serving cached snapshot");
            return hit;
        }
        let snapshot = self.snapshot().await;
        match &self.cache {
            Some(cache) => cache.insert(snapshot),
            None => Arc::new(snapshot),
        }
    }

    /// Look up one device, authenticating first.
    ///
    /// A failed `get_device` is ambiguous between an outage and an unknown
    /// id, so the inventory is consulted before reporting `Missing`.
    pub async fn device(&self, id: &str) -> DeviceLookup {
        let _guard = self.session_guard.lock().await;
        if !self.authenticate().await {
            return DeviceLookup::Unavailable {
                authenticated: false,
            };
        }
        if let Some(device) = settle("get_device", self.controller.get_device(id).await) {
            return DeviceLookup::Found(device);
        }
        match self.controller.list_devices().await {
            Ok(Some(_)) => {
                debug!(id, "device not in inventory");
                DeviceLookup::Missing
            }
            Ok(None) => DeviceLookup::Unavailable {
                authenticated: true,
            },
            Err(e) => {
                warn!(id, error = %e, "inventory unavailable for device lookup");
                DeviceLookup::Unavailable {
                    authenticated: !matches!(e, CoreError::AuthRequired),
                }
            }
        }
    }

    // ── Phases ───────────────────────────────────────────────────────

    async fn authenticate(&self) -> bool {
        let attempts = self.config.auth_attempts.max(1);
        for attempt in 1..=attempts {
            if self.controller.authenticate().await {
                return true;
            }
            if attempt < attempts {
                debug!(attempt, attempts, "authentication failed, backing off");
                tokio::time::sleep(self.config.auth_backoff).await;
            }
        }
        warn!(attempts, "controller authentication failed, continuing without it");
        false
    }

    async fn gather_controller(&self) -> ControllerReport {
        // Held for the whole phase so a concurrent refresh cannot swap the
        // token out from under these queries.
        let _guard = self.session_guard.lock().await;

        if !self.authenticate().await {
            return ControllerReport::default();
        }

        // Independent queries: one outage never blocks the others
        let devices = settle("list_devices", self.controller.list_devices().await);
        let network_health = settle(
            "get_network_health",
            self.controller.get_network_health().await,
        );
        let client_health = settle(
            "get_client_health",
            self.controller.get_client_health().await,
        );

        ControllerReport {
            authenticated: true,
            devices,
            network_health,
            client_health,
        }
    }

    async fn probe_endpoint(&self, endpoint: &TunnelEndpoint) -> (TunnelState, bool) {
        let router = endpoint.router_ip;
        let parts = [
            self.probe.handshake_state(router).await,
            self.probe.session_counters(router).await,
            self.probe.interface_state(router).await,
        ];
        let reached = parts.iter().any(|p| !p.is_probe_failure());

        let mut state = TunnelState::default();
        for part in parts {
            state.merge(part);
        }
        debug!(
            endpoint = %endpoint.name,
            established = state.is_established(),
            "endpoint probed"
        );
        (state, reached)
    }

    async fn gather_tunnel(&self) -> TunnelReport {
        let mut states = BTreeMap::new();
        let mut reached = false;
        for endpoint in self.topology.endpoints() {
            let (state, endpoint_reached) = self.probe_endpoint(endpoint).await;
            reached |= endpoint_reached;
            states.insert(endpoint.name.clone(), state);
        }

        let connectivity = self
            .probe
            .probe_connectivity(
                self.topology.local.probe_host,
                self.topology.remote.probe_host,
            )
            .await;

        TunnelReport {
            states,
            connectivity,
            reached,
        }
    }
}

impl<C, P> std::fmt::Debug for HealthAggregator<C, P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HealthAggregator")
            .field("topology", &self.topology)
            .field("config", &self.config)
            .field("cache", &self.cache)
            .finish_non_exhaustive()
    }
}
