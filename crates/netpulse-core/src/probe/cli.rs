// TunnelProbe over a CommandExecutor
//
// One show command per question, each bounded by the probe timeout. Any
// executor error, timeout or unparseable transcript turns into a `down`
// status (or a failed connectivity test) with the reason attached.

use std::net::IpAddr;

use chrono::Utc;
use tracing::{debug, warn};

use super::commands;
use super::parse;
use super::{CommandExecutor, ProbeError, TunnelProbe};
use crate::config::ProbeConfig;
use crate::model::{ConnectivityTest, TunnelState};

/// Tunnel probe that drives router CLI commands through an executor.
#[derive(Debug)]
pub struct CliTunnelProbe<E> {
    executor: E,
    config: ProbeConfig,
}

impl<E: CommandExecutor> CliTunnelProbe<E> {
    pub fn new(executor: E, config: ProbeConfig) -> Self {
        Self { executor, config }
    }

    pub fn executor(&self) -> &E {
        &self.executor
    }

    pub fn config(&self) -> &ProbeConfig {
        &self.config
    }

    /// Run one command, bounded by the probe timeout.
    async fn exec(&self, target: IpAddr, command: &str) -> Result<String, ProbeError> {
        debug!(%target, command, "running probe command");
        tokio::time::timeout(self.config.timeout, self.executor.run(target, command))
            .await
            .unwrap_or_else(|_| {
                Err(ProbeError::Timeout {
                    target,
                    command: command.to_owned(),
                    timeout_ms: self.config.timeout.as_millis(),
                })
            })
    }

    async fn exec_parsed<T>(
        &self,
        target: IpAddr,
        command: &str,
        parse: impl FnOnce(&str) -> Result<T, String> + Send,
    ) -> Result<T, ProbeError> {
        let output = self.exec(target, command).await?;
        parse(&output).map_err(|reason| ProbeError::Parse {
            command: command.to_owned(),
            reason,
        })
    }
}

impl<E: CommandExecutor> TunnelProbe for CliTunnelProbe<E> {
    async fn handshake_state(&self, router_ip: IpAddr) -> TunnelState {
        let now = Utc::now();
        match self
            .exec_parsed(router_ip, commands::IKEV2_SA, |out| parse::ikev2_sa(out, now))
            .await
        {
            Ok(state) => state,
            Err(e) => {
                warn!(%router_ip, error = %e, "handshake probe failed");
                TunnelState::handshake_failed(e)
            }
        }
    }

    async fn session_counters(&self, router_ip: IpAddr) -> TunnelState {
        let mut state = match self
            .exec_parsed(router_ip, commands::IPSEC_SA, parse::ipsec_sa)
            .await
        {
            Ok(state) => state,
            Err(e) => {
                warn!(%router_ip, error = %e, "session probe failed");
                return TunnelState::session_failed(e);
            }
        };

        // Byte counters live on the tunnel interface, not the SA
        let command = commands::show_interface(&self.config.interface);
        match self
            .exec_parsed(router_ip, &command, parse::interface_counters)
            .await
        {
            Ok(counters) => state.merge(counters),
            Err(e) => {
                warn!(%router_ip, error = %e, "interface counters unavailable");
                state.errors.push(format!("counters: {e}"));
            }
        }
        state
    }

    async fn interface_state(&self, router_ip: IpAddr) -> TunnelState {
        let command = commands::show_interface(&self.config.interface);
        match self
            .exec_parsed(router_ip, &command, parse::interface)
            .await
        {
            Ok(state) => state,
            Err(e) => {
                warn!(%router_ip, error = %e, "interface probe failed");
                TunnelState::interface_failed(e)
            }
        }
    }

    async fn probe_connectivity(
        &self,
        source_ip: IpAddr,
        destination_ip: IpAddr,
    ) -> ConnectivityTest {
        let count = self.config.ping_count;
        let command = commands::ping(destination_ip, count);
        match self.exec_parsed(source_ip, &command, parse::ping).await {
            Ok(stats) => {
                let test = ConnectivityTest::from_stats(
                    source_ip,
                    destination_ip,
                    stats.sent,
                    stats.received,
                    stats.rtt,
                );
                debug!(
                    %source_ip,
                    %destination_ip,
                    sent = stats.sent,
                    received = stats.received,
                    status = %test.status,
                    "connectivity probe finished"
                );
                test
            }
            Err(e) => {
                warn!(%source_ip, %destination_ip, error = %e, "connectivity probe failed");
                ConnectivityTest::failed(source_ip, destination_ip, count, e)
            }
        }
    }
}
