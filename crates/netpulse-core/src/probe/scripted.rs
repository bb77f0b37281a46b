// Scripted command executor
//
// Answers probe commands from a table of canned transcripts keyed by
// (target, command). Backs the simulated backend and every probe test;
// no router is ever contacted.

use std::collections::{HashMap, HashSet, VecDeque};
use std::net::{IpAddr, Ipv4Addr};
use std::sync::{Mutex, PoisonError};

use tracing::trace;

use super::{CommandExecutor, ProbeError, commands, transcripts};
use crate::config::ProbeConfig;
use crate::model::TunnelTopology;

/// Most recent calls kept by [`ScriptedExecutor::calls`]; a long-running
/// simulated backend would otherwise grow the log forever.
const CALL_LOG_LIMIT: usize = 256;

#[derive(Debug, Clone)]
enum Reply {
    Output(String),
    Fail(String),
    Stall,
}

/// `CommandExecutor` that replays canned transcripts.
///
/// Unscripted commands fail with `CommandFailed`; targets marked
/// unreachable fail every command.
#[derive(Debug, Default)]
pub struct ScriptedExecutor {
    replies: HashMap<(IpAddr, String), Reply>,
    unreachable: HashSet<IpAddr>,
    calls: Mutex<VecDeque<(IpAddr, String)>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// A healthy HQ/branch lab: handshake `READY`, SAs `ACTIVE`, tunnel
    /// interfaces up and a loss-free ping between the probe hosts.
    pub fn lab(topology: &TunnelTopology, config: &ProbeConfig) -> Self {
        let mut executor = Self::new();
        let interface = commands::show_interface(&config.interface);
        let pairs = [
            (&topology.local, &topology.remote),
            (&topology.remote, &topology.local),
        ];

        for (endpoint, peer) in pairs {
            let router = endpoint.router_ip;
            let tunnel_ip = endpoint
                .tunnel_ip
                .unwrap_or(IpAddr::V4(Ipv4Addr::UNSPECIFIED));
            executor = executor
                .respond(
                    router,
                    commands::IKEV2_SA,
                    transcripts::ikev2_sa(router, peer.router_ip, "READY"),
                )
                .respond(
                    router,
                    commands::IPSEC_SA,
                    transcripts::ipsec_sa(router, peer.router_ip, 125_000, "ACTIVE"),
                )
                .respond(
                    router,
                    interface.clone(),
                    transcripts::interface(
                        &config.interface,
                        "up",
                        tunnel_ip,
                        router,
                        peer.router_ip,
                        125_000,
                    ),
                )
                .respond(
                    endpoint.probe_host,
                    commands::ping(peer.probe_host, config.ping_count),
                    transcripts::ping(
                        peer.probe_host,
                        config.ping_count,
                        config.ping_count,
                        Some((4, 5, 7)),
                    ),
                );
        }
        executor
    }

    /// Answer `command` on `target` with `output`.
    #[must_use]
    pub fn respond(
        mut self,
        target: IpAddr,
        command: impl Into<String>,
        output: impl Into<String>,
    ) -> Self {
        self.replies
            .insert((target, command.into()), Reply::Output(output.into()));
        self
    }

    /// Fail `command` on `target` with `reason`.
    #[must_use]
    pub fn fail(
        mut self,
        target: IpAddr,
        command: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        self.replies
            .insert((target, command.into()), Reply::Fail(reason.into()));
        self
    }

    /// Never answer `command` on `target`.
    #[must_use]
    pub fn stall(mut self, target: IpAddr, command: impl Into<String>) -> Self {
        self.replies.insert((target, command.into()), Reply::Stall);
        self
    }

    /// Fail every command sent to `target`.
    #[must_use]
    pub fn unreachable(mut self, target: IpAddr) -> Self {
        self.unreachable.insert(target);
        self
    }

    /// The most recent (target, command) pairs run, oldest first.
    pub fn calls(&self) -> Vec<(IpAddr, String)> {
        self.calls
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .cloned()
            .collect()
    }
}

impl CommandExecutor for ScriptedExecutor {
    async fn run(&self, target: IpAddr, command: &str) -> Result<String, ProbeError> {
        trace!(%target, command, "scripted command");
        {
            let mut calls = self.calls.lock().unwrap_or_else(PoisonError::into_inner);
            if calls.len() == CALL_LOG_LIMIT {
                calls.pop_front();
            }
            calls.push_back((target, command.to_owned()));
        }

        if self.unreachable.contains(&target) {
            return Err(ProbeError::Unreachable {
                target,
                reason: "no route to host".into(),
            });
        }

        let reply = self.replies.get(&(target, command.to_owned())).cloned();
        match reply {
            Some(Reply::Output(output)) => Ok(output),
            Some(Reply::Fail(reason)) => Err(ProbeError::CommandFailed {
                target,
                command: command.to_owned(),
                reason,
            }),
            Some(Reply::Stall) => std::future::pending().await,
            None => Err(ProbeError::CommandFailed {
                target,
                command: command.to_owned(),
                reason: "no scripted response".into(),
            }),
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn replays_and_records() {
        let target: IpAddr = "203.0.113.2".parse().unwrap();
        let executor = ScriptedExecutor::new().respond(target, "show version", "IOS XE");

        assert_eq!(executor.run(target, "show version").await.unwrap(), "IOS XE");
        assert!(matches!(
            executor.run(target, "show clock").await,
            Err(ProbeError::CommandFailed { .. })
        ));
        assert_eq!(executor.calls().len(), 2);
    }

    #[tokio::test]
    async fn call_log_keeps_only_recent_calls() {
        let target: IpAddr = "203.0.113.2".parse().unwrap();
        let executor = ScriptedExecutor::new().respond(target, "show version", "IOS XE");

        for _ in 0..CALL_LOG_LIMIT * 3 {
            executor.run(target, "show version").await.unwrap();
        }
        executor.run(target, "show clock").await.unwrap_err();

        let calls = executor.calls();
        assert_eq!(calls.len(), CALL_LOG_LIMIT);
        assert_eq!(calls.last().unwrap().1, "show clock");
        assert_eq!(calls.first().unwrap().1, "show version");
    }

    #[tokio::test]
    async fn lab_covers_both_routers() {
        let topology = TunnelTopology::default();
        let executor = ScriptedExecutor::lab(&topology, &ProbeConfig::default());
        for endpoint in topology.endpoints() {
            let output = executor
                .run(endpoint.router_ip, commands::IKEV2_SA)
                .await
                .unwrap();
            assert!(output.contains("READY"));
        }
    }
}
