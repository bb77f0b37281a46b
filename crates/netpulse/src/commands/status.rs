//! Status command: one fresh snapshot, summarized.

use netpulse_core::{HealthSnapshot, ResultStore, TunnelState};

use crate::backend::Aggregator;
use crate::cli::{GlobalOpts, StatusArgs};
use crate::error::CliError;
use crate::output::{self, paint_connectivity, paint_link, paint_status};

use super::util;

fn tunnel_line(state: &TunnelState, color: bool) -> String {
    let mut line = format!(
        "handshake {}, session {}, interface {}",
        paint_link(state.handshake_status, color),
        paint_link(state.session_status, color),
        paint_link(state.interface_status, color),
    );
    if let Some(uptime) = state.uptime {
        line.push_str(&format!(", up {}", util::format_duration(uptime)));
    }
    if let Some(first) = state.errors.first() {
        line.push_str(&format!(" ({first})"));
    }
    line
}

pub(crate) fn summary(s: &HealthSnapshot, color: bool) -> String {
    let mut lines = vec![
        format!("Status:       {}", paint_status(s.overall_status, color)),
        format!("Timestamp:    {}", util::format_timestamp(s.timestamp)),
        format!(
            "Controller:   {}",
            if s.controller_authenticated {
                "authenticated"
            } else {
                "not authenticated"
            }
        ),
        format!(
            "Devices:      {}",
            s.devices.as_ref().map_or_else(
                || "unavailable".into(),
                |d| {
                    let reachable = d.iter().filter(|d| d.is_reachable()).count();
                    format!("{} ({reachable} reachable)", d.len())
                }
            )
        ),
        format!(
            "Network:      {}",
            s.network_health
                .as_ref()
                .map_or_else(|| "unavailable".into(), |h| h.overall.to_string())
        ),
        format!(
            "Clients:      {}",
            s.client_health.as_ref().map_or_else(
                || "unavailable".into(),
                |c| format!(
                    "{}/{} healthy ({})",
                    c.healthy_clients, c.total_clients, c.score
                )
            )
        ),
    ];

    for (name, state) in &s.tunnel {
        lines.push(format!("Tunnel {name:<6} {}", tunnel_line(state, color)));
    }

    let c = &s.connectivity;
    let mut connectivity = format!(
        "Connectivity: {} {} -> {} ({}/{} replies",
        paint_connectivity(c.status, color),
        c.source_ip,
        c.destination_ip,
        c.packets_received,
        c.packets_sent,
    );
    if let Some(avg) = c.rtt_avg_ms {
        connectivity.push_str(&format!(", avg {avg} ms"));
    }
    connectivity.push(')');
    if let Some(error) = &c.error {
        connectivity.push_str(&format!(": {error}"));
    }
    lines.push(connectivity);

    lines.join("\n")
}

pub async fn handle(
    aggregator: &Aggregator,
    store: &ResultStore,
    args: &StatusArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = aggregator.snapshot().await;
    let color = output::should_color(&global.color);

    let out = output::render_single(
        &global.output,
        &snapshot,
        |s| summary(s, color),
        |s| s.overall_status.to_string(),
    )?;
    output::print_output(&out, global.quiet);

    if args.save {
        let path = store.save("snapshot", &snapshot)?;
        output::notice(&format!("Saved snapshot to {}", path.display()), global.quiet);
    }

    if args.fail_on_degraded && !snapshot.is_active() {
        return Err(CliError::Degraded {
            status: snapshot.overall_status,
        });
    }
    Ok(())
}
