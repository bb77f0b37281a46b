//! Tunnel command: per-endpoint IPsec state and the connectivity test.

use std::collections::BTreeMap;

use serde::Serialize;
use tabled::Tabled;

use netpulse_core::{ConnectivityTest, TunnelState};

use crate::backend::Aggregator;
use crate::cli::GlobalOpts;
use crate::error::CliError;
use crate::output::{self, or_dash, paint_connectivity, paint_link};

use super::util;

#[derive(Serialize)]
struct TunnelReport<'a> {
    tunnel: &'a BTreeMap<String, TunnelState>,
    connectivity: &'a ConnectivityTest,
}

#[derive(Tabled)]
struct EndpointRow {
    #[tabled(rename = "Endpoint")]
    name: String,
    #[tabled(rename = "Handshake")]
    handshake: String,
    #[tabled(rename = "Session")]
    session: String,
    #[tabled(rename = "Interface")]
    interface: String,
    #[tabled(rename = "Peer")]
    peer: String,
    #[tabled(rename = "Cipher")]
    cipher: String,
    #[tabled(rename = "Uptime")]
    uptime: String,
    #[tabled(rename = "Pkts in/out")]
    packets: String,
}

impl EndpointRow {
    fn new(name: &str, s: &TunnelState, color: bool) -> Self {
        Self {
            name: name.to_owned(),
            handshake: paint_link(s.handshake_status, color),
            session: paint_link(s.session_status, color),
            interface: paint_link(s.interface_status, color),
            peer: or_dash(s.peer_ip),
            cipher: match (&s.encryption_alg, &s.integrity_alg) {
                (Some(enc), Some(int)) => format!("{enc}/{int}"),
                (Some(enc), None) => enc.clone(),
                _ => "-".into(),
            },
            uptime: or_dash(s.uptime.map(util::format_duration)),
            packets: format!("{}/{}", or_dash(s.packets_in), or_dash(s.packets_out)),
        }
    }
}

fn detail(r: &TunnelReport<'_>, color: bool) -> String {
    let rows: Vec<EndpointRow> = r
        .tunnel
        .iter()
        .map(|(name, state)| EndpointRow::new(name, state, color))
        .collect();
    let mut lines = vec![output::render_table(&rows)];

    for (name, state) in r.tunnel {
        for error in &state.errors {
            lines.push(format!("{name}: {error}"));
        }
    }

    let c = r.connectivity;
    lines.push(format!(
        "Connectivity {} -> {}: {} ({}/{} replies, {:.0}% loss, rtt {}/{}/{} ms)",
        c.source_ip,
        c.destination_ip,
        paint_connectivity(c.status, color),
        c.packets_received,
        c.packets_sent,
        c.packet_loss_pct(),
        or_dash(c.rtt_min_ms),
        or_dash(c.rtt_avg_ms),
        or_dash(c.rtt_max_ms),
    ));
    if let Some(error) = &c.error {
        lines.push(format!("  {error}"));
    }
    lines.join("\n")
}

fn plain(r: &TunnelReport<'_>) -> String {
    r.tunnel
        .iter()
        .map(|(name, s)| format!("{name} {}", s.handshake_status))
        .chain(std::iter::once(format!(
            "connectivity {}",
            r.connectivity.status
        )))
        .collect::<Vec<_>>()
        .join("\n")
}

pub async fn handle(aggregator: &Aggregator, global: &GlobalOpts) -> Result<(), CliError> {
    let snapshot = aggregator.current().await;
    let color = output::should_color(&global.color);
    let report = TunnelReport {
        tunnel: &snapshot.tunnel,
        connectivity: &snapshot.connectivity,
    };
    let out = output::render_single(&global.output, &report, |r| detail(r, color), plain)?;
    output::print_output(&out, global.quiet);
    Ok(())
}
