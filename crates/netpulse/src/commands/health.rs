//! Health command: controller network and client scores.

use chrono::{DateTime, Utc};
use serde::Serialize;

use netpulse_config::ResolvedConfig;
use netpulse_core::{ClientHealthScore, NetworkHealthScore, ResultStore};

use crate::backend::Aggregator;
use crate::cli::{GlobalOpts, HealthArgs};
use crate::error::CliError;
use crate::output::{self, or_dash};

use super::util;

#[derive(Serialize)]
struct HealthReport {
    timestamp: DateTime<Utc>,
    network_health: Option<NetworkHealthScore>,
    client_health: Option<ClientHealthScore>,
}

fn detail(r: &HealthReport) -> String {
    let mut lines = vec![format!(
        "Timestamp:     {}",
        util::format_timestamp(r.timestamp)
    )];
    match &r.network_health {
        Some(n) => lines.extend([
            format!("Overall:       {}", n.overall),
            format!("Connectivity:  {}", or_dash(n.connectivity)),
            format!("Performance:   {}", or_dash(n.performance)),
            format!("Security:      {}", or_dash(n.security)),
            format!("Availability:  {}", or_dash(n.availability)),
        ]),
        None => lines.push("Network:       unavailable".into()),
    }
    match &r.client_health {
        Some(c) => lines.extend([
            format!("Clients:       {}", c.total_clients),
            format!("  healthy:     {}", c.healthy_clients),
            format!("  unhealthy:   {}", c.unhealthy_clients),
            format!("Client score:  {}", c.score),
        ]),
        None => lines.push("Clients:       unavailable".into()),
    }
    lines.join("\n")
}

fn plain(r: &HealthReport) -> String {
    [
        or_dash(r.network_health.as_ref().map(|n| n.overall.value())),
        or_dash(r.client_health.as_ref().map(|c| c.score.value())),
    ]
    .join("\n")
}

pub async fn handle(
    aggregator: &Aggregator,
    store: &ResultStore,
    config: &ResolvedConfig,
    args: &HealthArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshot = aggregator.current().await;
    if snapshot.network_health.is_none() && snapshot.client_health.is_none() {
        return Err(util::controller_missing(&snapshot, config, "health scores"));
    }

    let report = HealthReport {
        timestamp: snapshot.timestamp,
        network_health: snapshot.network_health,
        client_health: snapshot.client_health,
    };
    let out = output::render_single(&global.output, &report, detail, plain)?;
    output::print_output(&out, global.quiet);

    if args.export {
        if let Some(network) = &report.network_health {
            let path = store.save_document("network_health", network, report.timestamp)?;
            output::notice(
                &format!("Exported network health to {}", path.display()),
                global.quiet,
            );
        }
        if let Some(clients) = &report.client_health {
            let path = store.save_document("client_health", clients, report.timestamp)?;
            output::notice(
                &format!("Exported client health to {}", path.display()),
                global.quiet,
            );
        }
    }
    Ok(())
}
