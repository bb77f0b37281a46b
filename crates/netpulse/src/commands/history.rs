//! History command: saved snapshots and exports, newest first.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::Tabled;
use tracing::warn;

use netpulse_core::{OverallStatus, ResultStore};

use crate::cli::{GlobalOpts, HistoryArgs, OutputFormat};
use crate::error::CliError;
use crate::output::{self, or_dash};

use super::util;

/// Namespace written by `status --save`.
const SNAPSHOT_NAMESPACE: &str = "snapshot";

#[derive(Serialize)]
struct HistoryItem {
    timestamp: DateTime<Utc>,
    path: String,
    /// Only for snapshots; `None` when unreadable.
    #[serde(skip_serializing_if = "Option::is_none")]
    status: Option<OverallStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    devices: Option<usize>,
}

#[derive(Tabled)]
struct HistoryRow {
    #[tabled(rename = "Timestamp")]
    timestamp: String,
    #[tabled(rename = "Status")]
    status: String,
    #[tabled(rename = "Devices")]
    devices: String,
    #[tabled(rename = "Path")]
    path: String,
}

impl From<&HistoryItem> for HistoryRow {
    fn from(item: &HistoryItem) -> Self {
        Self {
            timestamp: util::format_timestamp(item.timestamp),
            status: or_dash(item.status),
            devices: or_dash(item.devices),
            path: item.path.clone(),
        }
    }
}

pub fn handle(
    store: &ResultStore,
    args: &HistoryArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    let snapshots = args.namespace == SNAPSHOT_NAMESPACE;
    let items: Vec<HistoryItem> = store
        .entries(&args.namespace)?
        .into_iter()
        .take(args.limit)
        .map(|entry| {
            let mut item = HistoryItem {
                timestamp: entry.timestamp,
                path: entry.path.display().to_string(),
                status: None,
                devices: None,
            };
            if snapshots {
                match entry.load() {
                    Ok(snapshot) => {
                        item.status = Some(snapshot.overall_status);
                        item.devices = snapshot.device_count();
                    }
                    Err(e) => warn!(path = %item.path, error = %e, "unreadable snapshot"),
                }
            }
            item
        })
        .collect();

    if items.is_empty() && matches!(global.output, OutputFormat::Table) {
        output::notice(
            &format!(
                "No '{}' entries in {}",
                args.namespace,
                store.root().display()
            ),
            global.quiet,
        );
        return Ok(());
    }

    let out = output::render_list(
        &global.output,
        &items,
        |i| HistoryRow::from(i),
        |i| i.path.clone(),
    )?;
    output::print_output(&out, global.quiet);
    Ok(())
}
