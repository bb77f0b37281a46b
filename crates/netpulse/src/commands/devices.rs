//! Device command handlers.

use tabled::Tabled;

use netpulse_config::ResolvedConfig;
use netpulse_core::{Device, DeviceLookup, ResultStore};

use crate::backend::Aggregator;
use crate::cli::{DevicesArgs, DevicesCommand, GlobalOpts};
use crate::error::CliError;
use crate::output::{self, or_dash};

use super::util;

// ── Table row ───────────────────────────────────────────────────────

#[derive(Tabled)]
struct DeviceRow {
    #[tabled(rename = "Hostname")]
    hostname: String,
    #[tabled(rename = "Type")]
    dtype: String,
    #[tabled(rename = "Management IP")]
    ip: String,
    #[tabled(rename = "MAC")]
    mac: String,
    #[tabled(rename = "Reachability")]
    reachability: String,
    #[tabled(rename = "Version")]
    version: String,
    #[tabled(rename = "ID")]
    id: String,
}

impl From<&Device> for DeviceRow {
    fn from(d: &Device) -> Self {
        Self {
            hostname: d.display_name(),
            dtype: or_dash(d.device_type.as_deref()),
            ip: or_dash(d.management_ip),
            mac: or_dash(d.mac_address.as_ref()),
            reachability: d.reachability.to_string(),
            version: or_dash(d.software_version.as_deref()),
            id: or_dash(d.id.as_deref()),
        }
    }
}

fn detail(d: &Device) -> String {
    [
        format!("Hostname:     {}", d.display_name()),
        format!("ID:           {}", or_dash(d.id.as_deref())),
        format!("Type:         {}", or_dash(d.device_type.as_deref())),
        format!("Family:       {}", or_dash(d.family.as_deref())),
        format!("Role:         {}", or_dash(d.role.as_deref())),
        format!("Management:   {}", or_dash(d.management_ip)),
        format!("MAC:          {}", or_dash(d.mac_address.as_ref())),
        format!("Reachability: {}", d.reachability),
        format!("Version:      {}", or_dash(d.software_version.as_deref())),
        format!("Serial:       {}", or_dash(d.serial_number.as_deref())),
        format!("Uptime:       {}", or_dash(d.uptime.as_deref())),
    ]
    .join("\n")
}

fn identifier(d: &Device) -> String {
    d.key().map_or_else(|| d.display_name(), |k| k.to_string())
}

// ── Handler ─────────────────────────────────────────────────────────

pub async fn handle(
    aggregator: &Aggregator,
    store: &ResultStore,
    config: &ResolvedConfig,
    args: DevicesArgs,
    global: &GlobalOpts,
) -> Result<(), CliError> {
    match args.command {
        DevicesCommand::List { export } => {
            let snapshot = aggregator.current().await;
            let devices = util::require_devices(&snapshot, config)?;

            let out = output::render_list(
                &global.output,
                devices,
                |d| DeviceRow::from(d),
                identifier,
            )?;
            output::print_output(&out, global.quiet);

            if export {
                let path = store.save_document("network_devices", devices, snapshot.timestamp)?;
                output::notice(
                    &format!("Exported {} devices to {}", devices.len(), path.display()),
                    global.quiet,
                );
            }
            Ok(())
        }

        DevicesCommand::Get { device } => match aggregator.device(&device).await {
            DeviceLookup::Found(d) => {
                let out = output::render_single(&global.output, &d, detail, identifier)?;
                output::print_output(&out, global.quiet);
                Ok(())
            }
            DeviceLookup::Missing => Err(CliError::NotFound {
                resource_type: "device".into(),
                identifier: device,
                list_command: "devices list".into(),
            }),
            DeviceLookup::Unavailable { authenticated } => Err(util::controller_unavailable(
                authenticated,
                config,
                &format!("device '{device}'"),
            )),
        },
    }
}
