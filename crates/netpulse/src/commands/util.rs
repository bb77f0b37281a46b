//! Shared helpers for command handlers.

use std::time::Duration;

use chrono::{DateTime, Utc};

use netpulse_config::ResolvedConfig;
use netpulse_core::{Device, HealthSnapshot};

use crate::error::CliError;

/// The error for controller data missing from `snapshot`: an auth failure
/// when no session was obtained, otherwise an outage.
pub fn controller_missing(
    snapshot: &HealthSnapshot,
    config: &ResolvedConfig,
    what: &str,
) -> CliError {
    controller_unavailable(snapshot.controller_authenticated, config, what)
}

/// Same as [`controller_missing`] for a query made outside a snapshot.
pub fn controller_unavailable(
    authenticated: bool,
    config: &ResolvedConfig,
    what: &str,
) -> CliError {
    if authenticated {
        CliError::ControllerUnavailable {
            source_name: format!("controller at {}", config.controller.url),
            reason: format!("no {what} returned"),
        }
    } else {
        CliError::AuthFailed {
            url: config.controller.url.to_string(),
        }
    }
}

/// Devices from `snapshot`, or the reason there are none.
pub fn require_devices<'a>(
    snapshot: &'a HealthSnapshot,
    config: &ResolvedConfig,
) -> Result<&'a [Device], CliError> {
    snapshot
        .devices
        .as_deref()
        .ok_or_else(|| controller_missing(snapshot, config, "device inventory"))
}

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M:%S UTC").to_string()
}

/// Compact duration: `3d 4h`, `2h 05m`, `4m 10s`, `12s`.
pub fn format_duration(duration: Duration) -> String {
    let secs = duration.as_secs();
    let (days, hours, mins, secs) = (secs / 86_400, secs / 3600 % 24, secs / 60 % 60, secs % 60);
    if days > 0 {
        format!("{days}d {hours}h")
    } else if hours > 0 {
        format!("{hours}h {mins:02}m")
    } else if mins > 0 {
        format!("{mins}m {secs:02}s")
    } else {
        format!("{secs}s")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn durations() {
        assert_eq!(format_duration(Duration::from_secs(12)), "12s");
        assert_eq!(format_duration(Duration::from_secs(250)), "4m 10s");
        assert_eq!(format_duration(Duration::from_secs(7500)), "2h 05m");
        assert_eq!(format_duration(Duration::from_secs(273_600)), "3d 4h");
    }
}
