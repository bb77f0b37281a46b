// Router CLI transcript parsers
//
// Pure functions from `show` output to domain values. Each returns the
// subset of `TunnelState` its command can see; the probe merges them.
// Errors are plain reasons; the caller attaches the command.

use std::net::IpAddr;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};

use crate::model::{LinkStatus, RoundTrip, TunnelState};

/// Statistics of one ping run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PingStats {
    pub sent: u32,
    pub received: u32,
    pub rtt: Option<RoundTrip>,
}

/// IOS prints `% Invalid input ...`, `% Ambiguous command ...` and the like.
fn reject_cli_error(output: &str) -> Result<(), String> {
    match output.lines().map(str::trim).find(|l| l.starts_with('%')) {
        Some(line) => Err(line.trim_start_matches('%').trim().to_owned()),
        None => Ok(()),
    }
}

/// First whitespace-delimited token after `label`, parsed.
fn number_after<T: std::str::FromStr>(line: &str, label: &str) -> Option<T> {
    let (_, rest) = line.split_once(label)?;
    rest.trim_start()
        .split(|c: char| c.is_whitespace() || c == ',')
        .next()?
        .parse()
        .ok()
}

// ── show crypto ikev2 sa ─────────────────────────────────────────────

/// `1  203.0.113.2/500  203.0.113.6/500  none/none  READY`
fn sa_row(line: &str) -> Option<(Option<IpAddr>, &str)> {
    let tokens: Vec<&str> = line.split_whitespace().collect();
    if tokens.len() < 5 || tokens[0].parse::<u32>().is_err() {
        return None;
    }
    let peer = tokens[2].split('/').next().and_then(|ip| ip.parse().ok());
    Some((peer, tokens[tokens.len() - 1]))
}

/// `Encr: AES-CBC, keysize: 256, PRF: SHA256, Hash: SHA256, DH Grp:14, ...`
fn apply_crypto_line(state: &mut TunnelState, line: &str) {
    let mut cipher = None;
    let mut keysize = None;
    for part in line.split(',') {
        let Some((key, value)) = part.split_once(':') else {
            continue;
        };
        let value = value.trim();
        match key.trim() {
            "Encr" => cipher = Some(value),
            "keysize" => keysize = Some(value),
            "Hash" => state.integrity_alg = Some(value.to_owned()),
            "DH Grp" => state.dh_group = value.parse().ok(),
            _ => {}
        }
    }
    state.encryption_alg = match (cipher, keysize) {
        (Some(c), Some(k)) => Some(format!("{c}-{k}")),
        (Some(c), None) => Some(c.to_owned()),
        (None, _) => None,
    };
}

/// Parse `show crypto ikev2 sa`.
///
/// Only the first SA is considered. An empty table is a valid answer:
/// the handshake is down. `now` anchors the last-rekey timestamp, which
/// is derived from the SA's active time.
pub fn ikev2_sa(output: &str, now: DateTime<Utc>) -> Result<TunnelState, String> {
    reject_cli_error(output)?;
    if !output
        .lines()
        .any(|l| l.trim_start().starts_with("Tunnel-id"))
    {
        return Err("missing IKEv2 SA table header".into());
    }

    let mut state = TunnelState {
        handshake_status: LinkStatus::Down,
        ..TunnelState::default()
    };
    let mut seen_row = false;

    for line in output.lines().map(str::trim) {
        if let Some((peer, status)) = sa_row(line) {
            if seen_row {
                break;
            }
            seen_row = true;
            state.peer_ip = peer;
            state.handshake_status = if status.eq_ignore_ascii_case("READY") {
                LinkStatus::Up
            } else {
                LinkStatus::Down
            };
            continue;
        }
        if !seen_row {
            continue;
        }
        if line.starts_with("Encr:") {
            apply_crypto_line(&mut state, line);
        } else if let Some(times) = line.strip_prefix("Life/Active Time:") {
            let active = times
                .trim()
                .trim_end_matches("sec")
                .trim()
                .split_once('/')
                .and_then(|(_, active)| active.trim().parse::<u64>().ok());
            if let Some(active) = active {
                let uptime = Duration::from_secs(active);
                state.uptime = Some(uptime);
                state.last_rekey = TimeDelta::from_std(uptime)
                    .ok()
                    .and_then(|d| now.checked_sub_signed(d));
            }
        }
    }

    Ok(state)
}

// ── show crypto ipsec sa ─────────────────────────────────────────────

/// Parse `show crypto ipsec sa`: SA status, peer and packet counters.
///
/// The session is up when at least one SA is listed and every listed SA
/// is `ACTIVE`.
pub fn ipsec_sa(output: &str) -> Result<TunnelState, String> {
    reject_cli_error(output)?;
    if !output.contains("interface:") && !output.contains("#pkts") {
        return Err("no IPsec SA information in output".into());
    }

    let mut state = TunnelState::default();
    let mut statuses = Vec::new();

    for line in output.lines().map(str::trim) {
        if line.contains("#pkts encaps:") {
            state.packets_out = number_after(line, "#pkts encaps:");
        }
        if line.contains("#pkts decaps:") {
            state.packets_in = number_after(line, "#pkts decaps:");
        }
        if let Some(rest) = line.strip_prefix("current_peer") {
            state.peer_ip = rest.split_whitespace().next().and_then(|ip| ip.parse().ok());
        }
        if let Some(status) = line.strip_prefix("Status:") {
            statuses.push(status.trim().to_ascii_uppercase());
        }
    }

    state.session_status =
        if !statuses.is_empty() && statuses.iter().all(|s| s.starts_with("ACTIVE")) {
            LinkStatus::Up
        } else {
            LinkStatus::Down
        };
    Ok(state)
}

// ── show interfaces TunnelN ──────────────────────────────────────────

fn link_word(word: &str) -> LinkStatus {
    let word = word.trim().trim_end_matches(',').to_ascii_lowercase();
    if word == "up" {
        LinkStatus::Up
    } else if word.contains("down") {
        LinkStatus::Down
    } else {
        LinkStatus::Unknown
    }
}

/// `Tunnel0 is up, line protocol is up`
fn interface_header(output: &str) -> Result<(String, LinkStatus, LinkStatus), String> {
    let header = output
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .ok_or("empty interface output")?;
    let (name, rest) = header
        .split_once(" is ")
        .ok_or_else(|| format!("unrecognized interface header: {header}"))?;
    let (admin, protocol) = rest
        .split_once(", line protocol is ")
        .ok_or_else(|| format!("unrecognized interface header: {header}"))?;
    Ok((name.to_owned(), link_word(admin), link_word(protocol)))
}

/// Parse `show interfaces TunnelN`: status, line protocol, address, MTU
/// and bandwidth. Counters are left to [`interface_counters`].
pub fn interface(output: &str) -> Result<TunnelState, String> {
    reject_cli_error(output)?;
    let (name, interface_status, line_protocol) = interface_header(output)?;

    let mut state = TunnelState {
        interface: Some(name),
        interface_status,
        line_protocol,
        ..TunnelState::default()
    };

    for line in output.lines().map(str::trim) {
        if let Some(addr) = line.strip_prefix("Internet address is ") {
            state.tunnel_ip = addr.split('/').next().and_then(|ip| ip.trim().parse().ok());
        } else if line.starts_with("MTU ") {
            state.mtu = number_after(line, "MTU ");
            state.bandwidth_kbps = number_after(line, "BW ");
        }
    }

    Ok(state)
}

/// Byte counters from `show interfaces TunnelN`.
pub fn interface_counters(output: &str) -> Result<TunnelState, String> {
    reject_cli_error(output)?;
    let mut state = TunnelState::default();
    for line in output.lines().map(str::trim) {
        if line.contains("packets input,") {
            state.bytes_in = number_after(line, "packets input,");
        } else if line.contains("packets output,") {
            state.bytes_out = number_after(line, "packets output,");
        }
    }
    if state.bytes_in.is_none() && state.bytes_out.is_none() {
        return Err("no interface byte counters in output".into());
    }
    Ok(state)
}

// ── ping ─────────────────────────────────────────────────────────────

/// Parse IOS extended ping output:
/// `Success rate is 100 percent (5/5), round-trip min/avg/max = 4/5/7 ms`
pub fn ping(output: &str) -> Result<PingStats, String> {
    reject_cli_error(output)?;
    let line = output
        .lines()
        .map(str::trim)
        .find(|l| l.starts_with("Success rate is"))
        .ok_or("missing ping success-rate line")?;

    let counts = line
        .split_once('(')
        .and_then(|(_, rest)| rest.split_once(')'))
        .map(|(counts, _)| counts)
        .ok_or_else(|| format!("missing packet counts: {line}"))?;
    let (received, sent) = counts
        .split_once('/')
        .ok_or_else(|| format!("malformed packet counts: {counts}"))?;
    let received: u32 = received
        .trim()
        .parse()
        .map_err(|e| format!("bad received count '{received}': {e}"))?;
    let sent: u32 = sent
        .trim()
        .parse()
        .map_err(|e| format!("bad sent count '{sent}': {e}"))?;
    if received > sent {
        return Err(format!("received more packets than sent: {counts}"));
    }

    let rtt = line.split_once("min/avg/max = ").and_then(|(_, rest)| {
        let mut samples = rest
            .trim()
            .trim_end_matches("ms")
            .trim()
            .split('/')
            .map(|v| v.trim().parse::<u32>().ok());
        let rtt = RoundTrip {
            min_ms: samples.next()??,
            avg_ms: samples.next()??,
            max_ms: samples.next()??,
        };
        Some(rtt)
    });

    Ok(PingStats {
        sent,
        received,
        rtt,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::probe::transcripts;
    use pretty_assertions::assert_eq;

    fn ip(s: &str) -> IpAddr {
        s.parse().unwrap()
    }

    #[test]
    fn ikev2_ready_sa() {
        let now = Utc::now();
        let output = transcripts::ikev2_sa(ip("203.0.113.2"), ip("203.0.113.6"), "READY");
        let state = ikev2_sa(&output, now).unwrap();

        assert_eq!(state.handshake_status, LinkStatus::Up);
        assert_eq!(state.peer_ip, Some(ip("203.0.113.6")));
        assert_eq!(state.encryption_alg.as_deref(), Some("AES-CBC-256"));
        assert_eq!(state.integrity_alg.as_deref(), Some("SHA256"));
        assert_eq!(state.dh_group, Some(14));
        assert_eq!(state.uptime, Some(Duration::from_secs(3600)));
        assert_eq!(state.last_rekey, Some(now - TimeDelta::seconds(3600)));
    }

    #[test]
    fn ikev2_non_ready_sa_is_down() {
        let output = transcripts::ikev2_sa(ip("203.0.113.2"), ip("203.0.113.6"), "DELETE");
        let state = ikev2_sa(&output, Utc::now()).unwrap();
        assert_eq!(state.handshake_status, LinkStatus::Down);
        assert_eq!(state.peer_ip, Some(ip("203.0.113.6")));
    }

    #[test]
    fn ikev2_empty_table_is_down_not_error() {
        let output = "IPv4 Crypto IKEv2  SA\n\nTunnel-id Local  Remote  fvrf/ivrf  Status\n";
        let state = ikev2_sa(output, Utc::now()).unwrap();
        assert_eq!(state.handshake_status, LinkStatus::Down);
        assert!(!state.has_detail());
    }

    #[test]
    fn ikev2_rejects_cli_errors_and_garbage() {
        let err = ikev2_sa("% Invalid input detected at '^' marker.", Utc::now()).unwrap_err();
        assert!(err.starts_with("Invalid input"));
        assert!(ikev2_sa("hello", Utc::now()).is_err());
    }

    #[test]
    fn ipsec_active_counters() {
        let output = transcripts::ipsec_sa(ip("203.0.113.2"), ip("203.0.113.6"), 125_000, "ACTIVE");
        let state = ipsec_sa(&output).unwrap();
        assert_eq!(state.session_status, LinkStatus::Up);
        assert_eq!(state.packets_in, Some(125_000));
        assert_eq!(state.packets_out, Some(125_000));
        assert_eq!(state.peer_ip, Some(ip("203.0.113.6")));
    }

    #[test]
    fn ipsec_without_active_sa_is_down() {
        let output = transcripts::ipsec_sa(ip("203.0.113.2"), ip("203.0.113.6"), 0, "STANDBY");
        assert_eq!(ipsec_sa(&output).unwrap().session_status, LinkStatus::Down);

        let no_sas = "interface: Tunnel0\n    #pkts encaps: 0, #pkts encrypt: 0\n";
        assert_eq!(ipsec_sa(no_sas).unwrap().session_status, LinkStatus::Down);
    }

    #[test]
    fn interface_up() {
        let output = transcripts::interface(
            "Tunnel0",
            "up",
            ip("10.0.0.1"),
            ip("203.0.113.2"),
            ip("203.0.113.6"),
            125_000,
        );
        let state = interface(&output).unwrap();
        assert_eq!(state.interface.as_deref(), Some("Tunnel0"));
        assert_eq!(state.interface_status, LinkStatus::Up);
        assert_eq!(state.line_protocol, LinkStatus::Up);
        assert_eq!(state.tunnel_ip, Some(ip("10.0.0.1")));
        assert_eq!(state.mtu, Some(1400));
        assert_eq!(state.bandwidth_kbps, Some(1_000_000));
        assert_eq!(state.bytes_in, None);

        let counters = interface_counters(&output).unwrap();
        assert_eq!(counters.bytes_in, Some(125_000_000));
        assert_eq!(counters.bytes_out, Some(125_000_000));
    }

    #[test]
    fn interface_admin_down() {
        let output = "Tunnel0 is administratively down, line protocol is down\n";
        let state = interface(output).unwrap();
        assert_eq!(state.interface_status, LinkStatus::Down);
        assert_eq!(state.line_protocol, LinkStatus::Down);
        assert!(interface_counters(output).is_err());
    }

    #[test]
    fn interface_rejects_garbage() {
        assert!(interface("").is_err());
        assert!(interface("no such thing").is_err());
    }

    #[test]
    fn ping_full_success() {
        let stats = ping(&transcripts::ping(ip("192.168.2.10"), 5, 5, Some((4, 5, 7)))).unwrap();
        assert_eq!(
            stats,
            PingStats {
                sent: 5,
                received: 5,
                rtt: Some(RoundTrip {
                    min_ms: 4,
                    avg_ms: 5,
                    max_ms: 7
                }),
            }
        );
    }

    #[test]
    fn ping_partial_and_total_loss() {
        let lossy = ping(&transcripts::ping(ip("192.168.2.10"), 5, 3, Some((4, 5, 9)))).unwrap();
        assert_eq!((lossy.sent, lossy.received), (5, 3));
        assert!(lossy.rtt.is_some());

        let dead = ping(&transcripts::ping(ip("192.168.2.10"), 5, 0, None)).unwrap();
        assert_eq!((dead.sent, dead.received), (5, 0));
        assert_eq!(dead.rtt, None);
    }

    #[test]
    fn ping_rejects_missing_summary() {
        assert!(ping("Type escape sequence to abort.\n").is_err());
        assert!(ping("Success rate is 100 percent (6/5)").is_err());
    }
}
