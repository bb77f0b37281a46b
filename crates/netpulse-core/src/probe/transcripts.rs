// Canned IOS-XE transcripts for the lab executor and parser tests.
//
// Shapes follow what a CSR1000v prints for an IKEv2/IPsec site-to-site
// tunnel over `Tunnel0`.

use std::fmt::Write as _;
use std::net::IpAddr;

/// `show crypto ikev2 sa` with a single SA in the given state.
pub fn ikev2_sa(local: IpAddr, remote: IpAddr, status: &str) -> String {
    format!(
        " IPv4 Crypto IKEv2  SA\n\
         \n\
         Tunnel-id Local                 Remote                fvrf/ivrf            Status\n\
         1         {local}/500       {remote}/500       none/none            {status}\n      \
         Encr: AES-CBC, keysize: 256, PRF: SHA256, Hash: SHA256, DH Grp:14, Auth sign: PSK, Auth verify: PSK\n      \
         Life/Active Time: 86400/3600 sec\n"
    )
}

/// `show crypto ipsec sa` with one inbound and one outbound SA.
pub fn ipsec_sa(local: IpAddr, remote: IpAddr, packets: u64, status: &str) -> String {
    format!(
        "interface: Tunnel0\n    \
         Crypto map tag: Tunnel0-head-0, local addr {local}\n\n   \
         protected vrf: (none)\n   \
         current_peer {remote} port 500\n     \
         PERMIT, flags={{origin_is_acl,}}\n    \
         #pkts encaps: {packets}, #pkts encrypt: {packets}, #pkts digest: {packets}\n    \
         #pkts decaps: {packets}, #pkts decrypt: {packets}, #pkts verify: {packets}\n\n     \
         local crypto endpt.: {local}, remote crypto endpt.: {remote}\n     \
         inbound esp sas:\n      \
         spi: 0x12345678(305419896)\n        \
         transform: esp-256-aes esp-sha256-hmac ,\n        \
         Status: {status}({status})\n     \
         outbound esp sas:\n      \
         spi: 0x87654321(2271560481)\n        \
         transform: esp-256-aes esp-sha256-hmac ,\n        \
         Status: {status}({status})\n"
    )
}

/// `show interfaces <name>` for a GRE/IPsec tunnel interface.
///
/// `state` is used for both the interface and the line protocol.
/// Byte counters are 1000 bytes per packet.
pub fn interface(
    name: &str,
    state: &str,
    tunnel_ip: IpAddr,
    source: IpAddr,
    destination: IpAddr,
    packets: u64,
) -> String {
    let bytes = packets.saturating_mul(1000);
    format!(
        "{name} is {state}, line protocol is {state}\n  \
         Hardware is Tunnel\n  \
         Internet address is {tunnel_ip}/30\n  \
         MTU 1400 bytes, BW 1000000 Kbit/sec, DLY 50000 usec,\n     \
         reliability 255/255, txload 1/255, rxload 1/255\n  \
         Encapsulation TUNNEL, loopback not set\n  \
         Tunnel source {source}, destination {destination}\n  \
         Tunnel protocol/transport IPSEC/IP\n  \
         Tunnel protection via IPSec (profile \"VPN-PROFILE\")\n  \
         Last input 00:00:01, output 00:00:01, output hang never\n     \
         {packets} packets input, {bytes} bytes, 0 no buffer\n     \
         {packets} packets output, {bytes} bytes, 0 underruns\n"
    )
}

/// Extended ping output. `rtt` is `(min, avg, max)` in milliseconds and
/// is only printed when at least one reply arrived.
pub fn ping(destination: IpAddr, sent: u32, received: u32, rtt: Option<(u32, u32, u32)>) -> String {
    let mut out = format!(
        "Type escape sequence to abort.\n\
         Sending {sent}, 100-byte ICMP Echos to {destination}, timeout is 2 seconds:\n"
    );
    let marks: String = (0..sent)
        .map(|i| if i < received { '!' } else { '.' })
        .collect();
    out.push_str(&marks);
    out.push('\n');

    let rate = if sent == 0 {
        0
    } else {
        received.saturating_mul(100) / sent
    };
    let _ = write!(out, "Success rate is {rate} percent ({received}/{sent})");
    if let (Some((min, avg, max)), true) = (rtt, received > 0) {
        let _ = write!(out, ", round-trip min/avg/max = {min}/{avg}/{max} ms");
    }
    out.push('\n');
    out
}
