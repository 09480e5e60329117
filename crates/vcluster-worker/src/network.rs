//! Local network address discovery.

use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Best-effort outbound interface address.
///
/// Connecting a UDP socket sends nothing; it only asks the OS which local
/// address would route to a public host. Falls back to loopback.
pub fn detect_local_ip() -> IpAddr {
    UdpSocket::bind("0.0.0.0:0")
        .and_then(|socket| {
            socket.connect("8.8.8.8:80")?;
            socket.local_addr()
        })
        .map(|addr| addr.ip())
        .ok()
        .filter(|ip| !ip.is_unspecified())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}
