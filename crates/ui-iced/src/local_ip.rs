use std::net::{IpAddr, Ipv4Addr, UdpSocket};

/// Address of the interface used for outbound traffic.
///
/// Connecting a UDP socket sends nothing; it only makes the OS pick a route.
pub fn local_ip() -> IpAddr {
    outbound_ip().unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

fn outbound_ip() -> std::io::Result<IpAddr> {
    let socket = UdpSocket::bind(("0.0.0.0", 0))?;
    socket.connect(("8.8.8.8", 80))?;
    Ok(socket.local_addr()?.ip())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn always_yields_an_ipv4_address() {
        assert!(local_ip().is_ipv4());
    }
}
