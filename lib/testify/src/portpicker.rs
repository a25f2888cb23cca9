use std::net::{IpAddr, SocketAddr, TcpListener, ToSocketAddrs, UdpSocket};

use rand::Rng;

pub type Port = u16;

// Try to bind to a socket using UDP
fn test_bind_udp<A: ToSocketAddrs>(addr: A) -> Option<Port> {
    Some(UdpSocket::bind(addr).ok()?.local_addr().ok()?.port())
}

// Try to bind to a socket using TCP
fn test_bind_tcp<A: ToSocketAddrs>(addr: A) -> Option<Port> {
    Some(TcpListener::bind(addr).ok()?.local_addr().ok()?.port())
}

/// Check if a port is free on both TCP and UDP
fn is_free(ip: IpAddr, port: Port) -> bool {
    test_bind_tcp(SocketAddr::new(ip, port)).is_some()
        && test_bind_udp(SocketAddr::new(ip, port)).is_some()
}

/// Asks the OS for a free port
fn ask_free_tcp_port(ip: IpAddr) -> Option<Port> {
    test_bind_tcp(SocketAddr::new(ip, 0))
}

/// Picks a port that is available on both TCP and UDP
pub fn pick_unused_port(ip: IpAddr) -> Port {
    let mut rng = rand::rng();

    loop {
        // Try random port first
        for _ in 0..10 {
            let port = rng.random_range(15000..25000);
            if is_free(ip, port) {
                return port;
            }
        }

        // Ask the OS for a port
        for _ in 0..10 {
            if let Some(port) = ask_free_tcp_port(ip) {
                // Test that the udp port is free as well
                if test_bind_udp(SocketAddr::new(ip, port)).is_some() {
                    return port;
                }
            }
        }
    }
}
