use ipnet::IpNet;
use std::net::IpAddr;

/// Collapse an IPv4-mapped IPv6 address (`::ffff:a.b.c.d`) to its IPv4
/// form. Other addresses pass through unchanged.
pub fn canonical_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
            Some(v4) => IpAddr::V4(v4),
            None => ip,
        },
        v4 => v4,
    }
}

/// CIDR membership across families: an IPv4 address matches an IPv4 range
/// whether it arrives as dotted quad or as an IPv4-mapped IPv6 address,
/// and an IPv6 range covering the mapped block matches the dotted form.
pub fn ip_in_cidr(ip: IpAddr, net: &IpNet) -> bool {
    match (ip, net) {
        (IpAddr::V4(v4), IpNet::V4(n)) => n.contains(&v4),
        (IpAddr::V6(v6), IpNet::V6(n)) => n.contains(&v6),
        (IpAddr::V6(v6), IpNet::V4(n)) => v6
            .to_ipv4_mapped()
            .map(|v4| n.contains(&v4))
            .unwrap_or(false),
        (IpAddr::V4(v4), IpNet::V6(n)) => n.contains(&v4.to_ipv6_mapped()),
    }
}
