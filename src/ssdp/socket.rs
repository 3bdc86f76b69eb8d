use std::collections::BTreeMap;
use std::net::{IpAddr, Ipv4Addr, SocketAddr, SocketAddrV4};

use socket2::{Domain, Protocol, Socket, Type};
use tokio::net::UdpSocket;

pub const SSDP_MCAST_V4: Ipv4Addr = Ipv4Addr::new(239, 255, 255, 250);
pub const SSDP_PORT: u16 = 1900;
const MAX_DATAGRAM: usize = 65536;

pub fn ssdp_group() -> SocketAddr {
    SocketAddrV4::new(SSDP_MCAST_V4, SSDP_PORT).into()
}

#[derive(Debug, thiserror::Error)]
pub enum BindError {
    #[error("interface {0} has no IPv4 address to join the SSDP group on")]
    NoIpv4Address(String),
    #[error("could not open SSDP socket: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InterfaceFlags {
    pub up: bool,
    pub multicast: bool,
    pub loopback: bool,
}

/// One address bound to an interface, with its netmask when the OS reports one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceAddr {
    pub ip: IpAddr,
    pub netmask: Option<IpAddr>,
}

impl InterfaceAddr {
    /// Whether `other` is on this address's subnet. Without a netmask only
    /// the address itself matches.
    pub fn contains(&self, other: IpAddr) -> bool {
        match (self.ip, self.netmask, other) {
            (IpAddr::V4(ip), Some(IpAddr::V4(mask)), IpAddr::V4(other)) => {
                u32::from(ip) & u32::from(mask) == u32::from(other) & u32::from(mask)
            }
            (IpAddr::V6(ip), Some(IpAddr::V6(mask)), IpAddr::V6(other)) => {
                u128::from(ip) & u128::from(mask) == u128::from(other) & u128::from(mask)
            }
            _ => self.ip == other,
        }
    }

    /// Addresses SSDP may advertise from: IPv4 and not link-local.
    /// Link-local and IPv6 LOCATIONs confuse several clients (VLC among them).
    pub fn advertisable(&self) -> Option<Ipv4Addr> {
        match self.ip {
            IpAddr::V4(ip) if !ip.is_link_local() => Some(ip),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkInterface {
    pub name: String,
    pub index: u32,
    /// `None` when the platform does not report it.
    pub mtu: Option<u32>,
    pub flags: InterfaceFlags,
    pub addrs: Vec<InterfaceAddr>,
}

impl NetworkInterface {
    /// Up and not reporting a zero MTU.
    pub fn is_usable(&self) -> bool {
        self.flags.up && self.mtu != Some(0)
    }

    /// Whether a bind failure on this interface is worth reporting.
    pub fn expects_multicast(&self) -> bool {
        self.flags.up && self.flags.multicast
    }

    pub fn announce_addrs(&self) -> Vec<Ipv4Addr> {
        self.addrs.iter().filter_map(InterfaceAddr::advertisable).collect()
    }

    /// Local addresses a reply to `sender` may be sourced from: those whose
    /// subnet contains the sender.
    pub fn response_addrs(&self, sender: IpAddr) -> Vec<Ipv4Addr> {
        self.addrs
            .iter()
            .filter(|a| a.contains(sender))
            .filter_map(InterfaceAddr::advertisable)
            .collect()
    }

    /// MTU-sized receive buffer, capped at the largest UDP payload.
    pub fn recv_buffer_len(&self) -> usize {
        match self.mtu {
            Some(mtu) if mtu > 0 => (mtu as usize).min(MAX_DATAGRAM),
            _ => MAX_DATAGRAM,
        }
    }

    fn first_v4(&self) -> Option<Ipv4Addr> {
        self.addrs.iter().find_map(|a| match a.ip {
            IpAddr::V4(ip) => Some(ip),
            IpAddr::V6(_) => None,
        })
    }
}

/// Source of the interfaces SSDP runs on.
pub trait AddressSource {
    fn interfaces(&self) -> std::io::Result<Vec<NetworkInterface>>;
}

/// Interfaces as reported by the OS via `getifaddrs`.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl AddressSource for SystemInterfaces {
    fn interfaces(&self) -> std::io::Result<Vec<NetworkInterface>> {
        use getifaddrs::{Address, InterfaceFlags as Os};

        // getifaddrs yields one entry per (interface, address); fold them.
        let mut by_name: BTreeMap<String, NetworkInterface> = BTreeMap::new();
        for entry in getifaddrs::getifaddrs()? {
            let iface = by_name
                .entry(entry.name.clone())
                .or_insert_with(|| NetworkInterface {
                    name: entry.name.clone(),
                    index: entry.index.unwrap_or(0),
                    mtu: None,
                    flags: InterfaceFlags {
                        up: entry.flags.contains(Os::UP),
                        multicast: entry.flags.contains(Os::MULTICAST),
                        loopback: entry.flags.contains(Os::LOOPBACK),
                    },
                    addrs: Vec::new(),
                });
            let addr = match &entry.address {
                Address::V4(net) => InterfaceAddr {
                    ip: IpAddr::V4(net.address),
                    netmask: net.netmask.map(IpAddr::V4),
                },
                Address::V6(net) => InterfaceAddr {
                    ip: IpAddr::V6(net.address),
                    netmask: net.netmask.map(IpAddr::V6),
                },
                _ => continue,
            };
            iface.addrs.push(addr);
        }
        Ok(by_name.into_values().collect())
    }
}

/// Usable interfaces, optionally restricted to `names`.
pub fn select_interfaces(
    source: &impl AddressSource,
    names: &[String],
) -> std::io::Result<Vec<NetworkInterface>> {
    Ok(source
        .interfaces()?
        .into_iter()
        .filter(NetworkInterface::is_usable)
        .filter(|i| names.is_empty() || names.iter().any(|n| n == &i.name))
        .collect())
}

/// Open the SSDP socket for one interface.
///
/// Binds 0.0.0.0:1900 with address/port reuse so several engines can share
/// the port, joins 239.255.255.250 on the interface's IPv4 address, and
/// routes outgoing multicast through that interface with TTL 2.
pub fn bind_multicast(iface: &NetworkInterface) -> Result<UdpSocket, BindError> {
    let local = iface
        .first_v4()
        .ok_or_else(|| BindError::NoIpv4Address(iface.name.clone()))?;

    let socket = Socket::new(Domain::IPV4, Type::DGRAM, Some(Protocol::UDP))?;
    socket.set_reuse_address(true)?;
    #[cfg(unix)]
    socket.set_reuse_port(true)?;
    let bind_addr: SocketAddr = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, SSDP_PORT).into();
    socket.bind(&bind_addr.into())?;
    socket.join_multicast_v4(&SSDP_MCAST_V4, &local)?;
    socket.set_multicast_if_v4(&local)?;
    if let Err(e) = socket.set_multicast_ttl_v4(2) {
        tracing::debug!("SSDP: {}: could not set multicast TTL: {}", iface.name, e);
    }
    if let Err(e) = socket.set_multicast_loop_v4(true) {
        tracing::debug!("SSDP: {}: could not enable multicast loopback: {}", iface.name, e);
    }
    socket.set_nonblocking(true)?;

    let std_udp: std::net::UdpSocket = socket.into();
    Ok(UdpSocket::from_std(std_udp)?)
}
