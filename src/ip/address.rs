use std::fmt;
use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4, ToSocketAddrs};
use std::str::FromStr;
use std::vec;

use super::error::Error;

/// Transport protocol tag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Protocol {
    /// Unspecified; opened as a stream socket.
    #[default]
    Any,
    Tcp,
    Udp,
}

/// IPv4 host, port and protocol. The all-zero value means "unset".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Address {
    pub host: u32,
    pub port: u16,
    pub protocol: Protocol,
}

impl Address {
    pub const fn new(a: u8, b: u8, c: u8, d: u8, port: u16) -> Self {
        Self {
            host: u32::from_be_bytes([a, b, c, d]),
            port,
            protocol: Protocol::Any,
        }
    }

    /// The wildcard host (`0.0.0.0`) on `port`.
    pub const fn any(port: u16) -> Self {
        Self {
            host: 0,
            port,
            protocol: Protocol::Any,
        }
    }

    pub const fn localhost(port: u16) -> Self {
        Self::new(127, 0, 0, 1, port)
    }

    pub const fn with_protocol(mut self, protocol: Protocol) -> Self {
        self.protocol = protocol;
        self
    }

    pub const fn octets(&self) -> [u8; 4] {
        self.host.to_be_bytes()
    }

    pub fn is_unset(&self) -> bool {
        *self == Self::default()
    }

    pub fn ip(&self) -> Ipv4Addr {
        Ipv4Addr::from(self.host)
    }

    pub fn to_socket_addr(&self) -> SocketAddrV4 {
        SocketAddrV4::new(self.ip(), self.port)
    }
}

impl From<SocketAddrV4> for Address {
    fn from(addr: SocketAddrV4) -> Self {
        Self {
            host: u32::from(*addr.ip()),
            port: addr.port(),
            protocol: Protocol::Any,
        }
    }
}

impl From<Address> for SocketAddr {
    fn from(addr: Address) -> Self {
        SocketAddr::V4(addr.to_socket_addr())
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.octets();
        write!(f, "{}.{}.{}.{}:{}", a, b, c, d, self.port)
    }
}

impl FromStr for Address {
    type Err = std::net::AddrParseError;

    /// Parses `a.b.c.d:port` or a bare `a.b.c.d` (port 0).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.parse::<SocketAddrV4>() {
            Ok(addr) => Ok(addr.into()),
            Err(err) => s
                .parse::<Ipv4Addr>()
                .map(|ip| SocketAddrV4::new(ip, 0).into())
                .map_err(|_| err),
        }
    }
}

/// Lazy sequence of resolved IPv4 addresses, see [`resolve`].
#[derive(Debug)]
pub struct Addresses {
    inner: vec::IntoIter<SocketAddr>,
    protocol: Protocol,
}

impl Iterator for Addresses {
    type Item = Address;

    fn next(&mut self) -> Option<Address> {
        let protocol = self.protocol;
        self.inner.by_ref().find_map(|addr| match addr {
            SocketAddr::V4(v4) => Some(Address::from(v4).with_protocol(protocol)),
            SocketAddr::V6(_) => None,
        })
    }
}

/// Resolves `host` or `host:port` to IPv4 addresses tagged with `protocol`.
///
/// A missing port resolves as port 0.
pub fn resolve(protocol: Protocol, host: &str) -> Result<Addresses, Error> {
    let addrs = if host.contains(':') {
        host.to_socket_addrs()?
    } else {
        (host, 0).to_socket_addrs()?
    };
    Ok(Addresses {
        inner: addrs,
        protocol,
    })
}
