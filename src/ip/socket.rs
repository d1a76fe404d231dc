use std::io::{self, Read};
use std::net::Shutdown;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use socket2::{Domain, SockAddr, Type};

use super::address::{Address, Protocol};
use super::error::{Error, Transfer};

/// Backlog handed to the kernel when the caller asks for "the maximum".
/// Every supported platform clamps it to its own limit.
const MAX_BACKLOG: i32 = i32::MAX;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Which half of a connection to shut down.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    ReadWrite,
}

impl From<Operation> for Shutdown {
    fn from(op: Operation) -> Self {
        match op {
            Operation::Read => Shutdown::Read,
            Operation::Write => Shutdown::Write,
            Operation::ReadWrite => Shutdown::Both,
        }
    }
}

/// Socket options callers may configure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SocketOption {
    ReuseAddress(bool),
    /// Keep writes to a closed peer from raising `SIGPIPE`.
    IgnoreBrokenPipe,
    /// `None` blocks forever.
    RecvTimeout(Option<Duration>),
    SendTimeout(Option<Duration>),
    NoDelay(bool),
    RecvBufferSize(usize),
    SendBufferSize(usize),
}

/// An owned IPv4 socket.
///
/// The default value is the invalid sentinel: it holds no descriptor and
/// every I/O operation on it fails with [`Error::not_open`]. Dropping an open
/// socket closes it. Each successful [`open`](Socket::open) assigns a fresh
/// process-unique [`id`](Socket::id), so a re-opened socket is observably a
/// different endpoint even when the OS recycles the descriptor number.
#[derive(Debug, Default)]
pub struct Socket {
    inner: Option<socket2::Socket>,
    id: u64,
}

impl Socket {
    /// Opens a new socket for `protocol`.
    pub fn new(protocol: Protocol) -> Result<Self, Error> {
        let mut socket = Self::default();
        socket.open(protocol)?;
        Ok(socket)
    }

    pub fn is_open(&self) -> bool {
        self.inner.is_some()
    }

    /// Identity of the open socket; `None` when invalid.
    pub fn id(&self) -> Option<u64> {
        self.inner.as_ref().map(|_| self.id)
    }

    /// Moves the descriptor out, leaving `self` invalid.
    pub fn take(&mut self) -> Socket {
        std::mem::take(self)
    }

    /// Closes any current descriptor and opens a new one.
    pub fn open(&mut self, protocol: Protocol) -> Result<(), Error> {
        self.close()?;
        let (ty, proto) = match protocol {
            Protocol::Udp => (Type::DGRAM, socket2::Protocol::UDP),
            Protocol::Tcp | Protocol::Any => (Type::STREAM, socket2::Protocol::TCP),
        };
        let raw = socket2::Socket::new(Domain::IPV4, ty, Some(proto))?;
        self.adopt(raw);
        let _ = self.set_option(SocketOption::IgnoreBrokenPipe);
        Ok(())
    }

    pub fn bind(&mut self, address: Address) -> Result<(), Error> {
        let raw = self.ensure_open(address.protocol)?;
        raw.bind(&SockAddr::from(address.to_socket_addr()))?;
        Ok(())
    }

    pub fn connect(&mut self, address: Address) -> Result<(), Error> {
        let raw = self.ensure_open(address.protocol)?;
        raw.connect(&SockAddr::from(address.to_socket_addr()))?;
        Ok(())
    }

    /// Marks the socket as passive. A `backlog` of zero or less requests the
    /// platform maximum.
    pub fn listen(&self, backlog: i32) -> Result<(), Error> {
        let backlog = if backlog <= 0 { MAX_BACKLOG } else { backlog };
        self.raw()?.listen(backlog)?;
        Ok(())
    }

    /// Close, open, bind and listen in one step.
    pub fn listen_on(&mut self, address: Address, backlog: i32) -> Result<(), Error> {
        self.open(address.protocol)?;
        self.bind(address)?;
        self.listen(backlog)
    }

    /// Blocks until a peer connects.
    pub fn accept(&self) -> Result<(Socket, Address), Error> {
        let (raw, peer) = self.raw()?.accept()?;
        let peer = peer
            .as_socket_ipv4()
            .map(Address::from)
            .unwrap_or_default()
            .with_protocol(Protocol::Tcp);

        let mut socket = Socket::default();
        socket.adopt(raw);
        let _ = socket.set_option(SocketOption::IgnoreBrokenPipe);
        Ok((socket, peer))
    }

    /// One receive call. `Ok(0)` means the peer shut down its side.
    pub fn recv(&self, target: &mut [u8]) -> Result<usize, Error> {
        let mut raw = self.raw()?;
        loop {
            match raw.read(target) {
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                result => return Ok(result?),
            }
        }
    }

    /// Receives until `target` is full or an error occurs.
    pub fn recvall(&self, target: &mut [u8]) -> Transfer {
        let mut size = 0;
        while size < target.len() {
            match self.recv(&mut target[size..]) {
                Ok(0) => {
                    return Transfer {
                        size,
                        error: Some(io::ErrorKind::UnexpectedEof.into()),
                    };
                }
                Ok(n) => size += n,
                Err(err) => return Transfer { size, error: Some(err) },
            }
        }
        Transfer { size, error: None }
    }

    /// One send call.
    pub fn send(&self, source: &[u8]) -> Result<usize, Error> {
        let raw = self.raw()?;
        loop {
            match raw.send(source) {
                Err(err) if err.kind() == io::ErrorKind::Interrupted => continue,
                result => return Ok(result?),
            }
        }
    }

    /// Sends until `source` is exhausted or an error occurs.
    pub fn sendall(&self, source: &[u8]) -> Transfer {
        let mut size = 0;
        while size < source.len() {
            match self.send(&source[size..]) {
                Ok(0) => {
                    return Transfer {
                        size,
                        error: Some(io::ErrorKind::WriteZero.into()),
                    };
                }
                Ok(n) => size += n,
                Err(err) => return Transfer { size, error: Some(err) },
            }
        }
        Transfer { size, error: None }
    }

    /// Releases the descriptor, reporting what the OS said about it.
    /// Calling it on an invalid socket does nothing and returns `Ok`.
    pub fn close(&mut self) -> Result<(), Error> {
        self.id = 0;
        match self.inner.take() {
            Some(raw) => release(raw),
            None => Ok(()),
        }
    }

    /// Shuts down one or both directions, keeping the descriptor.
    pub fn shutdown(&self, op: Operation) -> Result<(), Error> {
        self.raw()?.shutdown(op.into())?;
        Ok(())
    }

    pub fn set_option(&self, option: SocketOption) -> Result<(), Error> {
        let raw = self.raw()?;
        match option {
            SocketOption::ReuseAddress(on) => raw.set_reuse_address(on)?,
            SocketOption::IgnoreBrokenPipe => ignore_broken_pipe(raw)?,
            SocketOption::RecvTimeout(timeout) => raw.set_read_timeout(timeout)?,
            SocketOption::SendTimeout(timeout) => raw.set_write_timeout(timeout)?,
            SocketOption::NoDelay(on) => raw.set_nodelay(on)?,
            SocketOption::RecvBufferSize(size) => raw.set_recv_buffer_size(size)?,
            SocketOption::SendBufferSize(size) => raw.set_send_buffer_size(size)?,
        }
        Ok(())
    }

    pub fn local_address(&self) -> Result<Address, Error> {
        to_address(self.raw()?.local_addr()?)
    }

    pub fn peer_address(&self) -> Result<Address, Error> {
        to_address(self.raw()?.peer_addr()?)
    }

    pub fn port(&self) -> Result<u16, Error> {
        self.local_address().map(|addr| addr.port)
    }

    /// A second handle onto the same OS socket, sharing this socket's id.
    pub fn try_clone(&self) -> Result<Socket, Error> {
        let raw = self.raw()?.try_clone()?;
        Ok(Socket {
            inner: Some(raw),
            id: self.id,
        })
    }

    fn adopt(&mut self, raw: socket2::Socket) {
        self.inner = Some(raw);
        self.id = NEXT_ID.fetch_add(1, Ordering::Relaxed);
    }

    fn raw(&self) -> Result<&socket2::Socket, Error> {
        self.inner.as_ref().ok_or_else(Error::not_open)
    }

    fn ensure_open(&mut self, protocol: Protocol) -> Result<&socket2::Socket, Error> {
        if self.inner.is_none() {
            self.open(protocol)?;
        }
        self.raw()
    }
}

fn to_address(addr: SockAddr) -> Result<Address, Error> {
    addr.as_socket_ipv4()
        .map(Address::from)
        .ok_or_else(|| io::ErrorKind::AddrNotAvailable.into())
}

// socket2 closes on drop and discards the result, so hand the descriptor to
// close(2) directly.
#[cfg(unix)]
fn release(raw: socket2::Socket) -> Result<(), Error> {
    use std::os::unix::io::IntoRawFd;

    let fd = raw.into_raw_fd();
    // SAFETY: `fd` came out of an owned socket and is closed exactly once.
    if unsafe { libc::close(fd) } == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error().into())
    }
}

#[cfg(not(unix))]
fn release(raw: socket2::Socket) -> Result<(), Error> {
    drop(raw);
    Ok(())
}

#[cfg(any(target_os = "ios", target_os = "macos"))]
fn ignore_broken_pipe(raw: &socket2::Socket) -> io::Result<()> {
    raw.set_nosigpipe(true)
}

// Elsewhere the Rust runtime already ignores SIGPIPE, so EPIPE comes back as
// an ordinary error.
#[cfg(not(any(target_os = "ios", target_os = "macos")))]
fn ignore_broken_pipe(_raw: &socket2::Socket) -> io::Result<()> {
    Ok(())
}
