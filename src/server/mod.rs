//! Multi-threaded blocking HTTP server.
//!
//! One accept thread polls the listening socket and spawns one thread per
//! client. [`Server::stop`] closes the listener, joins the accept thread,
//! force-closes every live client socket and then waits for all workers to
//! deregister.
//!
//! # Example
//!
//! ```no_run
//! use nethttp::http::{Request, Response, StatusCode};
//! use nethttp::server::Server;
//!
//! let server = Server::new(|_req: &Request, resp: &mut Response| {
//!     resp.status = StatusCode::Ok;
//!     resp.body = b"hello".to_vec();
//! });
//! server.start(7200)?;
//! // ...
//! server.stop();
//! # Ok::<(), nethttp::ip::Error>(())
//! ```

mod listener;
mod registry;

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use parking_lot::Mutex;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::http::Handler;
use crate::ip::{Address, Error, Operation, Protocol, Socket, SocketOption};
use registry::Registry;

/// Lifecycle of a [`Server`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ServerState {
    Stopped,
    Starting,
    Listening,
    Stopping,
}

impl ServerState {
    fn from_u8(value: u8) -> Self {
        match value {
            1 => ServerState::Starting,
            2 => ServerState::Listening,
            3 => ServerState::Stopping,
            _ => ServerState::Stopped,
        }
    }
}

/// State shared with the accept thread and the connection workers.
pub(crate) struct Shared {
    pub(crate) config: ServerConfig,
    pub(crate) handler: Box<dyn Handler>,
    pub(crate) registry: Arc<Registry>,
    accepting: AtomicBool,
    state: AtomicU8,
}

impl Shared {
    pub(crate) fn is_accepting(&self) -> bool {
        self.accepting.load(Ordering::SeqCst)
    }

    fn set_state(&self, state: ServerState) {
        self.state.store(state as u8, Ordering::SeqCst);
    }
}

#[derive(Default)]
struct Lifecycle {
    listener: Socket,
    accept_loop: Option<JoinHandle<()>>,
}

pub struct Server {
    shared: Arc<Shared>,
    lifecycle: Mutex<Lifecycle>,
}

impl Server {
    pub fn new(handler: impl Handler) -> Self {
        Self::with_config(ServerConfig::default(), handler)
    }

    pub fn with_config(config: ServerConfig, handler: impl Handler) -> Self {
        Self {
            shared: Arc::new(Shared {
                config,
                handler: Box::new(handler),
                registry: Arc::new(Registry::default()),
                accepting: AtomicBool::new(false),
                state: AtomicU8::new(ServerState::Stopped as u8),
            }),
            lifecycle: Mutex::new(Lifecycle::default()),
        }
    }

    /// Creates a server and starts it on `port`.
    pub fn bind(port: u16, handler: impl Handler) -> Result<Self, Error> {
        let server = Self::new(handler);
        server.start(port)?;
        Ok(server)
    }

    /// Binds `0.0.0.0:port` and starts accepting. Port 0 picks an ephemeral
    /// port, see [`Server::port`].
    ///
    /// A server that is already running is stopped first. On failure the
    /// server is left stopped and the error is returned.
    pub fn start(&self, port: u16) -> Result<(), Error> {
        let mut lifecycle = self.lifecycle.lock();
        self.shutdown(&mut lifecycle);

        self.shared.set_state(ServerState::Starting);
        match self.launch(port) {
            Ok((listener, accept_loop)) => {
                let port = listener.port().unwrap_or(port);
                lifecycle.listener = listener;
                lifecycle.accept_loop = Some(accept_loop);
                self.shared.set_state(ServerState::Listening);
                info!("Listening on port {}", port);
                Ok(())
            }
            Err(e) => {
                self.shared.accepting.store(false, Ordering::SeqCst);
                self.shared.set_state(ServerState::Stopped);
                warn!(port, error = %e, "Failed to start server");
                Err(e)
            }
        }
    }

    fn launch(&self, port: u16) -> Result<(Socket, JoinHandle<()>), Error> {
        let config = &self.shared.config;
        let mut socket = Socket::new(Protocol::Tcp)?;
        socket.set_option(SocketOption::ReuseAddress(true))?;
        socket.set_option(SocketOption::IgnoreBrokenPipe)?;
        socket.set_option(SocketOption::RecvTimeout(Some(config.accept_timeout())))?;
        socket.bind(Address::any(port).with_protocol(Protocol::Tcp))?;
        socket.listen(config.backlog)?;

        let accept_socket = socket.try_clone()?;
        let shared = Arc::clone(&self.shared);
        self.shared.accepting.store(true, Ordering::SeqCst);
        let accept_loop = thread::Builder::new()
            .name("nethttp-accept".into())
            .spawn(move || listener::run(shared, accept_socket))?;

        Ok((socket, accept_loop))
    }

    /// Stops accepting, closes every live connection and blocks until all
    /// workers have exited. Safe to call repeatedly and concurrently.
    ///
    /// Must not be called from inside a handler: the calling worker would
    /// wait for itself.
    pub fn stop(&self) {
        let mut lifecycle = self.lifecycle.lock();
        self.shutdown(&mut lifecycle);
    }

    fn shutdown(&self, lifecycle: &mut Lifecycle) {
        let was_running = lifecycle.accept_loop.is_some() || lifecycle.listener.is_open();
        if was_running {
            self.shared.set_state(ServerState::Stopping);
        }

        self.shared.accepting.store(false, Ordering::SeqCst);
        if lifecycle.listener.is_open() {
            let _ = lifecycle.listener.shutdown(Operation::ReadWrite);
            if let Err(e) = lifecycle.listener.close() {
                warn!(error = %e, "Failed to close listener");
            }
        }
        if let Some(accept_loop) = lifecycle.accept_loop.take() {
            if accept_loop.join().is_err() {
                warn!("Accept thread panicked");
            }
        }

        let closed = self.shared.registry.close_all();
        self.shared.registry.wait_drained();
        self.shared.set_state(ServerState::Stopped);

        if was_running {
            info!(closed, "Server stopped");
        }
    }

    pub fn state(&self) -> ServerState {
        ServerState::from_u8(self.shared.state.load(Ordering::SeqCst))
    }

    pub fn is_running(&self) -> bool {
        self.state() == ServerState::Listening
    }

    /// Port the listener is bound to, `None` when stopped.
    pub fn port(&self) -> Option<u16> {
        self.lifecycle.lock().listener.port().ok()
    }

    /// Number of live client connections.
    pub fn connection_count(&self) -> usize {
        self.shared.registry.len()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.shared.config
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        self.stop();
    }
}
