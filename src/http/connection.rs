use std::time::{Duration, Instant};

use anyhow::Context;
use bytes::BytesMut;
use tracing::{debug, trace};

use crate::config::ServerConfig;
use crate::http::handler::{respond, Handler};
use crate::http::parser::ParseError;
use crate::http::request::Request;
use crate::http::writer::write_response;
use crate::ip::{Address, Error, Socket, SocketOption};

/// One accepted client: reads requests, hands them to the handler and writes
/// the responses back, in order, until the peer leaves.
pub struct Connection {
    socket: Socket,
    peer: Address,
    buffer: BytesMut,
    outgoing: Vec<u8>,
    chunk_size: usize,
    idle_timeout: Duration,
}

pub enum ConnectionState {
    Reading,
    Closed,
}

impl Connection {
    pub fn new(socket: Socket, peer: Address, config: &ServerConfig) -> Self {
        if let Err(e) = socket
            .set_option(SocketOption::RecvTimeout(Some(config.recv_timeout())))
            .and_then(|_| socket.set_option(SocketOption::SendTimeout(Some(config.send_timeout()))))
        {
            debug!(%peer, error = %e, "Failed to set connection timeouts");
        }

        Self {
            socket,
            peer,
            buffer: BytesMut::with_capacity(config.read_chunk_size),
            outgoing: Vec::new(),
            chunk_size: config.read_chunk_size.max(1),
            idle_timeout: config.idle_timeout(),
        }
    }

    pub fn peer(&self) -> Address {
        self.peer
    }

    /// Serves the connection until the peer closes, goes idle, asks for
    /// `Connection: close`, or sends something unparsable.
    pub fn run(&mut self, handler: &dyn Handler) -> anyhow::Result<()> {
        let mut block = vec![0u8; self.chunk_size];
        let mut last_active = Instant::now();

        loop {
            match self.socket.recv(&mut block) {
                Ok(0) => {
                    // Client closed connection
                    debug!(peer = %self.peer, "Peer closed connection");
                    return Ok(());
                }
                Ok(n) => {
                    last_active = Instant::now();
                    self.buffer.extend_from_slice(&block[..n]);
                    if let ConnectionState::Closed = self.serve_buffered(handler)? {
                        return Ok(());
                    }
                }
                Err(e) if e.is_timeout() => {
                    if last_active.elapsed() > self.idle_timeout {
                        debug!(peer = %self.peer, "Idle timeout");
                        return Ok(());
                    }
                }
                Err(e) => return Err(e).context("Receive failed"),
            }
        }
    }

    /// Answers every complete request currently buffered.
    fn serve_buffered(&mut self, handler: &dyn Handler) -> anyhow::Result<ConnectionState> {
        loop {
            let request = match Request::read(&mut self.buffer) {
                Ok(request) => request,
                // Need more data
                Err(ParseError::Incomplete) => return Ok(ConnectionState::Reading),
                // Malformed request → protocol error
                Err(e) => return Err(anyhow::anyhow!("HTTP parse error: {:?}", e)),
            };

            let response = respond(handler, &request);
            trace!(
                peer = %self.peer,
                method = %request.method,
                path = %request.path,
                status = response.status.as_u16(),
                "Request handled"
            );

            self.outgoing.clear();
            write_response(&response, &mut self.outgoing);
            self.socket
                .sendall(&self.outgoing)
                .into_result()
                .context("Send failed")?;

            if request.closes_connection() {
                return Ok(ConnectionState::Closed);
            }
        }
    }

    pub fn close(&mut self) -> Result<(), Error> {
        self.socket.close()
    }
}
