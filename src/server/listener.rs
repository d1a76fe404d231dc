use std::sync::Arc;
use std::thread;
use std::time::Duration;

use tracing::{debug, error, info, warn};

use super::Shared;
use crate::http::connection::Connection;
use crate::ip::{Address, Socket};

/// Pause after an accept failure that is not a poll timeout, so a persistent
/// error (e.g. descriptor exhaustion) does not spin the thread.
const ACCEPT_BACKOFF: Duration = Duration::from_millis(10);

/// Accepts clients until the server stops accepting, spawning one worker
/// thread per connection.
pub(crate) fn run(shared: Arc<Shared>, listener: Socket) {
    while shared.is_accepting() {
        let (socket, peer) = match listener.accept() {
            Ok(accepted) => accepted,
            // Poll tick: re-check the accepting flag.
            Err(e) if e.is_timeout() => continue,
            Err(e) => {
                if shared.is_accepting() {
                    warn!(error = %e, "Accept failed");
                    thread::sleep(ACCEPT_BACKOFF);
                }
                continue;
            }
        };

        if !shared.is_accepting() {
            break;
        }
        spawn_connection(&shared, socket, peer);
    }
    debug!("Accept loop exited");
}

fn spawn_connection(shared: &Arc<Shared>, socket: Socket, peer: Address) {
    let Some(id) = socket.id() else {
        return;
    };
    let handle = match socket.try_clone() {
        Ok(handle) => handle,
        Err(e) => {
            warn!(%peer, error = %e, "Failed to register connection");
            return;
        }
    };

    let registration = shared.registry.register(id, handle);
    let worker = Arc::clone(shared);
    let spawned = thread::Builder::new()
        .name(format!("nethttp-conn-{}", id))
        .spawn(move || {
            let _registration = registration;
            serve(&worker, socket, peer);
        });

    if let Err(e) = spawned {
        error!(%peer, error = %e, "Failed to spawn connection thread");
    }
}

fn serve(shared: &Shared, socket: Socket, peer: Address) {
    info!("Accepted connection from {}", peer);

    let mut conn = Connection::new(socket, peer, &shared.config);
    if let Err(e) = conn.run(&*shared.handler) {
        error!("Connection error from {}: {:#}", peer, e);
    }
    if let Err(e) = conn.close() {
        debug!(%peer, error = %e, "Close failed");
    }

    debug!(%peer, "Connection closed");
}
