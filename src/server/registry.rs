use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::{Condvar, Mutex};

use crate::ip::{Operation, Socket};

/// Live client connections, keyed by socket id.
///
/// Each entry is a second handle onto the worker's socket so that shutdown
/// can force blocked workers out of `recv`. Workers remove their own entry
/// through the [`Registration`] guard; [`Registry::wait_drained`] blocks
/// until that has happened for all of them.
#[derive(Default)]
pub(crate) struct Registry {
    connections: Mutex<HashMap<u64, Socket>>,
    drained: Condvar,
}

impl Registry {
    pub(crate) fn register(self: &Arc<Self>, id: u64, handle: Socket) -> Registration {
        self.connections.lock().insert(id, handle);
        Registration {
            registry: Arc::clone(self),
            id,
        }
    }

    fn deregister(&self, id: u64) {
        let mut connections = self.connections.lock();
        connections.remove(&id);
        if connections.is_empty() {
            self.drained.notify_all();
        }
    }

    /// Shuts down and closes every registered handle. Entries stay until
    /// their workers deregister. Returns how many were closed.
    pub(crate) fn close_all(&self) -> usize {
        let mut connections = self.connections.lock();
        let mut closed = 0;
        for socket in connections.values_mut().filter(|s| s.is_open()) {
            let _ = socket.shutdown(Operation::ReadWrite);
            let _ = socket.close();
            closed += 1;
        }
        closed
    }

    pub(crate) fn wait_drained(&self) {
        let mut connections = self.connections.lock();
        while !connections.is_empty() {
            self.drained.wait(&mut connections);
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.connections.lock().len()
    }
}

/// Removes its connection from the registry when dropped, including when the
/// worker unwinds from a panicking handler.
pub(crate) struct Registration {
    registry: Arc<Registry>,
    id: u64,
}

impl Drop for Registration {
    fn drop(&mut self) {
        self.registry.deregister(self.id);
    }
}
