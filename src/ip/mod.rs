//! IPv4 transport layer.
//!
//! - **`address`**: packed host/port/protocol values and name resolution
//! - **`error`**: the platform error value and the retrying-transfer result
//! - **`socket`**: the owned socket handle with blocking I/O and options

pub mod address;
pub mod error;
pub mod socket;

pub use address::{resolve, Address, Addresses, Protocol};
pub use error::{Error, Transfer};
pub use socket::{Operation, Socket, SocketOption};
