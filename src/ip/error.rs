use std::io;

use thiserror::Error;

/// A platform I/O failure.
///
/// Carries the OS error code when the platform reported one, the portable
/// [`io::ErrorKind`], and the rendered message. Values are immutable once
/// built; success is represented by the `Ok` arm of a `Result`, never by an
/// `Error`.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct Error {
    code: Option<i32>,
    kind: io::ErrorKind,
    message: String,
}

impl Error {
    /// The error returned by operations on a socket that is not open.
    pub fn not_open() -> Self {
        Self::from(io::Error::new(io::ErrorKind::NotConnected, "socket is not open"))
    }

    pub fn code(&self) -> Option<i32> {
        self.code
    }

    pub fn kind(&self) -> io::ErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// True for the errors a receive/send/accept timeout produces.
    ///
    /// Unix reports an expired `SO_RCVTIMEO` as `EAGAIN`, Windows as
    /// `WSAETIMEDOUT`.
    pub fn is_timeout(&self) -> bool {
        matches!(
            self.kind,
            io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
        )
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Self {
            code: err.raw_os_error(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }
}

impl From<io::ErrorKind> for Error {
    fn from(kind: io::ErrorKind) -> Self {
        Self::from(io::Error::from(kind))
    }
}

/// Outcome of a retrying transfer: how many bytes moved, and the first error
/// that stopped the loop, if any.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Transfer {
    pub size: usize,
    pub error: Option<Error>,
}

impl Transfer {
    pub fn ok(&self) -> bool {
        self.error.is_none()
    }

    /// Converts into a `Result`, dropping the byte count on failure.
    pub fn into_result(self) -> Result<usize, Error> {
        match self.error {
            None => Ok(self.size),
            Some(err) => Err(err),
        }
    }
}
