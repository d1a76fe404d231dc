use std::fmt;
use std::str::FromStr;

use bytes::{Buf, BytesMut};

use crate::http::pairs::Pairs;
use crate::http::parser::{parse_http_response, ParseError};
use crate::http::status::StatusCode;
use crate::http::writer::write_response;

/// An HTTP response, either built by a handler or parsed off the wire.
///
/// The default value carries `StatusCode::Unknown` and is not `ok()`; a
/// handler that leaves it that way gets `501 Not Implemented` sent back.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Response {
    /// The HTTP status code
    pub status: StatusCode,
    /// HTTP headers as key-value pairs
    pub headers: Pairs,
    /// Response body as bytes
    pub body: Vec<u8>,
}

/// Builder for constructing HTTP responses in a fluent style.
///
/// # Example
///
/// ```
/// # use nethttp::http::{ResponseBuilder, StatusCode};
/// let response = ResponseBuilder::new(StatusCode::Ok)
///     .header("Content-Type", "application/json")
///     .body(b"{}".to_vec())
///     .build();
/// assert_eq!(response.body, b"{}");
/// ```
#[derive(Debug)]
pub struct ResponseBuilder {
    status: StatusCode,
    headers: Pairs,
    body: Vec<u8>,
}

impl ResponseBuilder {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            headers: Pairs::new(),
            body: Vec::new(),
        }
    }

    /// Adds or replaces a header.
    pub fn header(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.headers.set(key, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Builds the final Response. `Content-Length` is filled in on write, not
    /// here.
    pub fn build(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: self.body,
        }
    }
}

impl Response {
    pub fn new(status: StatusCode) -> Self {
        Self {
            status,
            ..Self::default()
        }
    }

    /// Creates a simple 200 OK response with the given body.
    pub fn ok_with(body: impl Into<Vec<u8>>) -> Self {
        ResponseBuilder::new(StatusCode::Ok).body(body).build()
    }

    /// Creates a 404 Not Found response.
    pub fn not_found() -> Self {
        ResponseBuilder::new(StatusCode::NotFound)
            .body(b"404 Not Found".to_vec())
            .build()
    }

    /// Creates a 500 Internal Server Error response.
    pub fn internal_error() -> Self {
        ResponseBuilder::new(StatusCode::InternalServerError)
            .body(b"500 Internal Server Error".to_vec())
            .build()
    }

    /// True once a status has been set or parsed.
    pub fn ok(&self) -> bool {
        !self.status.is_unknown()
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Parses one response off the front of `buf` and drains the bytes it
    /// used. On `Incomplete` the buffer is untouched.
    pub fn read(buf: &mut BytesMut) -> Result<Response, ParseError> {
        let (response, used) = parse_http_response(buf)?;
        buf.advance(used);
        Ok(response)
    }

    /// Replaces `self` with the next response in `buf`. On failure `self` is
    /// reset.
    pub fn read_from(&mut self, buf: &mut BytesMut) -> Result<(), ParseError> {
        match Response::read(buf) {
            Ok(response) => {
                *self = response;
                Ok(())
            }
            Err(err) => {
                self.reset();
                Err(err)
            }
        }
    }

    /// Wire form of the response, with `Content-Length` added when the
    /// headers lack one.
    pub fn write(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        write_response(self, &mut buf);
        buf
    }
}

impl FromStr for Response {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_http_response(s.as_bytes()).map(|(response, _)| response)
    }
}

impl fmt::Display for Response {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.write()))
    }
}
