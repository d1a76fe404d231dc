use std::fmt;
use std::str::FromStr;

use bytes::{Buf, BytesMut};

use crate::http::method::Method;
use crate::http::pairs::Pairs;
use crate::http::parser::{parse_http_request, ParseError};
use crate::http::writer::write_request;

/// A parsed HTTP request, or one being assembled for sending.
///
/// The default value is "not ok": its method is `Unknown`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    /// The HTTP method (GET, POST, etc.)
    pub method: Method,
    /// The request path without the query string (e.g. "/index.html").
    /// Absolute URIs are allowed when the request is sent with
    /// [`Request::send`].
    pub path: String,
    /// Query parameters from `?a=1&b=2`
    pub query: Pairs,
    /// Request headers as key-value pairs
    pub headers: Pairs,
    /// Request body
    pub body: Vec<u8>,
}

/// Builder for constructing Request objects.
#[derive(Debug, Default)]
pub struct RequestBuilder {
    method: Option<Method>,
    path: Option<String>,
    query: Pairs,
    headers: Pairs,
    body: Vec<u8>,
}

impl RequestBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    pub fn path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.set(key, value);
        self
    }

    pub fn header(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.headers.set(key, value);
        self
    }

    pub fn body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    pub fn build(self) -> Result<Request, &'static str> {
        let method = self.method.ok_or("method missing")?;
        if method.is_unknown() {
            return Err("method unknown");
        }
        let path = self.path.ok_or("path missing")?;
        if path.is_empty() {
            return Err("path empty");
        }
        Ok(Request {
            method,
            path,
            query: self.query,
            headers: self.headers,
            body: self.body,
        })
    }
}

impl Request {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            ..Self::default()
        }
    }

    /// True once a method has been set or parsed.
    pub fn ok(&self) -> bool {
        !self.method.is_unknown()
    }

    /// Returns every field to its default.
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Retrieves a header value by exact name.
    pub fn header(&self, key: &str) -> Option<&str> {
        self.headers.get(key)
    }

    /// Declared body length, 0 when absent or unparsable.
    pub fn content_length(&self) -> usize {
        self.headers
            .get_ignore_ascii_case("Content-Length")
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(0)
    }

    /// True when the client asked for the connection to close after this
    /// exchange (`Connection: close`, any case).
    pub fn closes_connection(&self) -> bool {
        self.headers
            .get_ignore_ascii_case("Connection")
            .map(|v| v.trim().eq_ignore_ascii_case("close"))
            .unwrap_or(false)
    }

    /// Parses one request off the front of `buf` and drains the bytes it
    /// used. On `Incomplete` the buffer is untouched; callers append more
    /// bytes and retry.
    pub fn read(buf: &mut BytesMut) -> Result<Request, ParseError> {
        let (request, used) = parse_http_request(buf)?;
        buf.advance(used);
        Ok(request)
    }

    /// Replaces `self` with the next request in `buf`. On failure `self` is
    /// reset.
    pub fn read_from(&mut self, buf: &mut BytesMut) -> Result<(), ParseError> {
        match Request::read(buf) {
            Ok(request) => {
                *self = request;
                Ok(())
            }
            Err(err) => {
                self.reset();
                Err(err)
            }
        }
    }

    /// Wire form of the request. No headers are added.
    pub fn write(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        write_request(self, &mut buf);
        buf
    }
}

impl FromStr for Request {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_http_request(s.as_bytes()).map(|(request, _)| request)
    }
}

impl fmt::Display for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&String::from_utf8_lossy(&self.write()))
    }
}
