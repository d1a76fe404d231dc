use std::fmt;

/// HTTP request methods.
///
/// `Unknown` is the unset value: a request carrying it is not `ok()`.
#[allow(clippy::upper_case_acronyms)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Method {
    #[default]
    Unknown,
    /// CONNECT - Establish a tunnel
    CONNECT,
    /// DELETE - Delete a resource
    DELETE,
    /// GET - Retrieve a resource
    GET,
    /// HEAD - Like GET but without the response body
    HEAD,
    /// OPTIONS - Describe communication options
    OPTIONS,
    /// PATCH - Partial modification of a resource
    PATCH,
    /// POST - Create or submit data
    POST,
    /// PUT - Replace a resource
    PUT,
    /// TRACE - Loop-back test
    TRACE,
}

impl Method {
    /// Every recognized method, in wire-token order.
    pub const ALL: [Method; 9] = [
        Method::CONNECT,
        Method::DELETE,
        Method::GET,
        Method::HEAD,
        Method::OPTIONS,
        Method::PATCH,
        Method::POST,
        Method::PUT,
        Method::TRACE,
    ];

    /// Canonical wire token.
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Unknown => "UNKNOWN",
            Method::CONNECT => "CONNECT",
            Method::DELETE => "DELETE",
            Method::GET => "GET",
            Method::HEAD => "HEAD",
            Method::OPTIONS => "OPTIONS",
            Method::PATCH => "PATCH",
            Method::POST => "POST",
            Method::PUT => "PUT",
            Method::TRACE => "TRACE",
        }
    }

    /// Looks up the method whose token is a prefix of `input`.
    ///
    /// Matching is case-sensitive. Unrecognized input yields `Unknown`.
    ///
    /// # Example
    ///
    /// ```
    /// # use nethttp::http::Method;
    /// assert_eq!(Method::from_token("GET / HTTP/1.1"), Method::GET);
    /// assert_eq!(Method::from_token("get"), Method::Unknown);
    /// ```
    pub fn from_token(input: impl AsRef<[u8]>) -> Method {
        let input = input.as_ref();
        Method::ALL
            .into_iter()
            .find(|m| input.starts_with(m.as_str().as_bytes()))
            .unwrap_or_default()
    }

    pub fn is_unknown(&self) -> bool {
        *self == Method::Unknown
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
