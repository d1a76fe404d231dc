use std::fmt;

macro_rules! status_codes {
    ($( ($variant:ident, $code:literal, $phrase:literal), )+) => {
        /// HTTP status codes.
        ///
        /// `Unknown` is the unset value: a response carrying it is not `ok()`.
        #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
        pub enum StatusCode {
            #[default]
            Unknown,
            $(
                #[doc = concat!(stringify!($code), " ", $phrase)]
                $variant,
            )+
        }

        impl StatusCode {
            /// Every recognized status, in ascending numeric order.
            pub const ALL: &'static [StatusCode] = &[$(StatusCode::$variant,)+];

            /// Returns the numeric HTTP status code, `0` for `Unknown`.
            pub fn as_u16(&self) -> u16 {
                match self {
                    StatusCode::Unknown => 0,
                    $(StatusCode::$variant => $code,)+
                }
            }

            /// Returns the standard HTTP reason phrase for this status code.
            pub fn reason_phrase(&self) -> &'static str {
                match self {
                    StatusCode::Unknown => "UNKNOWN",
                    $(StatusCode::$variant => $phrase,)+
                }
            }
        }
    };
}

status_codes! {
    (Continue, 100, "Continue"),
    (SwitchingProtocols, 101, "Switching Protocols"),
    (Processing, 102, "Processing"),

    (Ok, 200, "OK"),
    (Created, 201, "Created"),
    (Accepted, 202, "Accepted"),
    (NonAuthoritativeInformation, 203, "Non-Authoritative Information"),
    (NoContent, 204, "No Content"),
    (ResetContent, 205, "Reset Content"),
    (PartialContent, 206, "Partial Content"),

    (MultipleChoices, 300, "Multiple Choices"),
    (MovedPermanently, 301, "Moved Permanently"),
    (Found, 302, "Found"),
    (SeeOther, 303, "See Other"),
    (NotModified, 304, "Not Modified"),
    (UseProxy, 305, "Use Proxy"),
    (SwitchProxy, 306, "Switch Proxy"),
    (TemporaryRedirect, 307, "Temporary Redirect"),

    (BadRequest, 400, "Bad Request"),
    (Unauthorized, 401, "Unauthorized"),
    (PaymentRequired, 402, "Payment Required"),
    (Forbidden, 403, "Forbidden"),
    (NotFound, 404, "Not Found"),
    (MethodNotAllowed, 405, "Method Not Allowed"),
    (NotAcceptable, 406, "Not Acceptable"),
    (ProxyAuthenticationRequired, 407, "Proxy Authentication Required"),
    (RequestTimeout, 408, "Request Timeout"),
    (Conflict, 409, "Conflict"),
    (Gone, 410, "Gone"),
    (LengthRequired, 411, "Length Required"),
    (PreconditionFailed, 412, "Precondition Failed"),
    (PayloadTooLarge, 413, "Request Entity Too Large"),
    (UriTooLong, 414, "Request-URI Too Long"),
    (UnsupportedMediaType, 415, "Unsupported Media Type"),
    (RangeNotSatisfiable, 416, "Requested Range Not Satisfiable"),
    (ExpectationFailed, 417, "Expectation Failed"),

    (InternalServerError, 500, "Internal Server Error"),
    (NotImplemented, 501, "Not Implemented"),
    (BadGateway, 502, "Bad Gateway"),
    (ServiceUnavailable, 503, "Service Unavailable"),
    (GatewayTimeout, 504, "Gateway Timeout"),
    (HttpVersionNotSupported, 505, "HTTP Version Not Supported"),
}

impl StatusCode {
    /// Maps a numeric code onto its status, `Unknown` if unrecognized.
    pub fn from_u16(code: u16) -> StatusCode {
        Self::ALL
            .iter()
            .copied()
            .find(|s| s.as_u16() == code)
            .unwrap_or_default()
    }

    /// Looks up the status whose numeric code or reason phrase is a prefix of
    /// `input`.
    ///
    /// # Example
    ///
    /// ```
    /// # use nethttp::http::StatusCode;
    /// assert_eq!(StatusCode::from_token("404 Not Found\r\n"), StatusCode::NotFound);
    /// assert_eq!(StatusCode::from_token("Not Found"), StatusCode::NotFound);
    /// assert_eq!(StatusCode::from_token("999"), StatusCode::Unknown);
    /// ```
    pub fn from_token(input: impl AsRef<[u8]>) -> StatusCode {
        let input = input.as_ref();
        Self::ALL
            .iter()
            .copied()
            .find(|s| {
                input.starts_with(&code_digits(s.as_u16()))
                    || input.starts_with(s.reason_phrase().as_bytes())
            })
            .unwrap_or_default()
    }

    pub fn is_unknown(&self) -> bool {
        *self == StatusCode::Unknown
    }
}

fn code_digits(code: u16) -> [u8; 3] {
    [
        b'0' + (code / 100 % 10) as u8,
        b'0' + (code / 10 % 10) as u8,
        b'0' + (code % 10) as u8,
    ]
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.as_u16(), self.reason_phrase())
    }
}
