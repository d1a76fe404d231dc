//! Framing and parsing of HTTP/1.1 messages out of a receive buffer.
//!
//! A message is complete once the `\r\n\r\n` header terminator has arrived
//! along with `Content-Length` body bytes (zero when the header is absent).
//! Both parsers return the decoded message together with the number of bytes
//! it occupied, so the caller can drain exactly that prefix and leave any
//! pipelined follow-up in place.

use std::borrow::Cow;

use thiserror::Error;

use crate::http::method::Method;
use crate::http::pairs::Pairs;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::http::status::StatusCode;
use crate::substr::{is_space, Substr};

const CRLF: &[u8] = b"\r\n";
const HEADERS_END: &[u8] = b"\r\n\r\n";
const HTTP_PREFIX: &str = "HTTP/";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The buffer does not yet hold a whole message.
    #[error("incomplete message")]
    Incomplete,
    #[error("unrecognized request method")]
    InvalidMethod,
    #[error("unrecognized status line")]
    InvalidStatus,
    #[error("invalid Content-Length")]
    InvalidContentLength,
}

/// One complete message located inside a buffer.
struct Frame<'a> {
    start_line: Substr<'a>,
    fields: Substr<'a>,
    body: Substr<'a>,
    len: usize,
}

fn frame(buf: &[u8]) -> Result<Frame<'_>, ParseError> {
    let data = Substr::new(buf);
    let head = data.including(HEADERS_END);
    if head.is_empty() {
        return Err(ParseError::Incomplete);
    }

    let fields = head.after(CRLF);
    let content_length = content_length(fields)?;
    let len = head
        .len()
        .checked_add(content_length)
        .ok_or(ParseError::InvalidContentLength)?;
    if data.len() < len {
        return Err(ParseError::Incomplete);
    }

    Ok(Frame {
        start_line: head.before(CRLF),
        fields,
        body: data.prefix(len).skip_n(head.len()),
        len,
    })
}

/// `name: value` lines of a header block. Lines without a colon are skipped.
fn header_fields<'a>(block: Substr<'a>) -> impl Iterator<Item = (Substr<'a>, Substr<'a>)> {
    block.split(CRLF).filter_map(|line| {
        if !line.contains(b':') {
            return None;
        }
        let name = line.before(b':').skip_while(is_space).truncate_while(is_space);
        let value = line.after(b':').skip_while(is_space).truncate_while(is_space);
        (!name.is_empty()).then_some((name, value))
    })
}

fn content_length(fields: Substr<'_>) -> Result<usize, ParseError> {
    match header_fields(fields)
        .filter(|(name, _)| name.eq_ignore_ascii_case("Content-Length"))
        .last()
    {
        Some((_, value)) => value.parse().ok_or(ParseError::InvalidContentLength),
        None => Ok(0),
    }
}

/// Names keep their case, except `Content-Length`, which is stored under its
/// canonical spelling so the stored value is the one that framed the body.
fn parse_headers(fields: Substr<'_>) -> Pairs {
    header_fields(fields)
        .map(|(name, value)| {
            let name = if name.eq_ignore_ascii_case("Content-Length") {
                Cow::Borrowed("Content-Length")
            } else {
                name.to_string_lossy()
            };
            (name, value.to_string_lossy())
        })
        .collect()
}

/// Splits `a=1&b=2` into pairs. A parameter without `=` maps to the empty
/// string; empty names are dropped.
pub fn parse_query(query: Substr<'_>) -> Pairs {
    query
        .split(b'&')
        .filter(|param| !param.is_empty())
        .filter_map(|param| {
            let (name, value) = if param.contains(b'=') {
                (param.before(b'='), param.after(b'='))
            } else {
                (param, Substr::default())
            };
            (!name.is_empty()).then(|| (name.to_string_lossy(), value.to_string_lossy()))
        })
        .collect()
}

/// Parses one request from the front of `buf`.
///
/// Returns the request and the number of bytes it occupied.
pub fn parse_http_request(buf: &[u8]) -> Result<(Request, usize), ParseError> {
    let frame = frame(buf)?;

    let method = Method::from_token(frame.start_line);
    if method.is_unknown() {
        return Err(ParseError::InvalidMethod);
    }

    let target = frame
        .start_line
        .skip_n(method.as_str().len())
        .skip_while(is_space);
    let target = if target.contains(b' ') {
        target.before(b' ')
    } else {
        target.truncate_while(is_space)
    };

    let (path, query) = if target.contains(b'?') {
        (target.before(b'?'), parse_query(target.after(b'?')))
    } else {
        (target, Pairs::new())
    };

    let request = Request {
        method,
        path: path.to_string_lossy().into_owned(),
        query,
        headers: parse_headers(frame.fields),
        body: frame.body.as_bytes().to_vec(),
    };

    Ok((request, frame.len))
}

/// Parses one response from the front of `buf`.
///
/// The status is recognized by numeric code or by reason phrase.
pub fn parse_http_response(buf: &[u8]) -> Result<(Response, usize), ParseError> {
    let frame = frame(buf)?;

    if !frame.start_line.has_prefix(HTTP_PREFIX) {
        return Err(ParseError::InvalidStatus);
    }
    let status = StatusCode::from_token(frame.start_line.after(b' ').skip_while(is_space));
    if status.is_unknown() {
        return Err(ParseError::InvalidStatus);
    }

    let response = Response {
        status,
        headers: parse_headers(frame.fields),
        body: frame.body.as_bytes().to_vec(),
    };

    Ok((response, frame.len))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn headers_without_colon_are_ignored() {
        let raw = b"GET / HTTP/1.1\r\nHost: a\r\ngarbage\r\n\r\n";
        let (req, _) = parse_http_request(raw).unwrap();
        assert_eq!(req.headers.len(), 1);
        assert_eq!(req.headers.get("Host"), Some("a"));
    }

    #[test]
    fn content_length_is_case_insensitive() {
        let raw = b"POST / HTTP/1.1\r\ncontent-length: 2\r\n\r\nokEXTRA";
        let (req, used) = parse_http_request(raw).unwrap();
        assert_eq!(req.body, b"ok");
        assert_eq!(used, raw.len() - 5);
    }

    #[test]
    fn query_without_value() {
        let query = parse_query(Substr::from("flag&x=1&&=skip"));
        assert_eq!(query.get("flag"), Some(""));
        assert_eq!(query.get("x"), Some("1"));
        assert_eq!(query.len(), 2);
    }

    #[test]
    fn negative_content_length_is_rejected() {
        let raw = b"POST / HTTP/1.1\r\nContent-Length: -1\r\n\r\n";
        assert_eq!(
            parse_http_request(raw).unwrap_err(),
            ParseError::InvalidContentLength
        );
    }
}
