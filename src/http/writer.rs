use crate::http::pairs::Pairs;
use crate::http::request::Request;
use crate::http::response::Response;

const HTTP_VERSION: &str = "HTTP/1.1";

/// Appends the wire form of `req` to `buf`. Headers are written as given.
pub fn write_request(req: &Request, buf: &mut Vec<u8>) {
    // Request line
    buf.extend_from_slice(req.method.as_str().as_bytes());
    buf.push(b' ');
    if req.path.is_empty() {
        buf.push(b'/');
    } else {
        buf.extend_from_slice(req.path.as_bytes());
    }

    let mut separator = b'?';
    for (k, v) in &req.query {
        buf.push(separator);
        buf.extend_from_slice(k.as_bytes());
        buf.push(b'=');
        buf.extend_from_slice(v.as_bytes());
        separator = b'&';
    }

    buf.push(b' ');
    buf.extend_from_slice(HTTP_VERSION.as_bytes());
    buf.extend_from_slice(b"\r\n");

    write_headers(&req.headers, buf);

    // Header/body separator
    buf.extend_from_slice(b"\r\n");
    buf.extend_from_slice(&req.body);
}

/// Appends the wire form of `resp` to `buf`, adding `Content-Length` unless
/// the caller already set one.
pub fn write_response(resp: &Response, buf: &mut Vec<u8>) {
    // Status line
    let status_line = format!(
        "{} {} {}\r\n",
        HTTP_VERSION,
        resp.status.as_u16(),
        resp.status.reason_phrase()
    );
    buf.extend_from_slice(status_line.as_bytes());

    write_headers(&resp.headers, buf);
    if !resp.headers.has_ignore_ascii_case("Content-Length") {
        buf.extend_from_slice(format!("Content-Length: {}\r\n", resp.body.len()).as_bytes());
    }

    // Header/body separator
    buf.extend_from_slice(b"\r\n");
    buf.extend_from_slice(&resp.body);
}

fn write_headers(headers: &Pairs, buf: &mut Vec<u8>) {
    for (k, v) in headers {
        buf.extend_from_slice(k.as_bytes());
        buf.extend_from_slice(b": ");
        buf.extend_from_slice(v.as_bytes());
        buf.extend_from_slice(b"\r\n");
    }
}
