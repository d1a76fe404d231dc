//! One-shot blocking HTTP client: [`Request::send`].

use std::time::Duration;

use anyhow::{bail, Context, Result};
use bytes::BytesMut;
use url::Url;

use crate::http::pairs::Pairs;
use crate::http::parser::ParseError;
use crate::http::request::Request;
use crate::http::response::Response;
use crate::ip::{resolve, Protocol, Socket, SocketOption};

const BUFFER_SIZE: usize = 4096;
const CLIENT_TIMEOUT: Duration = Duration::from_secs(30);

impl Request {
    /// Connects to the host named by `path`, sends the request and blocks
    /// until one complete response has arrived.
    ///
    /// `path` must be an absolute URI (`http://host[:port]/path`); a missing
    /// scheme is taken as `http`. Query parameters in the URI are merged
    /// under any set on the request. `Host`, `Content-Length` and
    /// `Connection: close` are added unless already present.
    pub fn send(&self) -> Result<Response> {
        let url = target_url(&self.path)?;
        let host = url.host_str().context("Request URI missing host")?;
        let port = url.port_or_known_default().unwrap_or(80);

        let address = resolve(Protocol::Tcp, &format!("{}:{}", host, port))
            .with_context(|| format!("Failed to resolve {}", host))?
            .next()
            .with_context(|| format!("No IPv4 address for {}", host))?;

        let mut socket = Socket::new(Protocol::Tcp)?;
        socket.set_option(SocketOption::RecvTimeout(Some(CLIENT_TIMEOUT)))?;
        socket.set_option(SocketOption::SendTimeout(Some(CLIENT_TIMEOUT)))?;
        socket
            .connect(address)
            .with_context(|| format!("Failed to connect to {}", address))?;
        tracing::trace!(%address, "Connected");

        let outgoing = self.to_origin_form(&url);
        socket
            .sendall(&outgoing.write())
            .into_result()
            .context("Failed to send request")?;

        read_response(&socket)
    }

    /// Rewrites an absolute-URI request into what goes on the wire.
    fn to_origin_form(&self, url: &Url) -> Request {
        let mut request = self.clone();
        request.path = url.path().to_string();
        if request.path.is_empty() {
            request.path.push('/');
        }

        let mut query: Pairs = url.query_pairs().collect();
        query.extend(self.query.iter().map(|(k, v)| (k.as_str(), v.as_str())));
        request.query = query;

        if !request.headers.has_ignore_ascii_case("Host") {
            let host = url.host_str().unwrap_or_default();
            match url.port() {
                Some(port) => request.headers.set("Host", format!("{}:{}", host, port)),
                None => request.headers.set("Host", host),
            };
        }
        if !request.body.is_empty() && !request.headers.has_ignore_ascii_case("Content-Length") {
            request.headers.set("Content-Length", request.body.len());
        }
        if !request.headers.has_ignore_ascii_case("Connection") {
            request.headers.set("Connection", "close");
        }
        request
    }
}

fn target_url(path: &str) -> Result<Url> {
    let url = if path.contains("://") {
        Url::parse(path)
    } else {
        Url::parse(&format!("http://{}", path))
    }
    .with_context(|| format!("Invalid request URI: {}", path))?;

    if url.scheme() != "http" {
        bail!("Unsupported scheme: {}", url.scheme());
    }
    Ok(url)
}

fn read_response(socket: &Socket) -> Result<Response> {
    let mut buffer = BytesMut::with_capacity(BUFFER_SIZE);
    let mut block = [0u8; BUFFER_SIZE];

    loop {
        let n = socket.recv(&mut block).context("Failed to receive response")?;
        if n == 0 {
            bail!("Connection closed before complete response received");
        }
        buffer.extend_from_slice(&block[..n]);

        match Response::read(&mut buffer) {
            Ok(response) => return Ok(response),
            Err(ParseError::Incomplete) => continue,
            Err(e) => return Err(e).context("Malformed response"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::Method;

    #[test]
    fn scheme_defaults_to_http() {
        let url = target_url("localhost:7200/status").unwrap();
        assert_eq!(url.scheme(), "http");
        assert_eq!(url.port(), Some(7200));
    }

    #[test]
    fn other_schemes_are_rejected() {
        assert!(target_url("https://example.com/").is_err());
    }

    #[test]
    fn origin_form_fills_in_headers() {
        let mut request = Request::new(Method::POST, "http://example.com:8080/submit?a=1");
        request.query.set("b", "2");
        request.body = b"data".to_vec();

        let url = target_url(&request.path).unwrap();
        let outgoing = request.to_origin_form(&url);

        assert_eq!(outgoing.path, "/submit");
        assert_eq!(outgoing.query.get("a"), Some("1"));
        assert_eq!(outgoing.query.get("b"), Some("2"));
        assert_eq!(outgoing.header("Host"), Some("example.com:8080"));
        assert_eq!(outgoing.header("Content-Length"), Some("4"));
        assert_eq!(outgoing.header("Connection"), Some("close"));
    }
}
