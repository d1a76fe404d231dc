use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

use bytes::BytesMut;
use nethttp::config::ServerConfig;
use nethttp::http::{Method, Request, Response, StatusCode};
use nethttp::ip::{Address, Socket, SocketOption};
use nethttp::server::{Server, ServerState};

fn echo(request: &Request, response: &mut Response) {
    match request.path.as_str() {
        "/silent" => {}
        _ => {
            response.status = StatusCode::Ok;
            let name = request.query.get_or("name", "world");
            response.body = format!("{} {} {}", request.method, request.path, name).into_bytes();
            if !request.body.is_empty() {
                response.body.push(b':');
                response.body.extend_from_slice(&request.body);
            }
        }
    }
}

fn start_server() -> (Server, u16) {
    let config = ServerConfig {
        accept_timeout_ms: 50,
        recv_timeout_ms: 100,
        ..ServerConfig::default()
    };
    let server = Server::with_config(config, echo);
    server.start(0).unwrap();
    let port = server.port().unwrap();
    (server, port)
}

fn connect(port: u16) -> Socket {
    let mut socket = Socket::default();
    socket.connect(Address::localhost(port)).unwrap();
    socket
        .set_option(SocketOption::RecvTimeout(Some(Duration::from_secs(5))))
        .unwrap();
    socket
}

/// Reads responses until `count` have arrived.
fn read_responses(socket: &Socket, count: usize) -> Vec<Response> {
    let mut buf = BytesMut::new();
    let mut block = [0u8; 1024];
    let mut responses = Vec::new();
    while responses.len() < count {
        let n = socket.recv(&mut block).unwrap();
        assert!(n > 0, "server closed early");
        buf.extend_from_slice(&block[..n]);
        while let Ok(response) = Response::read(&mut buf) {
            responses.push(response);
        }
    }
    responses
}

/// The server side went away: orderly FIN, or RST if it closed with unread
/// bytes.
fn assert_closed(socket: &Socket) {
    let mut block = [0u8; 16];
    match socket.recv(&mut block) {
        Ok(n) => assert_eq!(n, 0, "expected the connection to be closed"),
        Err(e) => assert!(!e.is_timeout(), "connection still open"),
    }
}

fn wait_until(mut cond: impl FnMut() -> bool) -> bool {
    let deadline = Instant::now() + Duration::from_secs(5);
    while Instant::now() < deadline {
        if cond() {
            return true;
        }
        thread::sleep(Duration::from_millis(10));
    }
    cond()
}

#[test]
fn test_serves_request_with_client_send() {
    let (server, port) = start_server();
    assert_eq!(server.state(), ServerState::Listening);

    let request = Request::new(Method::GET, format!("http://127.0.0.1:{}/hello?name=rust", port));
    let response = request.send().unwrap();

    assert_eq!(response.status, StatusCode::Ok);
    assert_eq!(response.body, b"GET /hello rust");
    assert_eq!(response.header("Content-Length"), Some("15"));
}

#[test]
fn test_post_body_reaches_handler() {
    let (_server, port) = start_server();

    let mut request = Request::new(Method::POST, format!("127.0.0.1:{}/submit", port));
    request.body = b"payload".to_vec();
    let response = request.send().unwrap();

    assert_eq!(response.body, b"POST /submit world:payload");
}

#[test]
fn test_unhandled_request_gets_not_implemented() {
    let (_server, port) = start_server();

    let response = Request::new(Method::GET, format!("http://127.0.0.1:{}/silent", port))
        .send()
        .unwrap();

    assert_eq!(response.status, StatusCode::NotImplemented);
    assert!(response.body.is_empty());
}

#[test]
fn test_pipelined_requests_answered_in_order() {
    let (_server, port) = start_server();
    let socket = connect(port);

    let batch = b"GET /one HTTP/1.1\r\n\r\nGET /two HTTP/1.1\r\n\r\nGET /three HTTP/1.1\r\n\r\n";
    assert!(socket.sendall(batch).ok());

    let bodies: Vec<Vec<u8>> = read_responses(&socket, 3)
        .into_iter()
        .map(|r| r.body)
        .collect();
    assert_eq!(
        bodies,
        vec![
            b"GET /one world".to_vec(),
            b"GET /two world".to_vec(),
            b"GET /three world".to_vec(),
        ]
    );
}

#[test]
fn test_request_split_across_sends() {
    let (_server, port) = start_server();
    let socket = connect(port);

    assert!(socket.sendall(b"POST /split HTTP/1.1\r\nContent-Le").ok());
    thread::sleep(Duration::from_millis(30));
    assert!(socket.sendall(b"ngth: 3\r\n\r\nab").ok());
    thread::sleep(Duration::from_millis(30));
    assert!(socket.sendall(b"c").ok());

    let responses = read_responses(&socket, 1);
    assert_eq!(responses[0].body, b"POST /split world:abc");
}

#[test]
fn test_connection_close_header_disconnects() {
    let (server, port) = start_server();
    let socket = connect(port);

    assert!(socket.sendall(b"GET /bye HTTP/1.1\r\nConnection: close\r\n\r\n").ok());
    let responses = read_responses(&socket, 1);
    assert_eq!(responses[0].status, StatusCode::Ok);

    assert_closed(&socket);
    assert!(wait_until(|| server.connection_count() == 0));
}

#[test]
fn test_malformed_request_disconnects() {
    let (_server, port) = start_server();
    let socket = connect(port);

    assert!(socket.sendall(b"BREW /pot HTTP/1.1\r\n\r\n").ok());
    assert_closed(&socket);
}

#[test]
fn test_idle_connection_times_out() {
    let config = ServerConfig {
        accept_timeout_ms: 50,
        recv_timeout_ms: 20,
        idle_timeout_ms: 100,
        ..ServerConfig::default()
    };
    let server = Server::with_config(config, echo);
    server.start(0).unwrap();
    let socket = connect(server.port().unwrap());

    assert!(wait_until(|| server.connection_count() == 1));
    assert!(wait_until(|| server.connection_count() == 0));

    assert_closed(&socket);
}

#[test]
fn test_stop_closes_live_connections() {
    let (server, port) = start_server();
    let idle = connect(port);
    let busy = connect(port);
    assert!(busy.sendall(b"GET /partial HTTP/1.1\r\nHost: x").ok());
    assert!(wait_until(|| server.connection_count() == 2));

    server.stop();

    assert_eq!(server.state(), ServerState::Stopped);
    assert_eq!(server.connection_count(), 0);
    assert_eq!(server.port(), None);

    assert_closed(&idle);
    assert_closed(&busy);
}

#[test]
fn test_stop_is_idempotent_and_concurrent() {
    let (server, port) = start_server();
    let _client = connect(port);
    assert!(wait_until(|| server.connection_count() == 1));

    let server = Arc::new(server);
    let stoppers: Vec<_> = (0..4)
        .map(|_| {
            let server = Arc::clone(&server);
            thread::spawn(move || server.stop())
        })
        .collect();
    for stopper in stoppers {
        stopper.join().unwrap();
    }

    server.stop();
    assert_eq!(server.state(), ServerState::Stopped);
    assert_eq!(server.connection_count(), 0);
}

#[test]
fn test_stop_before_start_is_noop() {
    let server = Server::new(echo);
    server.stop();
    assert_eq!(server.state(), ServerState::Stopped);
    assert_eq!(server.port(), None);
}

#[test]
fn test_restart_rebinds() {
    let (server, first_port) = start_server();
    server.start(0).unwrap();
    let second_port = server.port().unwrap();
    assert_eq!(server.state(), ServerState::Listening);

    let response = Request::new(Method::GET, format!("http://127.0.0.1:{}/again", second_port))
        .send()
        .unwrap();
    assert_eq!(response.status, StatusCode::Ok);
    assert_ne!(first_port, 0);
}

#[test]
fn test_start_on_busy_port_fails() {
    let (_running, port) = start_server();

    let second = Server::new(echo);
    assert!(second.start(port).is_err());
    assert_eq!(second.state(), ServerState::Stopped);
    assert_eq!(second.port(), None);
}
