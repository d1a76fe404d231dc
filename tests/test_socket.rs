use std::thread;
use std::time::Duration;

use nethttp::ip::{resolve, Address, Error, Operation, Protocol, Socket, SocketOption};

fn loopback_listener() -> (Socket, u16) {
    let mut listener = Socket::default();
    listener
        .listen_on(Address::localhost(0).with_protocol(Protocol::Tcp), 0)
        .unwrap();
    let port = listener.port().unwrap();
    (listener, port)
}

#[test]
fn test_default_socket_is_invalid() {
    let mut socket = Socket::default();
    assert!(!socket.is_open());
    assert_eq!(socket.id(), None);

    let err = socket.send(b"x").unwrap_err();
    assert_eq!(err.kind(), Error::not_open().kind());
    assert!(socket.recvall(&mut [0u8; 4]).error.is_some());

    assert!(socket.close().is_ok());
    assert!(socket.close().is_ok());
    assert!(!socket.is_open());
}

#[test]
fn test_close_open_socket_twice() {
    let (mut listener, _) = loopback_listener();
    assert!(listener.close().is_ok());
    assert!(!listener.is_open());
    assert_eq!(listener.id(), None);
    assert!(listener.close().is_ok());
    assert!(listener.port().is_err());
}

#[test]
fn test_take_leaves_source_invalid() {
    let mut socket = Socket::new(Protocol::Tcp).unwrap();
    let id = socket.id();

    let moved = socket.take();
    assert!(!socket.is_open());
    assert!(moved.is_open());
    assert_eq!(moved.id(), id);
}

#[test]
fn test_reopen_gets_new_identity() {
    let mut socket = Socket::new(Protocol::Tcp).unwrap();
    let first = socket.id().unwrap();
    socket.open(Protocol::Tcp).unwrap();
    assert_ne!(socket.id().unwrap(), first);
}

#[test]
fn test_loopback_transfer() {
    let (listener, port) = loopback_listener();

    let client = thread::spawn(move || {
        let mut socket = Socket::default();
        socket.connect(Address::localhost(port)).unwrap();
        let sent = socket.sendall(b"ping");
        assert!(sent.ok());
        assert_eq!(sent.size, 4);

        let mut reply = [0u8; 4];
        let received = socket.recvall(&mut reply);
        assert!(received.ok());
        assert_eq!(&reply, b"pong");
    });

    let (conn, peer) = listener.accept().unwrap();
    assert_eq!(peer.ip(), std::net::Ipv4Addr::LOCALHOST);
    assert_eq!(conn.peer_address().unwrap().port, peer.port);

    let mut buf = [0u8; 4];
    assert!(conn.recvall(&mut buf).ok());
    assert_eq!(&buf, b"ping");
    assert!(conn.sendall(b"pong").ok());

    client.join().unwrap();
}

#[test]
fn test_recv_reports_peer_shutdown() {
    let (listener, port) = loopback_listener();

    let mut client = Socket::default();
    client.connect(Address::localhost(port)).unwrap();
    let (conn, _) = listener.accept().unwrap();

    client.shutdown(Operation::Write).unwrap();
    let mut buf = [0u8; 8];
    assert_eq!(conn.recv(&mut buf).unwrap(), 0);

    let short = conn.recvall(&mut buf);
    assert_eq!(short.size, 0);
    assert!(short.error.is_some());
}

#[test]
fn test_recv_timeout_is_reported_as_timeout() {
    let (listener, port) = loopback_listener();

    let mut client = Socket::default();
    client.connect(Address::localhost(port)).unwrap();
    let (conn, _) = listener.accept().unwrap();

    conn.set_option(SocketOption::RecvTimeout(Some(Duration::from_millis(50))))
        .unwrap();
    let err = conn.recv(&mut [0u8; 8]).unwrap_err();
    assert!(err.is_timeout());
    drop(client);
}

#[test]
fn test_bind_conflict_is_an_error() {
    let (_listener, port) = loopback_listener();

    let mut second = Socket::default();
    let err = second
        .bind(Address::localhost(port).with_protocol(Protocol::Tcp))
        .unwrap_err();
    assert!(err.code().is_some());
    assert!(!err.message().is_empty());
}

#[test]
fn test_resolve_localhost_name() {
    let first = resolve(Protocol::Tcp, "localhost:80").unwrap().next().unwrap();
    assert_eq!(first.port, 80);
    assert_eq!(first.protocol, Protocol::Tcp);
}
