//! nethttp - a small blocking HTTP/1.1 stack over raw IPv4 sockets.
//!
//! - [`substr`]: zero-copy byte views used for message framing
//! - [`ip`]: addresses, resolution and the socket wrapper
//! - [`http`]: requests, responses, the codec and a one-shot client
//! - [`server`]: the threaded connection server
//! - [`config`]: YAML/env configuration

pub mod config;
pub mod http;
pub mod ip;
pub mod server;
pub mod substr;
