//! HTTP/1.1 protocol implementation.
//!
//! # Architecture
//!
//! The HTTP layer is organized into several submodules:
//!
//! - **`connection`**: Per-client loop: receive, frame, dispatch, respond
//! - **`parser`**: Frames and parses requests and responses out of byte buffers
//! - **`request`** / **`response`**: Message types and their builders
//! - **`method`** / **`status`**: Method and status tables with prefix lookup
//! - **`pairs`**: Ordered string map used for headers and query parameters
//! - **`writer`**: Serializes messages to their wire form
//! - **`handler`**: The application callback trait
//! - **`client`**: One-shot blocking client, [`Request::send`]
//!
//! # Connection Loop
//!
//! ```text
//!        ┌─────────────┐
//!        │   Reading   │ ← recv into the buffer (timeouts tick idle time)
//!        └──────┬──────┘
//!               │ Complete request framed
//!               ▼
//!        ┌──────────────────┐
//!        │   Processing     │ ← handler fills the response
//!        └──────┬───────────┘
//!               │
//!               ▼
//!        ┌──────────────────┐
//!        │    Writing       │ ← sendall, Content-Length added
//!        └──────┬───────────┘
//!               ├─ more buffered → Processing
//!               ├─ Connection: close → Closed
//!               └─ otherwise → Reading
//! ```
//!
//! Only `Content-Length` framing is understood. Chunked transfer encoding,
//! TLS and HTTP/2 are out of scope.

pub mod client;
pub mod connection;
pub mod handler;
pub mod method;
pub mod pairs;
pub mod parser;
pub mod request;
pub mod response;
pub mod status;
pub mod writer;

pub use handler::Handler;
pub use method::Method;
pub use pairs::Pairs;
pub use parser::ParseError;
pub use request::{Request, RequestBuilder};
pub use response::{Response, ResponseBuilder};
pub use status::StatusCode;
