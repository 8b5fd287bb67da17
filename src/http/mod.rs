//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → reader.rs (chunked reads until head terminator, then Content-Length)
//!     → parser.rs (start line, headers, body)
//!     → [routing layer builds the response]
//!     → response.rs (status line + headers + body bytes)
//!     → server.rs (write, close)
//! ```

pub mod headers;
pub mod parser;
pub mod reader;
pub mod request;
pub mod response;
pub mod server;

pub use headers::Headers;
pub use parser::{parse_request, ParseError};
pub use reader::{read_request, RequestError};
pub use request::Request;
pub use response::{Response, StatusCode};
pub use server::{handle_connection, HttpServer};
