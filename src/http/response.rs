//! Response representation and serialization.
//!
//! # Design Decisions
//! - Closed set of status codes
//! - Serialization is plain concatenation; no header is added implicitly
//! - Default response is `404 Not Found` with no headers and no body

use std::fmt;

use crate::http::headers::Headers;

pub const HTTP_1_1: &str = "HTTP/1.1";

/// Status codes this server can answer with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum StatusCode {
    Ok,
    Created,
    BadRequest,
    #[default]
    NotFound,
    PayloadTooLarge,
    RequestHeaderFieldsTooLarge,
}

impl StatusCode {
    pub fn code(&self) -> u16 {
        match self {
            StatusCode::Ok => 200,
            StatusCode::Created => 201,
            StatusCode::BadRequest => 400,
            StatusCode::NotFound => 404,
            StatusCode::PayloadTooLarge => 413,
            StatusCode::RequestHeaderFieldsTooLarge => 431,
        }
    }

    pub fn reason(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::NotFound => "Not Found",
            StatusCode::PayloadTooLarge => "Payload Too Large",
            StatusCode::RequestHeaderFieldsTooLarge => "Request Header Fields Too Large",
        }
    }
}

impl fmt::Display for StatusCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.code(), self.reason())
    }
}

/// An HTTP response ready to be written to the socket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    pub version: String,
    pub status: StatusCode,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Default for Response {
    fn default() -> Self {
        Self::new(StatusCode::NotFound)
    }
}

impl Response {
    /// An HTTP/1.1 response with the given status, no headers and no body.
    pub fn new(status: StatusCode) -> Self {
        Self {
            version: HTTP_1_1.to_string(),
            status,
            headers: Headers::new(),
            body: Vec::new(),
        }
    }

    pub fn not_found() -> Self {
        Self::new(StatusCode::NotFound)
    }

    /// `200 OK` with a `text/plain` body and its `Content-Length`.
    pub fn text(body: impl Into<String>) -> Self {
        Self::with_content(StatusCode::Ok, "text/plain", body.into().into_bytes())
    }

    /// `200 OK` with an `application/octet-stream` body and its `Content-Length`.
    pub fn octets(body: Vec<u8>) -> Self {
        Self::with_content(StatusCode::Ok, "application/octet-stream", body)
    }

    fn with_content(status: StatusCode, content_type: &str, body: Vec<u8>) -> Self {
        Self::new(status)
            .with_header("Content-Type", content_type)
            .with_header("Content-Length", body.len().to_string())
            .with_body(body)
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self
    }

    /// Serialize as status line, header lines, blank line, body.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut head = format!("{} {}\r\n", self.version, self.status);
        for (name, value) in self.headers.iter() {
            head.push_str(name);
            head.push_str(": ");
            head.push_str(value);
            head.push_str("\r\n");
        }
        head.push_str("\r\n");

        let mut out = head.into_bytes();
        out.extend_from_slice(&self.body);
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_exact_framing() {
        let response = Response::new(StatusCode::Ok)
            .with_header("Content-Type", "text/plain")
            .with_body("hi");

        assert_eq!(
            response.to_bytes(),
            b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\n\r\nhi".to_vec()
        );
    }

    #[test]
    fn default_is_empty_not_found() {
        let response = Response::default();
        assert_eq!(response.status, StatusCode::NotFound);
        assert!(response.headers.is_empty());
        assert_eq!(response.to_bytes(), b"HTTP/1.1 404 Not Found\r\n\r\n".to_vec());
    }

    #[test]
    fn text_sets_content_headers() {
        let response = Response::text("hello");
        assert_eq!(response.headers.get("content-type"), Some("text/plain"));
        assert_eq!(response.headers.get("content-length"), Some("5"));
        assert_eq!(response.body, b"hello");
    }

    #[test]
    fn headers_keep_insertion_order() {
        let bytes = Response::octets(b"\x01\x02".to_vec()).to_bytes();
        assert_eq!(
            bytes,
            b"HTTP/1.1 200 OK\r\nContent-Type: application/octet-stream\r\nContent-Length: 2\r\n\r\n\x01\x02"
                .to_vec()
        );
    }

    #[test]
    fn status_lines() {
        assert_eq!(StatusCode::Created.to_string(), "201 Created");
        assert_eq!(StatusCode::BadRequest.to_string(), "400 Bad Request");
        assert_eq!(StatusCode::RequestHeaderFieldsTooLarge.code(), 431);
    }
}
