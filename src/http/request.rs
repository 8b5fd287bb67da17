//! Parsed request representation.
//!
//! # Design Decisions
//! - Header names are stored lower-cased (normalized by the parser)
//! - Body kept as raw bytes; it may not be UTF-8

use crate::http::headers::Headers;
use crate::http::parser::ParseError;

/// A single HTTP request, built once per connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Request {
    pub method: String,
    pub path: String,
    pub version: String,
    pub headers: Headers,
    pub body: Vec<u8>,
}

impl Request {
    /// Shorthand for a case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }

    /// Declared body length, if any.
    pub fn content_length(&self) -> Result<Option<usize>, ParseError> {
        match self.header("content-length") {
            None => Ok(None),
            Some(raw) => raw.trim().parse::<usize>().map(Some).map_err(|_| {
                ParseError::MalformedRequest(format!("invalid content-length `{raw}`"))
            }),
        }
    }
}
