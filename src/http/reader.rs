//! Reading a request off a socket.
//!
//! # Responsibilities
//! - Read in fixed-size chunks until the head terminator arrives
//! - Enforce head and body size limits
//! - Read exactly `Content-Length` body bytes
//!
//! # Design Decisions
//! - One request per connection: bytes beyond the declared body are dropped
//! - A peer that closes before sending anything is not an error

use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt};

use crate::config::LimitsConfig;
use crate::http::parser::{find_head_end, parse_head, parse_request, ParseError, HEAD_TERMINATOR};
use crate::http::request::Request;
use crate::http::response::StatusCode;

/// Error type for reading a request from a connection.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error("request head exceeds {limit} bytes")]
    HeadTooLarge { limit: usize },

    #[error("request body of {length} bytes exceeds {limit} bytes")]
    BodyTooLarge { length: usize, limit: usize },

    #[error("connection closed after {received} of {expected} body bytes")]
    Incomplete { received: usize, expected: usize },
}

impl RequestError {
    /// Status to answer with, or `None` when the connection is unusable.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RequestError::Io(_) => None,
            RequestError::Parse(_) | RequestError::Incomplete { .. } => Some(StatusCode::BadRequest),
            RequestError::HeadTooLarge { .. } => Some(StatusCode::RequestHeaderFieldsTooLarge),
            RequestError::BodyTooLarge { .. } => Some(StatusCode::PayloadTooLarge),
        }
    }

    /// Short label for logs and metrics.
    pub fn reason(&self) -> &'static str {
        match self {
            RequestError::Io(_) => "io",
            RequestError::Parse(_) => "malformed",
            RequestError::HeadTooLarge { .. } => "head_too_large",
            RequestError::BodyTooLarge { .. } => "body_too_large",
            RequestError::Incomplete { .. } => "incomplete",
        }
    }
}

/// Read one request from `stream`.
///
/// Returns `Ok(None)` if the peer closed the connection without sending a byte.
pub async fn read_request<R>(
    stream: &mut R,
    limits: &LimitsConfig,
) -> Result<Option<Request>, RequestError>
where
    R: AsyncRead + Unpin,
{
    let mut buf: Vec<u8> = Vec::with_capacity(limits.read_chunk_size);
    let mut chunk = vec![0u8; limits.read_chunk_size];
    let mut scanned: usize = 0;

    let head_end = loop {
        // The terminator may straddle two reads.
        let from = scanned.saturating_sub(HEAD_TERMINATOR.len() - 1);
        if let Some(pos) = find_head_end(&buf[from..]) {
            break from + pos;
        }
        scanned = buf.len();

        if buf.len() > limits.max_head_bytes {
            return Err(RequestError::HeadTooLarge {
                limit: limits.max_head_bytes,
            });
        }

        let n = stream.read(&mut chunk).await?;
        if n == 0 {
            if buf.is_empty() {
                return Ok(None);
            }
            // Peer half-closed without a blank line; parse what arrived.
            return Ok(Some(parse_request(&buf)?));
        }
        buf.extend_from_slice(&chunk[..n]);
    };

    if head_end > limits.max_head_bytes {
        return Err(RequestError::HeadTooLarge {
            limit: limits.max_head_bytes,
        });
    }

    let mut request = parse_head(&buf[..head_end])?;
    let length = request.content_length()?.unwrap_or(0);
    if length > limits.max_body_bytes {
        return Err(RequestError::BodyTooLarge {
            length,
            limit: limits.max_body_bytes,
        });
    }

    let mut body = buf.split_off(head_end + HEAD_TERMINATOR.len());
    let received = body.len().min(length);
    body.resize(length, 0);

    if received < length {
        match stream.read_exact(&mut body[received..]).await {
            Ok(_) => {}
            Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return Err(RequestError::Incomplete {
                    received,
                    expected: length,
                });
            }
            Err(e) => return Err(e.into()),
        }
    }

    request.body = body;
    Ok(Some(request))
}
