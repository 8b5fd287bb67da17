//! Request parsing from buffered bytes.
//!
//! # Responsibilities
//! - Locate the blank line separating the head from the body
//! - Split the start line into method, path, version
//! - Split header lines on the first `:`
//!
//! # Design Decisions
//! - Operates on an already-buffered slice; see `reader.rs` for socket reads
//! - Body is sliced from the raw buffer, never line-split
//! - Any structural problem is a `MalformedRequest`, never a panic

use thiserror::Error;

use crate::http::headers::Headers;
use crate::http::request::Request;

/// Separator between the request head and the body.
pub const HEAD_TERMINATOR: &[u8] = b"\r\n\r\n";

/// Errors produced while parsing a request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("malformed request: {0}")]
    MalformedRequest(String),
}

fn malformed(reason: impl Into<String>) -> ParseError {
    ParseError::MalformedRequest(reason.into())
}

/// Offset of the first `\r\n\r\n` in `buf`, if present.
pub fn find_head_end(buf: &[u8]) -> Option<usize> {
    buf.windows(HEAD_TERMINATOR.len())
        .position(|window| window == HEAD_TERMINATOR)
}

/// Parse a complete request. Everything after the first blank line is the body.
///
/// A buffer with no blank line is treated as a head with an empty body.
pub fn parse_request(buf: &[u8]) -> Result<Request, ParseError> {
    let (head, body) = match find_head_end(buf) {
        Some(end) => (&buf[..end], &buf[end + HEAD_TERMINATOR.len()..]),
        None => (buf, &[][..]),
    };

    let mut request = parse_head(head)?;
    request.body = body.to_vec();
    Ok(request)
}

/// Parse the start line and headers. The returned request has no body.
pub fn parse_head(head: &[u8]) -> Result<Request, ParseError> {
    let head = std::str::from_utf8(head).map_err(|_| malformed("request head is not UTF-8"))?;
    let mut lines = head.split("\r\n");

    let start_line = lines.next().unwrap_or_default();
    let (method, path, version) = parse_start_line(start_line)?;

    let mut headers = Headers::new();
    for line in lines.take_while(|line| !line.is_empty()) {
        let (name, value) = line
            .split_once(':')
            .ok_or_else(|| malformed(format!("header line without `:`: `{line}`")))?;
        let name = name.trim();
        if name.is_empty() {
            return Err(malformed("empty header name"));
        }
        headers.insert(name.to_ascii_lowercase(), value.trim());
    }

    Ok(Request {
        method: method.to_string(),
        path: path.to_string(),
        version: version.to_string(),
        headers,
        body: Vec::new(),
    })
}

fn parse_start_line(line: &str) -> Result<(&str, &str, &str), ParseError> {
    let mut parts = line.split(' ');
    match (parts.next(), parts.next(), parts.next(), parts.next()) {
        (Some(method), Some(path), Some(version), None)
            if !method.is_empty() && !path.is_empty() && !version.is_empty() =>
        {
            Ok((method, path, version))
        }
        _ => Err(malformed(format!("invalid start line `{line}`"))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_start_line_and_headers() {
        let request = parse_request(b"GET /echo/abc HTTP/1.1\r\nHost: x\r\n\r\n").unwrap();

        assert_eq!(request.method, "GET");
        assert_eq!(request.path, "/echo/abc");
        assert_eq!(request.version, "HTTP/1.1");
        assert_eq!(request.headers.iter().collect::<Vec<_>>(), vec![("host", "x")]);
        assert!(request.body.is_empty());
    }

    #[test]
    fn header_names_lowered_and_values_trimmed() {
        let request =
            parse_request(b"GET / HTTP/1.1\r\nUser-Agent:   curl/8.0  \r\nX-Empty:\r\n\r\n")
                .unwrap();

        assert_eq!(request.header("user-agent"), Some("curl/8.0"));
        assert_eq!(request.headers.iter().next(), Some(("user-agent", "curl/8.0")));
        assert_eq!(request.header("x-empty"), Some(""));
    }

    #[test]
    fn value_keeps_later_colons() {
        let request = parse_request(b"GET / HTTP/1.1\r\nHost: localhost:4221\r\n\r\n").unwrap();
        assert_eq!(request.header("host"), Some("localhost:4221"));
    }

    #[test]
    fn duplicate_header_last_wins() {
        let request =
            parse_request(b"GET / HTTP/1.1\r\nAccept: a\r\naccept: b\r\n\r\n").unwrap();
        assert_eq!(request.header("accept"), Some("b"));
        assert_eq!(request.headers.len(), 1);
    }

    #[test]
    fn body_is_raw_bytes_after_blank_line() {
        let request = parse_request(
            b"POST /files/a HTTP/1.1\r\nContent-Length: 6\r\n\r\n\x00\xffa\r\n\r\n",
        )
        .unwrap();
        assert_eq!(request.body, b"\x00\xffa\r\n\r\n");
    }

    #[test]
    fn missing_blank_line_means_empty_body() {
        let request = parse_request(b"GET / HTTP/1.1\r\nHost: x\r\n").unwrap();
        assert_eq!(request.header("host"), Some("x"));
        assert!(request.body.is_empty());
    }

    #[test]
    fn short_start_line_is_malformed() {
        for input in [&b"GET /\r\n\r\n"[..], b"GET\r\n\r\n", b"\r\n\r\n", b""] {
            let err = parse_request(input).unwrap_err();
            assert!(matches!(err, ParseError::MalformedRequest(_)), "{input:?}");
        }
    }

    #[test]
    fn extra_start_line_tokens_are_malformed() {
        assert!(parse_request(b"GET /a b HTTP/1.1\r\n\r\n").is_err());
        assert!(parse_request(b"GET  / HTTP/1.1\r\n\r\n").is_err());
    }

    #[test]
    fn header_without_colon_is_malformed() {
        let err = parse_request(b"GET / HTTP/1.1\r\nno-colon-here\r\n\r\n").unwrap_err();
        assert_eq!(
            err,
            ParseError::MalformedRequest("header line without `:`: `no-colon-here`".into())
        );
    }

    #[test]
    fn non_utf8_head_is_malformed() {
        assert!(parse_request(b"GET /\xff HTTP/1.1\r\n\r\n").is_err());
    }

    #[test]
    fn finds_head_end() {
        assert_eq!(find_head_end(b"GET / HTTP/1.1\r\n\r\nbody"), Some(14));
        assert_eq!(find_head_end(b"GET / HTTP/1.1\r\n"), None);
    }
}
