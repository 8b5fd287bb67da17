//! Route matching logic.
//!
//! # Responsibilities
//! - Match request method (exact, case-sensitive)
//! - Match path exactly or by prefix
//! - Hand the unmatched path tail to the handler
//!
//! # Design Decisions
//! - Path matching is case-sensitive and works on the raw request target
//! - No regex to guarantee O(n) matching

use crate::http::Request;

/// Trait for matching requests against conditions.
pub trait Matcher: Send + Sync + std::fmt::Debug {
    /// Returns the path remainder after the matched part, or `None` on mismatch.
    fn matches<'r>(&self, req: &'r Request) -> Option<&'r str>;
}

/// Matches one method and one exact path.
#[derive(Debug, Clone)]
pub struct ExactMatcher {
    method: String,
    path: String,
}

impl ExactMatcher {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
        }
    }
}

impl Matcher for ExactMatcher {
    fn matches<'r>(&self, req: &'r Request) -> Option<&'r str> {
        (req.method == self.method && req.path == self.path).then_some("")
    }
}

/// Matches one method and a path prefix.
#[derive(Debug, Clone)]
pub struct PrefixMatcher {
    method: String,
    prefix: String,
}

impl PrefixMatcher {
    pub fn new(method: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            prefix: prefix.into(),
        }
    }
}

impl Matcher for PrefixMatcher {
    fn matches<'r>(&self, req: &'r Request) -> Option<&'r str> {
        if req.method != self.method {
            return None;
        }
        req.path.strip_prefix(self.prefix.as_str())
    }
}
