//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Parsed Request (method, path, headers, body)
//!     → router.rs (ordered route scan)
//!     → matcher.rs (evaluate method + path condition)
//!     → route handler (echo, user-agent, files)
//!     → Response, or 404 when nothing answers
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (exact and prefix matching only)
//! - Deterministic: same input always matches same route
//! - First match wins

pub mod matcher;
pub mod router;

pub use router::{Route, Router};
