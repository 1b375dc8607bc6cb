//! Request framing.
//!
//! Turns the bytes read from a connection into an [`HttpRequest`]. The
//! dispatch engine only ever sees parsed requests.

mod request;
mod method;
mod version;
mod error;
mod tests;

// Re-export public items
pub use request::{HttpRequest, find_header_end, parse_request};
pub use method::Method;
pub use version::HttpVersion;
pub use error::Error;
