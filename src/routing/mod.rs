//! Route registration and matching.
//!
//! Maps a request method and path to a [`Responder`](crate::server::Responder),
//! extracting `:name` path parameters on the way.

mod pattern;
mod registry;
mod tests;

pub use pattern::{DynamicPattern, PathPattern};
pub use registry::{Route, RouteRegistry};
