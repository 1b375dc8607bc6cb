//! The dispatch engine and server lifecycle.
//!
//! Requests flow from the accept loop in [`HttpServer`] through the
//! [`Dispatcher`], which runs the middleware pipeline, resolves a
//! [`Responder`] and writes whatever it produces.

mod response;
mod config;
mod error;
mod responder;
mod middleware;
mod dispatcher;
pub mod connection;
mod http_server;

// Re-export public items
pub use response::{FileBody, HttpResponse, StatusCode};
pub use config::ServerConfig;
pub use error::Error;
pub use responder::{
    error_responder_fn, responder_fn, ErrorResponder, FnErrorResponder, FnResponder, Parameters, Responder,
    ResponseFuture,
};
pub use middleware::{Flow, MiddlewareFn, MiddlewarePipeline};
pub use dispatcher::{Dispatcher, Unhandled};
pub use http_server::HttpServer;
