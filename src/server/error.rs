//! Error types for dispatch, responders and the server lifecycle.

use thiserror::Error;

use crate::parser::{Error as ParserError, Method};
use crate::server::response::StatusCode;

/// Errors that can occur while serving requests or driving the server.
#[derive(Debug, Error)]
pub enum Error {
    /// Error parsing an HTTP request.
    #[error("Parse error: {0}")]
    ParseError(#[from] ParserError),

    /// I/O error.
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Requested resource not found.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A responder does not handle this method.
    #[error("Method {0} not supported by {1}")]
    MethodNotSupported(Method, String),

    /// No route matched and no default responder is configured.
    #[error("No responder for {0} {1}")]
    RouteNotFound(Method, String),

    /// The exact path is registered, but not for this method.
    #[error("Path {1} has no responder registered for {0}")]
    MethodNotRegistered(Method, String),

    /// A route pattern could not be compiled.
    #[error("Invalid route {0}: {1}")]
    InvalidRoute(String, String),

    /// The server has been disposed and can no longer be used.
    #[error("Server has been disposed")]
    Disposed,

    /// Internal server error.
    #[error("Internal server error: {0}")]
    InternalError(String),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl Error {
    /// The status written to the client when this error reaches the
    /// connection layer unhandled.
    pub fn status_code(&self) -> StatusCode {
        match self {
            Error::ParseError(_) => StatusCode::BadRequest,
            Error::NotFound(_) => StatusCode::NotFound,
            Error::MethodNotSupported(_, _) => StatusCode::MethodNotAllowed,
            _ => StatusCode::InternalServerError,
        }
    }

    /// Whether this is the typed not-found condition.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}
