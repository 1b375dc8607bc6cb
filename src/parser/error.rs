//! Error types for request framing.

use thiserror::Error;

/// Errors that can occur while framing an HTTP request.
#[derive(Debug, Error)]
pub enum Error {
    /// The HTTP method in the request is not supported.
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// The request target is missing or not an absolute path.
    #[error("Invalid HTTP path")]
    InvalidPath,

    /// The request line is malformed (wrong format or missing components).
    #[error("Malformed request line: {0}")]
    MalformedRequestLine(String),

    /// The HTTP version in the request is not supported.
    #[error("Invalid HTTP version: {0}")]
    InvalidVersion(String),

    /// A required header is missing from the request.
    #[error("Required header is missing: {0}")]
    MissingHeader(String),

    /// A header line has no `name: value` shape.
    #[error("Invalid header format")]
    InvalidHeaderFormat,

    /// `Content-Length` is not a decimal byte count.
    #[error("Invalid Content-Length: {0}")]
    InvalidContentLength(String),

    /// The request exceeds the configured size limit.
    #[error("Request exceeds {0} bytes")]
    TooLarge(usize),

    /// The request is empty.
    #[error("Empty request")]
    EmptyRequest,

    /// Error parsing JSON.
    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),
}
