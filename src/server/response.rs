//! HTTP response types and utilities.

use std::collections::HashMap;
use std::io::SeekFrom;
use std::path::PathBuf;

use serde::Serialize;
use tokio::fs::File;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWrite, AsyncWriteExt};

use crate::server::error::Error;

/// HTTP status codes with their standard reason phrases.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusCode {
    Ok = 200,
    Created = 201,
    NoContent = 204,
    PartialContent = 206,
    BadRequest = 400,
    Unauthorized = 401,
    Forbidden = 403,
    NotFound = 404,
    MethodNotAllowed = 405,
    RangeNotSatisfiable = 416,
    InternalServerError = 500,
    NotImplemented = 501,
    ServiceUnavailable = 503,
}

impl StatusCode {
    /// Get the reason phrase for this status code.
    pub fn reason_phrase(&self) -> &'static str {
        match self {
            StatusCode::Ok => "OK",
            StatusCode::Created => "Created",
            StatusCode::NoContent => "No Content",
            StatusCode::PartialContent => "Partial Content",
            StatusCode::BadRequest => "Bad Request",
            StatusCode::Unauthorized => "Unauthorized",
            StatusCode::Forbidden => "Forbidden",
            StatusCode::NotFound => "Not Found",
            StatusCode::MethodNotAllowed => "Method Not Allowed",
            StatusCode::RangeNotSatisfiable => "Range Not Satisfiable",
            StatusCode::InternalServerError => "Internal Server Error",
            StatusCode::NotImplemented => "Not Implemented",
            StatusCode::ServiceUnavailable => "Service Unavailable",
        }
    }

    /// The numeric code.
    pub fn as_u16(&self) -> u16 {
        *self as u16
    }

    /// True for 4xx and 5xx codes.
    pub fn is_error(&self) -> bool {
        self.as_u16() >= 400
    }
}

/// Represents an HTTP response.
///
/// A response is threaded by value through middleware and responders; each
/// step may mutate it before handing it on.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    /// The HTTP status code
    pub status: StatusCode,
    /// The HTTP headers
    pub headers: HashMap<String, String>,
    /// The response body
    pub body: Vec<u8>,
    /// A file span sent in place of `body`, copied to the socket when the
    /// response is written
    pub file: Option<FileBody>,
}

/// `length` bytes of the file at `path`, starting at `offset`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileBody {
    pub path: PathBuf,
    pub offset: u64,
    pub length: u64,
}

impl Default for HttpResponse {
    fn default() -> Self {
        Self::new(StatusCode::Ok)
    }
}

impl HttpResponse {
    /// Create a new HTTP response with the given status code.
    pub fn new(status: StatusCode) -> Self {
        let mut headers = HashMap::new();
        headers.insert("Server".to_string(), "localhttp".to_string());

        Self {
            status,
            headers,
            body: Vec::new(),
            file: None,
        }
    }

    /// Replace the status code.
    pub fn with_status(mut self, status: StatusCode) -> Self {
        self.status = status;
        self
    }

    /// Set the response body with a string.
    pub fn with_body_string(self, body: impl Into<String>) -> Self {
        self.with_body_bytes(body.into().into_bytes())
    }

    /// Set the response body with bytes.
    pub fn with_body_bytes(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self.file = None;
        let content_length = self.body.len().to_string();
        self.with_header("Content-Length", content_length)
    }

    /// Send `length` bytes of the file at `path` from `offset` as the body.
    /// The file is read only when the response is written.
    pub fn with_file_body(mut self, path: impl Into<PathBuf>, offset: u64, length: u64) -> Self {
        self.body = Vec::new();
        self.file = Some(FileBody {
            path: path.into(),
            offset,
            length,
        });
        self.with_header("Content-Length", length.to_string())
    }

    /// Number of body bytes that will be written.
    pub fn content_length(&self) -> u64 {
        match &self.file {
            Some(file) => file.length,
            None => self.body.len() as u64,
        }
    }

    /// Add or replace a header.
    ///
    /// An existing header with the same name in a different case is replaced.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_header(name, value);
        self
    }

    /// Set the content type.
    pub fn with_content_type(self, content_type: impl Into<String>) -> Self {
        self.with_header("Content-Type", content_type)
    }

    /// Add or replace a header in place.
    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) {
        let name = name.into();
        self.headers.retain(|k, _| !k.eq_ignore_ascii_case(&name));
        self.headers.insert(name, value.into());
    }

    /// Look up a header (case-insensitive).
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set the response body with a JSON value.
    pub fn with_json<T: Serialize>(self, value: &T) -> Result<Self, Error> {
        let json = serde_json::to_vec(value).map_err(Error::JsonError)?;
        Ok(self
            .with_header("Content-Type", "application/json")
            .with_body_bytes(json))
    }

    /// Replace the body with a plain-text description of `error`.
    ///
    /// An error status already set on the response is kept; otherwise the
    /// status comes from [`Error::status_code`].
    pub fn with_error(self, error: &Error) -> Self {
        let status = if self.status.is_error() {
            self.status
        } else {
            error.status_code()
        };
        self.with_status(status)
            .with_content_type("text/plain")
            .with_body_string(error.to_string())
    }

    /// The status line and headers, up to and including the blank line.
    ///
    /// `Content-Length` always reflects the body, and the connection is
    /// announced as closing since each connection carries one request.
    pub fn head_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(256);

        let status_line = format!("HTTP/1.1 {} {}\r\n", self.status.as_u16(), self.status.reason_phrase());
        bytes.extend_from_slice(status_line.as_bytes());

        for (name, value) in &self.headers {
            if name.eq_ignore_ascii_case("Content-Length") || name.eq_ignore_ascii_case("Connection") {
                continue;
            }
            let header_line = format!("{name}: {value}\r\n");
            bytes.extend_from_slice(header_line.as_bytes());
        }
        bytes.extend_from_slice(format!("Content-Length: {}\r\n", self.content_length()).as_bytes());
        bytes.extend_from_slice(b"Connection: close\r\n");

        // Add the empty line that separates headers from body
        bytes.extend_from_slice(b"\r\n");

        bytes
    }

    /// Write the whole response to `writer`. A file body is streamed, never
    /// buffered whole.
    pub async fn write_to(&self, writer: &mut (impl AsyncWrite + Unpin)) -> Result<(), Error> {
        writer.write_all(&self.head_bytes()).await?;

        let Some(file) = &self.file else {
            writer.write_all(&self.body).await?;
            return Ok(());
        };

        let mut source = File::open(&file.path).await?;
        source.seek(SeekFrom::Start(file.offset)).await?;
        let copied = tokio::io::copy(&mut source.take(file.length), writer).await?;
        if copied < file.length {
            return Err(Error::IoError(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                format!("{} shrank while being sent", file.path.display()),
            )));
        }
        Ok(())
    }

    /// The body as bytes, reading a file body from disk.
    pub async fn read_body(&self) -> Result<Vec<u8>, Error> {
        let Some(file) = &self.file else {
            return Ok(self.body.clone());
        };

        let mut source = File::open(&file.path).await?;
        source.seek(SeekFrom::Start(file.offset)).await?;
        let mut body = Vec::new();
        source.take(file.length).read_to_end(&mut body).await?;
        Ok(body)
    }
}
