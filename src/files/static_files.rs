//! Static file responder.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

use chrono::{DateTime, Utc};
use log::debug;

use crate::files::mime::content_type_for;
use crate::files::range::{parse_range_header, RangeRequest, ResolvedRange, resolve_range};
use crate::files::resolve::{resolve_file_path, DEFAULT_INDEX_FILES, EXPANDED_PATH_HEADER};
use crate::parser::{HttpRequest, Method};
use crate::server::{Error, HttpResponse, Parameters, Responder, ResponseFuture, StatusCode};

/// Format a timestamp as an HTTP date (IMF-fixdate).
pub fn http_date(time: DateTime<Utc>) -> String {
    time.format("%a, %d %b %Y %H:%M:%S GMT").to_string()
}

/// Serves files below a root directory, with single byte-range support.
///
/// Only `GET` is handled. A missing file fails with [`Error::NotFound`];
/// range problems are answered directly with 416 or 501.
#[derive(Debug, Clone)]
pub struct StaticFileResponder {
    root: PathBuf,
    index_files: Vec<String>,
    prefix: Option<String>,
}

impl StaticFileResponder {
    /// Serve files from `root` using the default index file list.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            index_files: DEFAULT_INDEX_FILES.iter().map(|s| s.to_string()).collect(),
            prefix: None,
        }
    }

    /// Replace the index file candidates, tried in order.
    pub fn with_index_files<I, S>(mut self, index_files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.index_files = index_files.into_iter().map(Into::into).collect();
        self
    }

    /// Strip `prefix` from request paths before resolving them, for a
    /// responder mounted below the site root.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        let prefix = prefix.into().trim_end_matches('/').to_string();
        self.prefix = (!prefix.is_empty()).then_some(prefix);
        self
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// The file a request maps to, whether or not it exists.
    pub async fn resolve(&self, request: &HttpRequest) -> Option<PathBuf> {
        let path = match &self.prefix {
            Some(prefix) => match request.path.strip_prefix(prefix.as_str()) {
                Some(rest) if rest.is_empty() || rest.starts_with('/') => rest,
                _ => return None,
            },
            None => request.path.as_str(),
        };

        let expanded = request
            .get_header(EXPANDED_PATH_HEADER)
            .is_some_and(|v| v.trim().eq_ignore_ascii_case("true"));

        resolve_file_path(&self.root, path, request.query.as_deref(), expanded, &self.index_files).await
    }

    /// Serve the file for `request` into `response`.
    pub async fn serve(&self, request: &HttpRequest, response: HttpResponse) -> Result<HttpResponse, Error> {
        if request.method != Method::GET {
            return Err(Error::MethodNotSupported(request.method, "static files".to_string()));
        }

        let not_found = || Error::NotFound(request.path.clone());
        let path = self.resolve(request).await.ok_or_else(not_found)?;

        let metadata = match tokio::fs::metadata(&path).await {
            Ok(metadata) => metadata,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Err(not_found()),
            Err(e) => return Err(e.into()),
        };
        if !metadata.is_file() {
            return Err(not_found());
        }
        let length = metadata.len();
        let modified = metadata.modified().unwrap_or_else(|_| SystemTime::now());

        let mut response = response
            .with_status(StatusCode::Ok)
            .with_content_type(content_type_for(&path))
            .with_header("Access-Control-Allow-Origin", "*")
            .with_header("Date", http_date(Utc::now()))
            .with_header("Last-Modified", http_date(DateTime::<Utc>::from(modified)))
            .with_header("Accept-Ranges", "bytes");

        let range = match request.get_header("Range") {
            Some(value) => parse_range_header(value),
            None => RangeRequest::Ignored,
        };

        let resolved = match range {
            RangeRequest::Ignored => ResolvedRange::Whole,
            RangeRequest::Multiple => {
                debug!("Multi-range request for {} rejected", request.path);
                return Ok(response
                    .with_status(StatusCode::NotImplemented)
                    .with_body_bytes(Vec::new()));
            }
            RangeRequest::Single { from, to } => resolve_range(from, to, length),
        };

        match resolved {
            ResolvedRange::Whole => Ok(response.with_file_body(path, 0, length)),
            ResolvedRange::Partial { from, to } => {
                response.set_header("Content-Range", resolved.content_range(length));
                Ok(response
                    .with_status(StatusCode::PartialContent)
                    .with_file_body(path, from, to - from + 1))
            }
            ResolvedRange::NotSatisfiable => {
                response.set_header("Content-Range", resolved.content_range(length));
                Ok(response
                    .with_status(StatusCode::RangeNotSatisfiable)
                    .with_body_bytes(Vec::new()))
            }
        }
    }
}

impl Responder for StaticFileResponder {
    fn generate_response<'a>(
        &'a self,
        request: &'a HttpRequest,
        response: HttpResponse,
        _parameters: Parameters,
    ) -> ResponseFuture<'a> {
        Box::pin(self.serve(request, response))
    }
}
