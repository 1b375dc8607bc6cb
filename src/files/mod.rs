//! Static file serving.
//!
//! [`StaticFileResponder`] maps request paths to files below a root
//! directory and answers single byte-range requests.

pub mod mime;
pub mod range;
mod resolve;
mod static_files;

pub use resolve::{resolve_file_path, DEFAULT_INDEX_FILES, EXPANDED_PATH_HEADER};
pub use static_files::{http_date, StaticFileResponder};
