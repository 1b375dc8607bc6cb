//! An embeddable local HTTP endpoint.
//!
//! `localhttp` serves HTTP/1.x requests on a local socket for a host
//! application. Requests are matched against a route registry, passed
//! through a per-method middleware pipeline and answered by pluggable
//! responders. A static file responder with byte-range support is included.
//!
//! # Features
//!
//! - Exact and parameterized (`/users/:id`) routes per HTTP method
//! - Short-circuiting middleware, registered per method
//! - Default and error responders
//! - Start, stop, restart and dispose with one sequential accept loop
//! - Static files with index documents and single byte ranges
//!
//! # Examples
//!
//! ## Parsing a request
//!
//! ```
//! use localhttp::parse_request;
//!
//! let request_bytes = b"GET /index.html?lang=en HTTP/1.1\r\nHost: example.com\r\n\r\n";
//!
//! let request = parse_request(request_bytes).unwrap();
//! assert_eq!(request.path, "/index.html");
//! assert_eq!(request.query.as_deref(), Some("lang=en"));
//! ```
//!
//! ## Serving routes
//!
//! ```no_run
//! use localhttp::{HttpResponse, HttpServer, Method, ServerConfig};
//!
//! # async fn run() -> Result<(), localhttp::ServerError> {
//! let server = HttpServer::new(ServerConfig::new("127.0.0.1", 8080));
//!
//! server
//!     .add_route_fn(&[Method::GET], "/users/:id", |_req, response: HttpResponse, params| async move {
//!         Ok(response.with_body_string(format!("user {}", params["id"])))
//!     })
//!     .await?;
//!
//! let addr = server.start().await?;
//! println!("listening on {addr}");
//! server.stop().await?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error handling
//!
//! ```
//! use localhttp::{parse_request, ParserError};
//!
//! let invalid_request = b"INVALID /index.html HTTP/1.1\r\nHost: example.com\r\n\r\n";
//!
//! match parse_request(invalid_request) {
//!     Ok(_) => println!("Request parsed successfully"),
//!     Err(ParserError::InvalidMethod(method)) => println!("Invalid method: {}", method),
//!     Err(err) => println!("Other error: {}", err),
//! }
//! ```

pub mod parser;

pub mod routing;

pub mod server;

pub mod files;

// Re-export commonly used items for convenience
pub use parser::{parse_request, Error as ParserError, HttpRequest, HttpVersion, Method};
pub use routing::{PathPattern, RouteRegistry};
pub use server::{
    error_responder_fn, responder_fn, Error as ServerError, ErrorResponder, Flow, HttpResponse, HttpServer,
    Parameters, Responder, ServerConfig, StatusCode,
};
pub use files::StaticFileResponder;
