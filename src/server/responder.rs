//! Responder capabilities.
//!
//! Everything that produces a response implements [`Responder`]: route
//! handlers, the default (catch-all) responder and the static file responder.
//! Failures raised by a responder can be turned into a response by an
//! [`ErrorResponder`].

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use crate::parser::HttpRequest;
use crate::server::{Error, HttpResponse};

/// Path parameter values keyed by parameter name.
pub type Parameters = HashMap<String, String>;

/// Type alias for a boxed future that returns a Result<HttpResponse, Error>.
pub type ResponseFuture<'a> = Pin<Box<dyn Future<Output = Result<HttpResponse, Error>> + Send + 'a>>;

/// Produces a response for a matched request.
///
/// `response` carries whatever middleware already put in place; the
/// responder returns it (possibly modified) or fails.
pub trait Responder: Send + Sync {
    fn generate_response<'a>(
        &'a self,
        request: &'a HttpRequest,
        response: HttpResponse,
        parameters: Parameters,
    ) -> ResponseFuture<'a>;
}

/// Turns a responder failure into a user-visible response.
pub trait ErrorResponder: Send + Sync {
    fn generate_error_response<'a>(
        &'a self,
        request: &'a HttpRequest,
        response: HttpResponse,
        error: Error,
    ) -> ResponseFuture<'a>;
}

/// A [`Responder`] backed by an async closure.
pub struct FnResponder<F>(F);

impl<F, Fut> Responder for FnResponder<F>
where
    F: Fn(HttpRequest, HttpResponse, Parameters) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
{
    fn generate_response<'a>(
        &'a self,
        request: &'a HttpRequest,
        response: HttpResponse,
        parameters: Parameters,
    ) -> ResponseFuture<'a> {
        Box::pin((self.0)(request.clone(), response, parameters))
    }
}

/// An [`ErrorResponder`] backed by an async closure.
pub struct FnErrorResponder<F>(F);

impl<F, Fut> ErrorResponder for FnErrorResponder<F>
where
    F: Fn(HttpRequest, HttpResponse, Error) -> Fut + Send + Sync,
    Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
{
    fn generate_error_response<'a>(
        &'a self,
        request: &'a HttpRequest,
        response: HttpResponse,
        error: Error,
    ) -> ResponseFuture<'a> {
        Box::pin((self.0)(request.clone(), response, error))
    }
}

/// Wrap an async closure as a shareable responder.
pub fn responder_fn<F, Fut>(f: F) -> Arc<dyn Responder>
where
    F: Fn(HttpRequest, HttpResponse, Parameters) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
{
    Arc::new(FnResponder(f))
}

/// Wrap an async closure as a shareable error responder.
pub fn error_responder_fn<F, Fut>(f: F) -> Arc<dyn ErrorResponder>
where
    F: Fn(HttpRequest, HttpResponse, Error) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
{
    Arc::new(FnErrorResponder(f))
}
