//! Request dispatch: middleware, route resolution and responder invocation.

use std::sync::Arc;

use log::{debug, warn};
use tokio::sync::RwLock;

use crate::parser::{HttpRequest, Method};
use crate::routing::RouteRegistry;
use crate::server::middleware::{Flow, MiddlewareFn, MiddlewarePipeline};
use crate::server::{Error, ErrorResponder, HttpResponse, Responder, StatusCode};

/// A failure no error responder turned into a response.
#[derive(Debug)]
pub struct Unhandled {
    /// The response as it stood when dispatch failed, after middleware.
    pub response: HttpResponse,
    pub error: Error,
}

impl From<Error> for Unhandled {
    fn from(error: Error) -> Self {
        Self {
            response: HttpResponse::new(StatusCode::Ok),
            error,
        }
    }
}

/// Turns a parsed request into a response.
///
/// Route and middleware tables sit behind read-mostly locks, so registration
/// is safe while requests are being served. Locks are released before any
/// responder runs.
#[derive(Default)]
pub struct Dispatcher {
    routes: RwLock<RouteRegistry>,
    middleware: RwLock<MiddlewarePipeline>,
    error_responder: RwLock<Option<Arc<dyn ErrorResponder>>>,
}

impl Dispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `responder` for `methods` at `path` (`:name` segments make a
    /// dynamic route).
    pub async fn add_route(&self, methods: &[Method], path: &str, responder: Arc<dyn Responder>) -> Result<(), Error> {
        self.routes.write().await.add(methods, path, responder)
    }

    /// Set the responder used when no route matches.
    pub async fn set_default_responder(&self, responder: Arc<dyn Responder>) {
        self.routes.write().await.set_default(Some(responder));
    }

    /// Set the responder that turns failures into responses.
    pub async fn set_error_responder(&self, responder: Arc<dyn ErrorResponder>) {
        *self.error_responder.write().await = Some(responder);
    }

    /// Append a middleware step for each of `methods`.
    pub async fn use_middleware<F>(&self, methods: &[Method], step: F)
    where
        F: Fn(&HttpRequest, HttpResponse) -> Flow + Send + Sync + 'static,
    {
        let step: MiddlewareFn = Arc::new(step);
        self.middleware.write().await.use_step(methods, step);
    }

    /// Registered (method, path) pairs in lookup order.
    pub async fn routes(&self) -> Vec<(Method, String)> {
        self.routes.read().await.routes()
    }

    /// Handle one request.
    ///
    /// Middleware runs first and may answer on its own. Otherwise exactly one
    /// responder runs; if resolving or running it fails and an error
    /// responder is configured, that error responder produces the response
    /// from the post-middleware state. Without an error responder the failure
    /// is returned to the caller together with that state.
    pub async fn handle(&self, request: &HttpRequest) -> Result<HttpResponse, Unhandled> {
        let response = HttpResponse::new(StatusCode::Ok);
        let (response, dispatch) = self.middleware.read().await.run(request, response);
        if !dispatch {
            debug!("{} {} answered by middleware", request.method, request.path);
            return Ok(response);
        }

        let fallback = response.clone();
        let resolved = self.routes.read().await.resolve(request.method, &request.path);
        let outcome = match resolved {
            Ok((responder, parameters)) => responder.generate_response(request, response, parameters).await,
            Err(error) => Err(error),
        };

        let error = match outcome {
            Ok(response) => return Ok(response),
            Err(error) => error,
        };

        let error_responder = self.error_responder.read().await.clone();
        match error_responder {
            Some(error_responder) => {
                debug!("{} {} failed, delegating to error responder: {error}", request.method, request.path);
                error_responder
                    .generate_error_response(request, fallback.clone(), error)
                    .await
                    .map_err(|error| Unhandled {
                        response: fallback,
                        error,
                    })
            }
            None => {
                warn!("{} {} failed: {error}", request.method, request.path);
                Err(Unhandled {
                    response: fallback,
                    error,
                })
            }
        }
    }
}
