//! HTTP server lifecycle.
//!
//! An [`HttpServer`] owns at most one accept loop. `start` and `stop`
//! rendezvous with that loop through one-shot channels: `start` returns once
//! the loop is listening, `stop` returns once the loop has exited. The loop
//! serves one connection at a time and never runs two requests concurrently.

use std::future::Future;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use log::{debug, error, info, warn};
use tokio::net::TcpListener;
use tokio::sync::{oneshot, Mutex};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

use crate::parser::{HttpRequest, Method};
use crate::server::connection::handle_connection;
use crate::server::middleware::Flow;
use crate::server::responder::{responder_fn, Parameters};
use crate::server::{Dispatcher, Error, ErrorResponder, HttpResponse, Responder, ServerConfig};

/// A running accept loop and the handles needed to stop it.
struct AcceptLoop {
    cancel: CancellationToken,
    exited: oneshot::Receiver<()>,
    task: JoinHandle<()>,
    local_addr: SocketAddr,
    listening: Arc<AtomicBool>,
}

enum State {
    Stopped,
    Running(AcceptLoop),
    Disposed,
}

struct Lifecycle {
    config: ServerConfig,
    state: State,
}

/// An embeddable HTTP server.
pub struct HttpServer {
    dispatcher: Arc<Dispatcher>,
    lifecycle: Mutex<Lifecycle>,
    disposed: AtomicBool,
}

impl HttpServer {
    /// Create a new, stopped HTTP server with the given configuration.
    pub fn new(config: ServerConfig) -> Self {
        Self {
            dispatcher: Arc::new(Dispatcher::new()),
            lifecycle: Mutex::new(Lifecycle {
                config,
                state: State::Stopped,
            }),
            disposed: AtomicBool::new(false),
        }
    }

    fn ensure_usable(&self) -> Result<(), Error> {
        if self.disposed.load(Ordering::SeqCst) {
            return Err(Error::Disposed);
        }
        Ok(())
    }

    /// The dispatcher behind this server, for serving requests in-process.
    pub fn dispatcher(&self) -> Arc<Dispatcher> {
        Arc::clone(&self.dispatcher)
    }

    /// A snapshot of the current configuration.
    pub async fn config(&self) -> ServerConfig {
        self.lifecycle.lock().await.config.clone()
    }

    /// Add a route served by `responder`.
    pub async fn add_route(&self, methods: &[Method], path: &str, responder: Arc<dyn Responder>) -> Result<(), Error> {
        self.ensure_usable()?;
        self.dispatcher.add_route(methods, path, responder).await
    }

    /// Add a route served by an async closure.
    pub async fn add_route_fn<F, Fut>(&self, methods: &[Method], path: &str, handler: F) -> Result<(), Error>
    where
        F: Fn(HttpRequest, HttpResponse, Parameters) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, Error>> + Send + 'static,
    {
        self.add_route(methods, path, responder_fn(handler)).await
    }

    /// Set the responder used when no route matches.
    pub async fn set_default_responder(&self, responder: Arc<dyn Responder>) -> Result<(), Error> {
        self.ensure_usable()?;
        self.dispatcher.set_default_responder(responder).await;
        Ok(())
    }

    /// Set the responder that turns responder failures into responses.
    pub async fn set_error_responder(&self, responder: Arc<dyn ErrorResponder>) -> Result<(), Error> {
        self.ensure_usable()?;
        self.dispatcher.set_error_responder(responder).await;
        Ok(())
    }

    /// Append a middleware step for each of `methods`.
    pub async fn use_middleware<F>(&self, methods: &[Method], step: F) -> Result<(), Error>
    where
        F: Fn(&HttpRequest, HttpResponse) -> Flow + Send + Sync + 'static,
    {
        self.ensure_usable()?;
        self.dispatcher.use_middleware(methods, step).await;
        Ok(())
    }

    /// Log the registered endpoints.
    async fn display_server_info(&self) {
        let routes = self.dispatcher.routes().await;
        info!("Registered endpoints:");
        for (method, path) in routes {
            info!("  {method} {path}");
        }
    }

    /// Start serving.
    ///
    /// Binds the configured address, spawns the accept loop and returns the
    /// bound address once the loop is listening. Calling `start` on a running
    /// server returns its current address without rebinding.
    pub async fn start(&self) -> Result<SocketAddr, Error> {
        let mut lifecycle = self.lifecycle.lock().await;
        self.start_locked(&mut lifecycle).await
    }

    /// Stop serving.
    ///
    /// Cancels the accept loop and returns once it has exited. An in-flight
    /// request finishes first. Stopping a stopped server does nothing.
    pub async fn stop(&self) -> Result<(), Error> {
        let mut lifecycle = self.lifecycle.lock().await;
        Self::stop_locked(&mut lifecycle).await
    }

    /// Stop, rebind to `port` on the same host, and start again.
    pub async fn restart(&self, port: u16) -> Result<SocketAddr, Error> {
        let mut lifecycle = self.lifecycle.lock().await;
        Self::stop_locked(&mut lifecycle).await?;
        lifecycle.config.port = port;
        info!("Restarting server on port {port}");
        self.start_locked(&mut lifecycle).await
    }

    /// Stop the server for good. Every later lifecycle or registration call
    /// fails with [`Error::Disposed`]; disposing twice is allowed.
    pub async fn dispose(&self) -> Result<(), Error> {
        let mut lifecycle = self.lifecycle.lock().await;
        if matches!(lifecycle.state, State::Disposed) {
            return Ok(());
        }
        Self::stop_locked(&mut lifecycle).await?;
        lifecycle.state = State::Disposed;
        self.disposed.store(true, Ordering::SeqCst);
        info!("Server disposed");
        Ok(())
    }

    /// True only while the accept loop is alive and its listener is bound.
    pub async fn is_available(&self) -> bool {
        let lifecycle = self.lifecycle.lock().await;
        match &lifecycle.state {
            State::Running(accept_loop) => {
                !accept_loop.task.is_finished() && accept_loop.listening.load(Ordering::SeqCst)
            }
            _ => false,
        }
    }

    /// The bound address while running.
    pub async fn local_addr(&self) -> Option<SocketAddr> {
        match &self.lifecycle.lock().await.state {
            State::Running(accept_loop) => Some(accept_loop.local_addr),
            _ => None,
        }
    }

    async fn start_locked(&self, lifecycle: &mut Lifecycle) -> Result<SocketAddr, Error> {
        let reap = match &lifecycle.state {
            State::Disposed => return Err(Error::Disposed),
            State::Running(accept_loop) if !accept_loop.task.is_finished() => {
                debug!("Server already running on {}", accept_loop.local_addr);
                return Ok(accept_loop.local_addr);
            }
            State::Running(_) => true,
            State::Stopped => false,
        };
        if reap {
            warn!("Accept loop exited on its own, starting a new one");
            Self::stop_locked(lifecycle).await?;
        }

        self.display_server_info().await;

        let addr = lifecycle.config.socket_addr()?;
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        let cancel = CancellationToken::new();
        let listening = Arc::new(AtomicBool::new(false));
        let (ready_tx, ready_rx) = oneshot::channel();
        let (exited_tx, exited_rx) = oneshot::channel();

        let task = tokio::spawn(accept_loop(
            listener,
            Arc::clone(&self.dispatcher),
            lifecycle.config.clone(),
            cancel.clone(),
            Arc::clone(&listening),
            ready_tx,
            exited_tx,
        ));

        if ready_rx.await.is_err() {
            return Err(Error::InternalError("accept loop exited before listening".to_string()));
        }

        lifecycle.state = State::Running(AcceptLoop {
            cancel,
            exited: exited_rx,
            task,
            local_addr,
            listening,
        });
        info!("Server listening on http://{local_addr}");

        Ok(local_addr)
    }

    async fn stop_locked(lifecycle: &mut Lifecycle) -> Result<(), Error> {
        match std::mem::replace(&mut lifecycle.state, State::Stopped) {
            State::Stopped => Ok(()),
            State::Disposed => {
                lifecycle.state = State::Disposed;
                Err(Error::Disposed)
            }
            State::Running(accept_loop) => {
                accept_loop.cancel.cancel();
                // A dropped sender means the loop is already gone.
                if accept_loop.exited.await.is_err() {
                    debug!("Accept loop on {} was already torn down", accept_loop.local_addr);
                }
                if let Err(e) = accept_loop.task.await {
                    error!("Accept loop on {} failed: {e}", accept_loop.local_addr);
                }
                info!("Server on {} stopped", accept_loop.local_addr);
                Ok(())
            }
        }
    }
}

impl Drop for HttpServer {
    fn drop(&mut self) {
        if let State::Running(accept_loop) = &self.lifecycle.get_mut().state {
            accept_loop.cancel.cancel();
        }
    }
}

/// Handle accept errors. Returns true when the loop should stop.
async fn handle_accept_error(e: std::io::Error) -> bool {
    error!("Error accepting connection: {e}");

    if e.kind() == std::io::ErrorKind::BrokenPipe {
        error!("Critical error accepting connection, shutting down");
        return true;
    }

    // For other errors, wait a bit before retrying
    tokio::time::sleep(Duration::from_millis(100)).await;
    false
}

/// The accept loop: one connection at a time until cancelled.
async fn accept_loop(
    listener: TcpListener,
    dispatcher: Arc<Dispatcher>,
    config: ServerConfig,
    cancel: CancellationToken,
    listening: Arc<AtomicBool>,
    ready: oneshot::Sender<()>,
    exited: oneshot::Sender<()>,
) {
    listening.store(true, Ordering::SeqCst);
    let _ = ready.send(());

    loop {
        let accepted = tokio::select! {
            biased;
            () = cancel.cancelled() => break,
            accepted = listener.accept() => accepted,
        };

        match accepted {
            Ok((mut socket, peer)) => {
                debug!("Connection from {peer}");
                if let Err(e) = handle_connection(&mut socket, &dispatcher, &config).await {
                    warn!("Error handling connection from {peer}: {e}");
                }
            }
            Err(e) => {
                if handle_accept_error(e).await {
                    break;
                }
            }
        }
    }

    listening.store(false, Ordering::SeqCst);
    drop(listener);
    let _ = exited.send(());
}
