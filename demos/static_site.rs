//! Serves a directory over HTTP with a small JSON API next to it.
//!
//! Usage: `cargo run --example static_site -- <root> [port]`

use std::sync::Arc;

use localhttp::{
    error_responder_fn, Flow, HttpRequest, HttpResponse, HttpServer, Method, ServerConfig, ServerError,
    StaticFileResponder,
};
use log::info;
use serde::Serialize;

#[derive(Serialize)]
struct Status {
    root: String,
    port: u16,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize the logger
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let root = args.next().unwrap_or_else(|| ".".to_string());
    let port = args.next().map(|p| p.parse()).transpose()?.unwrap_or(8080);

    let server = HttpServer::new(ServerConfig::new("127.0.0.1", port));

    // Every GET gets a trace header before it reaches a responder
    server
        .use_middleware(&[Method::GET], |req: &HttpRequest, response: HttpResponse| {
            Flow::Continue(response.with_header("X-Requested-Path", req.path.clone()))
        })
        .await?;

    let status_root = root.clone();
    server
        .add_route_fn(&[Method::GET], "/api/status", move |_req, response: HttpResponse, _params| {
            let status = Status {
                root: status_root.clone(),
                port,
            };
            async move { response.with_json(&status) }
        })
        .await?;

    server
        .add_route_fn(&[Method::GET], "/api/echo/:word", |_req, response: HttpResponse, params| async move {
            Ok(response
                .with_content_type("text/plain")
                .with_body_string(params.get("word").cloned().unwrap_or_default()))
        })
        .await?;

    server
        .set_default_responder(Arc::new(StaticFileResponder::new(&root)))
        .await?;

    server
        .set_error_responder(error_responder_fn(|_req, response: HttpResponse, error: ServerError| async move {
            Ok(response
                .with_status(error.status_code())
                .with_content_type("text/plain")
                .with_body_string(format!("{} {}", error.status_code().as_u16(), error)))
        }))
        .await?;

    let addr = server.start().await?;
    info!("Serving {root} on http://{addr}");

    tokio::signal::ctrl_c().await?;
    info!("Shutting down");
    server.dispose().await?;

    Ok(())
}
