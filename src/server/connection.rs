//! One connection, one request: read, dispatch, write, close.

use std::sync::Arc;

use log::{debug, error};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

use crate::parser::{find_header_end, parse_request, Error as ParserError, HttpRequest};
use crate::server::{Dispatcher, Error, HttpResponse, ServerConfig, Unhandled};

/// Read one request from `socket`.
///
/// Reads until the header block is complete and the `Content-Length` body
/// has arrived. Returns `None` when the peer closes without sending anything.
pub async fn read_request(
    socket: &mut (impl AsyncRead + Unpin),
    read_buffer_size: usize,
    max_request_size: usize,
) -> Result<Option<Vec<u8>>, Error> {
    let mut data = Vec::new();
    let mut buf = vec![0; read_buffer_size.max(1)];
    let mut expected: Option<usize> = None;

    loop {
        if let Some(total) = expected {
            if data.len() >= total {
                break;
            }
        } else if let Some(header_end) = find_header_end(&data) {
            let head = parse_request(&data[..header_end])?;
            let total = header_end
                .checked_add(head.content_length()?)
                .filter(|total| *total <= max_request_size)
                .ok_or(ParserError::TooLarge(max_request_size))?;
            expected = Some(total);
            continue;
        }

        let n = socket.read(&mut buf).await?;
        if n == 0 {
            if data.is_empty() {
                return Ok(None);
            }
            // Peer half-closed; parse whatever arrived.
            break;
        }
        data.extend_from_slice(&buf[..n]);

        if expected.is_none() && data.len() > max_request_size {
            return Err(ParserError::TooLarge(max_request_size).into());
        }
    }

    Ok(Some(data))
}

/// Run the dispatcher for `request` in its own task.
///
/// The caller still waits for the result, so requests stay sequential, but a
/// panicking responder surfaces as an internal error instead of unwinding
/// into the accept loop.
pub async fn dispatch(dispatcher: &Arc<Dispatcher>, request: HttpRequest) -> Result<HttpResponse, Unhandled> {
    let dispatcher = Arc::clone(dispatcher);
    let method = request.method;
    let path = request.path.clone();

    match tokio::spawn(async move { dispatcher.handle(&request).await }).await {
        Ok(result) => result,
        Err(join_error) => {
            error!("Responder for {method} {path} panicked: {join_error}");
            Err(Error::InternalError(format!("responder for {path} panicked")).into())
        }
    }
}

/// Handle a single connection.
///
/// Exactly one response is written and the stream is shut down on every
/// path. A dispatch failure is written as an error response, keeping any
/// error status middleware already set, and then returned so the caller can
/// log it.
pub async fn handle_connection(
    socket: &mut (impl AsyncRead + AsyncWrite + Unpin),
    dispatcher: &Arc<Dispatcher>,
    config: &ServerConfig,
) -> Result<(), Error> {
    let read = read_request(socket, config.read_buffer_size, config.max_request_size).await;
    let outcome: Result<HttpResponse, Unhandled> = match read {
        Ok(None) => {
            let _ = socket.shutdown().await;
            return Ok(()); // Connection closed
        }
        Ok(Some(bytes)) => match parse_request(&bytes) {
            Ok(request) => {
                let method = request.method;
                let path = request.path.clone();
                let outcome = dispatch(dispatcher, request).await;
                match &outcome {
                    Ok(response) => debug!("{method} {path} -> {}", response.status.as_u16()),
                    Err(unhandled) => debug!("{method} {path} failed: {}", unhandled.error),
                }
                outcome
            }
            Err(e) => Err(Error::from(e).into()),
        },
        Err(e) => Err(e.into()),
    };

    let (response, result) = match outcome {
        Ok(response) => (response, Ok(())),
        Err(Unhandled { response, error }) => (response.with_error(&error), Err(error)),
    };

    let written = response.write_to(socket).await;
    let flushed = socket.flush().await;
    let _ = socket.shutdown().await;

    written?;
    flushed?;
    result
}
