//! HTTP endpoint for the MCP server
//!
//! Serves JSON-RPC over `POST /mcp`, single messages or batches. Every request
//! gets exactly one reply: the handler's response, a transport-level
//! rejection, or the fixed internal-error body when a handler panics.

use std::net::SocketAddr;
use std::sync::Arc;

use futures::future::join_all;
use http_body_util::{BodyExt, Full};
use hyper::body::Bytes;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Method, Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use serde::Serialize;
use serde_json::Value;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::Result;
use crate::mcp::protocol::{JsonRpcRequest, JsonRpcResponse, error_codes};
use crate::mcp::server::{Dispatch, McpServer};

/// Path the MCP endpoint is mounted on
pub const MCP_PATH: &str = "/mcp";

/// HTTP server wrapping an MCP server.
pub struct HttpMcpServer {
    local_addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    task: JoinHandle<()>,
}

impl HttpMcpServer {
    /// Bind `addr` and spawn the accept loop.
    ///
    /// Port 0 picks an ephemeral port; read it back with [`port()`](Self::port).
    pub async fn start(server: Arc<McpServer>, addr: SocketAddr) -> Result<Self> {
        let listener = TcpListener::bind(addr).await?;
        let local_addr = listener.local_addr()?;

        info!("MCP HTTP server listening on {}", local_addr);

        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            Self::accept_loop(listener, server, shutdown_rx).await;
        });

        Ok(Self {
            local_addr,
            shutdown_tx: Some(shutdown_tx),
            task,
        })
    }

    /// URL of the MCP endpoint (e.g. `http://127.0.0.1:3000/mcp`).
    pub fn url(&self) -> String {
        format!("http://{}{}", self.local_addr, MCP_PATH)
    }

    /// The port the server is listening on.
    pub fn port(&self) -> u16 {
        self.local_addr.port()
    }

    /// Stop accepting connections and wait for the accept loop to exit.
    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Err(e) = (&mut self.task).await {
            warn!("MCP HTTP accept loop ended abnormally: {}", e);
        }
    }

    async fn accept_loop(
        listener: TcpListener,
        server: Arc<McpServer>,
        mut shutdown_rx: oneshot::Receiver<()>,
    ) {
        loop {
            tokio::select! {
                result = listener.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            debug!("MCP HTTP connection from {}", addr);
                            let server = Arc::clone(&server);
                            tokio::spawn(async move {
                                let io = TokioIo::new(stream);
                                let service = service_fn(move |req| {
                                    let server = Arc::clone(&server);
                                    handle_http_request(server, req)
                                });
                                if let Err(e) = http1::Builder::new()
                                    .serve_connection(io, service)
                                    .await
                                {
                                    error!("MCP HTTP connection error: {}", e);
                                }
                            });
                        }
                        Err(e) => {
                            error!("MCP HTTP accept error: {}", e);
                        }
                    }
                }
                _ = &mut shutdown_rx => {
                    info!("MCP HTTP server shutting down");
                    break;
                }
            }
        }
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: &T) -> Response<Full<Bytes>> {
    let bytes = serde_json::to_vec(body).unwrap_or_default();
    let mut resp = Response::new(Full::new(Bytes::from(bytes)));
    *resp.status_mut() = status;
    resp.headers_mut().insert(
        hyper::header::CONTENT_TYPE,
        hyper::header::HeaderValue::from_static("application/json"),
    );
    resp
}

fn empty_response(status: StatusCode) -> Response<Full<Bytes>> {
    let mut resp = Response::new(Full::new(Bytes::new()));
    *resp.status_mut() = status;
    resp
}

async fn handle_http_request(
    server: Arc<McpServer>,
    req: Request<hyper::body::Incoming>,
) -> std::result::Result<Response<Full<Bytes>>, hyper::Error> {
    if req.uri().path() != MCP_PATH {
        return Ok(empty_response(StatusCode::NOT_FOUND));
    }

    if req.method() != Method::POST {
        debug!(method = %req.method(), "Rejecting non-POST MCP request");
        return Ok(json_response(
            StatusCode::METHOD_NOT_ALLOWED,
            &JsonRpcResponse::method_not_allowed(),
        ));
    }

    let body = req.collect().await?.to_bytes();

    let payload: Value = match serde_json::from_slice(&body) {
        Ok(v) => v,
        Err(e) => {
            let response =
                JsonRpcResponse::error(None, error_codes::PARSE_ERROR, format!("Parse error: {e}"));
            return Ok(json_response(StatusCode::BAD_REQUEST, &response));
        }
    };

    let response = match payload {
        Value::Array(items) => handle_batch(&server, items).await,
        single => match parse_request(single) {
            Ok(request) => match server.dispatch(request).await {
                Dispatch::Reply(response) => json_response(StatusCode::OK, &response),
                Dispatch::Accepted => empty_response(StatusCode::ACCEPTED),
                Dispatch::Crashed { .. } => crashed_response(),
            },
            Err(response) => json_response(StatusCode::BAD_REQUEST, &response),
        },
    };

    Ok(response)
}

/// Dispatch every message of a batch concurrently and reply with one array.
///
/// Invalid members get their own error entry. A batch made only of
/// notifications is accepted with an empty body.
async fn handle_batch(server: &McpServer, items: Vec<Value>) -> Response<Full<Bytes>> {
    if items.is_empty() {
        let response = JsonRpcResponse::error(None, error_codes::INVALID_REQUEST, "Empty batch");
        return json_response(StatusCode::BAD_REQUEST, &response);
    }

    let outcomes = join_all(items.into_iter().map(|item| async move {
        match parse_request(item) {
            Ok(request) => server.dispatch(request).await,
            Err(response) => Dispatch::Reply(response),
        }
    }))
    .await;

    let mut replies = Vec::with_capacity(outcomes.len());
    for outcome in outcomes {
        match outcome {
            Dispatch::Reply(response) => replies.push(response),
            Dispatch::Accepted => {}
            Dispatch::Crashed { .. } => return crashed_response(),
        }
    }

    if replies.is_empty() {
        empty_response(StatusCode::ACCEPTED)
    } else {
        json_response(StatusCode::OK, &replies)
    }
}

/// Valid JSON that is not a request object is an invalid request, not a parse error.
fn parse_request(value: Value) -> std::result::Result<JsonRpcRequest, JsonRpcResponse> {
    serde_json::from_value(value).map_err(|e| {
        JsonRpcResponse::error(
            None,
            error_codes::INVALID_REQUEST,
            format!("Invalid request: {e}"),
        )
    })
}

fn crashed_response() -> Response<Full<Bytes>> {
    json_response(
        StatusCode::INTERNAL_SERVER_ERROR,
        &JsonRpcResponse::internal_error(None),
    )
}
