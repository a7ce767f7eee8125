//! In-process HTTP stub standing in for upstream APIs

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use http_body_util::{BodyExt, Full};
use hyper::body::{Bytes, Incoming};
use hyper::header::HeaderMap;
use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper::{Request, Response, StatusCode};
use hyper_util::rt::TokioIo;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;

/// A request the stub received
#[derive(Debug, Clone)]
pub struct Recorded {
    pub method: String,
    pub path: String,
    pub query: Option<String>,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl Recorded {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("request body should be JSON")
    }
}

/// Serves one canned response to every request and records what it saw
pub struct StubUpstream {
    addr: SocketAddr,
    requests: Arc<Mutex<Vec<Recorded>>>,
    task: JoinHandle<()>,
}

impl StubUpstream {
    pub async fn start(status: u16, reply: &'static str) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind stub upstream");
        let addr = listener.local_addr().expect("should have local addr");
        let requests = Arc::new(Mutex::new(Vec::new()));
        let status = StatusCode::from_u16(status).expect("valid status");

        let recorded = Arc::clone(&requests);
        let task = tokio::spawn(async move {
            while let Ok((stream, _)) = listener.accept().await {
                let recorded = Arc::clone(&recorded);
                tokio::spawn(async move {
                    let service = service_fn(move |req: Request<Incoming>| {
                        let recorded = Arc::clone(&recorded);
                        async move {
                            let (parts, body) = req.into_parts();
                            let body = body.collect().await?.to_bytes();
                            recorded.lock().expect("lock").push(Recorded {
                                method: parts.method.to_string(),
                                path: parts.uri.path().to_string(),
                                query: parts.uri.query().map(str::to_string),
                                headers: parts.headers,
                                body,
                            });

                            let mut response = Response::new(Full::new(Bytes::from_static(
                                reply.as_bytes(),
                            )));
                            *response.status_mut() = status;
                            response.headers_mut().insert(
                                hyper::header::CONTENT_TYPE,
                                hyper::header::HeaderValue::from_static("application/json"),
                            );
                            Ok::<_, hyper::Error>(response)
                        }
                    });
                    let _ = http1::Builder::new()
                        .serve_connection(TokioIo::new(stream), service)
                        .await;
                });
            }
        });

        Self {
            addr,
            requests,
            task,
        }
    }

    /// Base URL with no trailing slash
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn requests(&self) -> Vec<Recorded> {
        self.requests.lock().expect("lock").clone()
    }
}

impl Drop for StubUpstream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Accepts connections and never answers them
pub struct SilentUpstream {
    addr: SocketAddr,
    task: JoinHandle<()>,
}

impl SilentUpstream {
    pub async fn start() -> Self {
        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .expect("should bind silent upstream");
        let addr = listener.local_addr().expect("should have local addr");

        let task = tokio::spawn(async move {
            let mut held = Vec::new();
            while let Ok((stream, _)) = listener.accept().await {
                held.push(stream);
            }
        });

        Self { addr, task }
    }

    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }
}

impl Drop for SilentUpstream {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// A complete bulk indicator response for every indicator the client asks for
pub const BULK_OK: &str = r#"{"data":[
    {"id":"rsi","result":{"value":75.0},"errors":[]},
    {"id":"macd","result":{"valueMACD":152.37,"valueMACDSignal":118.91,"valueMACDHist":33.46},"errors":[]},
    {"id":"bb","result":{"valueUpperBand":66250.5,"valueMiddleBand":63980.25,"valueLowerBand":61710.0},"errors":[]},
    {"id":"atr","result":{"value":912.4},"errors":[]},
    {"id":"stoch","result":{"valueK":88.1,"valueD":84.6},"errors":[]},
    {"id":"sma","result":{"value":63950.0},"errors":[]},
    {"id":"ema","result":{"value":64210.8},"errors":[]}
]}"#;

/// Quote response for BTC at 65000
pub const QUOTE_BTC: &str =
    r#"{"status":{"error_code":0,"error_message":null},"data":{"BTC":{"quote":{"USD":{"price":65000.0}}}}}"#;
