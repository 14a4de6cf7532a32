//! Scripted HTTP server for tests. Requests must be anticipated before they arrive, then the
//! test decides when and what to respond.

use http_body_util::Full;
use hyper::{
    Request, Response, StatusCode, body::Bytes, http::request::Parts, server::conn::http1,
    service::Service,
};
use hyper_util::rt::TokioIo;
use std::{
    collections::HashMap,
    future::Future,
    net::SocketAddr,
    pin::Pin,
    sync::{Arc, Mutex},
};
use tokio::{net::TcpListener, sync::oneshot};

/// Request anticipated by the test, waiting to come.
struct Pending {
    request_tx: oneshot::Sender<Parts>,
    response_rx: oneshot::Receiver<(StatusCode, Bytes)>,
}

#[derive(Default)]
struct State {
    /// Keyed by path and query.
    anticipated: HashMap<String, Pending>,
    unexpected: Vec<String>,
}

pub struct Server {
    port: u16,
    state: Arc<Mutex<State>>,
}

impl Server {
    /// Create new [`Server`], and bind it to a random port.
    pub async fn bind() -> Self {
        let state = Arc::new(Mutex::new(State::default()));

        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let listener = TcpListener::bind(addr).await.unwrap();
        let port = listener.local_addr().unwrap().port();

        let state_clone = state.clone();
        tokio::spawn(async move {
            loop {
                let (stream, _) = listener.accept().await.unwrap();
                let io = TokioIo::new(stream);

                let state = state_clone.clone();
                tokio::task::spawn(async move {
                    if let Err(err) = http1::Builder::new()
                        .serve_connection(io, MockRequest { state })
                        .await
                    {
                        log::debug!("Connection closed: {err}.");
                    }
                });
            }
        });

        Self { port, state }
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    /// Anticipate a request to `path_and_query`, e.g. `/getToken?key=abc`.
    pub async fn anticipate(&self, path_and_query: impl Into<String>) -> AnticipatedRequest {
        let path_and_query = path_and_query.into();
        log::info!("Anticipating '{path_and_query}'.");

        let (request_tx, request_rx) = oneshot::channel();
        let (response_tx, response_rx) = oneshot::channel();

        self.state.lock().unwrap().anticipated.insert(
            path_and_query,
            Pending {
                request_tx,
                response_rx,
            },
        );

        AnticipatedRequest {
            request_rx: Some(request_rx),
            response_tx,
        }
    }

    /// Requests which came without being anticipated.
    pub fn unexpected(&self) -> Vec<String> {
        self.state.lock().unwrap().unexpected.clone()
    }
}

impl Drop for Server {
    fn drop(&mut self) {
        let unexpected = self.unexpected();
        if !unexpected.is_empty() && !std::thread::panicking() {
            panic!("there are unexpected requests: {unexpected:?}");
        }
    }
}

pub struct AnticipatedRequest {
    request_rx: Option<oneshot::Receiver<Parts>>,
    response_tx: oneshot::Sender<(StatusCode, Bytes)>,
}

impl AnticipatedRequest {
    /// Wait for the request to come.
    pub async fn expect(&mut self) -> Parts {
        let request_rx = self
            .request_rx
            .take()
            .expect("request was already expected");
        request_rx.await.unwrap()
    }

    pub async fn respond(self, payload: impl Into<Bytes>) {
        self.respond_with_status(StatusCode::OK, payload).await;
    }

    pub async fn respond_with_status(self, status: StatusCode, payload: impl Into<Bytes>) {
        log::info!("Responding with {status}.");
        self.response_tx.send((status, payload.into())).unwrap();
    }
}

struct MockRequest {
    state: Arc<Mutex<State>>,
}

impl Service<Request<hyper::body::Incoming>> for MockRequest {
    type Response = Response<Full<Bytes>>;
    type Error = hyper::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn call(&self, request: Request<hyper::body::Incoming>) -> Self::Future {
        log::info!("Incoming request '{}'.", request.uri());
        let state = self.state.clone();
        Box::pin(async move {
            let key = request
                .uri()
                .path_and_query()
                .map(|p| p.as_str().to_owned())
                .unwrap_or_default();

            let pending = state.lock().unwrap().anticipated.remove(&key);

            if let Some(pending) = pending {
                let (parts, _) = request.into_parts();
                // Test might not care about the request itself.
                let _ = pending.request_tx.send(parts);

                let (status, payload) = pending.response_rx.await.unwrap();
                Ok(Response::builder()
                    .status(status)
                    .body(Full::new(payload))
                    .unwrap())
            } else {
                log::warn!("Unexpected '{key}'.");
                state.lock().unwrap().unexpected.push(key);
                Ok(Response::builder()
                    .status(418)
                    .body(Full::new(Bytes::from_static(b"unexpected")))
                    .unwrap())
            }
        })
    }
}
