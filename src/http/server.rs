//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with the dispatch handler
//! - Wire up middleware (tracing, panic recovery, CORS headers)
//! - Run the accept loop, one task per connection
//! - Serve HTTP/1.1 and HTTP/2 via hyper-util's auto builder
//! - Drain connections on shutdown

use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{Request, StatusCode},
    response::{IntoResponse, Response},
    Router,
};
use hyper::body::Incoming;
use hyper_util::rt::{TokioExecutor, TokioIo};
use hyper_util::server::conn::auto;
use tokio::net::TcpStream;
use tower::ServiceExt;
use tower_http::{catch_panic::CatchPanicLayer, trace::TraceLayer};
use tracing::Instrument;

use crate::config::ProxyConfig;
use crate::http::forward::{upstream_client, Forwarder};
use crate::http::request::RequestId;
use crate::http::static_files::StaticFiles;
use crate::lifecycle::ShutdownSignal;
use crate::net::connection::log_connection_error;
use crate::net::{ConnectionGuard, ConnectionPermit, ConnectionTracker, Listener};
use crate::observability::metrics;
use crate::resilience::Timeouts;
use crate::routing::{Dispatch, ForwardingRule};
use crate::security::CorsPolicy;

/// Errors building the server from a configuration.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    #[error("invalid upstream URL: {0}")]
    Upstream(#[from] axum::http::uri::InvalidUri),
    #[error("invalid CORS header value: {0}")]
    Cors(#[from] axum::http::header::InvalidHeaderValue),
}

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub rule: Arc<ForwardingRule>,
    pub forwarder: Forwarder,
    pub cors: CorsPolicy,
    pub static_files: StaticFiles,
}

/// HTTP server for the forwarding proxy.
pub struct HttpServer {
    router: Router,
    config: ProxyConfig,
    rule: Arc<ForwardingRule>,
    timeouts: Timeouts,
}

impl HttpServer {
    /// Create a new HTTP server with the given configuration.
    pub fn new(config: ProxyConfig) -> Result<Self, ServerError> {
        let rule = Arc::new(ForwardingRule::from_config(&config.forwarding)?);
        let cors = CorsPolicy::from_config(&config.cors)?;
        let timeouts = Timeouts::from(&config.timeouts);

        let forwarder = Forwarder::new(
            upstream_client(&timeouts),
            rule.clone(),
            cors.clone(),
            timeouts,
            config.limits.max_body_bytes,
        );

        let state = AppState {
            rule: rule.clone(),
            forwarder,
            cors,
            static_files: StaticFiles::new(&config.static_files.root),
        };

        let router = Self::build_router(state);
        Ok(Self {
            router,
            config,
            rule,
            timeouts,
        })
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(state: AppState) -> Router {
        let [allow_origin, allow_methods, allow_headers] = state.cors.layers();
        Router::new()
            .fallback(dispatch)
            .with_state(state)
            .layer(CatchPanicLayer::custom(panic_response))
            .layer(allow_origin)
            .layer(allow_methods)
            .layer(allow_headers)
            .layer(TraceLayer::new_for_http())
    }

    /// The fully layered router, for driving requests without a socket.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Get a reference to the config.
    pub fn config(&self) -> &ProxyConfig {
        &self.config
    }

    /// Run the server, accepting connections on the given listener until
    /// `shutdown` fires, then drain in-flight connections.
    pub async fn run(self, listener: Listener, mut shutdown: ShutdownSignal) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            prefix = %self.rule.prefix(),
            upstream = %self.rule.upstream().base(),
            static_root = %self.config.static_files.root,
            "HTTP server starting"
        );

        let tracker = ConnectionTracker::new();

        loop {
            let (stream, peer, permit) = tokio::select! {
                accepted = listener.accept() => match accepted {
                    Some(accepted) => accepted,
                    None => break,
                },
                _ = shutdown.recv() => break,
            };

            let guard = tracker.track();
            tokio::spawn(serve_connection(
                stream,
                peer,
                self.router.clone(),
                permit,
                guard,
                shutdown.clone(),
            ));
        }

        listener.close();
        drop(listener);
        tracing::info!(
            active_connections = tracker.active_count(),
            "Stopped accepting connections"
        );

        if tracker.drain(self.timeouts.shutdown_grace).await {
            tracing::info!("HTTP server stopped");
        } else {
            tracing::info!(
                abandoned_connections = tracker.active_count(),
                grace_secs = self.timeouts.shutdown_grace.as_secs(),
                "Grace period elapsed, abandoning remaining connections"
            );
        }
        Ok(())
    }
}

/// Drive one client connection to completion.
///
/// Errors end here: they are classified and logged, never propagated.
async fn serve_connection(
    stream: TcpStream,
    peer: SocketAddr,
    router: Router,
    _permit: ConnectionPermit,
    guard: ConnectionGuard,
    mut shutdown: ShutdownSignal,
) {
    let _ = stream.set_nodelay(true);
    let io = TokioIo::new(stream);

    let service = hyper::service::service_fn(move |mut request: Request<Incoming>| {
        request.extensions_mut().insert(ConnectInfo(peer));
        router.clone().oneshot(request)
    });

    let builder = auto::Builder::new(TokioExecutor::new());
    let conn = builder.serve_connection(io, service);
    tokio::pin!(conn);

    let mut draining = false;
    let result = loop {
        tokio::select! {
            result = conn.as_mut() => break result,
            _ = shutdown.recv(), if !draining => {
                draining = true;
                conn.as_mut().graceful_shutdown();
            }
        }
    };

    if let Err(e) = result {
        log_connection_error(guard.id(), peer, &*e);
    }
}

/// Main handler. Classifies the request and serves it.
async fn dispatch(State(state): State<AppState>, request: Request<Body>) -> Response {
    let start = Instant::now();
    let request_id = RequestId::new();
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let peer = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.to_string())
        .unwrap_or_default();

    let dispatch = state.rule.classify(&method, request.uri());
    let span = tracing::debug_span!(
        "request",
        request_id = %request_id,
        method = %method,
        path = %path,
        peer = %peer,
        dispatch = dispatch.label(),
    );

    let response = async {
        match dispatch {
            Dispatch::Forward => match state.forwarder.forward(request).await {
                Ok(response) => response,
                Err(err) => {
                    err.log(&request_id.to_string(), method.as_str(), &path);
                    metrics::record_forward_error(err.kind());
                    err.into_response()
                }
            },
            Dispatch::Preflight => state.cors.preflight_response(),
            Dispatch::Static => state.static_files.serve(request).await,
            Dispatch::NotImplemented => StatusCode::NOT_IMPLEMENTED.into_response(),
            Dispatch::MethodNotAllowed => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        }
    }
    .instrument(span)
    .await;

    metrics::record_request(method.as_str(), response.status().as_u16(), dispatch.label(), start);
    response
}

fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response<Body> {
    let detail = panic
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| panic.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");
    tracing::error!(panic = detail, "Request handler panicked");
    (StatusCode::INTERNAL_SERVER_ERROR, "Proxy error: internal error").into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::{header, Method};

    fn server(upstream: &str, root: &std::path::Path) -> HttpServer {
        let mut config = ProxyConfig::default();
        config.forwarding.upstream = upstream.to_string();
        config.static_files.root = root.display().to_string();
        config.timeouts.connect_secs = 1;
        config.timeouts.upstream_secs = 1;
        HttpServer::new(config).unwrap()
    }

    fn assert_cors(response: &Response) {
        let headers = response.headers();
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], "*");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_METHODS], "GET, POST, PUT, DELETE, OPTIONS");
        assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_HEADERS], "Content-Type, Authorization");
    }

    #[tokio::test]
    async fn preflight_is_local() {
        // Nothing listens on the discard port; a contacted upstream would fail.
        let root = tempfile::tempdir().unwrap();
        let server = server("http://127.0.0.1:9", root.path());

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/api/items")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn non_prefix_writes_are_405_with_cors() {
        let root = tempfile::tempdir().unwrap();
        let server = server("http://127.0.0.1:9", root.path());

        for method in [Method::POST, Method::PUT, Method::DELETE, Method::PATCH] {
            let request = Request::builder()
                .method(method.clone())
                .uri("/upload")
                .body(Body::empty())
                .unwrap();
            let response = server.router().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method}");
            assert_cors(&response);
            let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
            assert!(body.is_empty());
        }
    }

    #[tokio::test]
    async fn options_outside_prefix_is_not_implemented() {
        let root = tempfile::tempdir().unwrap();
        let server = server("http://127.0.0.1:9", root.path());

        let request = Request::builder()
            .method(Method::OPTIONS)
            .uri("/index.html")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_IMPLEMENTED);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn static_get_has_cors() {
        let root = tempfile::tempdir().unwrap();
        std::fs::write(root.path().join("app.css"), "body{}").unwrap();
        let server = server("http://127.0.0.1:9", root.path());

        let request = Request::get("/app.css").body(Body::empty()).unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn invalid_content_length_is_400_without_upstream() {
        let root = tempfile::tempdir().unwrap();
        let server = server("http://127.0.0.1:9", root.path());

        let request = Request::post("/api/items")
            .header(header::CONTENT_LENGTH, "lots")
            .body(Body::empty())
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_cors(&response);
    }

    #[tokio::test]
    async fn oversized_body_is_413() {
        let root = tempfile::tempdir().unwrap();
        let mut config = ProxyConfig::default();
        config.forwarding.upstream = "http://127.0.0.1:9".into();
        config.static_files.root = root.path().display().to_string();
        config.limits.max_body_bytes = 4;
        let server = HttpServer::new(config).unwrap();

        let request = Request::post("/api/items")
            .header(header::CONTENT_LENGTH, "5")
            .body(Body::from("hello"))
            .unwrap();
        let response = server.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[test]
    fn panic_response_is_generic_500() {
        let response = panic_response(Box::new("boom"));
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
