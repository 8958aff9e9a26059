//! HTTP reverse-proxy server.
//!
//! # Responsibilities
//! - Create the Axum router with the catch-all proxy handler
//! - Wire up middleware (tracing)
//! - Select a backend per request and forward it with forwarding headers
//! - Stream request and response bodies without full buffering
//! - Optional TLS termination on the listener
//!
//! # Design Decisions
//! - The upstream client is reqwest: it speaks HTTPS to backends whose
//!   `secure` flag is set and streams bodies in both directions
//! - A request that fails before upstream response headers arrive gets a
//!   502; a failure mid-stream surfaces as a body stream error, which
//!   aborts the client connection
//! - Proxied connections carry no overall timeout; they live as long as
//!   both ends do

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    body::Body,
    extract::{ConnectInfo, State},
    http::{HeaderValue, Request, StatusCode},
    response::{IntoResponse, Response},
    routing::any,
    Router,
};
use axum_server::tls_rustls::RustlsConfig;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::trace::TraceLayer;

use crate::balance::BackendSelector;
use crate::observability::metrics;

/// Application state injected into the proxy handler.
#[derive(Clone)]
pub struct AppState {
    pub selector: Arc<BackendSelector>,
    pub client: reqwest::Client,
    /// Whether the listener terminates TLS; drives `x-forwarded-proto`.
    pub tls_enabled: bool,
}

/// HTTP reverse-proxy server.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    /// Create a new HTTP server over the given selector.
    ///
    /// `tls_enabled` reflects whether the listener terminates TLS, i.e.
    /// whether inbound connections are encrypted.
    pub fn new(selector: Arc<BackendSelector>, tls_enabled: bool) -> Self {
        // Backend responses are relayed verbatim: a 3xx from the backend
        // goes to the client untouched, never chased by the proxy.
        let client = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .expect("failed to build upstream client");
        let state = AppState {
            selector,
            client,
            tls_enabled,
        };
        Self {
            router: Self::build_router(state),
        }
    }

    /// Build the Axum router with the catch-all proxy route.
    fn build_router(state: AppState) -> Router {
        Router::new()
            .route("/{*path}", any(proxy_handler))
            .route("/", any(proxy_handler))
            .with_state(state)
            .layer(TraceLayer::new_for_http())
    }

    /// Run the server on a plain TCP listener.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP load balancer listening");

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    /// Run the server with TLS termination.
    pub async fn run_tls(
        self,
        addr: SocketAddr,
        tls: RustlsConfig,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        tracing::info!(address = %addr, "HTTPS load balancer listening");

        let handle = axum_server::Handle::new();
        let shutdown_handle = handle.clone();
        tokio::spawn(async move {
            let _ = shutdown.recv().await;
            tracing::info!("HTTPS server received shutdown signal");
            shutdown_handle.graceful_shutdown(None);
        });

        let app = self
            .router
            .into_make_service_with_connect_info::<SocketAddr>();

        axum_server::bind_rustls(addr, tls)
            .handle(handle)
            .serve(app)
            .await?;

        tracing::info!("HTTPS server stopped");
        Ok(())
    }
}

/// Main proxy handler: select a backend, forward the request with the
/// forwarding headers added, and stream the response back.
async fn proxy_handler(
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
    request: Request<Body>,
) -> Response {
    let client_ip = addr.ip();

    let Some(backend) = state.selector.select(client_ip) else {
        tracing::error!(client = %client_ip, "No backend available");
        return bad_gateway();
    };

    let (parts, body) = request.into_parts();
    let path_and_query = parts
        .uri
        .path_and_query()
        .map(|pq| pq.as_str())
        .unwrap_or("/");
    let url = format!("{}{}", backend.base_url(), path_and_query);
    let method = parts.method.clone();

    tracing::debug!(
        client = %client_ip,
        method = %method,
        path = path_and_query,
        backend = %backend.authority(),
        "Proxying request"
    );

    // Copy all inbound headers, then overwrite the two forwarding headers.
    let mut headers = parts.headers;
    if let Ok(value) = HeaderValue::from_str(&client_ip.to_string()) {
        headers.insert("x-forwarded-for", value);
    }
    let proto = if state.tls_enabled { "https" } else { "http" };
    headers.insert("x-forwarded-proto", HeaderValue::from_static(proto));

    let upstream = state
        .client
        .request(parts.method, &url)
        .headers(headers)
        .body(reqwest::Body::wrap_stream(body.into_data_stream()))
        .send()
        .await;

    match upstream {
        Ok(response) => {
            let status = response.status();
            metrics::record_request(method.as_str(), status.as_u16(), &backend.authority());

            let mut builder = Response::builder().status(status);
            if let Some(response_headers) = builder.headers_mut() {
                for (name, value) in response.headers() {
                    response_headers.insert(name.clone(), value.clone());
                }
            }

            builder
                .body(Body::from_stream(response.bytes_stream()))
                .map(IntoResponse::into_response)
                .unwrap_or_else(|_| bad_gateway())
        }
        Err(error) => {
            tracing::error!(
                client = %client_ip,
                backend = %backend.authority(),
                error = %error,
                "Upstream request failed"
            );
            metrics::record_request(method.as_str(), 502, &backend.authority());
            bad_gateway()
        }
    }
}

fn bad_gateway() -> Response {
    (StatusCode::BAD_GATEWAY, "Bad Gateway").into_response()
}
