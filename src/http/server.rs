//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum Router whose single fallback feeds the dispatch engine
//! - Wire up middleware (request ID, tracing, timeout, body limit)
//! - Buffer the request body and run the filter chain off the async workers
//! - Serve until shutdown, then drain with a deadline

use std::future::IntoFuture;
use std::sync::Arc;
use std::time::{Duration, Instant};

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response as AxumResponse},
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    limit::RequestBodyLimitLayer,
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::http::request::UuidRequestId;
use crate::http::{Request, RequestContext, Response};
use crate::lifecycle::Shutdown;
use crate::observability::metrics;
use crate::routing::{ChainOutcome, Resolution, RouteTable};

/// Application state injected into the dispatch handler.
#[derive(Clone)]
pub struct AppState {
    pub routes: Arc<RouteTable>,
    pub max_body_bytes: usize,
}

/// Socket-facing server around a frozen route table.
pub struct HttpServer {
    router: Router,
    config: ServerConfig,
}

impl HttpServer {
    pub fn new(config: ServerConfig, routes: Arc<RouteTable>) -> Self {
        let state = AppState {
            routes,
            max_body_bytes: config.limits.max_body_bytes,
        };
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .fallback(dispatch_handler)
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    // Outside the timeout: Timeout needs a response body with `Default`.
                    .layer(RequestBodyLimitLayer::new(config.limits.max_body_bytes))
                    .layer(TimeoutLayer::new(Duration::from_secs(config.timeouts.request_secs))),
            )
    }

    /// The fully layered router, for driving in-process.
    pub fn into_router(self) -> Router {
        self.router
    }

    /// Serve connections until `shutdown` fires, then drain.
    ///
    /// Connections still open `timeouts.shutdown_secs` after the trigger
    /// are dropped.
    pub async fn run(self, listener: TcpListener, shutdown: Shutdown) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        let graceful = shutdown.subscribe();
        let deadline = shutdown.subscribe();
        let drain = Duration::from_secs(self.config.timeouts.shutdown_secs);

        let serve = axum::serve(listener, self.router)
            .with_graceful_shutdown(graceful.recv())
            .into_future();

        tokio::select! {
            result = serve => result?,
            _ = async move {
                deadline.recv().await;
                tokio::time::sleep(drain).await;
            } => {
                tracing::warn!(drain_secs = drain.as_secs(), "Drain deadline elapsed, dropping open connections");
            }
        }

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }
}

/// Single entry point for every request.
async fn dispatch_handler(State(state): State<AppState>, request: axum::extract::Request) -> AxumResponse {
    let start_time = Instant::now();
    let (parts, body) = request.into_parts();
    let method = parts.method.clone();

    let body = match axum::body::to_bytes(body, state.max_body_bytes).await {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::warn!(method = %method, path = %parts.uri.path(), error = %e, "Failed to read request body");
            metrics::record_request(&method, StatusCode::PAYLOAD_TOO_LARGE, start_time);
            return (StatusCode::PAYLOAD_TOO_LARGE, "Request body too large").into_response();
        }
    };

    let req = Request::from_parts(&parts, body);
    tracing::debug!(
        request_id = req.request_id().unwrap_or("unknown"),
        method = %method,
        path = %req.path(),
        "Dispatching request"
    );

    let routes = Arc::clone(&state.routes);
    let response = match tokio::task::spawn_blocking(move || run_chain(&routes, req)).await {
        Ok(Some(res)) => res.into_response(),
        Ok(None) => (StatusCode::NOT_FOUND, "Not Found").into_response(),
        Err(e) => {
            tracing::error!(method = %method, error = %e, "Handler chain panicked");
            (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error").into_response()
        }
    };

    metrics::record_request(&method, response.status(), start_time);
    response
}

/// Resolve and execute one request against `routes`.
///
/// Returns `None` when no endpoint matched.
pub fn run_chain(routes: &RouteTable, mut req: Request) -> Option<Response> {
    let mut route = match routes.resolve(req.method(), req.path()) {
        Resolution::Found(route) => route,
        Resolution::NotFound => {
            metrics::record_not_found();
            return None;
        }
    };
    req.set_params(route.take_params());

    let mut res = Response::new();
    let mut ctx = RequestContext::new();
    if let ChainOutcome::Stopped { .. } = route.execute(&req, &mut res, &mut ctx) {
        metrics::record_filter_stop();
    }
    Some(res)
}
