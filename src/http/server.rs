//! HTTP server for the rate limit gateway.

use std::net::SocketAddr;

use axum::routing::{get, post, put};
use axum::{middleware, Router};
use tracing::{error, info};

use super::{auth, service, AppState};
use crate::error::{FloodgateError, Result};
use crate::store::CounterStore;

/// Build the service router: an unauthenticated info endpoint plus the
/// authenticated rate endpoints under `/api/v1`.
pub fn router<S: CounterStore + 'static>(state: AppState<S>) -> Router {
    let rate = Router::new()
        .route("/rate/fixed-window", post(service::check_limit::<S>))
        .route("/rate/fixed-window/set", put(service::set_config::<S>))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::authenticate::<S>,
        ));

    Router::new()
        .route("/", get(service::service_info))
        .nest("/api/v1", rate)
        .with_state(state)
}

/// HTTP server for the rate limit service.
pub struct HttpServer<S: CounterStore + 'static> {
    /// Address to bind to
    addr: SocketAddr,
    /// Shared handler state
    state: AppState<S>,
}

impl<S: CounterStore + 'static> HttpServer<S> {
    /// Create a new HTTP server.
    pub fn new(addr: SocketAddr, state: AppState<S>) -> Self {
        Self { addr, state }
    }

    /// Start the HTTP server.
    ///
    /// This method will block until the server is shut down.
    pub async fn serve(self) -> Result<()> {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;

        info!(addr = %self.addr, "Starting HTTP server");

        axum::serve(listener, router(self.state)).await.map_err(|e| {
            error!(error = %e, "HTTP server failed");
            FloodgateError::Io(e)
        })
    }

    /// Start the HTTP server with graceful shutdown.
    ///
    /// The server stops accepting connections when the provided signal
    /// resolves and drains in-flight requests before returning.
    pub async fn serve_with_shutdown<F>(self, signal: F) -> Result<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = tokio::net::TcpListener::bind(self.addr).await?;

        info!(addr = %self.addr, "Starting HTTP server with graceful shutdown");

        axum::serve(listener, router(self.state))
            .with_graceful_shutdown(signal)
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP server failed");
                FloodgateError::Io(e)
            })
    }
}
