//! HTTP server setup.
//!
//! # Responsibilities
//! - Create the Axum router feeding every request to the dispatcher
//! - Wire up middleware (request ID, tracing)
//! - Serve on a listener until the shutdown future resolves

use std::future::Future;

use axum::{
    body::Body,
    extract::State,
    http::Request,
    response::Response,
    Router,
};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

use crate::http::dispatcher::Dispatcher;
use crate::http::request::{request_id, UuidRequestId};

/// HTTP front end of a [`Dispatcher`].
pub struct EndpointServer {
    router: Router,
}

impl EndpointServer {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            router: Self::build_router(dispatcher),
        }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(dispatcher: Dispatcher) -> Router {
        let operations = dispatcher.registry().len();
        tracing::debug!(operations, "Building router");

        Router::new()
            .fallback(dispatch_handler)
            .with_state(dispatcher)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(UuidRequestId))
                    .layer(TraceLayer::new_for_http().make_span_with(|request: &Request<Body>| {
                        tracing::info_span!(
                            "request",
                            method = %request.method(),
                            path = %request.uri().path(),
                            request_id = %request_id(request),
                        )
                    }))
                    .layer(PropagateRequestIdLayer::x_request_id()),
            )
    }

    /// The router, for in-process use.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve until `shutdown` resolves.
    pub async fn run<F>(self, listener: TcpListener, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

async fn dispatch_handler(State(dispatcher): State<Dispatcher>, request: Request<Body>) -> Response {
    dispatcher.handle(request).await
}

/// Resolves on Ctrl+C.
pub async fn shutdown_signal() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => tracing::info!("Shutdown signal received"),
        Err(e) => {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await
        }
    }
}
