//! Server role: routing an incoming request to a bound implementation.
//!
//! # Responsibilities
//! - Match the path against the registry, then check the method
//! - Read and parse the JSON body (never for GET)
//! - Rebuild the logical argument from path captures and body
//! - Wrap it with the request headers, enforce the input guard
//! - Invoke the bound handler and encode its result
//!
//! # Design Decisions
//! - Each step is terminal on failure; no partial results
//! - A method mismatch on the first matching template is a 404, later templates are not tried
//! - Registry and implementation are read-only, shared via Arc

use std::sync::Arc;
use std::time::Instant;

use axum::{
    body::Body,
    http::Request,
    response::{IntoResponse, Response},
};
use serde_json::Value;

use crate::contract::HttpMethod;
use crate::envelope::{headers_from_map, RequestEnvelope};
use crate::http::response::{json_response, DispatchError};
use crate::merge::extract_argument;
use crate::observability::metrics;
use crate::routing::{RouteMatch, RouteRegistry};
use crate::service::{HandlerFailure, Implementation, Service};

/// Default cap on request bodies.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;

/// Dispatches requests for one service.
#[derive(Debug, Clone)]
pub struct Dispatcher {
    registry: Arc<RouteRegistry>,
    implementation: Option<Arc<Implementation>>,
    max_body_bytes: usize,
}

impl Dispatcher {
    /// A dispatcher with no implementation bound: matched routes answer 501.
    pub fn new(service: &Service) -> Self {
        Self {
            registry: service.registry().clone(),
            implementation: None,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        }
    }

    pub fn with_implementation(mut self, implementation: Implementation) -> Self {
        self.implementation = Some(Arc::new(implementation));
        self
    }

    pub fn with_body_limit(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    pub fn registry(&self) -> &Arc<RouteRegistry> {
        &self.registry
    }

    /// Dispatch and render the outcome as an HTTP response.
    pub async fn handle(&self, request: Request<Body>) -> Response {
        match self.dispatch(request).await {
            Ok(result) => json_response(&result),
            Err(e) => e.into_response(),
        }
    }

    /// Dispatch one request and return the operation's JSON result.
    pub async fn dispatch(&self, request: Request<Body>) -> Result<Value, DispatchError> {
        let start = Instant::now();
        let path = request.uri().path().to_string();
        let method = request.method().clone();

        let Some(route) = self.registry.match_path(&path) else {
            tracing::warn!(method = %method, path = %path, "No route matched");
            metrics::record_dispatch("none", 404, start);
            return Err(DispatchError::NotFound);
        };

        let operation = route.contract.operation_name.clone();
        let result = self.run(route, request).await;

        let status = match &result {
            Ok(_) => 200,
            Err(e) => e.status().as_u16(),
        };
        match &result {
            Ok(_) => {
                tracing::debug!(operation = %operation, path = %path, "Operation completed")
            }
            Err(DispatchError::Handler(e)) => {
                tracing::error!(operation = %operation, error = %e, "Operation failed")
            }
            Err(e) => {
                tracing::warn!(operation = %operation, path = %path, status, error = %e, "Request rejected")
            }
        }
        metrics::record_dispatch(&operation, status, start);

        result
    }

    async fn run(&self, route: RouteMatch<'_>, request: Request<Body>) -> Result<Value, DispatchError> {
        let contract = &route.contract;
        let (parts, body) = request.into_parts();

        if HttpMethod::from_http(&parts.method) != Some(contract.method) {
            return Err(DispatchError::NotFound);
        }

        let body = match contract.method {
            HttpMethod::Get => Value::Null,
            _ => read_json(body, self.max_body_bytes).await?,
        };

        let argument = extract_argument(&contract.template, &route.captures, body);
        let envelope = RequestEnvelope::new(argument, headers_from_map(&parts.headers));

        if !contract.accepts_input(envelope.payload()) {
            return Err(DispatchError::BadRequest(format!(
                "Invalid input: {}",
                envelope.payload()
            )));
        }

        let handler = self
            .implementation
            .as_ref()
            .and_then(|implementation| implementation.handler(&contract.operation_name))
            .ok_or(DispatchError::NotImplemented)?;

        tracing::debug!(operation = %contract.operation_name, "Invoking operation");

        handler(envelope).await.map_err(|failure| match failure {
            HandlerFailure::InvalidInput(message) => {
                DispatchError::BadRequest(format!("Invalid input: {message}"))
            }
            HandlerFailure::Failed(e) => DispatchError::Handler(e),
        })
    }
}

/// Read the whole body as JSON. An empty body is `null`.
async fn read_json(body: Body, limit: usize) -> Result<Value, DispatchError> {
    let bytes = axum::body::to_bytes(body, limit)
        .await
        .map_err(|e| DispatchError::BadRequest(format!("Failed to read request body: {e}")))?;
    let text = std::str::from_utf8(&bytes)
        .map_err(|e| DispatchError::BadRequest(format!("Request body is not UTF-8: {e}")))?;

    if text.trim().is_empty() {
        return Ok(Value::Null);
    }

    serde_json::from_str(text).map_err(|e| DispatchError::BadRequest(format!("Invalid JSON body: {e}")))
}
