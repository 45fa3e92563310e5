//! The client proxy.

use std::sync::Arc;
use std::time::Instant;

use reqwest::header::{HeaderMap, HeaderName, HeaderValue, CONTENT_TYPE};
use reqwest::Client;
use serde_json::Value;
use thiserror::Error;
use url::Url;

use crate::contract::{Contract, HttpMethod};
use crate::envelope::{Headers, RequestEnvelope};
use crate::merge::merge_path;
use crate::observability::metrics;
use crate::routing::RouteRegistry;
use crate::service::Service;

/// Errors surfaced to callers of a remote operation.
#[derive(Debug, Error)]
pub enum CallError {
    /// The peer answered with a non-2xx status. `message` is the reason
    /// phrase; `body` is whatever text the peer sent with it.
    #[error("HTTP error {status}: {message}")]
    Transport {
        status: u16,
        message: String,
        body: String,
    },

    /// The decoded response was rejected by the output guard or output type.
    #[error("Invalid response from server: {message}")]
    Validation { message: String },

    /// The response body was not valid JSON.
    #[error("Malformed response body: {0}")]
    Decode(#[source] serde_json::Error),

    /// The argument could not be encoded as JSON.
    #[error("Failed to encode argument: {0}")]
    Encode(#[source] serde_json::Error),

    #[error("Unknown operation '{0}'")]
    UnknownOperation(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Invalid header '{0}'")]
    InvalidHeader(String),

    /// Connection-level failure reported by the HTTP client.
    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

impl CallError {
    /// HTTP status of a transport error.
    pub fn status(&self) -> Option<u16> {
        match self {
            CallError::Transport { status, .. } => Some(*status),
            _ => None,
        }
    }

    fn outcome(&self) -> &'static str {
        match self {
            CallError::Transport { .. } => "transport",
            CallError::Validation { .. } => "validation",
            CallError::Decode(_) => "decode",
            CallError::Http(_) => "http",
            _ => "local",
        }
    }
}

/// Calls the operations of a service on a remote peer.
#[derive(Debug, Clone)]
pub struct ClientProxy {
    client: Client,
    base_url: Url,
    registry: Arc<RouteRegistry>,
}

impl ClientProxy {
    /// Create a proxy for `service` targeting `base_url` (e.g. `http://localhost:8080`).
    pub fn new(service: &Service, base_url: &str) -> Result<Self, CallError> {
        Self::with_client(service, base_url, Client::new())
    }

    /// Like [`new`](Self::new) with a preconfigured `reqwest` client.
    pub fn with_client(service: &Service, base_url: &str, client: Client) -> Result<Self, CallError> {
        Ok(Self {
            client,
            base_url: Url::parse(base_url)?,
            registry: service.registry().clone(),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Call an operation by name with an untyped argument.
    pub async fn call(
        &self,
        operation_name: &str,
        argument: impl Into<RequestEnvelope<Value>>,
    ) -> Result<Value, CallError> {
        let contract = self
            .registry
            .get(operation_name)
            .cloned()
            .ok_or_else(|| CallError::UnknownOperation(operation_name.to_string()))?;
        self.invoke(&contract, argument.into()).await
    }

    /// Send one call for `contract` and validate the decoded result.
    pub async fn invoke(
        &self,
        contract: &Contract,
        envelope: RequestEnvelope<Value>,
    ) -> Result<Value, CallError> {
        let start = Instant::now();
        let result = self.send(contract, envelope).await;
        let outcome = match &result {
            Ok(_) => "ok",
            Err(e) => e.outcome(),
        };
        metrics::record_call(&contract.operation_name, outcome, start);
        result
    }

    async fn send(
        &self,
        contract: &Contract,
        envelope: RequestEnvelope<Value>,
    ) -> Result<Value, CallError> {
        let (payload, headers) = envelope.into_parts();
        let merged = merge_path(&contract.template, &payload);
        let url = self.base_url.join(&merged.path)?;

        tracing::debug!(
            operation = %contract.operation_name,
            method = %contract.method,
            url = %url,
            "Calling remote operation"
        );

        let mut request = self
            .client
            .request(contract.method.to_http(), url)
            .headers(build_headers(&headers)?);

        if let Some(body) = merged.remainder.filter(|_| contract.method != HttpMethod::Get) {
            request = request.body(serde_json::to_vec(&body).map_err(CallError::Encode)?);
        }

        let response = request.send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = status
                .canonical_reason()
                .map(str::to_string)
                .unwrap_or_else(|| format!("HTTP error {}", status.as_u16()));
            let body = match response.text().await {
                Ok(body) => body,
                Err(e) => {
                    tracing::debug!(error = %e, "Failed to read error response body");
                    String::new()
                }
            };
            tracing::warn!(
                operation = %contract.operation_name,
                status = status.as_u16(),
                message = %message,
                body = %body,
                "Remote operation failed"
            );
            return Err(CallError::Transport {
                status: status.as_u16(),
                message,
                body,
            });
        }

        let bytes = response.bytes().await?;
        let result: Value = serde_json::from_slice(&bytes).map_err(CallError::Decode)?;

        if !contract.accepts_output(&result) {
            return Err(CallError::Validation {
                message: format!(
                    "'{}' returned {} which fails the {} guard",
                    contract.operation_name,
                    result,
                    contract.output_guard.name()
                ),
            });
        }

        Ok(result)
    }
}

/// `Content-Type: application/json` overlaid with the envelope headers.
fn build_headers(headers: &Headers) -> Result<HeaderMap, CallError> {
    let mut map = HeaderMap::new();
    map.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    for (name, values) in headers {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|_| CallError::InvalidHeader(name.clone()))?;
        map.remove(&name);
        for value in values.iter() {
            let value = HeaderValue::from_str(value)
                .map_err(|_| CallError::InvalidHeader(name.to_string()))?;
            map.append(name.clone(), value);
        }
    }

    Ok(map)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::envelope::HeaderValues;

    #[test]
    fn test_envelope_headers_override_content_type() {
        let mut headers = Headers::new();
        headers.insert("Content-Type".into(), "application/vnd.custom+json".into());
        headers.insert(
            "x-tag".into(),
            HeaderValues::Many(vec!["a".into(), "b".into()]),
        );

        let map = build_headers(&headers).unwrap();
        assert_eq!(map.get(CONTENT_TYPE).unwrap(), "application/vnd.custom+json");
        assert_eq!(map.get_all("x-tag").iter().count(), 2);
    }

    #[test]
    fn test_default_content_type() {
        let map = build_headers(&Headers::new()).unwrap();
        assert_eq!(map.get(CONTENT_TYPE).unwrap(), "application/json");
        assert_eq!(map.len(), 1);
    }

    #[test]
    fn test_invalid_header_rejected() {
        let mut headers = Headers::new();
        headers.insert("bad header".into(), "x".into());
        assert!(matches!(
            build_headers(&headers),
            Err(CallError::InvalidHeader(name)) if name == "bad header"
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        let service = Service::builder().build();
        assert!(matches!(
            ClientProxy::new(&service, "not a url"),
            Err(CallError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_transport_error_display() {
        let err = CallError::Transport {
            status: 404,
            message: "Not Found".into(),
            body: "Not found".into(),
        };
        assert_eq!(err.to_string(), "HTTP error 404: Not Found");
        assert_eq!(err.status(), Some(404));
    }
}
