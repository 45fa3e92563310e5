//! Service definition and implementation binding.
//!
//! A service is described once, with [`ServiceBuilder::register`], and the
//! resulting [`Service`] drives both roles:
//!
//! ```text
//!                     ServiceBuilder::register(..) → Endpoint<I, O>
//!                                  │
//!                                  ▼
//!                    Service { Arc<RouteRegistry> }
//!                     │                          │
//!                     ▼                          ▼
//!        ClientProxy (outbound calls)   Dispatcher + Implementation (inbound)
//! ```

use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::marker::PhantomData;
use std::sync::Arc;

use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::client::{CallError, ClientProxy};
use crate::contract::{Contract, Guard, HttpMethod};
use crate::envelope::RequestEnvelope;
use crate::routing::{RegistryError, RouteRegistry, RouteTemplate};

/// Error type returned by bound implementations.
pub type HandlerError = Box<dyn std::error::Error + Send + Sync>;

/// Why a bound handler did not produce a result.
#[derive(Debug)]
pub enum HandlerFailure {
    /// The payload did not deserialize into the handler's input type.
    InvalidInput(String),
    /// The handler itself failed.
    Failed(HandlerError),
}

type BoxedHandler =
    Arc<dyn Fn(RequestEnvelope<Value>) -> BoxFuture<'static, Result<Value, HandlerFailure>> + Send + Sync>;

/// Collects contracts at definition time.
#[derive(Debug, Default)]
pub struct ServiceBuilder {
    registry: RouteRegistry,
}

impl ServiceBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register one operation and return its typed caller handle.
    pub fn register<I, O>(
        &mut self,
        method: HttpMethod,
        pattern: &str,
        input_guard: Option<Guard>,
        output_guard: Guard,
        operation_name: &str,
    ) -> Result<Endpoint<I, O>, RegistryError> {
        let contract = Contract {
            method,
            template: RouteTemplate::parse(pattern)?,
            input_guard,
            output_guard,
            operation_name: operation_name.to_string(),
        };
        let contract = self.registry.insert(contract)?;
        Ok(Endpoint {
            contract,
            _types: PhantomData,
        })
    }

    pub fn build(self) -> Service {
        Service {
            registry: Arc::new(self.registry),
        }
    }
}

/// A defined service. Cloning shares the same registry.
#[derive(Debug, Clone)]
pub struct Service {
    registry: Arc<RouteRegistry>,
}

impl Service {
    pub fn builder() -> ServiceBuilder {
        ServiceBuilder::new()
    }

    pub fn registry(&self) -> &Arc<RouteRegistry> {
        &self.registry
    }
}

/// Typed handle for one registered operation.
pub struct Endpoint<I, O> {
    contract: Arc<Contract>,
    _types: PhantomData<fn(I) -> O>,
}

impl<I, O> Clone for Endpoint<I, O> {
    fn clone(&self) -> Self {
        Self {
            contract: self.contract.clone(),
            _types: PhantomData,
        }
    }
}

impl<I, O> fmt::Debug for Endpoint<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("operation", &self.contract.operation_name)
            .field("method", &self.contract.method)
            .field("template", &self.contract.template.pattern())
            .finish()
    }
}

impl<I, O> Endpoint<I, O> {
    pub fn contract(&self) -> &Arc<Contract> {
        &self.contract
    }

    pub fn name(&self) -> &str {
        &self.contract.operation_name
    }
}

impl<I, O> Endpoint<I, O>
where
    I: Serialize,
    O: DeserializeOwned,
{
    /// Call the operation on a remote peer.
    ///
    /// Accepts the bare argument or a [`RequestEnvelope`] carrying extra headers.
    pub async fn call(
        &self,
        client: &ClientProxy,
        argument: impl Into<RequestEnvelope<I>>,
    ) -> Result<O, CallError> {
        let envelope = argument
            .into()
            .try_map(serde_json::to_value)
            .map_err(CallError::Encode)?;
        let result = client.invoke(&self.contract, envelope).await?;
        serde_json::from_value(result).map_err(|e| CallError::Validation {
            message: format!(
                "response of '{}' does not match its output type: {}",
                self.contract.operation_name, e
            ),
        })
    }
}

/// The server-side dispatch table: operation name → bound handler.
#[derive(Clone, Default)]
pub struct Implementation {
    handlers: HashMap<String, BoxedHandler>,
}

impl Implementation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a typed handler to an operation.
    pub fn bind<I, O, F, Fut>(self, endpoint: &Endpoint<I, O>, handler: F) -> Self
    where
        I: DeserializeOwned + Send + 'static,
        O: Serialize + Send + 'static,
        F: Fn(RequestEnvelope<I>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<O, HandlerError>> + Send + 'static,
    {
        let handler = Arc::new(handler);
        self.bind_raw(endpoint.name(), move |envelope: RequestEnvelope<Value>| {
            let handler = handler.clone();
            async move {
                let envelope = envelope
                    .try_map(serde_json::from_value::<I>)
                    .map_err(|e| HandlerFailure::InvalidInput(e.to_string()))?;
                let output = handler(envelope).await.map_err(HandlerFailure::Failed)?;
                serde_json::to_value(output).map_err(|e| HandlerFailure::Failed(Box::new(e)))
            }
        })
    }

    /// Bind an untyped handler by operation name.
    pub fn bind_raw<F, Fut>(mut self, operation_name: &str, handler: F) -> Self
    where
        F: Fn(RequestEnvelope<Value>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Value, HandlerFailure>> + Send + 'static,
    {
        let boxed: BoxedHandler = Arc::new(move |envelope| handler(envelope).boxed());
        self.handlers.insert(operation_name.to_string(), boxed);
        self
    }

    pub fn contains(&self, operation_name: &str) -> bool {
        self.handlers.contains_key(operation_name)
    }

    pub(crate) fn handler(&self, operation_name: &str) -> Option<&BoxedHandler> {
        self.handlers.get(operation_name)
    }
}

impl fmt::Debug for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<&str> = self.handlers.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("Implementation")
            .field("operations", &names)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::contract::guard;
    use serde_json::json;

    #[test]
    fn test_register_returns_typed_endpoint() {
        let mut builder = Service::builder();
        let max: Endpoint<Vec<f64>, f64> = builder
            .register(
                HttpMethod::Post,
                "/max/:num/:num",
                Some(guard::array_of(guard::number())),
                guard::number(),
                "max",
            )
            .unwrap();
        let service = builder.build();

        assert_eq!(max.name(), "max");
        assert_eq!(service.registry().len(), 1);
        assert!(Arc::ptr_eq(max.contract(), service.registry().get("max").unwrap()));
    }

    #[test]
    fn test_register_rejects_bad_template() {
        let mut builder = Service::builder();
        let result = builder.register::<(), ()>(HttpMethod::Get, "bar", None, guard::any(), "bar");
        assert!(matches!(result, Err(RegistryError::Template(_))));
    }

    #[tokio::test]
    async fn test_bound_handler_decodes_input() {
        let mut builder = Service::builder();
        let max: Endpoint<Vec<f64>, f64> = builder
            .register(HttpMethod::Post, "/max", None, guard::number(), "max")
            .unwrap();

        let implementation = Implementation::new().bind(&max, |req: RequestEnvelope<Vec<f64>>| async move {
            Ok::<_, HandlerError>(req.payload.iter().cloned().fold(f64::MIN, f64::max))
        });

        let handler = implementation.handler("max").unwrap();
        let result = handler(RequestEnvelope::from(json!([1, 9, 3]))).await.unwrap();
        assert_eq!(result, json!(9.0));

        let failure = handler(RequestEnvelope::from(json!("nope"))).await.unwrap_err();
        assert!(matches!(failure, HandlerFailure::InvalidInput(_)));
        assert!(!implementation.contains("foo"));
    }
}
