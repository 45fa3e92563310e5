//! Universal endpoint: one service description, two roles.
//!
//! A service is a set of named operations, each with an HTTP method, a path
//! template and a pair of guards. The same description yields a client proxy
//! that turns calls into HTTP requests and a server dispatcher that turns HTTP
//! requests into calls on a local implementation.

pub mod client;
pub mod config;
pub mod contract;
pub mod demo;
pub mod envelope;
pub mod http;
pub mod merge;
pub mod observability;
pub mod routing;
pub mod service;

pub use client::{CallError, ClientProxy};
pub use config::EndpointConfig;
pub use contract::{guard, Contract, Guard, HttpMethod};
pub use envelope::{HeaderValues, Headers, RequestEnvelope};
pub use http::{DispatchError, Dispatcher, EndpointServer};
pub use routing::{RegistryError, RouteRegistry, RouteTemplate};
pub use service::{Endpoint, HandlerError, Implementation, Service, ServiceBuilder};
