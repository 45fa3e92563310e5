//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, request ID, trace span)
//!     → dispatcher.rs (route match, body parse, argument extract,
//!                      input guard, handler invocation)
//!     → response.rs (200 JSON or 400/404/500/501 plain text)
//!     → Send to client
//! ```

pub mod dispatcher;
pub mod request;
pub mod response;
pub mod server;

pub use dispatcher::Dispatcher;
pub use request::{UuidRequestId, X_REQUEST_ID};
pub use response::DispatchError;
pub use server::EndpointServer;
