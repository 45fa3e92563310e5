//! Client role: turning operation calls into outbound HTTP requests.
//!
//! # Data Flow
//! ```text
//! Endpoint::call(argument | RequestEnvelope)
//!     → envelope unwrap (payload, headers)
//!     → merge::merge_path (fill path parameters, keep remainder)
//!     → proxy.rs (reqwest request: method, JSON content type, headers, body)
//!     → status check (non-2xx → Transport error)
//!     → JSON decode → output guard → typed result
//! ```
//!
//! # Design Decisions
//! - No retries, no timeouts: one best-effort exchange per call
//! - Transport failures of the host stack surface unchanged as `CallError::Http`
//! - Guard rejections are a distinct `Validation` error, never a transport error

pub mod proxy;

pub use proxy::{CallError, ClientProxy};
