//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request path
//!     → registry.rs (scan contracts in registration order)
//!     → template.rs (segment match, raw captures)
//!     → Return: RouteMatch { contract, captures } or None
//!
//! Route compilation (at definition time):
//!     pattern "/foo/:age"
//!     → template.rs (literal + parameter segments)
//!     → registry.rs (reject duplicate templates / operations)
//!     → frozen inside Service, shared via Arc
//! ```
//!
//! # Design Decisions
//! - Routes compiled once, immutable at runtime
//! - No regex in the hot path
//! - First match wins, in registration order

pub mod registry;
pub mod template;

pub use registry::{RegistryError, RouteMatch, RouteRegistry};
pub use template::{RouteTemplate, Segment, TemplateError};
