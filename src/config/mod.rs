//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → EndpointConfig (validated, immutable)
//!     → main: listener address, body limit, logging, metrics
//!     → endpoint-cli: client base URL
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ClientConfig, EndpointConfig, LimitsConfig, ListenerConfig, ObservabilityConfig};
pub use validation::ValidationError;
