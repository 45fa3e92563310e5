//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate addresses, URLs and limits
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: EndpointConfig → Result<(), Vec<ValidationError>>

use std::fmt;
use std::net::SocketAddr;

use url::Url;

use crate::config::schema::EndpointConfig;

/// One semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path of the offending field.
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

pub fn validate_config(config: &EndpointConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Err(e) = config.listener.bind_address.parse::<SocketAddr>() {
        errors.push(ValidationError {
            field: "listener.bind_address",
            message: format!("'{}' is not a socket address: {}", config.listener.bind_address, e),
        });
    }

    match Url::parse(&config.client.base_url) {
        Ok(url) if !matches!(url.scheme(), "http" | "https") => errors.push(ValidationError {
            field: "client.base_url",
            message: format!("unsupported scheme '{}'", url.scheme()),
        }),
        Ok(_) => {}
        Err(e) => errors.push(ValidationError {
            field: "client.base_url",
            message: format!("'{}' is not a URL: {}", config.client.base_url, e),
        }),
    }

    if config.limits.max_body_bytes == 0 {
        errors.push(ValidationError {
            field: "limits.max_body_bytes",
            message: "must be greater than zero".to_string(),
        });
    }

    if config.observability.metrics_enabled {
        if let Err(e) = config.observability.metrics_address.parse::<SocketAddr>() {
            errors.push(ValidationError {
                field: "observability.metrics_address",
                message: format!(
                    "'{}' is not a socket address: {}",
                    config.observability.metrics_address, e
                ),
            });
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
