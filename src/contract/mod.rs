//! Operation contracts.
//!
//! # Data Flow
//! ```text
//! ServiceBuilder::register(method, pattern, input guard, output guard, name)
//!     → template.rs (compile pattern)
//!     → Contract (immutable, shared via Arc)
//!     → client: method + template + output guard
//!     → server: method + template + input guard + operation name
//! ```
//!
//! # Design Decisions
//! - One contract per operation, frozen at definition time
//! - Guards run on decoded JSON, before any typed deserialization
//! - The method set is closed (GET, POST, PUT, DELETE, PATCH)

pub mod guard;

use std::fmt;
use std::str::FromStr;

use axum::http::Method;
use serde_json::Value;
use thiserror::Error;

use crate::routing::RouteTemplate;

pub use guard::{Guard, PrimitiveType};

/// HTTP methods an operation can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    Get,
    Post,
    Put,
    Delete,
    Patch,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Patch => "PATCH",
        }
    }

    /// Map an incoming request method. Methods outside the supported set yield `None`.
    pub fn from_http(method: &Method) -> Option<Self> {
        match *method {
            Method::GET => Some(HttpMethod::Get),
            Method::POST => Some(HttpMethod::Post),
            Method::PUT => Some(HttpMethod::Put),
            Method::DELETE => Some(HttpMethod::Delete),
            Method::PATCH => Some(HttpMethod::Patch),
            _ => None,
        }
    }

    pub fn to_http(self) -> Method {
        match self {
            HttpMethod::Get => Method::GET,
            HttpMethod::Post => Method::POST,
            HttpMethod::Put => Method::PUT,
            HttpMethod::Delete => Method::DELETE,
            HttpMethod::Patch => Method::PATCH,
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unsupported method '{0}'")]
pub struct UnsupportedMethod(pub String);

impl FromStr for HttpMethod {
    type Err = UnsupportedMethod;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "GET" => Ok(HttpMethod::Get),
            "POST" => Ok(HttpMethod::Post),
            "PUT" => Ok(HttpMethod::Put),
            "DELETE" => Ok(HttpMethod::Delete),
            "PATCH" => Ok(HttpMethod::Patch),
            _ => Err(UnsupportedMethod(s.to_string())),
        }
    }
}

/// The route and validation rules of one named operation.
#[derive(Debug, Clone)]
pub struct Contract {
    pub method: HttpMethod,
    pub template: RouteTemplate,
    pub input_guard: Option<Guard>,
    pub output_guard: Guard,
    pub operation_name: String,
}

impl Contract {
    /// Returns true if the input guard is absent or accepts the payload.
    pub fn accepts_input(&self, payload: &Value) -> bool {
        self.input_guard
            .as_ref()
            .map_or(true, |guard| guard.check(payload))
    }

    pub fn accepts_output(&self, result: &Value) -> bool {
        self.output_guard.check(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contract(input_guard: Option<Guard>) -> Contract {
        Contract {
            method: HttpMethod::Post,
            template: RouteTemplate::parse("/foo/:age").unwrap(),
            input_guard,
            output_guard: guard::has_prop("message", guard::string()),
            operation_name: "foo".into(),
        }
    }

    #[test]
    fn test_method_round_trip() {
        for method in [
            HttpMethod::Get,
            HttpMethod::Post,
            HttpMethod::Put,
            HttpMethod::Delete,
            HttpMethod::Patch,
        ] {
            assert_eq!(HttpMethod::from_http(&method.to_http()), Some(method));
            assert_eq!(method.as_str().parse::<HttpMethod>(), Ok(method));
        }
        assert_eq!("patch".parse::<HttpMethod>(), Ok(HttpMethod::Patch));
        assert!("HEAD".parse::<HttpMethod>().is_err());
        assert_eq!(HttpMethod::from_http(&Method::OPTIONS), None);
    }

    #[test]
    fn test_missing_input_guard_accepts_everything() {
        let c = contract(None);
        assert!(c.accepts_input(&Value::Null));
        assert!(c.accepts_input(&json!([1, 2])));
    }

    #[test]
    fn test_guards_applied() {
        let c = contract(Some(guard::props(&[("age", PrimitiveType::Number)])));
        assert!(c.accepts_input(&json!({"age": 42})));
        assert!(!c.accepts_input(&json!({"age": "42"})));
        assert!(c.accepts_output(&json!({"message": "ok"})));
        assert!(!c.accepts_output(&json!("ok")));
    }
}
