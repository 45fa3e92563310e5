//! Runtime validation predicates over decoded JSON.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// A validation predicate applied to a decoded JSON value.
#[derive(Clone)]
pub struct Guard {
    name: &'static str,
    check: Arc<dyn Fn(&Value) -> bool + Send + Sync>,
}

impl Guard {
    /// Build a guard from a predicate. `name` only shows up in logs and `Debug`.
    pub fn new<F>(name: &'static str, check: F) -> Self
    where
        F: Fn(&Value) -> bool + Send + Sync + 'static,
    {
        Self {
            name,
            check: Arc::new(check),
        }
    }

    /// Returns true if the value passes this guard.
    pub fn check(&self, value: &Value) -> bool {
        (self.check)(value)
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl fmt::Debug for Guard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Guard").field(&self.name).finish()
    }
}

/// Primitive JSON types checked by [`props`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrimitiveType {
    String,
    Number,
    Boolean,
}

impl PrimitiveType {
    fn accepts(self, value: &Value) -> bool {
        match self {
            PrimitiveType::String => value.is_string(),
            PrimitiveType::Number => value.is_number(),
            PrimitiveType::Boolean => value.is_boolean(),
        }
    }
}

pub fn any() -> Guard {
    Guard::new("any", |_| true)
}

pub fn string() -> Guard {
    Guard::new("string", Value::is_string)
}

pub fn number() -> Guard {
    Guard::new("number", Value::is_number)
}

pub fn boolean() -> Guard {
    Guard::new("boolean", Value::is_boolean)
}

/// Accepts an array whose every element passes `inner`.
pub fn array_of(inner: Guard) -> Guard {
    Guard::new("array", move |value| {
        value
            .as_array()
            .is_some_and(|items| items.iter().all(|item| inner.check(item)))
    })
}

/// Accepts an object carrying `key` with a value that passes `inner`.
pub fn has_prop(key: &'static str, inner: Guard) -> Guard {
    Guard::new("has_prop", move |value| {
        value
            .as_object()
            .and_then(|object| object.get(key))
            .is_some_and(|field| inner.check(field))
    })
}

/// Accepts an object that has every listed key with the listed primitive type.
/// Extra keys are allowed.
pub fn props(shape: &[(&'static str, PrimitiveType)]) -> Guard {
    let shape = shape.to_vec();
    Guard::new("props", move |value| {
        let Some(object) = value.as_object() else {
            return false;
        };
        shape.iter().all(|(key, kind)| {
            object.get(*key).is_some_and(|field| kind.accepts(field))
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_primitive_guards() {
        assert!(string().check(&json!("x")));
        assert!(!string().check(&json!(1)));
        assert!(number().check(&json!(1.5)));
        assert!(!number().check(&json!("1")));
        assert!(boolean().check(&json!(false)));
        assert!(!boolean().check(&Value::Null));
        assert!(any().check(&Value::Null));
    }

    #[test]
    fn test_array_of() {
        let guard = array_of(number());
        assert!(guard.check(&json!([1, 2, 3])));
        assert!(guard.check(&json!([])));
        assert!(!guard.check(&json!([1, "2"])));
        assert!(!guard.check(&json!({"0": 1})));
    }

    #[test]
    fn test_props() {
        let guard = props(&[
            ("name", PrimitiveType::String),
            ("age", PrimitiveType::Number),
        ]);
        assert!(guard.check(&json!({"name": "John", "age": 42})));
        assert!(guard.check(&json!({"name": "John", "age": 42, "extra": true})));
        assert!(!guard.check(&json!({"name": "John"})));
        assert!(!guard.check(&json!({"name": "John", "age": "42"})));
        assert!(!guard.check(&json!(["John", 42])));
    }

    #[test]
    fn test_has_prop() {
        let guard = has_prop("message", string());
        assert!(guard.check(&json!({"message": "hi"})));
        assert!(!guard.check(&json!({"message": 1})));
        assert!(!guard.check(&json!("message")));
    }

    #[test]
    fn test_debug_shows_name() {
        assert_eq!(format!("{:?}", array_of(number())), "Guard(\"array\")");
    }
}
