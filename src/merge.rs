//! Splitting and joining call arguments across path parameters.
//!
//! # Data Flow
//! ```text
//! client: argument ──merge_path──▶ (path with parameters filled in, remainder body)
//! server: (captures, parsed body) ──extract_argument──▶ argument
//! ```
//!
//! The two directions are inverse on well-shaped arguments: a primitive fills
//! the first parameter, a sequence fills parameters left to right and keeps the
//! rest, and a keyed structure fills the parameters named by its keys.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Map, Number, Value};

use crate::routing::{RouteTemplate, Segment};

/// Characters escaped in a path segment, matching `encodeURIComponent`.
const SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Outcome of [`merge_path`].
#[derive(Debug, Clone, PartialEq)]
pub struct MergedPath {
    pub path: String,
    /// What is left of the argument once the parameters are filled in.
    /// `None` means there is no body to send.
    pub remainder: Option<Value>,
}

/// Fill the template's parameters from `argument`.
///
/// Parameters the argument cannot fill are left as `:name` in the path.
pub fn merge_path(template: &RouteTemplate, argument: &Value) -> MergedPath {
    let mut filled: Vec<Option<String>> = vec![None; template.segments().len()];
    let param_slots = template
        .segments()
        .iter()
        .enumerate()
        .filter_map(|(i, segment)| match segment {
            Segment::Param(name) => Some((i, name.as_str())),
            Segment::Literal(_) => None,
        });

    let remainder = match argument {
        Value::Null => None,
        Value::Array(items) => {
            let mut items = items.iter();
            for (slot, _) in param_slots {
                match items.next() {
                    Some(item) => filled[slot] = Some(encode_segment(item)),
                    None => break,
                }
            }
            Some(Value::Array(items.cloned().collect()))
        }
        Value::Object(object) => {
            let mut rest = object.clone();
            for (slot, name) in param_slots {
                if let Some(value) = object.get(name) {
                    filled[slot] = Some(encode_segment(value));
                    rest.remove(name);
                }
            }
            Some(Value::Object(rest))
        }
        primitive => {
            if let Some((slot, _)) = param_slots.into_iter().next() {
                filled[slot] = Some(encode_segment(primitive));
            }
            None
        }
    };

    let mut path = String::new();
    for (segment, value) in template.segments().iter().zip(filled) {
        path.push('/');
        match (segment, value) {
            (_, Some(value)) => path.push_str(&value),
            (Segment::Literal(literal), None) => path.push_str(literal),
            (Segment::Param(name), None) => {
                path.push(crate::routing::template::PARAM_MARKER);
                path.push_str(name);
            }
        }
    }

    MergedPath { path, remainder }
}

/// Rebuild the logical argument from the captured path segments and the parsed body.
///
/// `captures` are the raw segments returned by [`RouteTemplate::captures`].
pub fn extract_argument(template: &RouteTemplate, captures: &[&str], body: Value) -> Value {
    let decoded: Vec<Value> = captures.iter().map(|raw| decode_segment(raw)).collect();

    match body {
        Value::Null if decoded.is_empty() => Value::Null,
        Value::Null if decoded.len() == 1 => decoded.into_iter().next().unwrap_or(Value::Null),
        Value::Array(items) => {
            let mut merged = decoded;
            merged.extend(items);
            Value::Array(merged)
        }
        Value::Null => Value::Object(merge_params(template, decoded, Map::new())),
        Value::Object(object) => Value::Object(merge_params(template, decoded, object)),
        primitive => primitive,
    }
}

fn merge_params(template: &RouteTemplate, decoded: Vec<Value>, mut object: Map<String, Value>) -> Map<String, Value> {
    for (name, value) in template.params().zip(decoded) {
        object.insert(name.to_string(), value);
    }
    object
}

fn encode_segment(value: &Value) -> String {
    let text = match value {
        Value::String(s) => s.clone(),
        Value::Number(number) => number_text(number),
        other => other.to_string(),
    };
    utf8_percent_encode(&text, SEGMENT).to_string()
}

/// JSON text of `number`, spelled out in plain decimal when JSON would use an exponent.
fn number_text(number: &Number) -> String {
    let text = number.to_string();
    match number.as_f64() {
        Some(float) if text.contains(|c: char| c == 'e' || c == 'E') => float.to_string(),
        _ => text,
    }
}

/// Decode a raw path segment into a boolean, number or string.
pub fn decode_segment(raw: &str) -> Value {
    let text = percent_decode_str(raw)
        .decode_utf8()
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());

    match text.as_str() {
        "true" => return Value::Bool(true),
        "false" => return Value::Bool(false),
        _ => {}
    }

    if is_numeric(&text) {
        if let Some(number) = parse_number(&text) {
            return Value::Number(number);
        }
    }

    Value::String(text)
}

/// Full match of `-?\d*\.?\d+`.
fn is_numeric(text: &str) -> bool {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let (int_part, frac_part) = match digits.split_once('.') {
        Some((int_part, frac_part)) => (int_part, frac_part),
        None => ("", digits),
    };
    !frac_part.is_empty()
        && int_part.bytes().all(|b| b.is_ascii_digit())
        && frac_part.bytes().all(|b| b.is_ascii_digit())
}

fn parse_number(text: &str) -> Option<Number> {
    if !text.contains('.') {
        if let Ok(int) = text.parse::<i64>() {
            return Some(Number::from(int));
        }
    }
    text.parse::<f64>().ok().and_then(Number::from_f64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn template(pattern: &str) -> RouteTemplate {
        RouteTemplate::parse(pattern).unwrap()
    }

    fn round_trip(pattern: &str, argument: Value) -> Value {
        let template = template(pattern);
        let merged = merge_path(&template, &argument);
        let captures = template.captures(&merged.path).unwrap();
        extract_argument(&template, &captures, merged.remainder.unwrap_or(Value::Null))
    }

    #[test]
    fn test_merge_primitive_fills_first_param() {
        let merged = merge_path(&template("/number/:n"), &json!(42));
        assert_eq!(merged.path, "/number/42");
        assert_eq!(merged.remainder, None);

        let merged = merge_path(&template("/greet/:name"), &json!("John Doe/Jr"));
        assert_eq!(merged.path, "/greet/John%20Doe%2FJr");
    }

    #[test]
    fn test_merge_sequence_consumes_in_order() {
        let merged = merge_path(&template("/max/:num/:num"), &json!([1, 2, 7, 4, 5]));
        assert_eq!(merged.path, "/max/1/2");
        assert_eq!(merged.remainder, Some(json!([7, 4, 5])));
    }

    #[test]
    fn test_merge_keyed_structure_removes_used_keys() {
        let merged = merge_path(&template("/foo/:age"), &json!({"name": "John", "age": 42}));
        assert_eq!(merged.path, "/foo/42");
        assert_eq!(merged.remainder, Some(json!({"name": "John"})));
    }

    #[test]
    fn test_merge_leaves_unfilled_params() {
        let merged = merge_path(&template("/a/:x/:y"), &json!({"x": 1}));
        assert_eq!(merged.path, "/a/1/:y");

        let merged = merge_path(&template("/bar"), &Value::Null);
        assert_eq!(merged.path, "/bar");
        assert_eq!(merged.remainder, None);
    }

    #[test]
    fn test_extract_merges_params_into_body() {
        let t = template("/foo/:age");
        let argument = extract_argument(&t, &["42"], json!({"name": "John"}));
        assert_eq!(argument, json!({"name": "John", "age": 42}));
    }

    #[test]
    fn test_extract_prepends_params_to_sequence() {
        let t = template("/max/:num/:num");
        let argument = extract_argument(&t, &["1", "2"], json!([7, 4, 5]));
        assert_eq!(argument, json!([1, 2, 7, 4, 5]));
    }

    #[test]
    fn test_extract_null_body() {
        assert_eq!(extract_argument(&template("/bar"), &[], Value::Null), Value::Null);
        assert_eq!(
            extract_argument(&template("/number/:n"), &["-3.5"], Value::Null),
            json!(-3.5)
        );
        assert_eq!(
            extract_argument(&template("/pair/:a/:b"), &["x", "true"], Value::Null),
            json!({"a": "x", "b": true})
        );
    }

    #[test]
    fn test_extract_primitive_body_unchanged() {
        let t = template("/echo/:id");
        assert_eq!(extract_argument(&t, &["1"], json!("hello")), json!("hello"));
        assert_eq!(extract_argument(&t, &["1"], json!(false)), json!(false));
    }

    #[test]
    fn test_path_value_overwrites_body_key() {
        let t = template("/foo/:age");
        let argument = extract_argument(&t, &["42"], json!({"name": "John", "age": 1}));
        assert_eq!(argument, json!({"name": "John", "age": 42}));
    }

    #[test]
    fn test_decode_segment() {
        assert_eq!(decode_segment("true"), json!(true));
        assert_eq!(decode_segment("false"), json!(false));
        assert_eq!(decode_segment("42"), json!(42));
        assert_eq!(decode_segment("-7"), json!(-7));
        assert_eq!(decode_segment(".5"), json!(0.5));
        assert_eq!(decode_segment("-0.25"), json!(-0.25));
        assert_eq!(decode_segment("1."), json!("1."));
        assert_eq!(decode_segment("1e3"), json!("1e3"));
        assert_eq!(decode_segment("True"), json!("True"));
        assert_eq!(decode_segment("John%20Doe"), json!("John Doe"));
        assert_eq!(decode_segment("%FF"), json!("%FF"));
    }

    #[test]
    fn test_round_trip_primitive() {
        for argument in [json!(42), json!(-1.5), json!(true), json!("a b/c?")] {
            assert_eq!(round_trip("/number/:n", argument.clone()), argument);
        }
    }

    #[test]
    fn test_round_trip_exponent_numbers() {
        let merged = merge_path(&template("/number/:n"), &json!(1e17));
        assert_eq!(merged.path, "/number/100000000000000000");
        assert_eq!(round_trip("/number/:n", json!(1e17)).as_f64(), Some(1e17));

        let merged = merge_path(&template("/number/:n"), &json!(2.5e-7));
        assert_eq!(merged.path, "/number/0.00000025");
        assert_eq!(round_trip("/number/:n", json!(2.5e-7)), json!(2.5e-7));

        assert_eq!(round_trip("/number/:n", json!(-3e-10)), json!(-3e-10));
    }

    #[test]
    fn test_round_trip_sequence() {
        let argument = json!([1, 2, 7, 4, 5]);
        assert_eq!(round_trip("/max/:num/:num", argument.clone()), argument);
    }

    #[test]
    fn test_round_trip_keyed_structure() {
        let argument = json!({"name": "John", "age": 42, "admin": false});
        assert_eq!(round_trip("/foo/:age", argument.clone()), argument);

        let argument = json!({"user": "ann", "post": 9, "body": "hi"});
        assert_eq!(round_trip("/users/:user/posts/:post", argument.clone()), argument);
    }
}
