//! Request envelope: a payload plus the headers that travel with it.
//!
//! On the client, envelope headers are added to the outbound request. On the
//! server, the incoming request headers are wrapped around the extracted
//! argument before it reaches the bound implementation.

use std::collections::BTreeMap;

use axum::http::HeaderMap;
use serde::{Deserialize, Serialize};

/// A header value: a single string or a list of strings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum HeaderValues {
    One(String),
    Many(Vec<String>),
}

impl HeaderValues {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        let values: &[String] = match self {
            HeaderValues::One(value) => std::slice::from_ref(value),
            HeaderValues::Many(values) => values,
        };
        values.iter().map(String::as_str)
    }

    /// First value, if any.
    pub fn first(&self) -> Option<&str> {
        self.iter().next()
    }
}

impl From<&str> for HeaderValues {
    fn from(value: &str) -> Self {
        HeaderValues::One(value.to_string())
    }
}

impl From<String> for HeaderValues {
    fn from(value: String) -> Self {
        HeaderValues::One(value)
    }
}

impl From<Vec<String>> for HeaderValues {
    fn from(values: Vec<String>) -> Self {
        HeaderValues::Many(values)
    }
}

pub type Headers = BTreeMap<String, HeaderValues>;

/// Convert transport headers into envelope headers.
///
/// Repeated names become [`HeaderValues::Many`]; values that are not visible
/// ASCII are skipped.
pub fn headers_from_map(map: &HeaderMap) -> Headers {
    let mut headers = Headers::new();
    for name in map.keys() {
        let mut values: Vec<String> = map
            .get_all(name)
            .iter()
            .filter_map(|v| v.to_str().ok())
            .map(str::to_string)
            .collect();
        let entry = match values.len() {
            0 => continue,
            1 => HeaderValues::One(values.remove(0)),
            _ => HeaderValues::Many(values),
        };
        headers.insert(name.as_str().to_string(), entry);
    }
    headers
}

/// A call argument together with its headers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequestEnvelope<T> {
    pub payload: T,
    #[serde(default)]
    pub headers: Headers,
}

impl<T> RequestEnvelope<T> {
    pub fn new(payload: T, headers: Headers) -> Self {
        Self { payload, headers }
    }

    /// Merge `headers` into this envelope; the new values win on conflict.
    ///
    /// Wrapping is idempotent in shape: the payload is never nested.
    pub fn wrap(mut self, headers: Headers) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Add or replace a single header.
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<HeaderValues>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    pub fn payload(&self) -> &T {
        &self.payload
    }

    pub fn headers(&self) -> &Headers {
        &self.headers
    }

    /// Case-insensitive header lookup, first value only.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(name)
            .or_else(|| {
                self.headers
                    .iter()
                    .find(|(key, _)| key.eq_ignore_ascii_case(name))
                    .map(|(_, values)| values)
            })
            .and_then(HeaderValues::first)
    }

    pub fn into_parts(self) -> (T, Headers) {
        (self.payload, self.headers)
    }

    pub fn into_payload(self) -> T {
        self.payload
    }

    /// Convert the payload, keeping the headers.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> RequestEnvelope<U> {
        RequestEnvelope {
            payload: f(self.payload),
            headers: self.headers,
        }
    }

    /// Like [`map`](Self::map) for fallible conversions.
    pub fn try_map<U, E>(self, f: impl FnOnce(T) -> Result<U, E>) -> Result<RequestEnvelope<U>, E> {
        Ok(RequestEnvelope {
            payload: f(self.payload)?,
            headers: self.headers,
        })
    }
}

impl<T> From<T> for RequestEnvelope<T> {
    fn from(payload: T) -> Self {
        Self::new(payload, Headers::new())
    }
}
