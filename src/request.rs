//! Inbound request as delivered by the transport.
//!
//! The transport owns sockets and HTTP parsing; the router only needs the
//! method, the request target, the headers and the fully-buffered body.
//! Header names are stored lowercased so lookups are case-insensitive
//! (RFC 7230).

use http::Method;
use serde_json::{Map, Value};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    method: Method,
    url: String,
    path: String,
    query: Option<String>,
    headers: HashMap<String, String>,
}

impl Request {
    /// Create a request from a method and a request target such as
    /// `/kitchen?fries=golden`.
    #[must_use]
    pub fn new(method: Method, url: impl Into<String>) -> Self {
        let url = url.into();
        let target = url.split('#').next().unwrap_or_default();
        let (path, query) = match target.split_once('?') {
            Some((path, query)) => (path.to_string(), Some(query.to_string())),
            None => (target.to_string(), None),
        };
        Self {
            method,
            url,
            path,
            query,
            headers: HashMap::new(),
        }
    }

    /// Builder-style header setter; the name is lowercased.
    #[must_use]
    pub fn with_header(mut self, name: &str, value: impl Into<String>) -> Self {
        self.insert_header(name, value);
        self
    }

    pub fn insert_header(&mut self, name: &str, value: impl Into<String>) {
        self.headers.insert(name.to_ascii_lowercase(), value.into());
    }

    #[inline]
    #[must_use]
    pub fn method(&self) -> &Method {
        &self.method
    }

    /// The request target exactly as received.
    #[inline]
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Path component of the target, without query or fragment.
    #[inline]
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    #[must_use]
    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    /// Get a header by name (case-insensitive)
    #[inline]
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(String::as_str)
    }

    #[must_use]
    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Query string decoded into a JSON object.
    ///
    /// Repeated keys collapse into an array in order of appearance.
    #[must_use]
    pub fn query_params(&self) -> Map<String, Value> {
        self.query.as_deref().map(parse_form).unwrap_or_default()
    }
}

/// Decode an `application/x-www-form-urlencoded` string into a JSON object.
///
/// Values are always strings; a key seen more than once becomes an array.
#[must_use]
pub fn parse_form(input: &str) -> Map<String, Value> {
    let mut params = Map::new();
    for (key, value) in url::form_urlencoded::parse(input.as_bytes()) {
        let value = Value::String(value.into_owned());
        match params.get_mut(key.as_ref()) {
            Some(Value::Array(items)) => items.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                params.insert(key.into_owned(), value);
            }
        }
    }
    params
}
