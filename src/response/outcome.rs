use http::Method;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::{json, Value};
use smallvec::SmallVec;
use time::macros::format_description;
use time::OffsetDateTime;

use crate::error::HttpError;

/// Value of the `Server` header stamped on every outcome
pub const SERVER: &str = concat!("trailhead/", env!("CARGO_PKG_VERSION"));

/// Maximum inline headers before heap allocation
pub const MAX_INLINE_HEADERS: usize = 8;

/// Ordered header map with case-insensitive names.
///
/// Most outcomes carry fewer than eight headers (`Date`, `Server`,
/// `Content-Type`, `Content-Length` plus a few from the handler), so storage
/// is inline.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers(SmallVec<[(String, String); MAX_INLINE_HEADERS]>);

impl Headers {
    #[must_use]
    pub fn new() -> Self {
        Self(SmallVec::new())
    }

    /// Get a header by name (case-insensitive)
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or replace a header. A replaced header keeps its position and the
    /// name spelling it was first set with.
    pub fn set(&mut self, name: &str, value: impl Into<String>) {
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(name)) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name.to_string(), value)),
        }
    }

    pub fn remove(&mut self, name: &str) -> Option<String> {
        let idx = self.0.iter().position(|(k, _)| k.eq_ignore_ascii_case(name))?;
        Some(self.0.remove(idx).1)
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}

impl<K: AsRef<str>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        for (k, v) in iter {
            headers.set(k.as_ref(), v);
        }
        headers
    }
}

impl<K: AsRef<str>, V: Into<String>, const N: usize> From<[(K, V); N]> for Headers {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (k, v) in &self.0 {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

/// Response body before encoding.
#[derive(Debug, Clone, Default, PartialEq)]
pub enum Body {
    #[default]
    Empty,
    /// Sent as-is
    Text(String),
    /// JSON-encoded on the way out
    Json(Value),
}

impl Body {
    /// Empty bodies, empty strings and `null` all count as "no body".
    #[must_use]
    pub fn is_absent(&self) -> bool {
        match self {
            Body::Empty => true,
            Body::Text(s) => s.is_empty(),
            Body::Json(Value::Null) => true,
            Body::Json(Value::String(s)) => s.is_empty(),
            Body::Json(_) => false,
        }
    }
}

impl From<&str> for Body {
    fn from(s: &str) -> Self {
        Body::Text(s.to_string())
    }
}

impl From<String> for Body {
    fn from(s: String) -> Self {
        Body::Text(s)
    }
}

impl From<Value> for Body {
    fn from(v: Value) -> Self {
        Body::Json(v)
    }
}

impl From<()> for Body {
    fn from(_: ()) -> Self {
        Body::Empty
    }
}

/// Outcome under construction: status, headers and an unencoded body.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct Draft {
    pub status: u16,
    pub headers: Headers,
    pub body: Body,
}

impl Draft {
    /// Defaults every reply shape is merged over: 201 for POST, 200
    /// otherwise, JSON content type, no body.
    pub fn base(method: &Method) -> Self {
        let mut headers = Headers::new();
        headers.set("Content-Type", "application/json");
        Self {
            status: if *method == Method::POST { 201 } else { 200 },
            headers,
            body: Body::Empty,
        }
    }

    pub fn from_error(err: &HttpError) -> Self {
        Self {
            status: err.status(),
            headers: err.headers(),
            body: Body::Json(err.body()),
        }
    }

    pub fn handler_failure(status: u16, message: &str, stack: Vec<String>) -> Self {
        Self {
            status,
            headers: Headers::new(),
            body: Body::Json(json!({ "error": message, "stack": stack })),
        }
    }

    /// Stamp `Date` and `Server`, encode the body and set
    /// `Content-Type`/`Content-Length` accordingly.
    pub fn finalize(self, now: OffsetDateTime) -> Outcome {
        let Draft {
            status,
            mut headers,
            body,
        } = self;

        headers.set("Date", http_date(now));
        headers.set("Server", SERVER);

        let body = if body.is_absent() {
            headers.remove("Content-Type");
            String::new()
        } else {
            let encoded = match body {
                Body::Text(text) => text,
                Body::Json(value) => {
                    headers.set("Content-Type", "application/json");
                    value.to_string()
                }
                Body::Empty => String::new(),
            };
            headers.set("Content-Length", encoded.len().to_string());
            encoded
        };

        Outcome {
            status,
            headers,
            body,
        }
    }
}

/// Canonical result handed back to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    pub status: u16,
    pub headers: Headers,
    /// Encoded body; empty when the outcome has no body
    pub body: String,
}

impl Outcome {
    /// Decode the body as JSON, `None` for empty or non-JSON bodies.
    #[must_use]
    pub fn json(&self) -> Option<Value> {
        if self.body.is_empty() {
            return None;
        }
        serde_json::from_str(&self.body).ok()
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name)
    }
}

/// IMF-fixdate, e.g. `Sun, 06 Nov 1994 08:49:37 GMT`
pub(crate) fn http_date(now: OffsetDateTime) -> String {
    let format = format_description!(
        "[weekday repr:short], [day] [month repr:short] [year] [hour]:[minute]:[second] GMT"
    );
    now.to_offset(time::UtcOffset::UTC)
        .format(format)
        .unwrap_or_default()
}
