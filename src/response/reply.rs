use serde::Serialize;
use serde_json::{json, Map, Value};

use super::drawer::HandlerError;
use super::outcome::{Body, Draft, Headers};

/// What a handler sends back.
///
/// Every shape except [`Reply::Full`] is merged over the request's defaults
/// (201 for POST, 200 otherwise; `Content-Type: application/json`; no body).
#[derive(Debug, Clone, PartialEq)]
pub enum Reply {
    /// The defaults, unchanged
    Default,
    /// Body `{"journey": text}`
    Text(String),
    /// Override the status only
    Status(u16),
    /// JSON object body
    Object(Map<String, Value>),
    /// Used verbatim; defaults are bypassed
    Full {
        status: u16,
        headers: Headers,
        body: Body,
    },
    /// Any body over the defaults
    Body(Body),
    /// Status and header map over the defaults, no body
    Headers { status: u16, headers: Headers },
    /// `callback(<json>)` served as `text/javascript` with status 200
    Jsonp { callback: String, value: Value },
}

impl Reply {
    #[must_use]
    pub fn full(status: u16, headers: impl Into<Headers>, body: impl Into<Body>) -> Self {
        Reply::Full {
            status,
            headers: headers.into(),
            body: body.into(),
        }
    }

    #[must_use]
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    #[must_use]
    pub fn body(body: impl Into<Body>) -> Self {
        Reply::Body(body.into())
    }

    #[must_use]
    pub fn headers(status: u16, headers: impl Into<Headers>) -> Self {
        Reply::Headers {
            status,
            headers: headers.into(),
        }
    }

    #[must_use]
    pub fn jsonp(callback: impl Into<String>, value: Value) -> Self {
        Reply::Jsonp {
            callback: callback.into(),
            value,
        }
    }

    /// Serialize `value` into an object reply.
    ///
    /// # Errors
    ///
    /// Fails with "wrong response type" when `value` does not serialize to a
    /// JSON object.
    pub fn object<T: Serialize>(value: &T) -> Result<Self, HandlerError> {
        match serde_json::to_value(value)? {
            Value::Object(map) => Ok(Reply::Object(map)),
            _ => Err(HandlerError::new("wrong response type")),
        }
    }

    /// Merge this reply over `base`.
    pub(crate) fn draw(self, base: Draft) -> Draft {
        match self {
            Reply::Default => base,
            Reply::Text(text) => Draft {
                body: Body::Json(json!({ "journey": text })),
                ..base
            },
            Reply::Status(status) => Draft { status, ..base },
            Reply::Object(map) => Draft {
                body: Body::Json(Value::Object(map)),
                ..base
            },
            Reply::Full {
                status,
                headers,
                body,
            } => Draft {
                status,
                headers,
                body,
            },
            Reply::Body(body) => Draft { body, ..base },
            Reply::Headers { status, headers } => Draft {
                status,
                headers,
                ..base
            },
            Reply::Jsonp { callback, value } => Draft {
                status: 200,
                headers: Headers::from([("Content-Type", "text/javascript")]),
                body: Body::Text(format!("{callback}({value})")),
            },
        }
    }
}

impl From<()> for Reply {
    fn from(_: ()) -> Self {
        Reply::Default
    }
}

impl From<&str> for Reply {
    fn from(text: &str) -> Self {
        Reply::Text(text.to_string())
    }
}

impl From<String> for Reply {
    fn from(text: String) -> Self {
        Reply::Text(text)
    }
}

impl From<u16> for Reply {
    fn from(status: u16) -> Self {
        Reply::Status(status)
    }
}

impl From<Map<String, Value>> for Reply {
    fn from(map: Map<String, Value>) -> Self {
        Reply::Object(map)
    }
}

impl From<(u16, Headers, Body)> for Reply {
    fn from((status, headers, body): (u16, Headers, Body)) -> Self {
        Reply::Full {
            status,
            headers,
            body,
        }
    }
}
