use serde_json::{Map, Number, Value};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::RouterConfig;
use crate::constraint::ConstraintRegistry;
use crate::error::{Error, HttpError};
use crate::ids::RequestId;
use crate::request::{parse_form, Request};
use crate::response::{self, Context, Draft};
use crate::router::{resolve, Route};

/// Media type every route speaks
pub const JSON: &str = "application/json";

/// Split an `Accept` header into tokens on `,` or `;` followed by optional
/// spaces. Quality parameters become tokens of their own and never match.
fn accept_tokens(accept: &str) -> impl Iterator<Item = &str> {
    accept
        .split([',', ';'])
        .map(|token| token.trim_start_matches(' '))
}

/// Check the `Accept` header against what the router can produce.
///
/// Strict mode requires an explicit `application/json` token. Otherwise only
/// a present, non-empty header listing neither `application/json` nor `*/*`
/// is refused.
///
/// # Errors
///
/// `NotAcceptable` carrying the header as received.
pub fn negotiate(accept: Option<&str>, strict: bool) -> Result<(), HttpError> {
    let refuse = || HttpError::NotAcceptable(accept.unwrap_or_default().to_string());

    match accept.filter(|a| !a.is_empty()) {
        None if strict => Err(refuse()),
        None => Ok(()),
        Some(header) => {
            let acceptable = accept_tokens(header)
                .any(|token| token == JSON || (!strict && token == "*/*"));
            if acceptable {
                Ok(())
            } else {
                Err(refuse())
            }
        }
    }
}

/// Decode a raw request body according to its `Content-Type`.
///
/// Returns `None` for an empty body. `application/json` (with any
/// parameters) goes through `serde_json`; anything else is treated as a
/// form.
///
/// # Errors
///
/// `BadRequest("malformed data")` when a JSON body does not parse.
pub fn decode_body(raw: &str, content_type: Option<&str>) -> Result<Option<Value>, HttpError> {
    if raw.is_empty() {
        return Ok(None);
    }
    let is_json = content_type
        .is_some_and(|ct| ct.trim_start().to_ascii_lowercase().starts_with(JSON));

    if is_json {
        serde_json::from_str(raw)
            .map(Some)
            .map_err(|_| HttpError::BadRequest("malformed data".to_string()))
    } else {
        Ok(Some(Value::Object(parse_form(raw))))
    }
}

/// Merge query parameters with a decoded body.
///
/// Query values are defaults that object fields override. An array body
/// replaces the parameters entirely; scalar bodies leave them untouched.
#[must_use]
pub fn merge_params(query: Map<String, Value>, body: Option<&Value>) -> Value {
    match body {
        Some(Value::Object(fields)) => {
            let mut params = query;
            for (key, value) in fields {
                params.insert(key.clone(), value.clone());
            }
            Value::Object(params)
        }
        Some(Value::Array(items)) => Value::Array(items.clone()),
        _ => Value::Object(query),
    }
}

/// Turn raw captures into handler arguments.
///
/// Non-participating groups become `null`. With `numeric` set, captures made
/// only of ASCII digits become integers when they fit in a `u64`.
#[must_use]
pub fn captures_to_values(raw: Vec<Option<String>>, numeric: bool) -> Vec<Value> {
    raw.into_iter()
        .map(|capture| match capture {
            None => Value::Null,
            Some(s) if numeric && !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit()) => s
                .parse::<u64>()
                .map(|n| Value::Number(Number::from(n)))
                .unwrap_or(Value::String(s)),
            Some(s) => Value::String(s),
        })
        .collect()
}

/// Borrowed view of everything one dispatch needs from the router.
pub(crate) struct Dispatcher<'a> {
    pub routes: &'a [Route],
    pub registry: &'a ConstraintRegistry,
    pub config: &'a RouterConfig,
}

impl Dispatcher<'_> {
    /// Run one request through negotiation, resolution, decoding and the
    /// handler.
    ///
    /// HTTP-shaped failures come back as drafts; only defects are `Err`.
    pub async fn dispatch(
        &self,
        request: Arc<Request>,
        body: Arc<str>,
        request_id: RequestId,
    ) -> Result<Draft, Error> {
        match self.run(request, body, request_id).await {
            Ok(draft) => Ok(draft),
            Err(Error::Http(err)) => {
                debug!(
                    request_id = %request_id,
                    status = err.status(),
                    error = %err,
                    "Request failed"
                );
                Ok(Draft::from_error(&err))
            }
            Err(defect) => {
                warn!(request_id = %request_id, error = %defect, "Dispatch aborted");
                Err(defect)
            }
        }
    }

    async fn run(
        &self,
        request: Arc<Request>,
        body: Arc<str>,
        request_id: RequestId,
    ) -> Result<Draft, Error> {
        negotiate(request.header("accept"), self.config.strict)?;

        let matched = resolve(self.routes, self.registry, &request, &body).await?;

        let decoded = decode_body(&body, request.header("content-type"))?;
        let params = merge_params(request.query_params(), decoded.as_ref());
        let captures =
            captures_to_values(matched.captures, self.config.coerce_numeric_captures);

        info!(
            request_id = %request_id,
            method = %request.method(),
            path = %request.path(),
            route = matched.index,
            "Dispatching to handler"
        );

        let ctx = Context::new(request, request_id, captures, params, decoded);
        Ok(response::go(matched.handler, ctx).await)
    }
}
