//! # Error Taxonomy
//!
//! Three families of failure flow through the router:
//!
//! - [`HttpError`] - failures that carry an HTTP status and are turned into an
//!   [`Outcome`](crate::response::Outcome) at the dispatcher boundary.
//! - [`Error`] - everything [`Router::route`](crate::Router::route) can return.
//!   HTTP-shaped errors never escape as `Err`; only defects do (for example a
//!   route naming a constraint the registry does not know).
//! - [`BuildError`] - construction-time failures raised while the route table
//!   is being built. These never happen while serving.
//!
//! Handler failures use [`HandlerError`](crate::response::HandlerError) and
//! constraint failures use [`ConstraintError`](crate::constraint::ConstraintError).

use http::Method;
use serde_json::{json, Value};
use thiserror::Error;

use crate::response::Headers;

/// HTTP-shaped failure converted directly into an outcome.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HttpError {
    /// Malformed path or body (400)
    #[error("bad request: {0}")]
    BadRequest(String),
    /// Constraint-level authorization denial (403)
    #[error("not authorized: {0}")]
    NotAuthorized(String),
    /// No route matched pattern, constraints and method (404)
    #[error("not found: {0}")]
    NotFound(String),
    /// Pattern and constraints matched but the method did not (405)
    ///
    /// Carries the allowed methods in the order they were first seen in the
    /// route table.
    #[error("method not allowed (allowed: {})", join_methods(.0))]
    MethodNotAllowed(Vec<Method>),
    /// Content negotiation failed (406); carries the offending `Accept` value
    #[error("cannot generate '{0}' response")]
    NotAcceptable(String),
    /// A route matched but has no handler bound (501)
    #[error("not implemented: {0}")]
    NotImplemented(String),
}

impl HttpError {
    #[must_use]
    pub fn status(&self) -> u16 {
        match self {
            HttpError::BadRequest(_) => 400,
            HttpError::NotAuthorized(_) => 403,
            HttpError::NotFound(_) => 404,
            HttpError::MethodNotAllowed(_) => 405,
            HttpError::NotAcceptable(_) => 406,
            HttpError::NotImplemented(_) => 501,
        }
    }

    /// Headers this error contributes to its outcome.
    ///
    /// Empty for every variant except `MethodNotAllowed`, which sets `Allow`.
    #[must_use]
    pub fn headers(&self) -> Headers {
        let mut headers = Headers::new();
        if let HttpError::MethodNotAllowed(allowed) = self {
            headers.set("Allow", join_methods(allowed));
        }
        headers
    }

    /// JSON body describing the error.
    #[must_use]
    pub fn body(&self) -> Value {
        match self {
            HttpError::BadRequest(msg)
            | HttpError::NotAuthorized(msg)
            | HttpError::NotFound(msg)
            | HttpError::NotImplemented(msg) => json!({ "error": msg }),
            HttpError::MethodNotAllowed(_) => json!({ "error": "method not allowed." }),
            HttpError::NotAcceptable(accept) => json!({
                "error": format!("cannot generate '{accept}' response"),
                "only": "application/json",
            }),
        }
    }
}

/// Comma-joined method list, as used by the `Allow` header.
pub(crate) fn join_methods(methods: &[Method]) -> String {
    methods
        .iter()
        .map(Method::as_str)
        .collect::<Vec<_>>()
        .join(",")
}

/// Error returned by the runtime entry points.
#[derive(Debug, Error)]
pub enum Error {
    /// HTTP-shaped failure
    #[error(transparent)]
    Http(#[from] HttpError),
    /// A route references a built-in constraint that is not registered
    #[error("constraint '{0}' not found")]
    UnknownConstraint(String),
}

impl Error {
    /// Status code when this is an HTTP-shaped error, `None` for defects.
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Http(err) => Some(err.status()),
            Error::UnknownConstraint(_) => None,
        }
    }
}

/// Failure raised while the route table is being constructed.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("invalid route pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("route method set is empty")]
    EmptyMethodSet,
    #[error("cannot understand route: {0} given more than once")]
    DuplicateArgument(&'static str),
    #[error("route requires authorization but no auth predicate is configured")]
    MissingAuth,
}
