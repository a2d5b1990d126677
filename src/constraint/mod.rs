//! # Constraints
//!
//! Named predicates a route must satisfy, after its pattern matched and
//! before its method is checked.
//!
//! Two kinds exist:
//!
//! - **Predicates** ([`Predicate`]) carry their own logic. They may be
//!   synchronous ([`predicate`]) or asynchronous ([`async_predicate`]); an
//!   asynchronous predicate can look up sessions or call an auth service.
//! - **Built-ins** are referenced by name plus a JSON argument, e.g.
//!   `payload: true`, and resolved against the router's
//!   [`ConstraintRegistry`] when the route is tried. A name the registry does
//!   not know is a defect and aborts the dispatch with
//!   [`Error::UnknownConstraint`](crate::Error::UnknownConstraint).
//!
//! ## Verdicts
//!
//! | check result                       | effect                                  |
//! |------------------------------------|-----------------------------------------|
//! | `Ok(true)`                         | next constraint                         |
//! | `Ok(false)` / `Err(Failed(_))`     | route skipped, next route tried         |
//! | `Err(Halt(http_error))`            | resolution ends with `http_error`       |
//!
//! ## Example
//!
//! ```rust
//! use trailhead::constraint::{async_predicate, Constraints};
//!
//! let constraints = Constraints::new()
//!     .payload(true)
//!     .assert(|_req, body| body.len() < 4096)
//!     .check("session", async_predicate(|req, _body| async move {
//!         Ok::<bool, trailhead::constraint::ConstraintError>(req.header("cookie").is_some())
//!     }));
//! assert_eq!(constraints.len(), 3);
//! ```

mod chain;

pub(crate) use chain::{run_chain, ChainVerdict};

use futures::future::{self, BoxFuture};
use serde_json::{json, Value};
use std::collections::HashMap;
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;

use crate::error::HttpError;
use crate::request::Request;

/// Name under which `secure` scopes register their authorization check.
pub const AUTH: &str = "auth";
/// Name under which `filter` scopes register their check.
pub const FILTER: &str = "filter";

/// Failure reported by a constraint check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConstraintError {
    /// The route is skipped; resolution moves on to the next candidate
    #[error("constraint failed: {0}")]
    Failed(String),
    /// Resolution stops with this HTTP error
    #[error(transparent)]
    Halt(HttpError),
}

pub type CheckFuture = BoxFuture<'static, Result<bool, ConstraintError>>;

/// A constraint carrying its own logic.
///
/// The request and raw body are shared so asynchronous checks can hold them
/// across await points.
pub trait Predicate: Send + Sync + 'static {
    fn check(&self, request: Arc<Request>, body: Arc<str>) -> CheckFuture;
}

struct SyncFn<F>(F);

impl<F> Predicate for SyncFn<F>
where
    F: Fn(&Request, &str) -> bool + Send + Sync + 'static,
{
    fn check(&self, request: Arc<Request>, body: Arc<str>) -> CheckFuture {
        Box::pin(future::ready(Ok((self.0)(&request, &body))))
    }
}

struct AsyncFn<F>(F);

impl<F, Fut> Predicate for AsyncFn<F>
where
    F: Fn(Arc<Request>, Arc<str>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<bool, ConstraintError>> + Send + 'static,
{
    fn check(&self, request: Arc<Request>, body: Arc<str>) -> CheckFuture {
        Box::pin((self.0)(request, body))
    }
}

/// Wraps a predicate so that any failure halts with `403 NotAuthorized`.
struct Authorize(Arc<dyn Predicate>);

impl Predicate for Authorize {
    fn check(&self, request: Arc<Request>, body: Arc<str>) -> CheckFuture {
        let inner = self.0.check(request, body);
        Box::pin(async move {
            match inner.await {
                Ok(true) => Ok(true),
                Ok(false) => Err(ConstraintError::Halt(HttpError::NotAuthorized(
                    "authorization required".to_string(),
                ))),
                Err(ConstraintError::Failed(reason)) => {
                    Err(ConstraintError::Halt(HttpError::NotAuthorized(reason)))
                }
                Err(halt) => Err(halt),
            }
        })
    }
}

/// Synchronous predicate over the request and raw body.
pub fn predicate<F>(f: F) -> Arc<dyn Predicate>
where
    F: Fn(&Request, &str) -> bool + Send + Sync + 'static,
{
    Arc::new(SyncFn(f))
}

/// Asynchronous predicate; the returned future is awaited before the next
/// constraint of the route is started.
pub fn async_predicate<F, Fut>(f: F) -> Arc<dyn Predicate>
where
    F: Fn(Arc<Request>, Arc<str>) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<bool, ConstraintError>> + Send + 'static,
{
    Arc::new(AsyncFn(f))
}

/// Turn a predicate into an authorization check: a rejection becomes
/// `403 NotAuthorized` instead of skipping the route.
pub fn authorize(inner: Arc<dyn Predicate>) -> Arc<dyn Predicate> {
    Arc::new(Authorize(inner))
}

/// Named constraint resolved through the router's registry.
pub trait Builtin: Send + Sync + 'static {
    fn check(&self, arg: &Value, request: &Request, body: &str) -> bool;
}

impl<F> Builtin for F
where
    F: Fn(&Value, &Request, &str) -> bool + Send + Sync + 'static,
{
    fn check(&self, arg: &Value, request: &Request, body: &str) -> bool {
        self(arg, request, body)
    }
}

/// `payload: bool` - passes when "the body is non-empty" equals the argument.
pub struct Payload;

impl Builtin for Payload {
    fn check(&self, arg: &Value, _request: &Request, body: &str) -> bool {
        arg.as_bool() == Some(!body.is_empty())
    }
}

/// Built-in constraints known to a router.
#[derive(Clone)]
pub struct ConstraintRegistry {
    builtins: HashMap<String, Arc<dyn Builtin>>,
}

impl ConstraintRegistry {
    /// Registry with the standard built-ins (`payload`).
    #[must_use]
    pub fn new() -> Self {
        let mut registry = Self {
            builtins: HashMap::new(),
        };
        registry.register("payload", Payload);
        registry
    }

    /// Registry without any built-ins.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            builtins: HashMap::new(),
        }
    }

    pub fn register(&mut self, name: impl Into<String>, builtin: impl Builtin) {
        self.builtins.insert(name.into(), Arc::new(builtin));
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Arc<dyn Builtin>> {
        self.builtins.get(name)
    }

    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.builtins.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }
}

impl Default for ConstraintRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for ConstraintRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConstraintRegistry")
            .field("builtins", &self.names())
            .finish()
    }
}

#[derive(Clone)]
pub enum Check {
    /// Look up a built-in by the constraint's name and pass it this argument
    Builtin(Value),
    Predicate(Arc<dyn Predicate>),
}

#[derive(Clone)]
pub struct Constraint {
    name: String,
    check: Check,
}

impl Constraint {
    #[must_use]
    pub fn builtin(name: impl Into<String>, arg: Value) -> Self {
        Self {
            name: name.into(),
            check: Check::Builtin(arg),
        }
    }

    #[must_use]
    pub fn predicate(name: impl Into<String>, predicate: Arc<dyn Predicate>) -> Self {
        Self {
            name: name.into(),
            check: Check::Predicate(predicate),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn check(&self) -> &Check {
        &self.check
    }
}

impl fmt::Debug for Constraint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match &self.check {
            Check::Builtin(arg) => format!("builtin({arg})"),
            Check::Predicate(_) => "predicate".to_string(),
        };
        f.debug_struct("Constraint")
            .field("name", &self.name)
            .field("check", &kind)
            .finish()
    }
}

/// Ordered record of named constraints.
///
/// Behaves like a map that remembers insertion order: inserting a name that
/// already exists replaces the entry in place.
#[derive(Clone, Default, Debug)]
pub struct Constraints {
    entries: Vec<Constraint>,
}

impl Constraints {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a non-empty (`true`) or empty (`false`) body.
    #[must_use]
    pub fn payload(self, expected: bool) -> Self {
        self.builtin("payload", json!(expected))
    }

    /// Synchronous assertion over the request and raw body.
    #[must_use]
    pub fn assert<F>(self, f: F) -> Self
    where
        F: Fn(&Request, &str) -> bool + Send + Sync + 'static,
    {
        self.check("assert", predicate(f))
    }

    /// Reference a registry built-in by name.
    #[must_use]
    pub fn builtin(mut self, name: impl Into<String>, arg: Value) -> Self {
        self.insert(Constraint::builtin(name, arg));
        self
    }

    #[must_use]
    pub fn check(mut self, name: impl Into<String>, predicate: Arc<dyn Predicate>) -> Self {
        self.insert(Constraint::predicate(name, predicate));
        self
    }

    pub fn insert(&mut self, constraint: Constraint) {
        match self.entries.iter_mut().find(|c| c.name == constraint.name) {
            Some(slot) => *slot = constraint,
            None => self.entries.push(constraint),
        }
    }

    /// Insert every entry of `other`, in order.
    pub fn extend(&mut self, other: Constraints) {
        for constraint in other.entries {
            self.insert(constraint);
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Constraint> {
        self.entries.iter()
    }

    #[must_use]
    pub fn as_slice(&self) -> &[Constraint] {
        &self.entries
    }
}
