//! # Router Module
//!
//! The router owns the route table and runs every request through it.
//!
//! ## Overview
//!
//! A [`Router`] is built once from a closure over the [`Map`] DSL and is
//! read-only afterwards. Each route is a compiled pattern, a method set, an
//! ordered chain of named constraints and (once bound) a handler. Route order
//! is priority order.
//!
//! ## Resolution
//!
//! For every route, in table order:
//!
//! 1. **Pattern**: tested against the path with its leading `/` stripped
//!    (unless the path is `/`). Non-matching routes never run constraints.
//! 2. **Constraints**: awaited one after another. A rejection moves on to the
//!    next route; an authorization failure ends resolution with `403`.
//! 3. **Method**: a mismatch records the route's methods for the `Allow`
//!    header of a possible `405` and moves on.
//!
//! The first route passing all three wins. A winning route without a handler
//! answers `501`. When the table is exhausted the answer is `405` if any
//! method was recorded, `404` otherwise.
//!
//! ## Example
//!
//! ```rust
//! use trailhead::{Context, HandlerError, Reply, Router};
//! use trailhead::request::Request;
//! use http::Method;
//!
//! fn hello(_ctx: Context) -> Result<Reply, HandlerError> {
//!     Ok(Reply::text("Hello"))
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let router = Router::new(|map| {
//!     map.root()?.bind(hello);
//!     map.path("kitchen", |map| {
//!         map.get(trailhead::Segment::regex(r"(\d+)"))?.bind(hello);
//!         Ok(())
//!     })
//! })?;
//!
//! let outcome = router.route(Request::new(Method::GET, "/kitchen/42"), "").await?;
//! assert_eq!(outcome.status, 200);
//! assert_eq!(outcome.body, r#"{"journey":"Hello"}"#);
//! # Ok(())
//! # }
//! ```
//!
//! ## Events
//!
//! Each completed dispatch is broadcast to [`Router::subscribe`] receivers as
//! [`RouterEvent::Success`] followed by [`RouterEvent::Log`]. Sending never
//! blocks; lagging receivers lose the oldest events.

mod builder;
mod resolve;
mod route;

pub use builder::{Map, RouteBinder};
pub use route::{IntoRouteArgs, MethodVec, Methods, Route, RouteArg, MAX_INLINE_METHODS};

pub(crate) use resolve::resolve;

use serde::Serialize;
use std::sync::Arc;
use std::time::{Duration, Instant};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{info, warn};

use crate::config::RouterConfig;
use crate::constraint::{Builtin, ConstraintRegistry};
use crate::dispatcher::Dispatcher;
use crate::error::{BuildError, Error};
use crate::ids::{RequestId, REQUEST_ID_HEADER};
use crate::request::Request;
use crate::response::Outcome;

/// Dispatches slower than this are logged at `warn`
const SLOW_DISPATCH: Duration = Duration::from_millis(100);

/// Access-log style summary of one dispatch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogRecord {
    /// RFC 3339 completion time
    pub timestamp: String,
    pub request_id: RequestId,
    pub method: String,
    pub url: String,
    pub status: u16,
}

/// Broadcast after every completed dispatch.
#[derive(Debug, Clone)]
pub enum RouterEvent {
    Success(Outcome),
    Log(LogRecord),
}

/// Configures and builds a [`Router`].
#[derive(Debug, Default)]
pub struct RouterBuilder {
    config: RouterConfig,
    registry: ConstraintRegistry,
}

impl RouterBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole configuration.
    #[must_use]
    pub fn config(mut self, config: RouterConfig) -> Self {
        self.config = config;
        self
    }

    /// Require `Accept: application/json`.
    #[must_use]
    pub fn strict(mut self, strict: bool) -> Self {
        self.config.strict = strict;
        self
    }

    /// Disable trailing-slash tolerance.
    #[must_use]
    pub fn strict_urls(mut self, strict_urls: bool) -> Self {
        self.config.strict_urls = strict_urls;
        self
    }

    /// Accept an optional URL extension such as `json` on every route.
    #[must_use]
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.config.extension = Some(extension.into());
        self
    }

    #[must_use]
    pub fn coerce_numeric_captures(mut self, coerce: bool) -> Self {
        self.config.coerce_numeric_captures = coerce;
        self
    }

    /// Register a named built-in constraint.
    #[must_use]
    pub fn constraint(mut self, name: impl Into<String>, builtin: impl Builtin) -> Self {
        self.registry.register(name, builtin);
        self
    }

    /// Run `routes` once over a fresh [`Map`] and freeze the result.
    ///
    /// # Errors
    ///
    /// The first [`BuildError`] raised while the table was being built.
    pub fn build<F>(self, routes: F) -> Result<Router, BuildError>
    where
        F: FnOnce(&mut Map) -> Result<(), BuildError>,
    {
        let mut map = Map::new(self.config.compile_flags());
        routes(&mut map)?;
        let routes = map.into_routes();

        let summary: Vec<String> = routes.iter().take(10).map(describe).collect();
        info!(
            routes_count = routes.len(),
            unbound = routes.iter().filter(|r| !r.is_bound()).count(),
            strict = self.config.strict,
            routes_summary = ?summary,
            "Routing table loaded"
        );

        let (events, _) = broadcast::channel(self.config.event_capacity.max(1));
        Ok(Router {
            routes,
            registry: self.registry,
            config: self.config,
            events,
        })
    }
}

fn describe(route: &Route) -> String {
    format!("{} {}", route.methods(), route.pattern().as_str())
}

/// Ordered route table plus everything needed to serve it.
pub struct Router {
    routes: Vec<Route>,
    registry: ConstraintRegistry,
    config: RouterConfig,
    events: broadcast::Sender<RouterEvent>,
}

impl Router {
    #[must_use]
    pub fn builder() -> RouterBuilder {
        RouterBuilder::new()
    }

    /// Build a router with the default configuration.
    ///
    /// # Errors
    ///
    /// The first [`BuildError`] raised while the table was being built.
    pub fn new<F>(routes: F) -> Result<Self, BuildError>
    where
        F: FnOnce(&mut Map) -> Result<(), BuildError>,
    {
        RouterBuilder::new().build(routes)
    }

    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    #[must_use]
    pub fn config(&self) -> &RouterConfig {
        &self.config
    }

    /// One `METHODS PATTERN` line per route, in priority order.
    #[must_use]
    pub fn route_summary(&self) -> Vec<String> {
        self.routes.iter().map(describe).collect()
    }

    /// Receive an event for every dispatch completed from now on.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<RouterEvent> {
        self.events.subscribe()
    }

    /// Dispatch one request.
    ///
    /// Yields to the scheduler before doing any work. Every HTTP-shaped
    /// failure (404, 405, 406, handler errors, panics, ...) is an `Ok`
    /// outcome.
    ///
    /// # Errors
    ///
    /// Only defects, such as a route naming a built-in constraint that was
    /// never registered.
    pub async fn route(
        &self,
        request: Request,
        body: impl Into<Arc<str>>,
    ) -> Result<Outcome, Error> {
        let body: Arc<str> = body.into();
        tokio::task::yield_now().await;

        let started = Instant::now();
        let request_id = RequestId::from_header_or_new(request.header(REQUEST_ID_HEADER));
        let request = Arc::new(request);

        let dispatcher = Dispatcher {
            routes: &self.routes,
            registry: &self.registry,
            config: &self.config,
        };
        let draft = dispatcher
            .dispatch(Arc::clone(&request), body, request_id)
            .await?;

        let now = OffsetDateTime::now_utc();
        let outcome = draft.finalize(now);

        let elapsed = started.elapsed();
        if elapsed > SLOW_DISPATCH {
            warn!(
                request_id = %request_id,
                method = %request.method(),
                url = %request.url(),
                status = outcome.status,
                duration_ms = elapsed.as_millis(),
                "Slow dispatch detected"
            );
        } else {
            info!(
                request_id = %request_id,
                method = %request.method(),
                url = %request.url(),
                status = outcome.status,
                duration_us = elapsed.as_micros(),
                "Dispatch complete"
            );
        }

        self.publish(&request, request_id, &outcome, now);
        Ok(outcome)
    }

    /// Dispatch one request and hand the outcome to `callback`.
    ///
    /// # Errors
    ///
    /// Defects, as for [`route`](Self::route); the callback is not invoked.
    pub async fn route_with<F>(
        &self,
        request: Request,
        body: impl Into<Arc<str>>,
        callback: F,
    ) -> Result<(), Error>
    where
        F: FnOnce(Outcome),
    {
        let outcome = self.route(request, body).await?;
        callback(outcome);
        Ok(())
    }

    /// Spawn the dispatch onto the runtime and return its pending handle.
    pub fn route_detached(
        self: &Arc<Self>,
        request: Request,
        body: String,
    ) -> JoinHandle<Result<Outcome, Error>> {
        let router = Arc::clone(self);
        tokio::spawn(async move { router.route(request, body).await })
    }

    fn publish(
        &self,
        request: &Request,
        request_id: RequestId,
        outcome: &Outcome,
        now: OffsetDateTime,
    ) {
        if self.events.receiver_count() == 0 {
            return;
        }
        let record = LogRecord {
            timestamp: now.format(&Rfc3339).unwrap_or_default(),
            request_id,
            method: request.method().to_string(),
            url: request.url().to_string(),
            status: outcome.status,
        };
        // Receivers may have dropped since the check
        self.events
            .send(RouterEvent::Success(outcome.clone()))
            .unwrap_or(0);
        self.events.send(RouterEvent::Log(record)).unwrap_or(0);
    }
}

impl std::fmt::Debug for Router {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Router")
            .field("routes", &self.routes)
            .field("registry", &self.registry)
            .field("config", &self.config)
            .finish()
    }
}
