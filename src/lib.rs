//! # trailhead
//!
//! **trailhead** is an ordered, pattern-driven request router and dispatcher
//! for JSON HTTP services. It sits behind whatever transport you already
//! have: hand it a method, a URL, headers and a raw body, get back a status,
//! headers and a JSON (or text) body.
//!
//! ## Overview
//!
//! A route table is declared once with the [`Map`] DSL: regex or literal
//! patterns, method sets, nested path scopes, and ordered chains of named
//! constraints (filters, authorization, body presence). Requests are resolved
//! against the table in declaration order; the first route whose pattern,
//! constraints and method all accept the request wins. Its handler returns a
//! [`Reply`] that the response drawer turns into a final [`Outcome`].
//!
//! ## Architecture
//!
//! - **[`pattern`]** - Compiles literal and regex segments into anchored matchers
//! - **[`constraint`]** - Named, possibly asynchronous route constraints and the built-in registry
//! - **[`router`]** - Route table DSL, resolution, and the [`Router`] entry point
//! - **[`dispatcher`]** - Accept negotiation, body decoding, parameter merging
//! - **[`response`]** - Handler contract and the reply-to-outcome drawer
//! - **[`error`]** - HTTP error taxonomy, defects and build errors
//! - **[`config`]** - Router options from YAML or `TRAILHEAD_*` variables
//! - **[`logging`]** - `tracing` subscriber setup
//! - **[`cli`]** - The `trailhead-probe` binary
//!
//! ### Request Handling Flow
//!
//! ```mermaid
//! sequenceDiagram
//!     participant Transport
//!     participant Router
//!     participant Dispatcher
//!     participant Resolver
//!     participant Chain as Constraint Chain
//!     participant Handler
//!     participant Drawer as Response Drawer
//!
//!     Transport->>Router: route(request, body)
//!     Router->>Router: yield, assign request id
//!     Router->>Dispatcher: dispatch
//!     Dispatcher->>Dispatcher: negotiate Accept
//!     alt Not acceptable
//!         Dispatcher-->>Router: 406 draft
//!     end
//!     Dispatcher->>Resolver: resolve(routes)
//!     loop every route in order
//!         Resolver->>Resolver: match pattern
//!         Resolver->>Chain: run constraints
//!         alt Authorization rejected
//!             Chain-->>Dispatcher: 403
//!         end
//!         Resolver->>Resolver: check method (record Allow)
//!     end
//!     alt No route
//!         Resolver-->>Dispatcher: 404 / 405
//!     end
//!     Dispatcher->>Dispatcher: decode body, merge params
//!     Dispatcher->>Handler: call(Context)
//!     Handler-->>Drawer: Reply / HandlerError / panic
//!     Drawer-->>Router: Draft
//!     Router->>Router: finalize (Date, Content-Length)
//!     Router-->>Transport: Outcome
//!     Router->>Router: broadcast Success + Log events
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use trailhead::{Constraints, Context, HandlerError, Reply, Router, Segment};
//! use trailhead::request::Request;
//! use http::Method;
//! use serde_json::json;
//!
//! fn order(ctx: Context) -> Result<Reply, HandlerError> {
//!     let drink = ctx.param_str("drink").unwrap_or("water").to_string();
//!     Ok(Reply::full(201, [("X-Kitchen", "open")], json!({ "drink": drink })))
//! }
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let router = Router::new(|map| {
//!     map.post_with(Segment::regex("orders"), Constraints::new().payload(true))?
//!         .bind(order);
//!     Ok(())
//! })?;
//!
//! let request = Request::new(Method::POST, "/orders?size=large")
//!     .with_header("Content-Type", "application/json");
//! let outcome = router.route(request, r#"{"drink":"coke"}"#).await?;
//! assert_eq!(outcome.status, 201);
//! assert_eq!(outcome.header("x-kitchen"), Some("open"));
//! # Ok(())
//! # }
//! ```
//!
//! ## Runtime Considerations
//!
//! Dispatch is `async` and runtime-agnostic except for
//! [`Router::route_detached`], which spawns onto the ambient tokio runtime.
//! Handlers and constraints may be synchronous closures or futures; a
//! handler panic is caught and answered with `500`, so release builds must
//! keep unwinding enabled.

pub mod cli;
pub mod config;
pub mod constraint;
pub mod dispatcher;
pub mod echo;
pub mod error;
pub mod ids;
pub mod logging;
pub mod pattern;
pub mod request;
pub mod response;
pub mod router;

pub use config::RouterConfig;
pub use constraint::{async_predicate, authorize, predicate, ConstraintError, Constraints};
pub use error::{BuildError, Error, HttpError};
pub use ids::RequestId;
pub use pattern::Segment;
pub use request::Request;
pub use response::{async_handler, Body, Context, Handler, HandlerError, Headers, Outcome, Reply};
pub use router::{LogRecord, Map, Methods, RouteBinder, Router, RouterBuilder, RouterEvent};
