//! # Response Drawer
//!
//! Turns whatever a handler produced into the canonical [`Outcome`] handed
//! back to the transport.
//!
//! ## Defaults
//!
//! Every [`Reply`] except [`Reply::Full`] is merged over a base draft:
//!
//! - status `201` for `POST`, `200` for everything else
//! - `Content-Type: application/json`
//! - no body
//!
//! ## Finalization
//!
//! Every outcome, successful or not, is stamped on the way out:
//!
//! - `Date` (IMF-fixdate) and `Server` are always set
//! - a structured body is JSON-encoded and `Content-Type` is forced to
//!   `application/json`
//! - a present body gets `Content-Length` in bytes
//! - an absent body (empty, `""` or `null`) drops `Content-Type` and gets no
//!   `Content-Length`
//!
//! ## Failures
//!
//! A handler returning [`HandlerError`] produces `{"error", "stack"}` with the
//! error's status or `500`. A panicking handler is caught and produces a
//! `500`; the panic never reaches the caller of the router.
//!
//! ## Example
//!
//! ```rust
//! use trailhead::response::{Context, HandlerError, Reply};
//! use serde_json::json;
//!
//! fn show(ctx: Context) -> Result<Reply, HandlerError> {
//!     let id = ctx.capture_str(0).unwrap_or_default();
//!     Reply::object(&json!({ "id": id }))
//! }
//! # let _ = show;
//! ```

mod drawer;
mod outcome;
mod reply;
#[cfg(test)]
mod tests;

pub use drawer::{async_handler, AsyncHandler, Context, Handler, HandlerError, HandlerFuture};
pub use outcome::{Body, Headers, Outcome, MAX_INLINE_HEADERS, SERVER};
pub use reply::Reply;

pub(crate) use drawer::go;
pub(crate) use outcome::Draft;
