use futures::future::{self, BoxFuture};
use futures::FutureExt;
use http::Method;
use serde_json::Value;
use std::backtrace::{Backtrace, BacktraceStatus};
use std::fmt;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tracing::{error, info};

use super::outcome::Draft;
use super::reply::Reply;
use crate::error::HttpError;
use crate::ids::RequestId;
use crate::request::Request;

/// Per-request context handed to a handler.
///
/// Carries the captured pattern groups, the merged parameters (query string
/// defaults overridden by decoded body fields) and the decoded body.
#[derive(Debug, Clone)]
pub struct Context {
    request: Arc<Request>,
    request_id: RequestId,
    captures: Vec<Value>,
    params: Value,
    body: Option<Value>,
}

impl Context {
    pub(crate) fn new(
        request: Arc<Request>,
        request_id: RequestId,
        captures: Vec<Value>,
        params: Value,
        body: Option<Value>,
    ) -> Self {
        Self {
            request,
            request_id,
            captures,
            params,
            body,
        }
    }

    #[must_use]
    pub fn request(&self) -> &Request {
        &self.request
    }

    #[must_use]
    pub fn method(&self) -> &Method {
        self.request.method()
    }

    #[must_use]
    pub fn request_id(&self) -> RequestId {
        self.request_id
    }

    /// Captured pattern groups in order. Groups that did not participate in
    /// the match are `null`.
    #[must_use]
    pub fn captures(&self) -> &[Value] {
        &self.captures
    }

    #[must_use]
    pub fn capture(&self, index: usize) -> Option<&Value> {
        self.captures.get(index)
    }

    #[must_use]
    pub fn capture_str(&self, index: usize) -> Option<&str> {
        self.capture(index).and_then(Value::as_str)
    }

    /// Merged parameters: an object, or an array when the body was an array.
    #[must_use]
    pub fn params(&self) -> &Value {
        &self.params
    }

    #[must_use]
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    #[must_use]
    pub fn param_str(&self, name: &str) -> Option<&str> {
        self.param(name).and_then(Value::as_str)
    }

    /// The decoded request body, if one was sent.
    #[must_use]
    pub fn body(&self) -> Option<&Value> {
        self.body.as_ref()
    }
}

/// Error returned by a handler. Becomes a `{error, stack}` outcome with the
/// error's status, or 500.
pub struct HandlerError {
    status: Option<u16>,
    message: String,
    backtrace: Backtrace,
}

impl HandlerError {
    #[must_use]
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
            backtrace: Backtrace::capture(),
        }
    }

    #[must_use]
    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    #[must_use]
    pub fn status(&self) -> Option<u16> {
        self.status
    }

    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Backtrace lines; empty unless `RUST_BACKTRACE` enabled capture.
    #[must_use]
    pub fn stack(&self) -> Vec<String> {
        match self.backtrace.status() {
            BacktraceStatus::Captured => self
                .backtrace
                .to_string()
                .lines()
                .map(str::to_string)
                .collect(),
            _ => Vec::new(),
        }
    }
}

impl fmt::Debug for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerError")
            .field("status", &self.status)
            .field("message", &self.message)
            .finish()
    }
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl std::error::Error for HandlerError {}

impl From<HttpError> for HandlerError {
    fn from(err: HttpError) -> Self {
        let status = err.status();
        HandlerError::new(err.to_string()).with_status(status)
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::new(err.to_string())
    }
}

impl From<anyhow::Error> for HandlerError {
    fn from(err: anyhow::Error) -> Self {
        HandlerError::new(format!("{err:#}"))
    }
}

pub type HandlerFuture = BoxFuture<'static, Result<Reply, HandlerError>>;

/// Request handler bound to a route.
///
/// Plain functions and closures `Fn(Context) -> Result<Reply, HandlerError>`
/// implement this directly; wrap async functions with [`async_handler`].
pub trait Handler: Send + Sync + 'static {
    fn call(&self, ctx: Context) -> HandlerFuture;
}

impl<F> Handler for F
where
    F: Fn(Context) -> Result<Reply, HandlerError> + Send + Sync + 'static,
{
    fn call(&self, ctx: Context) -> HandlerFuture {
        Box::pin(future::ready(self(ctx)))
    }
}

pub struct AsyncHandler<F>(F);

impl<F, Fut> Handler for AsyncHandler<F>
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, HandlerError>> + Send + 'static,
{
    fn call(&self, ctx: Context) -> HandlerFuture {
        Box::pin((self.0)(ctx))
    }
}

/// Adapt an async function into a [`Handler`].
pub fn async_handler<F, Fut>(f: F) -> AsyncHandler<F>
where
    F: Fn(Context) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Reply, HandlerError>> + Send + 'static,
{
    AsyncHandler(f)
}

/// Run a handler and shape whatever it produced into a draft outcome.
///
/// Handler errors and panics are converted here; they never reach the
/// caller of the router.
pub(crate) async fn go(handler: Arc<dyn Handler>, ctx: Context) -> Draft {
    let base = Draft::base(ctx.method());
    let request_id = ctx.request_id();

    let result = AssertUnwindSafe(async move { handler.call(ctx).await })
        .catch_unwind()
        .await;

    match result {
        Ok(Ok(reply)) => reply.draw(base),
        Ok(Err(err)) => {
            let status = err.status().unwrap_or(500);
            info!(
                request_id = %request_id,
                status = status,
                error = %err,
                "Handler returned an error"
            );
            Draft::handler_failure(status, err.message(), err.stack())
        }
        Err(panic) => {
            let message = panic_message(panic.as_ref());
            error!(
                request_id = %request_id,
                panic_message = %message,
                "Handler panicked"
            );
            Draft::handler_failure(500, &format!("handler panicked: {message}"), Vec::new())
        }
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
