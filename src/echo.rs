use serde_json::json;

use crate::response::{Context, HandlerError, Reply};

/// Handler that answers with what it was given: method, path, captures,
/// merged params and the decoded body.
pub fn echo_handler(ctx: Context) -> Result<Reply, HandlerError> {
    Reply::object(&json!({
        "request_id": ctx.request_id(),
        "method": ctx.method().as_str(),
        "path": ctx.request().path(),
        "captures": ctx.captures(),
        "params": ctx.params(),
        "body": ctx.body(),
    }))
}
