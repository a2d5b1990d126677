use http::Method;
use std::sync::Arc;
use tracing::debug;

use super::route::Route;
use crate::constraint::{run_chain, ChainVerdict, ConstraintRegistry};
use crate::error::{Error, HttpError};
use crate::request::Request;
use crate::response::Handler;

/// Result of successfully resolving a request against the route table.
pub(crate) struct RouteMatch {
    pub index: usize,
    pub handler: Arc<dyn Handler>,
    /// Capture groups 1..n; `None` for groups that did not participate
    pub captures: Vec<Option<String>>,
}

/// Methods seen on routes whose pattern and constraints matched but whose
/// method did not. First-seen order, no duplicates.
#[derive(Debug, Default)]
struct Allowed(Vec<Method>);

impl Allowed {
    fn add(&mut self, methods: &[Method]) {
        for method in methods {
            if !self.0.contains(method) {
                self.0.push(method.clone());
            }
        }
    }
}

/// The path as routes see it: the leading `/` is stripped unless the path
/// is the root.
fn match_target(path: &str) -> &str {
    if path.len() > 1 {
        path.strip_prefix('/').unwrap_or(path)
    } else {
        path
    }
}

/// Walk the table in order and return the first route whose pattern,
/// constraint chain and method all accept the request.
///
/// # Errors
///
/// - `BadRequest` for an empty path
/// - whatever `HttpError` a halting constraint raised
/// - `NotImplemented` when the winning route has no handler
/// - `MethodNotAllowed` when only methods failed, `NotFound` otherwise
/// - [`Error::UnknownConstraint`] when a route names an unregistered built-in
pub(crate) async fn resolve(
    routes: &[Route],
    registry: &ConstraintRegistry,
    request: &Arc<Request>,
    body: &Arc<str>,
) -> Result<RouteMatch, Error> {
    let path = request.path();
    if path.is_empty() {
        return Err(HttpError::BadRequest("malformed path".to_string()).into());
    }
    let target = match_target(path);
    let mut allowed = Allowed::default();

    for (index, route) in routes.iter().enumerate() {
        // Pattern first so non-matching routes never run their constraints
        let Some(captures) = route.pattern.captures(target) else {
            continue;
        };

        match run_chain(route.constraints.as_slice(), registry, request, body).await? {
            ChainVerdict::Passed => {}
            ChainVerdict::Rejected { name, reason } => {
                debug!(
                    route = index,
                    constraint = %name,
                    reason = reason.as_deref().unwrap_or(""),
                    "Route skipped by constraint"
                );
                continue;
            }
        }

        if !route.methods.allows(request.method()) {
            allowed.add(route.methods.as_slice());
            continue;
        }

        let Some(handler) = route.handler.as_ref() else {
            return Err(HttpError::NotImplemented("unbound route".to_string()).into());
        };

        debug!(
            route = index,
            pattern = %route.pattern.as_str(),
            method = %request.method(),
            "Route matched"
        );
        return Ok(RouteMatch {
            index,
            handler: Arc::clone(handler),
            captures,
        });
    }

    if allowed.0.is_empty() {
        debug!(method = %request.method(), path = %path, "No route found");
        Err(HttpError::NotFound("request not found".to_string()).into())
    } else {
        debug!(
            method = %request.method(),
            path = %path,
            allowed = %crate::error::join_methods(&allowed.0),
            "Method not allowed"
        );
        Err(HttpError::MethodNotAllowed(allowed.0).into())
    }
}

#[cfg(test)]
mod tests {
    use super::match_target;

    #[test]
    fn test_match_target() {
        assert_eq!(match_target("/"), "/");
        assert_eq!(match_target("/kitchen"), "kitchen");
        assert_eq!(match_target("//kitchen"), "/kitchen");
    }
}
