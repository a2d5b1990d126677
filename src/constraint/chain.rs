use std::sync::Arc;
use tracing::debug;

use super::{Check, Constraint, ConstraintError, ConstraintRegistry};
use crate::error::Error;
use crate::request::Request;

/// Result of walking one route's constraint chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum ChainVerdict {
    Passed,
    Rejected { name: String, reason: Option<String> },
}

/// Run a route's constraints strictly in order.
///
/// Each check is awaited before the next one is created, so side effects of
/// constraints happen in table order. The first rejection ends the chain.
pub(crate) async fn run_chain(
    constraints: &[Constraint],
    registry: &ConstraintRegistry,
    request: &Arc<Request>,
    body: &Arc<str>,
) -> Result<ChainVerdict, Error> {
    for constraint in constraints {
        let result = match constraint.check() {
            Check::Builtin(arg) => {
                let builtin = registry
                    .get(constraint.name())
                    .ok_or_else(|| Error::UnknownConstraint(constraint.name().to_string()))?;
                Ok(builtin.check(arg, request, body))
            }
            Check::Predicate(predicate) => {
                predicate
                    .check(Arc::clone(request), Arc::clone(body))
                    .await
            }
        };

        match result {
            Ok(true) => {
                debug!(constraint = %constraint.name(), "Constraint passed");
            }
            Ok(false) => {
                return Ok(ChainVerdict::Rejected {
                    name: constraint.name().to_string(),
                    reason: None,
                });
            }
            Err(ConstraintError::Failed(reason)) => {
                return Ok(ChainVerdict::Rejected {
                    name: constraint.name().to_string(),
                    reason: Some(reason),
                });
            }
            Err(ConstraintError::Halt(err)) => {
                debug!(
                    constraint = %constraint.name(),
                    status = err.status(),
                    "Constraint halted resolution"
                );
                return Err(Error::Http(err));
            }
        }
    }
    Ok(ChainVerdict::Passed)
}
