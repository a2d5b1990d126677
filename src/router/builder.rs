use http::Method;
use std::sync::Arc;
use tracing::debug;

use super::route::{IntoRouteArgs, Methods, Route, RouteSpec};
use crate::constraint::{authorize, Constraint, Constraints, Predicate, AUTH, FILTER};
use crate::error::BuildError;
use crate::pattern::{compile, CompileFlags, Segment};
use crate::response::Handler;

/// Route table construction DSL.
///
/// Only reachable from the closure passed to
/// [`RouterBuilder::build`](super::RouterBuilder::build); once that closure
/// returns the table is frozen.
pub struct Map {
    routes: Vec<Route>,
    flags: CompileFlags,
    prefixes: Vec<Segment>,
    inherited: Constraints,
    filter_depth: usize,
    auth: Option<Arc<dyn Predicate>>,
}

impl Map {
    pub(crate) fn new(flags: CompileFlags) -> Self {
        Self {
            routes: Vec::new(),
            flags,
            prefixes: Vec::new(),
            inherited: Constraints::new(),
            filter_depth: 0,
            auth: None,
        }
    }

    pub(crate) fn into_routes(self) -> Vec<Route> {
        self.routes
    }

    /// Append one route.
    ///
    /// `args` is a method, method set, pattern or [`Constraints`] record, or a
    /// tuple of up to three of them in any order. Without a pattern the route
    /// matches everything (or exactly the enclosing `path` prefix); without a
    /// method it answers to every method.
    ///
    /// # Errors
    ///
    /// Fails when an argument kind is repeated, the method set is empty or the
    /// pattern does not compile.
    pub fn route(&mut self, args: impl IntoRouteArgs) -> Result<RouteBinder<'_>, BuildError> {
        let spec = RouteSpec::parse(args.into_route_args())?;

        let own = spec.pattern.unwrap_or_else(|| {
            if self.prefixes.is_empty() {
                Segment::regex(".*")
            } else {
                Segment::Literal(String::new())
            }
        });
        let mut segments = self.prefixes.clone();
        segments.push(own);
        let pattern = compile(&segments, &self.flags)?;

        let mut constraints = self.inherited.clone();
        if let Some(record) = spec.constraints {
            constraints.extend(record);
        }

        let methods = spec.methods.unwrap_or_default();
        debug!(
            pattern = %pattern.as_str(),
            methods = %methods,
            constraints = constraints.len(),
            "Route registered"
        );

        self.routes.push(Route {
            pattern,
            methods,
            constraints,
            handler: None,
        });
        let auth = self.auth.clone();
        let index = self.routes.len() - 1;
        Ok(RouteBinder {
            route: &mut self.routes[index],
            auth,
        })
    }

    fn verb(
        &mut self,
        method: Method,
        pattern: impl Into<Segment>,
        constraints: Option<Constraints>,
    ) -> Result<RouteBinder<'_>, BuildError> {
        match constraints {
            Some(record) => self.route((method, pattern.into(), record)),
            None => self.route((method, pattern.into())),
        }
    }

    pub fn get(&mut self, pattern: impl Into<Segment>) -> Result<RouteBinder<'_>, BuildError> {
        self.verb(Method::GET, pattern, None)
    }

    pub fn put(&mut self, pattern: impl Into<Segment>) -> Result<RouteBinder<'_>, BuildError> {
        self.verb(Method::PUT, pattern, None)
    }

    pub fn post(&mut self, pattern: impl Into<Segment>) -> Result<RouteBinder<'_>, BuildError> {
        self.verb(Method::POST, pattern, None)
    }

    pub fn del(&mut self, pattern: impl Into<Segment>) -> Result<RouteBinder<'_>, BuildError> {
        self.verb(Method::DELETE, pattern, None)
    }

    /// `GET` route with a constraint record.
    pub fn get_with(
        &mut self,
        pattern: impl Into<Segment>,
        constraints: Constraints,
    ) -> Result<RouteBinder<'_>, BuildError> {
        self.verb(Method::GET, pattern, Some(constraints))
    }

    pub fn put_with(
        &mut self,
        pattern: impl Into<Segment>,
        constraints: Constraints,
    ) -> Result<RouteBinder<'_>, BuildError> {
        self.verb(Method::PUT, pattern, Some(constraints))
    }

    pub fn post_with(
        &mut self,
        pattern: impl Into<Segment>,
        constraints: Constraints,
    ) -> Result<RouteBinder<'_>, BuildError> {
        self.verb(Method::POST, pattern, Some(constraints))
    }

    pub fn del_with(
        &mut self,
        pattern: impl Into<Segment>,
        constraints: Constraints,
    ) -> Result<RouteBinder<'_>, BuildError> {
        self.verb(Method::DELETE, pattern, Some(constraints))
    }

    /// `GET /`
    pub fn root(&mut self) -> Result<RouteBinder<'_>, BuildError> {
        self.get("/")
    }

    /// Every method, every path; the captured remainder is the first argument.
    pub fn any(&mut self) -> Result<RouteBinder<'_>, BuildError> {
        self.route(Segment::regex("(.*)"))
    }

    /// Register the routes of `f` under `prefix`.
    pub fn path<F>(&mut self, prefix: impl Into<Segment>, f: F) -> Result<(), BuildError>
    where
        F: FnOnce(&mut Self) -> Result<(), BuildError>,
    {
        self.prefixes.push(prefix.into());
        let result = f(self);
        self.prefixes.pop();
        result
    }

    /// Register the routes of `f` with an extra predicate; a route whose
    /// predicate fails is skipped.
    pub fn filter<F>(&mut self, predicate: Arc<dyn Predicate>, f: F) -> Result<(), BuildError>
    where
        F: FnOnce(&mut Self) -> Result<(), BuildError>,
    {
        self.filter_depth += 1;
        let name = match self.filter_depth {
            1 => FILTER.to_string(),
            depth => format!("{FILTER}#{depth}"),
        };
        let result = self.scoped(Constraint::predicate(name, predicate), f);
        self.filter_depth -= 1;
        result
    }

    /// Register the routes of `f` behind an authorization check; a failing
    /// check answers `403`.
    pub fn secure<F>(&mut self, predicate: Arc<dyn Predicate>, f: F) -> Result<(), BuildError>
    where
        F: FnOnce(&mut Self) -> Result<(), BuildError>,
    {
        self.scoped(Constraint::predicate(AUTH, authorize(predicate)), f)
    }

    /// [`secure`](Self::secure) with the predicate set by [`auth`](Self::auth).
    ///
    /// # Errors
    ///
    /// [`BuildError::MissingAuth`] when no default predicate was set.
    pub fn secure_default<F>(&mut self, f: F) -> Result<(), BuildError>
    where
        F: FnOnce(&mut Self) -> Result<(), BuildError>,
    {
        let predicate = self.auth.clone().ok_or(BuildError::MissingAuth)?;
        self.secure(predicate, f)
    }

    /// Default authorization predicate for `secure_default` and
    /// [`RouteBinder::secured`].
    pub fn auth(&mut self, predicate: Arc<dyn Predicate>) {
        self.auth = Some(predicate);
    }

    fn scoped<F>(&mut self, constraint: Constraint, f: F) -> Result<(), BuildError>
    where
        F: FnOnce(&mut Self) -> Result<(), BuildError>,
    {
        let saved = self.inherited.clone();
        self.inherited.insert(constraint);
        let result = f(self);
        self.inherited = saved;
        result
    }
}

/// Handle on the route just appended.
pub struct RouteBinder<'a> {
    route: &'a mut Route,
    auth: Option<Arc<dyn Predicate>>,
}

impl<'a> RouteBinder<'a> {
    /// Attach the handler.
    pub fn bind(self, handler: impl Handler) -> &'a Route {
        self.route.handler = Some(Arc::new(handler));
        self.route
    }

    /// Attach an already shared handler.
    pub fn bind_arc(self, handler: Arc<dyn Handler>) -> &'a Route {
        self.route.handler = Some(handler);
        self.route
    }

    /// Add (or replace) a named constraint on this route only.
    pub fn ensure(self, name: impl Into<String>, predicate: Arc<dyn Predicate>) -> Self {
        self.route
            .constraints
            .insert(Constraint::predicate(name, predicate));
        self
    }

    /// Guard this route with the map's default authorization predicate.
    ///
    /// # Errors
    ///
    /// [`BuildError::MissingAuth`] when no default predicate was set.
    pub fn secured(self) -> Result<Self, BuildError> {
        let predicate = self.auth.clone().ok_or(BuildError::MissingAuth)?;
        Ok(self.ensure(AUTH, authorize(predicate)))
    }

    #[must_use]
    pub fn methods(&self) -> &Methods {
        &self.route.methods
    }
}
