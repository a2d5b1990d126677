use http::Method;
use smallvec::SmallVec;
use std::fmt;
use std::sync::Arc;

use crate::constraint::Constraints;
use crate::pattern::{CompiledPattern, Segment};
use crate::response::Handler;

/// Maximum inline methods per route before heap allocation
pub const MAX_INLINE_METHODS: usize = 4;

pub type MethodVec = SmallVec<[Method; MAX_INLINE_METHODS]>;

/// The methods a route answers to.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Methods {
    /// Every method
    #[default]
    Any,
    /// Only the listed methods, in declaration order
    Only(MethodVec),
}

impl Methods {
    #[must_use]
    pub fn one(method: Method) -> Self {
        let mut set = MethodVec::new();
        set.push(method);
        Methods::Only(set)
    }

    #[must_use]
    pub fn of(methods: impl IntoIterator<Item = Method>) -> Self {
        let mut set = MethodVec::new();
        for method in methods {
            if !set.contains(&method) {
                set.push(method);
            }
        }
        Methods::Only(set)
    }

    #[inline]
    #[must_use]
    pub fn allows(&self, method: &Method) -> bool {
        match self {
            Methods::Any => true,
            Methods::Only(set) => set.contains(method),
        }
    }

    /// Listed methods; empty for [`Methods::Any`].
    #[must_use]
    pub fn as_slice(&self) -> &[Method] {
        match self {
            Methods::Any => &[],
            Methods::Only(set) => set,
        }
    }

    fn is_empty_set(&self) -> bool {
        matches!(self, Methods::Only(set) if set.is_empty())
    }
}

impl fmt::Display for Methods {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Methods::Any => f.write_str("*"),
            Methods::Only(set) => f.write_str(&crate::error::join_methods(set)),
        }
    }
}

/// One argument to [`Map::route`](super::Map::route).
///
/// Each kind may be given at most once per route.
#[derive(Debug, Clone)]
pub enum RouteArg {
    Methods(Methods),
    Pattern(Segment),
    Constraints(Constraints),
}

impl RouteArg {
    pub(crate) fn kind(&self) -> &'static str {
        match self {
            RouteArg::Methods(_) => "method",
            RouteArg::Pattern(_) => "pattern",
            RouteArg::Constraints(_) => "constraints",
        }
    }
}

impl From<Method> for RouteArg {
    fn from(method: Method) -> Self {
        RouteArg::Methods(Methods::one(method))
    }
}

impl From<Methods> for RouteArg {
    fn from(methods: Methods) -> Self {
        RouteArg::Methods(methods)
    }
}

impl<const N: usize> From<[Method; N]> for RouteArg {
    fn from(methods: [Method; N]) -> Self {
        RouteArg::Methods(Methods::of(methods))
    }
}

impl From<Vec<Method>> for RouteArg {
    fn from(methods: Vec<Method>) -> Self {
        RouteArg::Methods(Methods::of(methods))
    }
}

impl From<Segment> for RouteArg {
    fn from(segment: Segment) -> Self {
        RouteArg::Pattern(segment)
    }
}

impl From<&str> for RouteArg {
    fn from(literal: &str) -> Self {
        RouteArg::Pattern(Segment::from(literal))
    }
}

impl From<String> for RouteArg {
    fn from(literal: String) -> Self {
        RouteArg::Pattern(Segment::from(literal))
    }
}

impl From<Constraints> for RouteArg {
    fn from(constraints: Constraints) -> Self {
        RouteArg::Constraints(constraints)
    }
}

/// Arguments accepted by [`Map::route`](super::Map::route): a single
/// argument or a tuple of up to three, in any order.
pub trait IntoRouteArgs {
    fn into_route_args(self) -> Vec<RouteArg>;
}

macro_rules! single_route_arg {
    ($($ty:ty),* $(,)?) => {
        $(
            impl IntoRouteArgs for $ty {
                fn into_route_args(self) -> Vec<RouteArg> {
                    vec![self.into()]
                }
            }
        )*
    };
}

single_route_arg!(
    RouteArg,
    Method,
    Methods,
    Vec<Method>,
    Segment,
    &str,
    String,
    Constraints
);

impl<const N: usize> IntoRouteArgs for [Method; N] {
    fn into_route_args(self) -> Vec<RouteArg> {
        vec![self.into()]
    }
}

impl IntoRouteArgs for () {
    fn into_route_args(self) -> Vec<RouteArg> {
        Vec::new()
    }
}

impl<A: Into<RouteArg>> IntoRouteArgs for (A,) {
    fn into_route_args(self) -> Vec<RouteArg> {
        vec![self.0.into()]
    }
}

impl<A: Into<RouteArg>, B: Into<RouteArg>> IntoRouteArgs for (A, B) {
    fn into_route_args(self) -> Vec<RouteArg> {
        vec![self.0.into(), self.1.into()]
    }
}

impl<A: Into<RouteArg>, B: Into<RouteArg>, C: Into<RouteArg>> IntoRouteArgs for (A, B, C) {
    fn into_route_args(self) -> Vec<RouteArg> {
        vec![self.0.into(), self.1.into(), self.2.into()]
    }
}

/// Parsed route arguments; every kind at most once.
#[derive(Debug, Default)]
pub(crate) struct RouteSpec {
    pub methods: Option<Methods>,
    pub pattern: Option<Segment>,
    pub constraints: Option<Constraints>,
}

impl RouteSpec {
    pub fn parse(args: Vec<RouteArg>) -> Result<Self, crate::error::BuildError> {
        use crate::error::BuildError;

        let mut spec = RouteSpec::default();
        for arg in args {
            let kind = arg.kind();
            let taken = match arg {
                RouteArg::Methods(methods) => {
                    if methods.is_empty_set() {
                        return Err(BuildError::EmptyMethodSet);
                    }
                    spec.methods.replace(methods).is_some()
                }
                RouteArg::Pattern(pattern) => spec.pattern.replace(pattern).is_some(),
                RouteArg::Constraints(constraints) => {
                    spec.constraints.replace(constraints).is_some()
                }
            };
            if taken {
                return Err(BuildError::DuplicateArgument(kind));
            }
        }
        Ok(spec)
    }
}

/// One entry of the route table.
#[derive(Clone)]
pub struct Route {
    pub(crate) pattern: CompiledPattern,
    pub(crate) methods: Methods,
    pub(crate) constraints: Constraints,
    pub(crate) handler: Option<Arc<dyn Handler>>,
}

impl Route {
    #[must_use]
    pub fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    #[must_use]
    pub fn methods(&self) -> &Methods {
        &self.methods
    }

    #[must_use]
    pub fn constraints(&self) -> &Constraints {
        &self.constraints
    }

    #[must_use]
    pub fn is_bound(&self) -> bool {
        self.handler.is_some()
    }
}

impl fmt::Debug for Route {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Route")
            .field("pattern", &self.pattern.as_str())
            .field("methods", &self.methods)
            .field("constraints", &self.constraints)
            .field("bound", &self.is_bound())
            .finish()
    }
}
