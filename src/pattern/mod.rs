//! # Pattern Compiler
//!
//! Turns the path segments accumulated by the route table builder into one
//! anchored regular expression.
//!
//! A route pattern is the concatenation of every enclosing `path(...)` prefix
//! plus the route's own pattern. Each piece is a [`Segment`]: either a literal
//! string, escaped so that `.` or `?` match themselves, or a raw regex
//! fragment whose capture groups become handler arguments.
//!
//! ## Algorithm
//!
//! 1. Escape literals, strip one outer `^`/`$` pair from raw fragments
//! 2. Join the non-empty fragments with `/`
//! 3. Collapse runs of `/` (or `\/`) into a single `/`
//! 4. Strip the leading slash unless the whole pattern is `/`
//! 5. Append the optional extension fragment (e.g. `(?:\.(?:json))?`)
//! 6. Anchor with `^` and `$`, or `/?$` when a trailing slash is tolerated
//!
//! Request paths are matched with their leading slash removed, so the
//! compiled form of `/pets/{id}`-style routes never starts with a slash.
//!
//! ## Example
//!
//! ```rust
//! use trailhead::pattern::{compile, CompileFlags, Segment};
//!
//! let segments = [Segment::from("kitchen"), Segment::regex(r"(\d+)")];
//! let pattern = compile(&segments, &CompileFlags::default()).unwrap();
//!
//! assert_eq!(pattern.as_str(), r"^kitchen/(\d+)$");
//! assert_eq!(pattern.captures("kitchen/42"), Some(vec![Some("42".to_string())]));
//! ```

mod compile;
#[cfg(test)]
mod tests;

pub use compile::{compile, pattern_source, CompileFlags, CompiledPattern, Segment};
