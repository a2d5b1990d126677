use once_cell::sync::Lazy;
use regex::{Regex, RegexBuilder};

use crate::error::BuildError;

/// Runs of plain or escaped slashes
static SLASHES: Lazy<Regex> = Lazy::new(|| {
    #[allow(clippy::expect_used)]
    Regex::new(r"(?:\\/|/)+").expect("slash squeeze regex is valid")
});

/// One piece of a route pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Matched verbatim; regex metacharacters are escaped
    Literal(String),
    /// Raw regex fragment; capture groups become handler arguments
    Regex { source: String, ignore_case: bool },
}

impl Segment {
    #[must_use]
    pub fn regex(source: impl Into<String>) -> Self {
        Segment::Regex {
            source: source.into(),
            ignore_case: false,
        }
    }

    /// Case-insensitive regex fragment. The flag is inherited by every route
    /// compiled under this segment.
    #[must_use]
    pub fn regex_ci(source: impl Into<String>) -> Self {
        Segment::Regex {
            source: source.into(),
            ignore_case: true,
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        match self {
            Segment::Literal(s) => s.is_empty(),
            Segment::Regex { source, .. } => source.is_empty(),
        }
    }

    fn ignore_case(&self) -> bool {
        matches!(self, Segment::Regex { ignore_case: true, .. })
    }

    fn fragment(&self) -> String {
        match self {
            Segment::Literal(s) => regex::escape(s),
            Segment::Regex { source, .. } => strip_anchors(source).to_string(),
        }
    }
}

impl From<&str> for Segment {
    fn from(s: &str) -> Self {
        Segment::Literal(s.to_string())
    }
}

impl From<String> for Segment {
    fn from(s: String) -> Self {
        Segment::Literal(s)
    }
}

/// Options that affect every compiled pattern of a router.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CompileFlags {
    /// Accept an optional trailing `/` on every route
    pub trailing_slash: bool,
    /// Optional URL suffix fragment, e.g. `json` or `json|xml`
    pub extension: Option<String>,
}

/// Anchored matcher produced by [`compile`].
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    regex: Regex,
    case_insensitive: bool,
}

impl CompiledPattern {
    /// Pattern source as handed to the regex engine
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.regex.as_str()
    }

    #[must_use]
    pub fn case_insensitive(&self) -> bool {
        self.case_insensitive
    }

    #[must_use]
    pub fn is_match(&self, path: &str) -> bool {
        self.regex.is_match(path)
    }

    /// Capture groups 1..n of a match, `None` when the path does not match.
    ///
    /// Groups that did not participate in the match are reported as `None`.
    #[must_use]
    pub fn captures(&self, path: &str) -> Option<Vec<Option<String>>> {
        let caps = self.regex.captures(path)?;
        Some(
            caps.iter()
                .skip(1)
                .map(|group| group.map(|m| m.as_str().to_string()))
                .collect(),
        )
    }
}

/// Build the anchored pattern source and its case-sensitivity flag.
///
/// Pure string transformation; [`compile`] hands the result to the regex
/// engine.
#[must_use]
pub fn pattern_source(segments: &[Segment], flags: &CompileFlags) -> (String, bool) {
    let joined = segments
        .iter()
        .filter(|s| !s.is_empty())
        .map(Segment::fragment)
        .filter(|f| !f.is_empty())
        .collect::<Vec<_>>()
        .join("/");

    let squeezed = SLASHES.replace_all(&joined, "/");
    let body = match squeezed.as_ref() {
        "/" => "/",
        s => s.strip_prefix('/').unwrap_or(s),
    };

    let mut source = String::with_capacity(body.len() + 24);
    source.push('^');
    source.push_str(body);
    if let Some(ext) = flags
        .extension
        .as_deref()
        .map(|e| e.trim_start_matches('.'))
        .filter(|e| !e.is_empty())
    {
        source.push_str(r"(?:\.(?:");
        source.push_str(ext);
        source.push_str("))?");
    }
    source.push_str(if flags.trailing_slash { "/?$" } else { "$" });

    let case_insensitive = segments.iter().any(Segment::ignore_case);
    (source, case_insensitive)
}

/// Compile route segments into one anchored matcher.
///
/// # Errors
///
/// Returns [`BuildError::InvalidPattern`] when a raw fragment is not a valid
/// regular expression.
pub fn compile(segments: &[Segment], flags: &CompileFlags) -> Result<CompiledPattern, BuildError> {
    let (source, case_insensitive) = pattern_source(segments, flags);
    let regex = RegexBuilder::new(&source)
        .case_insensitive(case_insensitive)
        .build()
        .map_err(|source_err| BuildError::InvalidPattern {
            pattern: source.clone(),
            source: source_err,
        })?;
    Ok(CompiledPattern {
        regex,
        case_insensitive,
    })
}

/// Strip one leading `^` and one unescaped trailing `$`.
fn strip_anchors(source: &str) -> &str {
    let source = source.strip_prefix('^').unwrap_or(source);
    match source.strip_suffix('$') {
        Some(rest) => {
            let backslashes = rest.chars().rev().take_while(|c| *c == '\\').count();
            if backslashes % 2 == 0 {
                rest
            } else {
                source
            }
        }
        None => source,
    }
}
