//! # Router Configuration
//!
//! Options that shape how a [`Router`](crate::Router) compiles its table and
//! treats incoming requests.
//!
//! | option                    | default | effect                                              |
//! |---------------------------|---------|-----------------------------------------------------|
//! | `strict`                  | `false` | require `Accept: application/json`                  |
//! | `strict_urls`             | `false` | when off, every route tolerates a trailing `/`      |
//! | `extension`               | none    | optional URL suffix such as `json` (`/pets.json`)   |
//! | `coerce_numeric_captures` | `false` | all-digit captures reach handlers as integers       |
//! | `event_capacity`          | `256`   | buffer size of the router event channel             |
//!
//! ## Sources
//!
//! Configuration can be built in code, parsed from YAML, or read from the
//! environment:
//!
//! ```bash
//! export TRAILHEAD_STRICT=true
//! export TRAILHEAD_STRICT_URLS=false
//! export TRAILHEAD_EXTENSION=json
//! export TRAILHEAD_COERCE_CAPTURES=1
//! ```
//!
//! ```rust
//! use trailhead::config::RouterConfig;
//!
//! let config = RouterConfig::from_yaml_str("strict: true\nextension: json\n").unwrap();
//! assert!(config.strict);
//! assert_eq!(config.extension.as_deref(), Some("json"));
//! assert!(!config.strict_urls);
//! ```

use anyhow::Context as _;
use serde::{Deserialize, Serialize};
use std::env;
use std::path::Path;

use crate::pattern::CompileFlags;

/// Default buffer size of the router event channel
pub const DEFAULT_EVENT_CAPACITY: usize = 256;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RouterConfig {
    /// Require `application/json` in `Accept`
    pub strict: bool,
    /// Disable trailing-slash tolerance
    pub strict_urls: bool,
    /// Optional URL extension alternation, without the dot
    pub extension: Option<String>,
    /// Turn all-digit captures into integers
    pub coerce_numeric_captures: bool,
    /// Capacity of the broadcast channel behind `Router::subscribe`
    pub event_capacity: usize,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            strict: false,
            strict_urls: false,
            extension: None,
            coerce_numeric_captures: false,
            event_capacity: DEFAULT_EVENT_CAPACITY,
        }
    }
}

impl RouterConfig {
    /// Parse a YAML document.
    ///
    /// # Errors
    ///
    /// Fails on malformed YAML or unknown keys.
    pub fn from_yaml_str(yaml: &str) -> anyhow::Result<Self> {
        serde_yaml::from_str(yaml).context("invalid router configuration")
    }

    /// Load a YAML configuration file.
    ///
    /// # Errors
    ///
    /// Fails when the file cannot be read or does not parse.
    pub fn load(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        Self::from_yaml_str(&raw).with_context(|| format!("in {}", path.display()))
    }

    /// Load configuration from `TRAILHEAD_*` environment variables.
    ///
    /// Unset or unparsable variables keep their defaults.
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Like [`from_env`](Self::from_env) with a custom variable source.
    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();
        let flag = |key: &str, default: bool| {
            lookup(key)
                .and_then(|v| parse_bool(&v))
                .unwrap_or(default)
        };

        Self {
            strict: flag("TRAILHEAD_STRICT", defaults.strict),
            strict_urls: flag("TRAILHEAD_STRICT_URLS", defaults.strict_urls),
            extension: lookup("TRAILHEAD_EXTENSION")
                .map(|v| v.trim().trim_start_matches('.').to_string())
                .filter(|v| !v.is_empty()),
            coerce_numeric_captures: flag(
                "TRAILHEAD_COERCE_CAPTURES",
                defaults.coerce_numeric_captures,
            ),
            event_capacity: lookup("TRAILHEAD_EVENT_CAPACITY")
                .and_then(|v| v.trim().parse().ok())
                .filter(|n| *n > 0)
                .unwrap_or(defaults.event_capacity),
        }
    }

    /// Flags handed to the pattern compiler for every route.
    #[must_use]
    pub fn compile_flags(&self) -> CompileFlags {
        CompileFlags {
            trailing_slash: !self.strict_urls,
            extension: self.extension.clone(),
        }
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
