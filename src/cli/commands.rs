use anyhow::{bail, Context as _, Result};
use clap::{Args, Parser, Subcommand};
use http::Method;
use std::path::PathBuf;

use crate::config::RouterConfig;
use crate::echo::echo_handler;
use crate::logging::{init_logging, LogConfig};
use crate::pattern::Segment;
use crate::request::Request;
use crate::router::{Methods, Router};

/// Command-line interface for trailhead
///
/// Builds a route table of echo handlers from `--route` rules and runs
/// requests through it.
#[derive(Debug, Parser)]
#[command(name = "trailhead-probe")]
#[command(about = "Probe a trailhead route table from the command line", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Route table shared by every command
#[derive(Debug, Clone, Args)]
pub struct TableArgs {
    /// Route rule `METHODS PATTERN`, e.g. `GET kitchen/(\d+)` or `* (.*)`.
    /// METHODS is `*` or a comma-separated list; PATTERN is a regex.
    #[arg(short, long = "route", value_name = "RULE")]
    pub routes: Vec<String>,

    /// YAML router configuration; defaults to `TRAILHEAD_*` variables
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Require `Accept: application/json`
    #[arg(long, default_value_t = false)]
    pub strict: bool,
}

/// Available commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Dispatch one request and print the outcome as JSON
    Dispatch {
        #[command(flatten)]
        table: TableArgs,

        /// Request method
        #[arg(short, long, default_value = "GET")]
        method: String,

        /// Request target, path plus optional query string
        #[arg(short, long)]
        url: String,

        /// `Accept` header
        #[arg(long)]
        accept: Option<String>,

        /// `Content-Type` header
        #[arg(long)]
        content_type: Option<String>,

        /// Extra header `Name: value` (repeatable)
        #[arg(short = 'H', long = "header", value_name = "HEADER")]
        headers: Vec<String>,

        /// Raw request body
        #[arg(short, long, default_value = "")]
        body: String,
    },
    /// Print the compiled route table in priority order
    Routes {
        #[command(flatten)]
        table: TableArgs,
    },
}

/// Parse a `METHODS PATTERN` rule.
pub fn parse_rule(rule: &str) -> Result<(Methods, String)> {
    let rule = rule.trim();
    let (methods, pattern) = rule
        .split_once(char::is_whitespace)
        .map(|(m, p)| (m, p.trim()))
        .unwrap_or((rule, ""));

    if methods == "*" {
        return Ok((Methods::Any, pattern.to_string()));
    }
    let parsed = methods
        .split(',')
        .filter(|m| !m.is_empty())
        .map(|m| {
            Method::from_bytes(m.to_ascii_uppercase().as_bytes())
                .with_context(|| format!("invalid method '{m}' in rule '{rule}'"))
        })
        .collect::<Result<Vec<_>>>()?;
    if parsed.is_empty() {
        bail!("rule '{rule}' names no method");
    }
    Ok((Methods::of(parsed), pattern.to_string()))
}

fn parse_header(header: &str) -> Result<(&str, &str)> {
    header
        .split_once(':')
        .map(|(name, value)| (name.trim(), value.trim()))
        .filter(|(name, _)| !name.is_empty())
        .with_context(|| format!("header '{header}' is not `Name: value`"))
}

/// Build a router binding every rule to the echo handler.
pub fn build_router(table: &TableArgs) -> Result<Router> {
    let mut config = match &table.config {
        Some(path) => RouterConfig::load(path)?,
        None => RouterConfig::from_env(),
    };
    config.strict |= table.strict;

    let rules = table
        .routes
        .iter()
        .map(|rule| parse_rule(rule))
        .collect::<Result<Vec<_>>>()?;

    let router = Router::builder().config(config).build(|map| {
        for (methods, pattern) in rules {
            map.route((methods, Segment::regex(pattern)))?
                .bind(echo_handler);
        }
        Ok(())
    })?;
    Ok(router)
}

/// Run a parsed command and return what it would print.
pub async fn execute(cli: Cli) -> Result<String> {
    match cli.command {
        Commands::Routes { table } => {
            let router = build_router(&table)?;
            Ok(router.route_summary().join("\n"))
        }
        Commands::Dispatch {
            table,
            method,
            url,
            accept,
            content_type,
            headers,
            body,
        } => {
            let router = build_router(&table)?;
            let method = Method::from_bytes(method.to_ascii_uppercase().as_bytes())
                .with_context(|| format!("invalid method '{method}'"))?;

            let mut request = Request::new(method, url);
            if let Some(accept) = accept {
                request.insert_header("accept", accept);
            }
            if let Some(content_type) = content_type {
                request.insert_header("content-type", content_type);
            }
            for header in &headers {
                let (name, value) = parse_header(header)?;
                request.insert_header(name, value);
            }

            let outcome = router.route(request, body).await?;
            serde_json::to_string_pretty(&outcome).context("failed to encode outcome")
        }
    }
}

/// Entry point of the `trailhead-probe` binary.
pub fn run_cli() -> Result<()> {
    let cli = Cli::parse();
    init_logging(&LogConfig::from_env())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start runtime")?;
    let output = runtime.block_on(execute(cli))?;
    println!("{output}");
    Ok(())
}
