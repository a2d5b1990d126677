//! # CLI Module
//!
//! Command-line access to a route table, mainly for checking how patterns,
//! methods and negotiation behave without writing a transport.
//!
//! Every `--route` rule is bound to [`echo_handler`](crate::echo::echo_handler),
//! so the printed outcome shows the captures and merged parameters the
//! handler would have received.
//!
//! ## Commands
//!
//! ### `dispatch`
//!
//! ```bash
//! trailhead-probe dispatch \
//!     --route 'GET kitchen/(\d+)' \
//!     --route 'POST,PUT kitchen' \
//!     --method POST --url '/kitchen?fries=golden' \
//!     --content-type application/json --body '{"drink":"coke"}'
//! ```
//!
//! Prints the outcome (`status`, `headers`, `body`) as JSON.
//!
//! ### `routes`
//!
//! ```bash
//! trailhead-probe routes --route 'GET kitchen/(\d+)' --config router.yaml
//! ```
//!
//! Prints one `METHODS PATTERN` line per compiled route.
//!
//! ## Usage from Code
//!
//! ```rust
//! use clap::Parser;
//! use trailhead::cli::{execute, Cli};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let cli = Cli::try_parse_from(["trailhead-probe", "routes", "--route", "GET pets"])?;
//! let printed = execute(cli).await?;
//! assert!(printed.starts_with("GET ^pets"));
//! # Ok(())
//! # }
//! ```

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{build_router, execute, parse_rule, run_cli, Cli, Commands, TableArgs};
