//! # CLI Module
//!
//! Command-line interface for the preroute generator.
//!
//! ## Commands
//!
//! ### `generate`
//!
//! Analyze an annotated source tree and write the generated route module:
//!
//! ```bash
//! preroute generate --source src --output src --module generated
//! ```
//!
//! Options:
//! - `--source <DIR>` - Root of the source tree to analyze (default: `src`)
//! - `--output <DIR>` - Directory the module directory is created under
//! - `--module <NAME>` - Name of the generated module (default: `generated`)
//! - `--max-depth <N>` - Bound for transitive response inference
//! - `--fail-on-warnings` - Exit nonzero when warnings are reported
//! - `--config <FILE>` - Explicit `preroute.toml` path
//!
//! ### `check`
//!
//! Run the full analysis and print diagnostics without writing artifacts:
//!
//! ```bash
//! preroute check --source src
//! ```
//!
//! Settings resolve in three layers: built-in defaults, then `preroute.toml`
//! (probed next to the source tree unless `--config` names a file), then
//! command-line flags.

mod commands;

#[cfg(test)]
mod tests;

pub use commands::{run_cli, Cli, Commands};
