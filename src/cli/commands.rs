use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::{load_config_file, GeneratorConfig};
use crate::diagnostics::print_diagnostics;
use crate::generate::{generate_to_disk, run_generation};

/// Command-line interface for the preroute generator.
#[derive(Parser)]
#[command(name = "preroute")]
#[command(about = "Route binding and dispatch code generation", long_about = None)]
pub struct Cli {
    /// The subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate the route module from an annotated source tree
    Generate {
        /// Root of the source tree to analyze
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Directory the generated module directory is created under
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Name of the generated module
        #[arg(long)]
        module: Option<String>,

        /// Bound on transitive calls followed during response inference
        #[arg(long, env = "PREROUTE_MAX_DEPTH")]
        max_depth: Option<usize>,

        /// Exit nonzero when warnings are reported
        #[arg(long, default_value_t = false)]
        fail_on_warnings: bool,

        /// Explicit config file path (default: preroute.toml next to the source tree)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run the full analysis and print diagnostics without writing artifacts
    Check {
        /// Root of the source tree to analyze
        #[arg(short, long)]
        source: Option<PathBuf>,

        /// Bound on transitive calls followed during response inference
        #[arg(long, env = "PREROUTE_MAX_DEPTH")]
        max_depth: Option<usize>,

        /// Exit nonzero when warnings are reported
        #[arg(long, default_value_t = false)]
        fail_on_warnings: bool,

        /// Explicit config file path (default: preroute.toml next to the source tree)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

pub fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();
    match &cli.command {
        Commands::Generate {
            source,
            output,
            module,
            max_depth,
            fail_on_warnings,
            config,
        } => {
            let config = effective_config(
                source,
                output,
                module,
                max_depth,
                *fail_on_warnings,
                config,
            )?;
            let outcome = generate_to_disk(&config)?;
            print_diagnostics(&outcome.diagnostics);
            println!(
                "Generated {} file(s) for {} route(s) into {}",
                outcome.files.len(),
                outcome.routes.len(),
                config.module_dir().display()
            );
            if outcome.failed(&config) {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::Check {
            source,
            max_depth,
            fail_on_warnings,
            config,
        } => {
            let config =
                effective_config(source, &None, &None, max_depth, *fail_on_warnings, config)?;
            let outcome = run_generation(&config)?;
            print_diagnostics(&outcome.diagnostics);
            println!("{} route(s) resolved", outcome.routes.len());
            if outcome.failed(&config) {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

/// Defaults, then the config file, then flags.
pub(crate) fn effective_config(
    source: &Option<PathBuf>,
    output: &Option<PathBuf>,
    module: &Option<String>,
    max_depth: &Option<usize>,
    fail_on_warnings: bool,
    config_path: &Option<PathBuf>,
) -> anyhow::Result<GeneratorConfig> {
    let mut config = GeneratorConfig::default();
    // The source flag decides where the default config file is probed.
    if let Some(s) = source {
        config.source = s.clone();
    }
    let probe = config_path
        .clone()
        .unwrap_or_else(|| config.default_config_path());
    match load_config_file(&probe)? {
        Some(file) => {
            info!(path = %probe.display(), "config file loaded");
            config.apply(file);
        }
        None if config_path.is_some() => {
            anyhow::bail!("config file not found: {}", probe.display());
        }
        None => {}
    }
    if let Some(s) = source {
        config.source = s.clone();
    }
    if let Some(o) = output {
        config.output = o.clone();
    }
    if let Some(m) = module {
        config.module_name = m.clone();
    }
    if let Some(d) = max_depth {
        config.max_call_depth = *d;
    }
    if fail_on_warnings {
        config.fail_on_warnings = true;
    }
    Ok(config)
}
