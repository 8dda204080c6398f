//! End-to-end generation: load the source tree, run every pipeline stage,
//! and optionally write the artifacts to disk.
//!
//! The pipeline itself never touches the output directory; [`run_generation`]
//! returns the artifacts as values and [`write_artifacts`] is the one place
//! filesystem writes happen. Resolution failures do not abort a run: routes
//! that resolved cleanly are still emitted, and the diagnostics decide the
//! process exit status in the CLI layer.

use std::path::Path;

use anyhow::Context;
use tracing::{debug, info};

use crate::analyzer;
use crate::config::GeneratorConfig;
use crate::diagnostics::{has_errors, has_warnings, Diagnostic};
use crate::discover::discover;
use crate::emit::strings::StringCache;
use crate::emit::{emit_artifacts, GeneratedFile};
use crate::infer::attach_responses;
use crate::model::load_program;
use crate::resolve::{resolve_routes, ResolvedRoute};

/// Everything one pipeline run produced.
#[derive(Debug)]
pub struct GenerationOutput {
    pub routes: Vec<ResolvedRoute>,
    pub diagnostics: Vec<Diagnostic>,
    pub files: Vec<GeneratedFile>,
}

impl GenerationOutput {
    #[must_use]
    pub fn has_errors(&self) -> bool {
        has_errors(&self.diagnostics)
    }

    #[must_use]
    pub fn has_warnings(&self) -> bool {
        has_warnings(&self.diagnostics)
    }

    /// Whether this run should fail the process under `config`.
    #[must_use]
    pub fn failed(&self, config: &GeneratorConfig) -> bool {
        self.has_errors() || (config.fail_on_warnings && self.has_warnings())
    }
}

/// Run the full pipeline over `config.source` and return routes, diagnostics
/// and artifacts. Nothing is written to disk.
pub fn run_generation(config: &GeneratorConfig) -> anyhow::Result<GenerationOutput> {
    info!(source = %config.source.display(), "loading source tree");
    let program = load_program(&config.source)?;

    let candidates = discover(&program);
    let (mut routes, mut diagnostics) = resolve_routes(&program, &candidates);
    attach_responses(&program, &mut routes, config.max_call_depth);
    diagnostics.extend(analyzer::analyze(&candidates));

    let mut cache = StringCache::new();
    let files = emit_artifacts(&routes, &mut cache);
    info!(
        routes = routes.len(),
        files = files.len(),
        diagnostics = diagnostics.len(),
        "generation complete"
    );
    Ok(GenerationOutput {
        routes,
        diagnostics,
        files,
    })
}

/// Write artifacts into `dir`, creating it as needed.
pub fn write_artifacts(files: &[GeneratedFile], dir: &Path) -> anyhow::Result<()> {
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    for file in files {
        let path = dir.join(&file.name);
        std::fs::write(&path, &file.contents)
            .with_context(|| format!("failed to write artifact {}", path.display()))?;
        debug!(path = %path.display(), "artifact written");
    }
    Ok(())
}

/// Run the pipeline and write the artifacts into the configured module
/// directory.
pub fn generate_to_disk(config: &GeneratorConfig) -> anyhow::Result<GenerationOutput> {
    let output = run_generation(config)?;
    if output.files.is_empty() {
        info!("no routes found, nothing written");
    } else {
        write_artifacts(&output.files, &config.module_dir())?;
    }
    Ok(output)
}
