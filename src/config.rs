//! Generator settings: built-in defaults, an optional `preroute.toml`
//! overlay, and the values a run finally uses.
//!
//! Precedence is defaults, then the config file, then command-line flags.
//! The file is looked up next to the analyzed source tree unless a path is
//! given explicitly; a missing file is not an error.

use std::path::{Path, PathBuf};

use anyhow::Context;
use serde::{Deserialize, Serialize};

/// Config file name probed next to the source tree.
pub const CONFIG_FILE_NAME: &str = "preroute.toml";

/// Default bound on transitive calls the response walker follows.
pub const DEFAULT_MAX_CALL_DEPTH: usize = 16;

/// Effective settings for one generator run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Root of the source tree to analyze.
    pub source: PathBuf,
    /// Directory the generated module directory is created under.
    pub output: PathBuf,
    /// Name of the generated module, also the artifact directory name.
    pub module_name: String,
    /// Bound on transitive calls followed during response inference.
    pub max_call_depth: usize,
    /// Treat warnings as fatal for the process exit status.
    pub fail_on_warnings: bool,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            source: PathBuf::from("src"),
            output: PathBuf::from("src"),
            module_name: "generated".to_string(),
            max_call_depth: DEFAULT_MAX_CALL_DEPTH,
            fail_on_warnings: false,
        }
    }
}

impl GeneratorConfig {
    /// Directory the artifacts land in: `output/module_name`.
    #[must_use]
    pub fn module_dir(&self) -> PathBuf {
        self.output.join(&self.module_name)
    }

    /// Default config file path for this run, next to the source tree.
    #[must_use]
    pub fn default_config_path(&self) -> PathBuf {
        self.source
            .parent()
            .map(|p| p.join(CONFIG_FILE_NAME))
            .unwrap_or_else(|| PathBuf::from(CONFIG_FILE_NAME))
    }

    /// Overlays file values onto this config; unset keys keep their current
    /// value.
    pub fn apply(&mut self, file: ConfigFile) {
        if let Some(source) = file.source {
            self.source = source;
        }
        if let Some(output) = file.output {
            self.output = output;
        }
        if let Some(module_name) = file.module_name {
            self.module_name = module_name;
        }
        if let Some(depth) = file.max_call_depth {
            self.max_call_depth = depth;
        }
        if let Some(fail) = file.fail_on_warnings {
            self.fail_on_warnings = fail;
        }
    }
}

/// Partial settings as written in `preroute.toml`; every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub source: Option<PathBuf>,
    pub output: Option<PathBuf>,
    pub module_name: Option<String>,
    pub max_call_depth: Option<usize>,
    pub fail_on_warnings: Option<bool>,
}

/// Loads a config file if it exists. Returns `Ok(None)` for a missing file;
/// an unreadable or syntactically invalid file is an error.
pub fn load_config_file(path: &Path) -> anyhow::Result<Option<ConfigFile>> {
    if !path.exists() {
        return Ok(None);
    }
    let contents = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let config: ConfigFile = toml::from_str(&contents)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(Some(config))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used)]

    use super::*;

    #[test]
    fn test_defaults() {
        let config = GeneratorConfig::default();
        assert_eq!(config.source, PathBuf::from("src"));
        assert_eq!(config.module_name, "generated");
        assert_eq!(config.max_call_depth, DEFAULT_MAX_CALL_DEPTH);
        assert!(!config.fail_on_warnings);
        assert_eq!(config.module_dir(), PathBuf::from("src/generated"));
    }

    #[test]
    fn test_apply_overlays_only_set_keys() {
        let mut config = GeneratorConfig::default();
        config.apply(ConfigFile {
            module_name: Some("bindings".to_string()),
            max_call_depth: Some(4),
            ..ConfigFile::default()
        });
        assert_eq!(config.module_name, "bindings");
        assert_eq!(config.max_call_depth, 4);
        assert_eq!(config.source, PathBuf::from("src"));
    }

    #[test]
    fn test_missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded = load_config_file(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert!(loaded.is_none());
    }

    #[test]
    fn test_file_parses_partial_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "module_name = \"api\"\nfail_on_warnings = true\n").unwrap();
        let loaded = load_config_file(&path).unwrap().unwrap();
        assert_eq!(loaded.module_name.as_deref(), Some("api"));
        assert_eq!(loaded.fail_on_warnings, Some(true));
        assert!(loaded.source.is_none());
    }

    #[test]
    fn test_invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE_NAME);
        std::fs::write(&path, "module_name = [not toml").unwrap();
        let result = load_config_file(&path);
        assert!(result.is_err());
    }
}
