use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use kreactor_util::errors::{KreactorError, KreactorResult};

/// Global user configuration loaded from `~/.kreactor/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub resolution: ResolutionConfig,

    #[serde(default)]
    pub repository: RepositoryConfig,
}

/// What to do when the artifact resolution service fails for a module.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Abort the whole run with the service's error.
    #[default]
    Fail,
    /// Keep the unresolved frontier as-is and continue with the next module.
    Degrade,
}

/// Resolution settings from `[resolution]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionConfig {
    #[serde(default, rename = "failure-policy")]
    pub failure_policy: FailurePolicy,
    /// Dependency types treated as library archives. Others are skipped.
    #[serde(default = "default_library_types", rename = "library-types")]
    pub library_types: Vec<String>,
    /// Factor dependencies shared by every module into a common set.
    #[serde(default, rename = "factor-common")]
    pub factor_common: bool,
}

impl Default for ResolutionConfig {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            library_types: default_library_types(),
            factor_common: false,
        }
    }
}

impl ResolutionConfig {
    pub fn is_library_type(&self, type_: &str) -> bool {
        self.library_types.iter().any(|t| t == type_)
    }
}

fn default_library_types() -> Vec<String> {
    ["jar", "test-jar", "ejb", "bundle"]
        .iter()
        .map(|s| s.to_string())
        .collect()
}

/// Local repository settings from `[repository]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RepositoryConfig {
    #[serde(default = "default_local_repository")]
    pub local: String,
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            local: default_local_repository(),
        }
    }
}

impl RepositoryConfig {
    /// The local repository directory with `~` expanded.
    pub fn local_path(&self) -> PathBuf {
        kreactor_util::fs::expand_tilde(&self.local)
    }
}

fn default_local_repository() -> String {
    "~/.m2/repository".to_string()
}

impl GlobalConfig {
    /// Load the global configuration, or return defaults if the file doesn't exist.
    pub fn load() -> KreactorResult<Self> {
        Self::load_from(&Self::default_path())
    }

    /// Load configuration from an explicit path, defaulting when absent.
    pub fn load_from(path: &Path) -> KreactorResult<Self> {
        if !path.is_file() {
            tracing::debug!(path = %path.display(), "no config file, using defaults");
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| KreactorError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        Self::parse(&content)
    }

    /// Parse configuration from TOML text.
    pub fn parse(content: &str) -> KreactorResult<Self> {
        toml::from_str(content).map_err(|e| KreactorError::Config {
            message: format!("Failed to parse config: {e}"),
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the kreactor data directory (`~/.kreactor/`).
pub fn dirs_path() -> PathBuf {
    kreactor_util::fs::home_dir().join(".kreactor")
}
