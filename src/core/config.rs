//! Project configuration, stored in slipway.toml at the project root
//!
//! The file is optional: a default configuration infers the core package and
//! mutates every manifest it discovers. The `exclude` list exists because
//! discovery is pattern-based and would otherwise touch unrelated manifests
//! (example projects, vendored trees).

use crate::core::error::{ReleaseResult, ResultExt};
use crate::release::package::Registry;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

pub const CONFIG_FILE: &str = "slipway.toml";

/// Configuration for a release run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct ProjectConfig {
  /// Name of the core package; inferred from the dependency graph when unset
  pub core: Option<String>,

  /// Glob patterns (relative to the project root) whose manifests are left untouched
  pub exclude: Vec<String>,

  /// Dependencies stripped from manifests when their source is a git reference
  pub remove_dev_deps: Vec<String>,

  /// Per-package overrides
  pub packages: HashMap<String, PackageConfig>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct PackageConfig {
  /// Registry override; detected from the manifest when unset
  pub registry: Option<Registry>,
}

impl ProjectConfig {
  /// Load slipway.toml from the project root, falling back to defaults
  pub fn load(root: &Path) -> ReleaseResult<Self> {
    let config_path = root.join(CONFIG_FILE);
    if !config_path.exists() {
      return Ok(Self::default());
    }

    let content =
      fs::read_to_string(&config_path).with_context(|| format!("Failed to read {}", config_path.display()))?;
    let config: ProjectConfig =
      toml_edit::de::from_str(&content).with_context(|| format!("Failed to parse {}", config_path.display()))?;
    Ok(config)
  }

  /// Registry override for a package, if configured
  pub fn registry_override(&self, package: &str) -> Option<Registry> {
    self.packages.get(package).and_then(|p| p.registry)
  }
}
