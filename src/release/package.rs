//! Logical packages discovered from the manifest tree
//!
//! A package is a named unit with a manifest, a target registry, and the set
//! of sibling packages it depends on. Packages are discovered, never created:
//! the set is fixed by the project layout.

use crate::core::config::ProjectConfig;
use crate::release::manifest::{Manifest, ManifestSet};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use std::path::PathBuf;

/// Registry a package publishes to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Registry {
  #[serde(rename = "crates-io")]
  CratesIo,
  #[serde(rename = "pypi")]
  PyPi,
}

impl Registry {
  /// Detect the registry from manifest contents
  ///
  /// Python extension crates (maturin metadata or a pyo3 dependency) go to
  /// PyPI; everything else goes to crates.io.
  pub fn detect(manifest: &Manifest) -> Self {
    if manifest.has_python_binding() {
      Registry::PyPi
    } else {
      Registry::CratesIo
    }
  }
}

impl fmt::Display for Registry {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Registry::CratesIo => write!(f, "crates.io"),
      Registry::PyPi => write!(f, "pypi"),
    }
  }
}

/// A publishable package in the project tree
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
  pub name: String,
  /// Manifest path relative to the project root
  pub manifest_path: PathBuf,
  pub registry: Registry,
  /// Sibling packages this package depends on
  pub depends_on: Vec<String>,
}

/// Collect the packages from a discovered manifest set
///
/// Bare `[workspace]` manifests carry no package and are skipped. Dependency
/// edges are restricted to siblings in the set; external crates do not affect
/// publish order.
pub fn collect_packages(manifests: &ManifestSet, config: &ProjectConfig) -> Vec<Package> {
  let names: HashSet<String> = manifests
    .iter()
    .filter_map(|m| m.package_name().map(str::to_string))
    .collect();

  manifests
    .iter()
    .filter_map(|manifest| {
      let name = manifest.package_name()?.to_string();
      let registry = config
        .registry_override(&name)
        .unwrap_or_else(|| Registry::detect(manifest));
      let depends_on = manifest
        .dependency_names()
        .into_iter()
        .filter(|dep| dep != &name && names.contains(dep))
        .collect();

      Some(Package {
        name,
        manifest_path: manifest.rel_path.clone(),
        registry,
        depends_on,
      })
    })
    .collect()
}
