//! Manifest discovery and mutation across the project tree
//!
//! The project's version state is spread across many Cargo.toml files with no
//! single source of truth. `ManifestSet` is the one abstraction that owns it:
//! the core manifest is the authoritative read path, and every write fans out
//! through an enumerated list of discovered manifests.
//!
//! All documents are parsed up front, so a parse error anywhere aborts the
//! run before any file is touched. Writes are then flushed file by file with
//! no rollback on partial failure; a failed flush leaves earlier files
//! modified on disk.

use crate::core::config::ProjectConfig;
use crate::core::error::{ReleaseError, ReleaseResult};
use glob::Pattern;
use semver::Version;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, value};

/// Dependency sections a manifest may declare
pub const DEP_SECTIONS: [&str; 3] = ["dependencies", "dev-dependencies", "build-dependencies"];

/// Manifest role within the project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestKind {
  /// The core library every other package pins
  Core,
  /// A downstream binding or tool package
  Dependent,
}

/// A single manifest file, edited in place
#[derive(Debug)]
pub struct Manifest {
  /// Path relative to the project root
  pub rel_path: PathBuf,
  pub kind: ManifestKind,
  doc: DocumentMut,
  dirty: bool,
}

impl Manifest {
  fn load(root: &Path, rel_path: PathBuf) -> ReleaseResult<Self> {
    let abs = root.join(&rel_path);
    let content = fs::read_to_string(&abs).map_err(|e| ReleaseError::ManifestParse {
      path: abs.clone(),
      reason: e.to_string(),
    })?;
    let doc = content
      .parse::<DocumentMut>()
      .map_err(|e| ReleaseError::ManifestParse {
        path: abs,
        reason: e.to_string(),
      })?;

    Ok(Self {
      rel_path,
      kind: ManifestKind::Dependent,
      doc,
      dirty: false,
    })
  }

  /// Package name, or None for a bare `[workspace]` manifest
  pub fn package_name(&self) -> Option<&str> {
    self
      .doc
      .get("package")
      .and_then(|p| p.as_table_like())
      .and_then(|t| t.get("name"))
      .and_then(|n| n.as_str())
  }

  /// The package-level version declaration
  pub fn version(&self) -> ReleaseResult<Version> {
    let raw = self
      .doc
      .get("package")
      .and_then(|p| p.as_table_like())
      .and_then(|t| t.get("version"))
      .and_then(|v| v.as_str())
      .ok_or_else(|| ReleaseError::ManifestParse {
        path: self.rel_path.clone(),
        reason: "missing package-level version declaration".to_string(),
      })?;

    raw.parse::<Version>().map_err(|e| ReleaseError::ManifestParse {
      path: self.rel_path.clone(),
      reason: format!("malformed version '{}': {}", raw, e),
    })
  }

  /// Replace the package-level version declaration
  ///
  /// Only the `version` key of the `[package]` section is rewritten -- the
  /// first version declaration after the section marker. Any other key named
  /// `version` (dependency pins in particular) is left untouched, as is a
  /// `version.workspace = true` inheritance marker.
  pub fn set_version(&mut self, version: &Version) {
    let new = version.to_string();
    if let Some(pkg) = self.doc.get_mut("package").and_then(|p| p.as_table_like_mut())
      && let Some(existing) = pkg.get("version").and_then(|v| v.as_str())
      && existing != new
    {
      pkg.insert("version", value(new));
      self.dirty = true;
    }
  }

  /// Rewrite the version pin on a dependency, preserving every other key
  ///
  /// Handles both the string form (`core = "0.1.0"`) and the table form
  /// (`core = { version = "0.1.0", path = "../core", optional = true }`).
  pub fn set_dependency_version(&mut self, dep: &str, version: &Version) {
    for section in DEP_SECTIONS {
      if let Some(deps) = self.doc.get_mut(section).and_then(|d| d.as_table_like_mut())
        && let Some(entry) = deps.get_mut(dep)
      {
        let new = version.to_string();
        if let Some(table) = entry.as_table_like_mut() {
          if table.get("version").and_then(|v| v.as_str()) != Some(new.as_str()) {
            table.insert("version", value(new));
            self.dirty = true;
          }
        } else if let Some(existing) = entry.as_str()
          && existing != new
        {
          *entry = value(new);
          self.dirty = true;
        }
      }
    }
  }

  /// Delete the named dependency entry wherever its source is a git reference
  ///
  /// Git-sourced entries cannot be published to a registry; they only exist
  /// for development against unreleased sibling code.
  pub fn remove_git_dependency(&mut self, dep: &str) {
    for section in DEP_SECTIONS {
      if let Some(deps) = self.doc.get_mut(section).and_then(|d| d.as_table_like_mut())
        && deps
          .get(dep)
          .and_then(|e| e.as_table_like())
          .is_some_and(|t| t.contains_key("git"))
      {
        deps.remove(dep);
        self.dirty = true;
      }
    }
  }

  /// Names of normal (publish-relevant) dependencies
  pub fn dependency_names(&self) -> Vec<String> {
    self
      .doc
      .get("dependencies")
      .and_then(|d| d.as_table_like())
      .map(|t| t.iter().map(|(k, _)| k.to_string()).collect())
      .unwrap_or_default()
  }

  /// Whether the manifest declares the dependency in any section
  pub fn has_dependency(&self, dep: &str) -> bool {
    DEP_SECTIONS.iter().any(|section| {
      self
        .doc
        .get(section)
        .and_then(|d| d.as_table_like())
        .is_some_and(|t| t.contains_key(dep))
    })
  }

  /// Whether this package builds a Python extension (maturin metadata or pyo3)
  pub fn has_python_binding(&self) -> bool {
    let maturin = self
      .doc
      .get("package")
      .and_then(|p| p.as_table_like())
      .and_then(|t| t.get("metadata"))
      .and_then(|m| m.as_table_like())
      .is_some_and(|m| m.contains_key("maturin"));

    maturin || self.has_dependency("pyo3")
  }

  fn flush(&mut self, root: &Path) -> ReleaseResult<()> {
    if !self.dirty {
      return Ok(());
    }

    let abs = root.join(&self.rel_path);
    fs::write(&abs, self.doc.to_string()).map_err(|e| ReleaseError::ManifestWrite {
      path: abs,
      source: e,
    })?;
    self.dirty = false;
    Ok(())
  }
}

/// Every manifest discoverable under the project root
#[derive(Debug)]
pub struct ManifestSet {
  root: PathBuf,
  manifests: Vec<Manifest>,
  core_index: usize,
}

impl ManifestSet {
  /// Discover and parse all manifests under the project root
  ///
  /// Manifests under `target/` and any configured exclude pattern are left
  /// out of the set entirely, so they are never mutated.
  pub fn discover(root: &Path, config: &ProjectConfig) -> ReleaseResult<Self> {
    let excludes = config
      .exclude
      .iter()
      .map(|p| Pattern::new(p))
      .collect::<Result<Vec<_>, _>>()?;

    let pattern = format!("{}/**/Cargo.toml", root.display());
    let mut manifests = Vec::new();

    for entry in glob::glob(&pattern)? {
      let abs = entry?;
      let rel = abs.strip_prefix(root).unwrap_or(&abs).to_path_buf();

      if rel.components().any(|c| c.as_os_str() == "target") {
        continue;
      }
      if excludes.iter().any(|p| p.matches_path(&rel)) {
        continue;
      }

      manifests.push(Manifest::load(root, rel)?);
    }

    if manifests.is_empty() {
      return Err(ReleaseError::message(format!(
        "No manifests found under {}",
        root.display()
      )));
    }

    let core_index = resolve_core(&manifests, config)?;
    manifests[core_index].kind = ManifestKind::Core;

    Ok(Self {
      root: root.to_path_buf(),
      manifests,
      core_index,
    })
  }

  /// Name of the core package
  pub fn core_name(&self) -> &str {
    // The core index always points at a named package, checked in discover
    self.manifests[self.core_index].package_name().unwrap_or_default()
  }

  /// Read the authoritative current version from the core manifest
  pub fn current_version(&self) -> ReleaseResult<Version> {
    self.manifests[self.core_index].version()
  }

  /// Set the package-level version in every manifest
  pub fn set_version(&mut self, version: &Version) {
    for manifest in &mut self.manifests {
      manifest.set_version(version);
    }
  }

  /// Re-pin the core dependency in every dependent manifest
  pub fn update_cross_references(&mut self, version: &Version) {
    let core = self.core_name().to_string();
    for manifest in &mut self.manifests {
      if manifest.kind == ManifestKind::Dependent {
        manifest.set_dependency_version(&core, version);
      }
    }
  }

  /// Strip the named git-sourced dependency from every manifest
  pub fn remove_dev_only_dependency(&mut self, name: &str) {
    for manifest in &mut self.manifests {
      manifest.remove_git_dependency(name);
    }
  }

  /// Write all pending edits back to disk, returning the changed paths
  pub fn flush(&mut self) -> ReleaseResult<Vec<PathBuf>> {
    let mut changed = Vec::new();
    for manifest in &mut self.manifests {
      if manifest.dirty {
        changed.push(manifest.rel_path.clone());
      }
      manifest.flush(&self.root)?;
    }
    Ok(changed)
  }

  pub fn iter(&self) -> impl Iterator<Item = &Manifest> {
    self.manifests.iter()
  }

  pub fn len(&self) -> usize {
    self.manifests.len()
  }

  pub fn is_empty(&self) -> bool {
    self.manifests.is_empty()
  }
}

/// Pick the core manifest: configured name, or the unique package siblings depend on
fn resolve_core(manifests: &[Manifest], config: &ProjectConfig) -> ReleaseResult<usize> {
  if let Some(name) = &config.core {
    return manifests
      .iter()
      .position(|m| m.package_name() == Some(name.as_str()))
      .ok_or_else(|| ReleaseError::message(format!("Configured core package '{}' not found in the tree", name)));
  }

  let names: HashSet<String> = manifests
    .iter()
    .filter_map(|m| m.package_name().map(str::to_string))
    .collect();

  let mut referenced: Vec<String> = Vec::new();
  for manifest in manifests {
    for dep in manifest.dependency_names() {
      if names.contains(&dep) && manifest.package_name() != Some(dep.as_str()) && !referenced.contains(&dep) {
        referenced.push(dep);
      }
    }
  }

  match referenced.as_slice() {
    [core] => manifests
      .iter()
      .position(|m| m.package_name() == Some(core.as_str()))
      .ok_or_else(|| ReleaseError::message(format!("Core package '{}' has no manifest in the set", core))),
    [] => Err(ReleaseError::message(
      "Cannot infer the core package: no manifest depends on a sibling. Set `core` in slipway.toml.",
    )),
    _ => Err(ReleaseError::message(format!(
      "Cannot infer the core package: multiple candidates ({}). Set `core` in slipway.toml.",
      referenced.join(", ")
    ))),
  }
}
