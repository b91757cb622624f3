//! The ordered publish plan for a release
//!
//! A `ReleasePlan` is derived once per run from the dependency relation and
//! never mutated afterwards. It is printable as a table for operators,
//! serializable to JSON for CI, and carries a content hash so two runs over
//! the same tree can be compared in logs.

use crate::core::error::ReleaseResult;
use crate::release::graph::PackageGraph;
use crate::release::package::{Package, Registry};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// Plan identifier (SHA-256 hash of plan contents)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanId(String);

impl PlanId {
  fn from_contents(contents: &[u8]) -> Self {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    Self(format!("{:x}", hasher.finalize()))
  }

  /// Get the short ID (first 12 characters)
  pub fn short(&self) -> &str {
    &self.0[..12.min(self.0.len())]
  }
}

impl fmt::Display for PlanId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.short())
  }
}

/// One publish step of a release
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlannedPublish {
  pub name: String,
  pub registry: Registry,
  pub manifest_path: String,
}

/// Complete release plan: the version and the publish sequence
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleasePlan {
  pub version: String,
  pub publishes: Vec<PlannedPublish>,
}

impl ReleasePlan {
  /// Derive the plan from the discovered packages
  pub fn new(version: &semver::Version, packages: &[Package]) -> ReleaseResult<Self> {
    let graph = PackageGraph::from_packages(packages);
    let order = graph.publish_order()?;

    let publishes = order
      .iter()
      .filter_map(|name| packages.iter().find(|p| &p.name == name))
      .map(|p| PlannedPublish {
        name: p.name.clone(),
        registry: p.registry,
        manifest_path: p.manifest_path.display().to_string(),
      })
      .collect();

    Ok(Self {
      version: version.to_string(),
      publishes,
    })
  }

  /// Names in publish order
  pub fn order(&self) -> Vec<&str> {
    self.publishes.iter().map(|p| p.name.as_str()).collect()
  }

  /// Stable content hash of the plan
  pub fn id(&self) -> ReleaseResult<PlanId> {
    let json = serde_json::to_vec(self)?;
    Ok(PlanId::from_contents(&json))
  }

  /// Output as human-readable table
  pub fn format_table(&self) -> String {
    let mut output = format!("📦 Release Plan for v{}\n\n", self.version);

    if self.publishes.is_empty() {
      output.push_str("No packages to publish.\n");
      return output;
    }

    output.push_str("Package           Registry    Manifest\n");
    output.push_str("──────────────────────────────────────────────────────\n");

    for publish in &self.publishes {
      output.push_str(&format!(
        "{:<17} {:<11} {}\n",
        publish.name,
        publish.registry.to_string(),
        publish.manifest_path
      ));
    }

    output.push_str(&format!("\nPublish order: {}\n", self.order().join(" → ")));

    output
  }

  /// Output as JSON for CI
  pub fn to_json(&self) -> ReleaseResult<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }
}
