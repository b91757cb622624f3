//! Dependency graph construction and topological sorting
//!
//! Builds a directed graph over the discovered packages to determine the
//! publish order (a package's dependencies must already exist in their
//! registries before the dependent is published). The project shape today is
//! one core with independent dependents, but the order is computed generically
//! so added inter-dependencies stay correct.

use crate::core::error::{ReleaseError, ReleaseResult};
use crate::release::package::Package;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::collections::HashMap;

/// Dependency graph over the project's packages
pub struct PackageGraph {
  graph: DiGraph<String, ()>,
  node_map: HashMap<String, NodeIndex>,
}

impl PackageGraph {
  /// Build the graph from discovered packages
  ///
  /// Edge direction: dependent → dependency, so the topological sort (after
  /// reversal) yields dependencies first.
  pub fn from_packages(packages: &[Package]) -> Self {
    let mut graph = DiGraph::new();
    let mut node_map = HashMap::new();

    for package in packages {
      let idx = graph.add_node(package.name.clone());
      node_map.insert(package.name.clone(), idx);
    }

    for package in packages {
      let dependent_idx = node_map[&package.name];
      for dep in &package.depends_on {
        if let Some(&dependency_idx) = node_map.get(dep) {
          graph.add_edge(dependent_idx, dependency_idx, ());
        }
      }
    }

    Self { graph, node_map }
  }

  /// Publish order: every package after all packages it depends on
  pub fn publish_order(&self) -> ReleaseResult<Vec<String>> {
    let sorted = toposort(&self.graph, None).map_err(|cycle| {
      let node_idx = cycle.node_id();
      ReleaseError::CyclicDependency {
        package: self.graph[node_idx].clone(),
      }
    })?;

    // Reverse because edges point dependent → dependency,
    // but we want dependencies first in output
    Ok(sorted.into_iter().rev().map(|idx| self.graph[idx].clone()).collect())
  }

  /// Check if graph has cycles (circular dependencies)
  pub fn has_cycles(&self) -> bool {
    toposort(&self.graph, None).is_err()
  }

  /// Get dependencies of a specific package
  pub fn dependencies_of(&self, name: &str) -> Option<Vec<String>> {
    let idx = self.node_map.get(name)?;
    Some(self.graph.neighbors(*idx).map(|dep| self.graph[dep].clone()).collect())
  }

  pub fn len(&self) -> usize {
    self.graph.node_count()
  }

  pub fn is_empty(&self) -> bool {
    self.graph.node_count() == 0
  }
}
