//! The release state machine
//!
//! Drives a run through `Idle → Validating → MutatingManifests → Committing →
//! Publishing → Tagging → Pushed → Done`, with `Failed` reachable from any
//! non-terminal state. Each state fully completes before the next begins;
//! the first hard failure aborts the run in place. There is no compensating
//! rollback: manifests written and commits created before a failure stay on
//! disk for manual intervention or a `--force` re-run.

use crate::core::config::ProjectConfig;
use crate::core::error::{ReleaseError, ReleaseResult};
use crate::core::vcs::SystemGit;
use crate::release::manifest::ManifestSet;
use crate::release::package::{Package, collect_packages};
use crate::release::plan::ReleasePlan;
use crate::release::publish;
use crate::release::version;
use semver::Version;
use std::fmt;
use std::path::PathBuf;
use std::thread;
use std::time::Duration;

/// States of a release run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseState {
  Idle,
  Validating,
  MutatingManifests,
  Committing,
  Publishing,
  Tagging,
  Pushed,
  Done,
  Failed,
}

impl fmt::Display for ReleaseState {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    let name = match self {
      ReleaseState::Idle => "idle",
      ReleaseState::Validating => "validating",
      ReleaseState::MutatingManifests => "mutating-manifests",
      ReleaseState::Committing => "committing",
      ReleaseState::Publishing => "publishing",
      ReleaseState::Tagging => "tagging",
      ReleaseState::Pushed => "pushed",
      ReleaseState::Done => "done",
      ReleaseState::Failed => "failed",
    };
    write!(f, "{}", name)
  }
}

/// Flags controlling a release run
#[derive(Debug, Clone, Default)]
pub struct ReleaseOptions {
  /// Print the plan and stop before any mutation
  pub dry_run: bool,
  /// Emit the plan as JSON instead of a table
  pub json: bool,
  /// Commit, tag and push, but skip registry publishing
  pub skip_publish: bool,
  /// Skip the version-order check (re-tag an existing release)
  pub force: bool,
  /// Seconds to wait between publishes for registry propagation
  pub delay: u64,
}

/// Top-level driver for a release run
pub struct ReleaseOrchestrator {
  root: PathBuf,
  config: ProjectConfig,
  state: ReleaseState,
}

impl ReleaseOrchestrator {
  pub fn new(root: PathBuf) -> ReleaseResult<Self> {
    let config = ProjectConfig::load(&root)?;
    Ok(Self {
      root,
      config,
      state: ReleaseState::Idle,
    })
  }

  pub fn state(&self) -> ReleaseState {
    self.state
  }

  /// Run the release to completion or first failure
  pub fn run(&mut self, requested: &Version, opts: &ReleaseOptions) -> ReleaseResult<()> {
    let result = self.run_states(requested, opts);
    if result.is_err() {
      self.state = ReleaseState::Failed;
    }
    result
  }

  fn run_states(&mut self, requested: &Version, opts: &ReleaseOptions) -> ReleaseResult<()> {
    // Validating: nothing on disk changes until this state passes
    self.state = ReleaseState::Validating;
    let mut manifests = ManifestSet::discover(&self.root, &self.config)?;
    let current = manifests.current_version()?;

    if !opts.force {
      version::validate_bump(&current, requested)?;
    }

    // With --json, stdout carries only the plan so CI can parse it
    if !opts.json {
      if opts.force {
        println!("⚠️  --force: skipping version-order check ({} → {})", current, requested);
      } else if version::is_pre_release(&current) {
        println!("🔍 Validated {} → {} (pre-release marker stripped)", current, requested);
      } else {
        println!("🔍 Validated {} → {}", current, requested);
      }
    }

    // A cycle in the package graph also aborts before any mutation
    let packages = collect_packages(&manifests, &self.config);
    let plan = ReleasePlan::new(requested, &packages)?;

    if opts.json {
      println!("{}", plan.to_json()?);
    } else {
      println!("{}", plan.format_table());
      println!("Plan id: {}", plan.id()?);
    }

    if opts.dry_run {
      if !opts.json {
        println!("\n💡 Dry-run: no manifests, commits, publishes or tags were touched.");
      }
      return Ok(());
    }

    // MutatingManifests: version fan-out across the whole tree
    self.state = ReleaseState::MutatingManifests;
    manifests.set_version(requested);
    manifests.update_cross_references(requested);
    for name in &self.config.remove_dev_deps {
      manifests.remove_dev_only_dependency(name);
    }
    let changed = manifests.flush()?;

    // Committing: a re-run over an already-mutated tree has nothing to stage
    self.state = ReleaseState::Committing;
    let git = SystemGit::open(&self.root)?;
    if changed.is_empty() {
      println!("📝 Manifests already at v{}, nothing to commit", requested);
    } else {
      println!("📝 Updated {} manifest(s)", changed.len());
      git.stage(&changed)?;
      git.commit(&format!("v{}", requested))?;
      let head = git.head_commit()?;
      println!("✅ Committed v{} ({})", requested, &head[..12.min(head.len())]);
    }

    // Publishing: strictly sequential, dependencies first
    self.state = ReleaseState::Publishing;
    if opts.skip_publish {
      println!("⏭️  Skipping registry publishing (--skip-publish)");
    } else {
      self.publish_in_order(&plan, &packages, opts.delay)?;
    }

    // Tagging: force semantics so a corrective re-run replaces the prior tag
    self.state = ReleaseState::Tagging;
    let tag = format!("v{}", requested);
    println!("🏷️  Tagging {}", tag);
    git.tag_force(&tag)?;

    println!("📤 Pushing commit and tags");
    git.push()?;
    git.push_tags_force()?;
    self.state = ReleaseState::Pushed;

    // Final step outside the failure path
    println!("🔄 Refreshing lockfile");
    publish::refresh_locks(&self.root);

    self.state = ReleaseState::Done;
    println!("\n🎉 Released v{}", requested);
    Ok(())
  }

  fn publish_in_order(&self, plan: &ReleasePlan, packages: &[Package], delay: u64) -> ReleaseResult<()> {
    let total = plan.publishes.len();
    println!("📦 Publishing {} package(s) in dependency order", total);
    println!("   Order: {}", plan.order().join(" → "));

    for (idx, planned) in plan.publishes.iter().enumerate() {
      let package = packages
        .iter()
        .find(|p| p.name == planned.name)
        .ok_or_else(|| ReleaseError::message(format!("Package '{}' missing from the plan", planned.name)))?;

      println!("📌 [{}/{}] {} ({})", idx + 1, total, package.name, package.registry);
      publish::publish_package(&self.root, package)?;
      println!("   ✅ Published {}", package.name);

      if idx + 1 < total && delay > 0 {
        println!("   ⏳ Waiting {}s for registry propagation...", delay);
        thread::sleep(Duration::from_secs(delay));
      }
    }

    Ok(())
  }
}
