//! End-to-end release runs against a scratch project with a bare remote
//!
//! Registry publishing is skipped (--skip-publish): these tests exercise the
//! manifest fan-out, the release commit, and the force-tag/push semantics.

use crate::helpers::{TestProject, run_slipway};
use anyhow::Result;

#[test]
fn test_full_release_updates_manifests_commit_and_tag() -> Result<()> {
  let project = TestProject::new()?;

  let output = run_slipway(&project.path, &["0.2.0", "--skip-publish"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert_eq!(output.status.code(), Some(0), "release failed:\n{}", stderr);

  // Version fan-out across every manifest
  let core = project.read_file("core/Cargo.toml")?;
  assert!(core.contains("version = \"0.2.0\""));

  let py = project.read_file("bindings/py/Cargo.toml")?;
  assert!(py.contains("version = \"0.2.0\""));
  assert!(py.contains("optional = true"), "optional flag must survive the re-pin");
  assert!(py.contains("path = \"../../core\""));
  assert!(!py.contains("devkit"), "git-sourced dev dependency must be stripped");
  assert!(py.contains("pyo3 = \"0.22\""), "unrelated pins must be untouched");

  let data = project.read_file("bindings/data/Cargo.toml")?;
  assert!(data.contains("core-lib = { version = \"0.2.0\""));

  // Release commit and tag
  assert_eq!(project.last_commit_message()?, "v0.2.0");
  assert_eq!(project.tag_sha("v0.2.0"), Some(project.head_sha()?));

  // Commit and tag both reached the remote
  let remote_tags = project.remote_tags()?;
  assert!(remote_tags.contains("refs/tags/v0.2.0"));
  Ok(())
}

#[test]
fn test_force_rerun_moves_the_tag_to_the_new_commit() -> Result<()> {
  let project = TestProject::new()?;

  let first = run_slipway(&project.path, &["0.2.0", "--skip-publish"])?;
  assert_eq!(first.status.code(), Some(0));
  let old_tag_sha = project.tag_sha("v0.2.0").unwrap();

  // Same version again without --force is rejected
  let rejected = run_slipway(&project.path, &["0.2.0", "--skip-publish"])?;
  assert_eq!(rejected.status.code(), Some(2));

  // A corrective re-run after a new commit replaces the tag
  project.commit_change("README.md", "# fixed release notes\n", "Fix release notes")?;
  let rerun = run_slipway(&project.path, &["0.2.0", "--skip-publish", "--force"])?;
  let stderr = String::from_utf8_lossy(&rerun.stderr);
  assert_eq!(rerun.status.code(), Some(0), "re-run failed:\n{}", stderr);

  let new_tag_sha = project.tag_sha("v0.2.0").unwrap();
  assert_ne!(new_tag_sha, old_tag_sha);
  assert_eq!(new_tag_sha, project.head_sha()?);

  let remote_tags = project.remote_tags()?;
  assert!(remote_tags.contains(&new_tag_sha));
  Ok(())
}

#[test]
fn test_release_from_pre_release_baseline() -> Result<()> {
  let project = TestProject::new()?;
  project.commit_change(
    "core/Cargo.toml",
    "[package]\nname = \"core-lib\"\nversion = \"0.3.0-pre\"\nedition = \"2024\"\n",
    "Start 0.3.0 development",
  )?;

  let output = run_slipway(&project.path, &["0.3.0", "--skip-publish"])?;
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert_eq!(output.status.code(), Some(0), "release failed:\n{}", stderr);

  let core = project.read_file("core/Cargo.toml")?;
  assert!(core.contains("version = \"0.3.0\""));
  assert!(!core.contains("-pre"));
  assert_eq!(project.last_commit_message()?, "v0.3.0");
  Ok(())
}

#[test]
fn test_excluded_manifest_is_never_touched() -> Result<()> {
  let project = TestProject::new()?;
  project.commit_change(
    "slipway.toml",
    "remove-dev-deps = [\"devkit\"]\nexclude = [\"demos/**\"]\n",
    "Exclude demo manifests",
  )?;
  project.commit_change(
    "demos/hello/Cargo.toml",
    "[package]\nname = \"hello-demo\"\nversion = \"9.9.9\"\n",
    "Add demo",
  )?;

  let output = run_slipway(&project.path, &["0.2.0", "--skip-publish"])?;
  assert_eq!(output.status.code(), Some(0));

  let demo = project.read_file("demos/hello/Cargo.toml")?;
  assert!(demo.contains("9.9.9"));
  Ok(())
}
