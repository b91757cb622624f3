//! Exit-code contract and the no-mutation guarantee of the failure path

use crate::helpers::{TestProject, run_slipway};
use anyhow::Result;

const MANIFESTS: [&str; 3] = [
  "core/Cargo.toml",
  "bindings/py/Cargo.toml",
  "bindings/data/Cargo.toml",
];

#[test]
fn test_missing_argument_exits_one() -> Result<()> {
  let project = TestProject::new()?;
  let output = run_slipway(&project.path, &[])?;
  assert_eq!(output.status.code(), Some(1));
  Ok(())
}

#[test]
fn test_malformed_version_exits_one() -> Result<()> {
  let project = TestProject::new()?;
  let output = run_slipway(&project.path, &["not-a-version"])?;
  assert_eq!(output.status.code(), Some(1));
  Ok(())
}

#[test]
fn test_non_increasing_version_exits_two_and_mutates_nothing() -> Result<()> {
  let project = TestProject::new()?;
  let before: Vec<String> = MANIFESTS.iter().map(|m| project.read_file(m).unwrap()).collect();
  let head = project.head_sha()?;

  for requested in ["0.1.0", "0.0.9"] {
    let output = run_slipway(&project.path, &[requested])?;
    assert_eq!(output.status.code(), Some(2), "version {} must be rejected", requested);
  }

  // The failure path is an idempotent no-op
  for (manifest, expected) in MANIFESTS.iter().zip(&before) {
    assert_eq!(&project.read_file(manifest)?, expected);
  }
  assert_eq!(project.head_sha()?, head);
  assert!(project.tag_sha("v0.1.0").is_none());
  Ok(())
}

#[test]
fn test_pre_release_current_accepts_its_stripped_value() -> Result<()> {
  let project = TestProject::new()?;
  project.commit_change(
    "core/Cargo.toml",
    "[package]\nname = \"core-lib\"\nversion = \"0.3.0-pre\"\n",
    "Start 0.3.0 development",
  )?;

  let accepted = run_slipway(&project.path, &["0.3.0", "--dry-run"])?;
  assert_eq!(accepted.status.code(), Some(0));

  let rejected = run_slipway(&project.path, &["0.2.9", "--dry-run"])?;
  assert_eq!(rejected.status.code(), Some(2));
  Ok(())
}

#[test]
fn test_dry_run_mutates_nothing() -> Result<()> {
  let project = TestProject::new()?;
  let before = project.read_file("core/Cargo.toml")?;
  let head = project.head_sha()?;

  let output = run_slipway(&project.path, &["0.2.0", "--dry-run"])?;
  assert_eq!(output.status.code(), Some(0));

  let stdout = String::from_utf8_lossy(&output.stdout);
  assert!(stdout.contains("core-lib"), "plan should list the core package");

  assert_eq!(project.read_file("core/Cargo.toml")?, before);
  assert_eq!(project.head_sha()?, head);
  Ok(())
}

#[test]
fn test_json_plan_is_parseable_and_core_first() -> Result<()> {
  let project = TestProject::new()?;
  let output = run_slipway(&project.path, &["0.2.0", "--dry-run", "--json"])?;
  assert_eq!(output.status.code(), Some(0));

  let stdout = String::from_utf8_lossy(&output.stdout);
  let plan: serde_json::Value = serde_json::from_str(&stdout)?;
  assert_eq!(plan["version"], "0.2.0");

  let publishes = plan["publishes"].as_array().unwrap();
  assert_eq!(publishes.len(), 3);
  assert_eq!(publishes[0]["name"], "core-lib");
  assert_eq!(publishes[0]["registry"], "crates-io");

  let py = publishes.iter().find(|p| p["name"] == "py-bindings").unwrap();
  assert_eq!(py["registry"], "pypi");
  Ok(())
}
