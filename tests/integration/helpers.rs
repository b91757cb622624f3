//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// A scratch release project: core crate, two bindings, git history, bare remote
pub struct TestProject {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestProject {
  /// Create a project with a committed baseline at version 0.1.0
  pub fn new() -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().join("project");
    let remote = root.path().join("remote.git");
    std::fs::create_dir_all(&path)?;

    git(&remote_parent(&remote), &["init", "--bare", "remote.git"])?;
    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;
    git(&path, &["remote", "add", "origin", &remote.display().to_string()])?;

    write_file(
      &path,
      "core/Cargo.toml",
      r#"[package]
name = "core-lib"
version = "0.1.0"
edition = "2024"

[dependencies]
anyhow = "1.0"
"#,
    )?;

    write_file(
      &path,
      "bindings/py/Cargo.toml",
      r#"[package]
name = "py-bindings"
version = "0.1.0"

[dependencies]
core-lib = { version = "0.1.0", path = "../../core", optional = true }
pyo3 = "0.22"
devkit = { git = "https://example.com/devkit.git" }
"#,
    )?;

    write_file(
      &path,
      "bindings/data/Cargo.toml",
      r#"[package]
name = "data-bindings"
version = "0.1.0"

[dependencies]
core-lib = { version = "0.1.0", path = "../../core" }
"#,
    )?;

    write_file(
      &path,
      "slipway.toml",
      "remove-dev-deps = [\"devkit\"]\n",
    )?;

    git(&path, &["add", "."])?;
    git(&path, &["commit", "-m", "Initial project setup"])?;

    Ok(Self { _root: root, path })
  }

  /// Read a file relative to the project root
  pub fn read_file(&self, rel: &str) -> Result<String> {
    Ok(std::fs::read_to_string(self.path.join(rel))?)
  }

  /// Overwrite a file and commit the change
  pub fn commit_change(&self, rel: &str, content: &str, message: &str) -> Result<()> {
    write_file(&self.path, rel, content)?;
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "-m", message])?;
    Ok(())
  }

  /// Current HEAD commit SHA
  pub fn head_sha(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Commit SHA a local tag points to, if the tag exists
  pub fn tag_sha(&self, tag: &str) -> Option<String> {
    let output = Command::new("git")
      .current_dir(&self.path)
      .args(["rev-list", "-n", "1", tag])
      .output()
      .ok()?;
    if !output.status.success() {
      return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Subject line of the last commit
  pub fn last_commit_message(&self) -> Result<String> {
    let output = git(&self.path, &["log", "-1", "--format=%s"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Tags visible on the remote
  pub fn remote_tags(&self) -> Result<String> {
    let output = git(&self.path, &["ls-remote", "--tags", "origin"])?;
    Ok(String::from_utf8_lossy(&output.stdout).to_string())
  }
}

fn remote_parent(remote: &Path) -> PathBuf {
  remote.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."))
}

fn write_file(root: &Path, rel: &str, content: &str) -> Result<()> {
  let path = root.join(rel);
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent)?;
  }
  std::fs::write(path, content)?;
  Ok(())
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the slipway CLI, returning the raw output so exit codes can be asserted
pub fn run_slipway(cwd: &Path, args: &[&str]) -> Result<Output> {
  let bin = env!("CARGO_BIN_EXE_slipway");

  Command::new(bin)
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run slipway")
}
