//! System git backend - zero dependencies
//!
//! All version-control effects of a release (staging, the release commit, the
//! force-moved tag, pushes) go through git subprocesses with an isolated
//! environment so the operator's global config cannot change behavior.

use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git (zero crate dependencies)
pub struct SystemGit {
  /// Repository working directory
  repo_path: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  pub fn open(path: &Path) -> ReleaseResult<Self> {
    let output = Command::new("git")
      .arg("-C")
      .arg(path)
      .args(["rev-parse", "--show-toplevel"])
      .output()
      .context("Failed to execute git rev-parse")?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ReleaseError::VersionControl {
        command: "git rev-parse --show-toplevel".to_string(),
        code: output.status.code(),
        stderr: stderr.to_string(),
      });
    }

    Ok(Self {
      repo_path: path.to_path_buf(),
    })
  }

  /// Get HEAD commit SHA
  pub fn head_commit(&self) -> ReleaseResult<String> {
    let output = self.run(&["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output).trim().to_string())
  }

  /// Stage the given paths
  pub fn stage(&self, paths: &[PathBuf]) -> ReleaseResult<()> {
    if paths.is_empty() {
      return Ok(());
    }

    let mut args: Vec<String> = vec!["add".to_string(), "--".to_string()];
    args.extend(paths.iter().map(|p| p.display().to_string()));
    let args: Vec<&str> = args.iter().map(|s| s.as_str()).collect();
    self.run(&args)?;
    Ok(())
  }

  /// Create a commit with the given message
  pub fn commit(&self, message: &str) -> ReleaseResult<()> {
    self.run(&["commit", "-m", message])?;
    Ok(())
  }

  /// Create a tag, replacing any existing tag of the same name
  pub fn tag_force(&self, name: &str) -> ReleaseResult<()> {
    self.run(&["tag", "--force", name])?;
    Ok(())
  }

  /// Push the current branch to origin
  pub fn push(&self) -> ReleaseResult<()> {
    self.run(&["push", "origin", "HEAD"])?;
    Ok(())
  }

  /// Push all tags to origin, overwriting remote tags of the same name
  pub fn push_tags_force(&self) -> ReleaseResult<()> {
    self.run(&["push", "origin", "--tags", "--force"])?;
    Ok(())
  }

  fn run(&self, args: &[&str]) -> ReleaseResult<Vec<u8>> {
    let output = self
      .git_cmd()
      .args(args)
      .output()
      .with_context(|| format!("Failed to execute git {}", args.join(" ")))?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ReleaseError::VersionControl {
        command: format!("git {}", args.join(" ")),
        code: output.status.code(),
        stderr: stderr.to_string(),
      });
    }

    Ok(output.stdout)
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  /// - Adds safe configuration overrides
  fn git_cmd(&self) -> Command {
    let mut cmd = Command::new("git");

    cmd.arg("-C").arg(&self.repo_path);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    // Force safe behavior (override user config)
    cmd.arg("-c").arg("protocol.version=2");
    cmd.arg("-c").arg("advice.detachedHead=false");
    cmd.arg("-c").arg("core.quotePath=false"); // Don't escape non-ASCII

    cmd
  }
}
