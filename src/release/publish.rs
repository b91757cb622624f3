//! Registry publish operations
//!
//! Each publish is a synchronous external command with a success/failure
//! outcome and no retry. `--allow-dirty` is passed because the release commit
//! may coexist with files the operator has not committed (lockfiles updated
//! by the run itself).

use crate::core::error::{ReleaseError, ReleaseResult, ResultExt};
use crate::release::package::{Package, Registry};
use std::path::Path;
use std::process::Command;

/// Publish one package to its registry
pub fn publish_package(root: &Path, package: &Package) -> ReleaseResult<()> {
  let manifest = root.join(&package.manifest_path);

  let mut cmd = match package.registry {
    Registry::CratesIo => {
      let mut cmd = Command::new("cargo");
      cmd.arg("publish").arg("--manifest-path").arg(&manifest).arg("--allow-dirty");
      cmd
    }
    Registry::PyPi => {
      let mut cmd = Command::new("maturin");
      cmd.arg("publish").arg("--manifest-path").arg(&manifest);
      cmd
    }
  };

  let output = cmd
    .current_dir(root)
    .output()
    .with_context(|| format!("Failed to spawn publish command for '{}'", package.name))?;

  if !output.status.success() {
    return Err(ReleaseError::PublishFailure {
      package: package.name.clone(),
      code: output.status.code(),
      stderr: String::from_utf8_lossy(&output.stderr).to_string(),
    });
  }

  Ok(())
}

/// Refresh local lock state against the newly published versions
///
/// Best-effort final step: a failure is reported but never fails the run.
pub fn refresh_locks(root: &Path) {
  let result = Command::new("cargo")
    .arg("update")
    .arg("--workspace")
    .current_dir(root)
    .output();

  match result {
    Ok(output) if output.status.success() => {
      println!("   ✅ Lockfile refreshed");
    }
    Ok(output) => {
      let stderr = String::from_utf8_lossy(&output.stderr);
      eprintln!("   ⚠️  Warning: lockfile refresh failed:\n{}", stderr.trim_end());
    }
    Err(e) => {
      eprintln!("   ⚠️  Warning: could not run cargo update: {}", e);
    }
  }
}
