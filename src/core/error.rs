//! Error types for slipway with contextual messages and exit codes
//!
//! Every failure in a release run is fatal: the first error is surfaced and
//! the process halts. This module categorizes those failures and maps each
//! category to the exit code the CLI contract promises.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Main error type for slipway
#[derive(Debug)]
pub enum ReleaseError {
  /// Bad or missing command-line input (exit code 1)
  InvalidArguments { message: String },

  /// Requested version is not forward progress over the current one (exit code 2)
  InvalidVersionOrder {
    current: String,
    requested: String,
    reason: String,
  },

  /// A manifest could not be read or parsed
  ManifestParse { path: PathBuf, reason: String },

  /// A mutated manifest could not be written back
  ManifestWrite { path: PathBuf, source: io::Error },

  /// The package dependency graph has no valid publish order
  CyclicDependency { package: String },

  /// A registry publish command failed
  PublishFailure {
    package: String,
    code: Option<i32>,
    stderr: String,
  },

  /// A version-control command failed
  VersionControl {
    command: String,
    code: Option<i32>,
    stderr: String,
  },

  /// I/O errors outside manifest writes
  Io(io::Error),

  /// Generic error with message and optional context
  Message { message: String, context: Option<String> },
}

impl ReleaseError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ReleaseError::Message {
      message: msg.into(),
      context: None,
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ReleaseError::Message { message, context } => ReleaseError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
      },
      _ => self,
    }
  }

  /// Exit code for this error
  ///
  /// Argument errors exit 1, version-order rejections exit 2, and failures of
  /// external commands propagate the child's own exit code when it had one.
  pub fn exit_code(&self) -> i32 {
    match self {
      ReleaseError::InvalidArguments { .. } => 1,
      ReleaseError::InvalidVersionOrder { .. } => 2,
      ReleaseError::PublishFailure { code, .. } => code.unwrap_or(1),
      ReleaseError::VersionControl { code, .. } => code.unwrap_or(1),
      _ => 1,
    }
  }

  /// Contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ReleaseError::InvalidVersionOrder { current, .. } => Some(format!(
        "The current version is {}. Pick a strictly higher version, or re-run with --force to re-tag an existing release.",
        current
      )),
      ReleaseError::CyclicDependency { package } => Some(format!(
        "Break the dependency cycle involving '{}' before releasing; no publish order exists.",
        package
      )),
      ReleaseError::PublishFailure { package, .. } => Some(format!(
        "The manifests and commit for this release are already in place. Fix the registry issue for '{}' and re-run with --force.",
        package
      )),
      _ => None,
    }
  }
}

impl fmt::Display for ReleaseError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ReleaseError::InvalidArguments { message } => write!(f, "Invalid arguments: {}", message),
      ReleaseError::InvalidVersionOrder {
        current,
        requested,
        reason,
      } => {
        write!(f, "Version {} does not supersede {}: {}", requested, current, reason)
      }
      ReleaseError::ManifestParse { path, reason } => {
        write!(f, "Failed to parse manifest {}: {}", path.display(), reason)
      }
      ReleaseError::ManifestWrite { path, source } => {
        write!(f, "Failed to write manifest {}: {}", path.display(), source)
      }
      ReleaseError::CyclicDependency { package } => {
        write!(f, "Circular dependency detected involving package '{}'", package)
      }
      ReleaseError::PublishFailure { package, stderr, .. } => {
        write!(f, "Publishing '{}' failed:\n{}", package, stderr)
      }
      ReleaseError::VersionControl { command, stderr, .. } => {
        write!(f, "Version-control command failed: {}\n{}", command, stderr)
      }
      ReleaseError::Io(e) => write!(f, "I/O error: {}", e),
      ReleaseError::Message { message, context } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ReleaseError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ReleaseError::Io(e) => Some(e),
      ReleaseError::ManifestWrite { source, .. } => Some(source),
      _ => None,
    }
  }
}

impl From<io::Error> for ReleaseError {
  fn from(err: io::Error) -> Self {
    ReleaseError::Io(err)
  }
}

impl From<String> for ReleaseError {
  fn from(msg: String) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<&str> for ReleaseError {
  fn from(msg: &str) -> Self {
    ReleaseError::message(msg)
  }
}

impl From<toml_edit::TomlError> for ReleaseError {
  fn from(err: toml_edit::TomlError) -> Self {
    ReleaseError::message(format!("TOML parse error: {}", err))
  }
}

impl From<toml_edit::de::Error> for ReleaseError {
  fn from(err: toml_edit::de::Error) -> Self {
    ReleaseError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ReleaseError {
  fn from(err: serde_json::Error) -> Self {
    ReleaseError::message(format!("JSON error: {}", err))
  }
}

impl From<glob::PatternError> for ReleaseError {
  fn from(err: glob::PatternError) -> Self {
    ReleaseError::message(format!("Invalid glob pattern: {}", err))
  }
}

impl From<glob::GlobError> for ReleaseError {
  fn from(err: glob::GlobError) -> Self {
    ReleaseError::message(format!("Manifest discovery error: {}", err))
  }
}

impl From<anyhow::Error> for ReleaseError {
  fn from(err: anyhow::Error) -> Self {
    ReleaseError::message(err.to_string())
  }
}

/// Result type alias for slipway
pub type ReleaseResult<T> = Result<T, ReleaseError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ReleaseError>,
{
  fn context(self, ctx: impl Into<String>) -> ReleaseResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ReleaseResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ReleaseError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }
}
