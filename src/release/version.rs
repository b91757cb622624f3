//! Version ordering rules for release validation
//!
//! Versions follow semver; a non-empty pre-release identifier (e.g.
//! `1.3.0-pre`) is the pre-release marker for the version currently under
//! development. A pre-release already reserves its own value as the next
//! release, so validation strips the marker from the current version before
//! comparing and accepts equality. Without the marker the requested version
//! must be strictly greater.

use crate::core::error::{ReleaseError, ReleaseResult};
use semver::{BuildMetadata, Prerelease, Version};

/// Parse a version string supplied on the command line
pub fn parse_requested(input: &str) -> ReleaseResult<Version> {
  input.parse::<Version>().map_err(|e| ReleaseError::InvalidArguments {
    message: format!("'{}' is not a valid version: {}", input, e),
  })
}

/// Whether this version carries the pre-release marker
pub fn is_pre_release(version: &Version) -> bool {
  !version.pre.is_empty()
}

/// The version with the pre-release marker removed
pub fn stripped(version: &Version) -> Version {
  let mut v = version.clone();
  v.pre = Prerelease::EMPTY;
  v.build = BuildMetadata::EMPTY;
  v
}

/// Validate that `requested` supersedes `current`
///
/// - current carries the marker: require `requested >= stripped(current)`
/// - current carries no marker: require `requested > current`
pub fn validate_bump(current: &Version, requested: &Version) -> ReleaseResult<()> {
  if is_pre_release(current) {
    let floor = stripped(current);
    if *requested >= floor {
      return Ok(());
    }
    Err(ReleaseError::InvalidVersionOrder {
      current: current.to_string(),
      requested: requested.to_string(),
      reason: format!("the pre-release already reserves {}", floor),
    })
  } else if requested > current {
    Ok(())
  } else {
    Err(ReleaseError::InvalidVersionOrder {
      current: current.to_string(),
      requested: requested.to_string(),
      reason: "a released version must be strictly superseded".to_string(),
    })
  }
}
