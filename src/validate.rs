//! Publish and release preconditions
//!
//! The blueprint's optional publish fields are checked once here and turned
//! into a [`PublishTarget`] whose fields are all present. An incomplete
//! blueprint is reported as an [`Incomplete`] reason, which callers treat as a
//! skip rather than a failure. Release artifact checks, by contrast, are fatal.

use crate::blueprint::Blueprint;
use crate::core::error::{ArtifactProblem, ResultExt, ShipResult, ValidationError};
use crate::platform::PlatformPlan;
use std::collections::BTreeMap;
use std::fmt;
use std::fs;
use std::path::Path;

/// Why a blueprint cannot be published
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Incomplete {
  ContainerUndefined,
  RegistriesUndefined,
  StrategyUndefined,
}

impl fmt::Display for Incomplete {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Incomplete::ContainerUndefined => write!(f, "the project does not have a container defined"),
      Incomplete::RegistriesUndefined => write!(f, "the repository does not have any container registries defined"),
      Incomplete::StrategyUndefined => write!(f, "the repository does not have a tagging strategy defined"),
    }
  }
}

/// Publish configuration with every required field present
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishTarget {
  pub container: String,
  pub registries: Vec<String>,
  /// Present whenever the strategy was required
  pub strategy: Option<String>,
  pub aliases: BTreeMap<String, String>,
}

/// Check that `blueprint` defines everything a publish needs.
///
/// Checks run in order: container, registries (absent or empty), then the
/// tagging strategy when `require_strategy` is set. The first gap wins.
pub fn validate_publishable(blueprint: &Blueprint, require_strategy: bool) -> Result<PublishTarget, Incomplete> {
  let container = blueprint
    .container()
    .filter(|c| !c.trim().is_empty())
    .ok_or(Incomplete::ContainerUndefined)?;

  let registries = blueprint
    .registries()
    .filter(|r| !r.is_empty())
    .ok_or(Incomplete::RegistriesUndefined)?;

  let strategy = blueprint.tagging_strategy().filter(|s| !s.trim().is_empty());
  if require_strategy && strategy.is_none() {
    return Err(Incomplete::StrategyUndefined);
  }

  Ok(PublishTarget {
    container: container.to_string(),
    registries: registries.to_vec(),
    strategy: strategy.map(String::from),
    aliases: blueprint.aliases(),
  })
}

/// Check that every planned platform has a non-empty output directory.
///
/// Platforms are checked in plan order and the first violation is returned;
/// later platforms are not inspected.
pub fn validate_release_artifacts(plan: &PlatformPlan, base: &Path) -> ShipResult<()> {
  for platform in plan.iter() {
    tracing::info!(platform, "validating artifacts");
    let dir = base.join(platform);

    if !dir.is_dir() {
      return Err(
        ValidationError::ArtifactMissing {
          platform: platform.to_string(),
          path: dir,
          problem: ArtifactProblem::Missing,
        }
        .into(),
      );
    }

    let mut entries = fs::read_dir(&dir).with_context(|| format!("Failed to read output folder {}", dir.display()))?;
    if entries.next().is_none() {
      return Err(
        ValidationError::ArtifactMissing {
          platform: platform.to_string(),
          path: dir,
          problem: ArtifactProblem::Empty,
        }
        .into(),
      );
    }
  }

  Ok(())
}
