//! Platform plans
//!
//! A [`PlatformPlan`] is the ordered list of `os/arch` platforms a run acts on.
//! Its order is the iteration order of every downstream fan-out (image legs,
//! artifact checks, archives), so it is kept exactly as declared.

use crate::blueprint::TargetConfig;
use serde::Serialize;

/// Where a plan's platforms came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanSource {
  /// Declared by the target configuration
  Declared,
  /// Fallback to the runner's native platform
  Native,
}

/// Ordered, non-empty list of platform identifiers
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlatformPlan {
  platforms: Vec<String>,
  source: PlanSource,
}

impl PlatformPlan {
  /// Plan for a single native platform
  pub fn native(platform: impl Into<String>) -> Self {
    Self {
      platforms: vec![platform.into()],
      source: PlanSource::Native,
    }
  }

  /// Whether images are published as per-platform legs joined by a manifest list.
  ///
  /// Any declared platform list counts, even a single entry; only the native
  /// fallback publishes a plain image.
  pub fn is_multi_platform(&self) -> bool {
    self.source == PlanSource::Declared
  }

  pub fn iter(&self) -> impl Iterator<Item = &str> {
    self.platforms.iter().map(String::as_str)
  }
}

/// Build the platform plan for a target
///
/// Declared platforms are returned verbatim and in order; an absent target,
/// absent list or empty list falls back to `[native]`.
pub fn build_plan(target: Option<&TargetConfig>, native: &str) -> PlatformPlan {
  match target.and_then(|t| t.platforms.as_ref()) {
    Some(platforms) if !platforms.is_empty() => {
      tracing::info!(platforms = %platforms.join(", "), "detected multi-platform target");
      PlatformPlan {
        platforms: platforms.clone(),
        source: PlanSource::Declared,
      }
    }
    _ => {
      tracing::debug!(platform = native, "using native platform");
      PlatformPlan::native(native)
    }
  }
}

/// The `os/arch` platform of the running binary, in container-platform naming
pub fn native_platform() -> String {
  format!("{}/{}", docker_os(std::env::consts::OS), docker_arch(std::env::consts::ARCH))
}

fn docker_os(os: &str) -> &str {
  match os {
    "macos" => "darwin",
    other => other,
  }
}

fn docker_arch(arch: &str) -> &str {
  match arch {
    "x86_64" => "amd64",
    "aarch64" => "arm64",
    "x86" => "386",
    "arm" => "arm",
    "powerpc64" => "ppc64le",
    other => other,
  }
}
