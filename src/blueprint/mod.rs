//! Blueprint schema and providers
//!
//! A blueprint is the merged project + global configuration of one project,
//! obtained as JSON from an external command (`forge dump <project>` by
//! default) or from a file. Every field is optional on the wire; callers turn
//! the snapshot into validated structures via [`crate::validate`].

mod provider;

pub use provider::{BlueprintProvider, CommandBlueprintProvider, FileBlueprintProvider};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Immutable configuration snapshot for one project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Blueprint {
  #[serde(default)]
  pub project: Option<ProjectBlueprint>,
  #[serde(default)]
  pub global: Option<GlobalBlueprint>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectBlueprint {
  /// Container image name published for this project
  #[serde(default)]
  pub container: Option<String>,
  #[serde(default)]
  pub ci: Option<ProjectCi>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectCi {
  #[serde(default)]
  pub targets: BTreeMap<String, TargetConfig>,
}

/// Per-target CI configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetConfig {
  /// Platforms to build and publish, in order
  #[serde(default)]
  pub platforms: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalBlueprint {
  #[serde(default)]
  pub ci: Option<GlobalCi>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalCi {
  #[serde(default)]
  pub registries: Option<Vec<String>>,
  #[serde(default)]
  pub tagging: Option<Tagging>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tagging {
  #[serde(default)]
  pub strategy: Option<String>,
  /// Declared tag path -> canonical project path
  #[serde(default)]
  pub aliases: BTreeMap<String, String>,
}

impl Blueprint {
  /// Parse a blueprint from JSON
  pub fn from_json(json: &str) -> serde_json::Result<Self> {
    serde_json::from_str(json)
  }

  pub fn container(&self) -> Option<&str> {
    self.project.as_ref()?.container.as_deref()
  }

  pub fn target(&self, name: &str) -> Option<&TargetConfig> {
    self.project.as_ref()?.ci.as_ref()?.targets.get(name)
  }

  pub fn registries(&self) -> Option<&[String]> {
    self.global_ci()?.registries.as_deref()
  }

  pub fn tagging_strategy(&self) -> Option<&str> {
    self.global_ci()?.tagging.as_ref()?.strategy.as_deref()
  }

  /// Tag aliases; empty when none are configured
  pub fn aliases(&self) -> BTreeMap<String, String> {
    self
      .global_ci()
      .and_then(|ci| ci.tagging.as_ref())
      .map(|t| t.aliases.clone())
      .unwrap_or_default()
  }

  fn global_ci(&self) -> Option<&GlobalCi> {
    self.global.as_ref()?.ci.as_ref()
  }
}
