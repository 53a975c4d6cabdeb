use crate::core::error::{ConfigError, ResultExt, ShipResult};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Settings for monoship
/// Searched in order: monoship.toml, .monoship.toml, .config/monoship.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Settings {
  #[serde(default)]
  pub tools: ToolsConfig,
  #[serde(default)]
  pub blueprint: BlueprintCommandConfig,
  #[serde(default)]
  pub publish: PublishConfig,
}

/// External binaries invoked by monoship
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ToolsConfig {
  #[serde(default = "default_docker")]
  pub docker: String,
  #[serde(default = "default_gh")]
  pub gh: String,
  #[serde(default = "default_tar")]
  pub tar: String,
  #[serde(default = "default_git")]
  pub git: String,
}

fn default_docker() -> String {
  "docker".to_string()
}

fn default_gh() -> String {
  "gh".to_string()
}

fn default_tar() -> String {
  "tar".to_string()
}

fn default_git() -> String {
  "git".to_string()
}

impl Default for ToolsConfig {
  fn default() -> Self {
    Self {
      docker: default_docker(),
      gh: default_gh(),
      tar: default_tar(),
      git: default_git(),
    }
  }
}

/// Command that dumps a project's blueprint as JSON
///
/// The project path is appended as the final argument.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct BlueprintCommandConfig {
  #[serde(default = "default_blueprint_command")]
  pub command: String,
  #[serde(default = "default_blueprint_args")]
  pub args: Vec<String>,
}

fn default_blueprint_command() -> String {
  "forge".to_string()
}

fn default_blueprint_args() -> Vec<String> {
  vec!["dump".to_string()]
}

impl Default for BlueprintCommandConfig {
  fn default() -> Self {
    Self {
      command: default_blueprint_command(),
      args: default_blueprint_args(),
    }
  }
}

/// Which tags a publish pushes
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum TagPolicy {
  /// The git tag when one applies, otherwise the generated tag
  #[default]
  GitOrGenerated,
  /// The git tag (if any) followed by the generated tag
  All,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PublishConfig {
  #[serde(default)]
  pub tag_policy: TagPolicy,

  /// Branch that publishes run on (tag refs always publish)
  #[serde(default = "default_branch")]
  pub default_branch: String,

  /// Separator between the base image name and the platform suffix of local handles
  #[serde(default = "default_image_suffix_separator")]
  pub image_suffix_separator: String,
}

fn default_branch() -> String {
  "main".to_string()
}

fn default_image_suffix_separator() -> String {
  "_".to_string()
}

impl Default for PublishConfig {
  fn default() -> Self {
    Self {
      tag_policy: TagPolicy::default(),
      default_branch: default_branch(),
      image_suffix_separator: default_image_suffix_separator(),
    }
  }
}

impl Settings {
  /// Find settings file in search order: monoship.toml, .monoship.toml, .config/monoship.toml
  pub fn find_path(dir: &Path) -> Option<PathBuf> {
    let candidates = [
      dir.join("monoship.toml"),
      dir.join(".monoship.toml"),
      dir.join(".config").join("monoship.toml"),
    ];

    candidates.into_iter().find(|p| p.exists())
  }

  /// Load settings, falling back to defaults when no file exists
  pub fn load(dir: &Path) -> ShipResult<Self> {
    let Some(path) = Self::find_path(dir) else {
      return Ok(Self::default());
    };

    let content =
      fs::read_to_string(&path).with_context(|| format!("Failed to read settings from {}", path.display()))?;
    let settings: Settings =
      toml_edit::de::from_str(&content).with_context(|| format!("Failed to parse settings from {}", path.display()))?;

    settings.validate(&path)?;
    tracing::debug!(path = %path.display(), "loaded settings");

    Ok(settings)
  }

  /// Validate settings loaded from `path`
  pub fn validate(&self, path: &Path) -> ShipResult<()> {
    let invalid = |reason: String| ConfigError::InvalidSettings {
      path: path.to_path_buf(),
      reason,
    };

    for (name, value) in [
      ("tools.docker", &self.tools.docker),
      ("tools.gh", &self.tools.gh),
      ("tools.tar", &self.tools.tar),
      ("tools.git", &self.tools.git),
      ("blueprint.command", &self.blueprint.command),
      ("publish.default_branch", &self.publish.default_branch),
    ] {
      if value.trim().is_empty() {
        return Err(invalid(format!("{} must not be empty", name)).into());
      }
    }

    if self.publish.image_suffix_separator.contains('/') || self.publish.image_suffix_separator.contains(':') {
      return Err(
        invalid(format!(
          "publish.image_suffix_separator '{}' must not contain '/' or ':'",
          self.publish.image_suffix_separator
        ))
        .into(),
      );
    }

    Ok(())
  }
}
