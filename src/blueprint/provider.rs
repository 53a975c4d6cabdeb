use super::Blueprint;
use crate::core::config::BlueprintCommandConfig;
use crate::core::error::{ConfigError, ShipError, ShipResult, ToolError};
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

/// Source of project blueprints
pub trait BlueprintProvider {
  /// Load the blueprint for the project at `project` (relative to the repository root)
  fn blueprint(&self, project: &str) -> ShipResult<Blueprint>;
}

/// Runs an external command that prints the blueprint as JSON
pub struct CommandBlueprintProvider {
  command: String,
  args: Vec<String>,
  cwd: PathBuf,
}

impl CommandBlueprintProvider {
  pub fn new(config: &BlueprintCommandConfig, cwd: &Path) -> Self {
    Self {
      command: config.command.clone(),
      args: config.args.clone(),
      cwd: cwd.to_path_buf(),
    }
  }
}

impl BlueprintProvider for CommandBlueprintProvider {
  fn blueprint(&self, project: &str) -> ShipResult<Blueprint> {
    // The command expects a path; the repository root is "."
    let target = if project.is_empty() { "." } else { project };
    tracing::debug!(command = %self.command, project = target, "loading blueprint");

    let output = Command::new(&self.command)
      .current_dir(&self.cwd)
      .args(&self.args)
      .arg(target)
      .output()
      .map_err(|e| ToolError::NotFound {
        tool: self.command.clone(),
        reason: e.to_string(),
      })?;

    if !output.status.success() {
      return Err(ShipError::Tool(ToolError::CommandFailed {
        tool: self.command.clone(),
        command: format!("{} {} {}", self.command, self.args.join(" "), target),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }

    let stdout = String::from_utf8(output.stdout)?;
    Blueprint::from_json(&stdout).map_err(|e| {
      ShipError::Config(ConfigError::Blueprint {
        project: target.to_string(),
        message: format!("invalid blueprint JSON: {}", e),
      })
    })
  }
}

/// Reads a blueprint JSON file, ignoring the project argument
pub struct FileBlueprintProvider {
  path: PathBuf,
}

impl FileBlueprintProvider {
  pub fn new(path: impl Into<PathBuf>) -> Self {
    Self { path: path.into() }
  }
}

impl BlueprintProvider for FileBlueprintProvider {
  fn blueprint(&self, project: &str) -> ShipResult<Blueprint> {
    let content = fs::read_to_string(&self.path).map_err(|e| {
      ShipError::Config(ConfigError::Blueprint {
        project: project.to_string(),
        message: format!("failed to read {}: {}", self.path.display(), e),
      })
    })?;

    Blueprint::from_json(&content).map_err(|e| {
      ShipError::Config(ConfigError::Blueprint {
        project: project.to_string(),
        message: format!("invalid blueprint JSON in {}: {}", self.path.display(), e),
      })
    })
  }
}
