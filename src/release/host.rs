//! Release hosting
//!
//! [`GhCli`] creates releases and uploads assets with the GitHub CLI, which
//! authenticates from `GH_TOKEN`/`GITHUB_TOKEN` in the inherited environment.

use crate::core::error::{ShipError, ShipResult, ToolError};
use std::path::Path;
use std::process::Command;

/// Where releases are created and assets uploaded
pub trait ReleaseHost {
  /// Create release `name` for existing git tag `tag`
  fn create_release(&self, tag: &str, name: &str, prerelease: bool) -> ShipResult<()>;

  /// Upload `asset` to the release of `tag`, named after its file name
  fn upload_asset(&self, tag: &str, asset: &Path) -> ShipResult<()>;
}

/// GitHub CLI backend
pub struct GhCli {
  bin: String,
  /// `owner/name`; `gh` infers it from the checkout when absent
  repository: Option<String>,
}

impl GhCli {
  pub fn new(bin: impl Into<String>, repository: Option<String>) -> Self {
    Self {
      bin: bin.into(),
      repository,
    }
  }

  fn run(&self, mut args: Vec<String>) -> ShipResult<()> {
    if let Some(repository) = &self.repository {
      args.push("--repo".to_string());
      args.push(repository.clone());
    }
    tracing::debug!(bin = %self.bin, args = %args.join(" "), "running gh");

    let output = Command::new(&self.bin).args(&args).output().map_err(|e| ToolError::NotFound {
      tool: self.bin.clone(),
      reason: e.to_string(),
    })?;

    if !output.status.success() {
      return Err(ShipError::Tool(ToolError::CommandFailed {
        tool: "gh".to_string(),
        command: format!("{} {}", self.bin, args.join(" ")),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }

    Ok(())
  }
}

impl ReleaseHost for GhCli {
  fn create_release(&self, tag: &str, name: &str, prerelease: bool) -> ShipResult<()> {
    let mut args: Vec<String> = ["release", "create", tag, "--title", name, "--notes", ""]
      .into_iter()
      .map(String::from)
      .collect();
    if prerelease {
      args.push("--prerelease".to_string());
    }
    self.run(args)
  }

  fn upload_asset(&self, tag: &str, asset: &Path) -> ShipResult<()> {
    self.run(vec![
      "release".to_string(),
      "upload".to_string(),
      tag.to_string(),
      asset.display().to_string(),
    ])
  }
}
