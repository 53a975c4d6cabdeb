//! Run context - build once, pass everywhere
//!
//! `RunContext` gathers everything a command reads from its environment: the
//! CI inputs (project, git ref, commit, repository, native platform) and the
//! settings file. `main.rs` builds it once and hands it to commands by
//! reference; nothing downstream reads environment variables directly.

use crate::core::config::Settings;
use crate::core::error::ShipResult;
use crate::platform;
use crate::utils::normalize_project_path;
use std::path::{Path, PathBuf};

/// Inputs describing the triggering CI event
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiInputs {
  /// Project path relative to the repository root, normalised
  pub project: String,

  /// Raw git ref (`refs/tags/...` or `refs/heads/...`)
  pub git_ref: Option<String>,

  /// Commit SHA of the run
  pub sha: Option<String>,

  /// `owner/name` of the hosting repository
  pub repository: Option<String>,

  /// Native `os/arch` platform of the runner
  pub native_platform: String,
}

/// Shared, read-only state for one monoship invocation
#[derive(Debug, Clone)]
pub struct RunContext {
  /// Working directory (repository root in CI)
  pub root: PathBuf,

  /// CI inputs
  pub inputs: CiInputs,

  /// Settings (monoship.toml or defaults)
  pub settings: Settings,
}

impl RunContext {
  /// Build the context for `root`, loading settings from it.
  ///
  /// Empty strings count as absent so that unset CI variables exported as ""
  /// behave like missing ones.
  pub fn build(
    root: &Path,
    project: &str,
    git_ref: Option<String>,
    sha: Option<String>,
    repository: Option<String>,
    native_platform: Option<String>,
  ) -> ShipResult<Self> {
    let settings = Settings::load(root)?;
    let native_platform = non_empty(native_platform).unwrap_or_else(platform::native_platform);

    Ok(Self {
      root: root.to_path_buf(),
      inputs: CiInputs {
        project: normalize_project_path(project),
        git_ref: non_empty(git_ref),
        sha: non_empty(sha),
        repository: non_empty(repository),
        native_platform,
      },
      settings,
    })
  }

  /// Repository name without the owner, if known
  pub fn repository_name(&self) -> Option<&str> {
    self
      .inputs
      .repository
      .as_deref()
      .map(|full| full.rsplit('/').next().unwrap_or(full))
  }
}

fn non_empty(value: Option<String>) -> Option<String> {
  value.filter(|v| !v.trim().is_empty())
}
