//! System git backend
//!
//! Only two questions are ever asked of git: which commit is checked out, and
//! which tag (if any) points at it. Both are answered with plumbing commands run
//! through an isolated `git` subprocess.

use crate::core::error::{ShipError, ShipResult, ToolError};
use std::path::{Path, PathBuf};
use std::process::Command;

/// Git backend using system git
pub struct SystemGit {
  /// git binary to invoke
  git_bin: String,

  /// Repository working directory
  pub(crate) repo_path: PathBuf,
}

impl SystemGit {
  /// Open a git repository
  ///
  /// This performs ONE subprocess call to verify the path is inside a work tree.
  pub fn open(path: &Path, git_bin: &str) -> ShipResult<Self> {
    let git = Self {
      git_bin: git_bin.to_string(),
      repo_path: path.to_path_buf(),
    };

    git.run(&["rev-parse", "--show-toplevel"])?;
    Ok(git)
  }

  /// Get HEAD commit SHA
  pub fn head_commit(&self) -> ShipResult<String> {
    self.run(&["rev-parse", "HEAD"])
  }

  /// Tags pointing at HEAD, annotated tags first, each group sorted by name
  pub fn tags_at_head(&self) -> ShipResult<Vec<String>> {
    let stdout = self.run(&[
      "for-each-ref",
      "--points-at=HEAD",
      "--format=%(objecttype) %(refname:strip=2)",
      "refs/tags",
    ])?;

    Ok(order_tags(&stdout))
  }

  fn run(&self, args: &[&str]) -> ShipResult<String> {
    let output = self.git_cmd().args(args).output().map_err(|e| ToolError::NotFound {
      tool: self.git_bin.clone(),
      reason: e.to_string(),
    })?;

    if !output.status.success() {
      let stderr = String::from_utf8_lossy(&output.stderr);
      return Err(ShipError::Tool(ToolError::CommandFailed {
        tool: "git".to_string(),
        command: format!("git {}", args.join(" ")),
        stderr: stderr.to_string(),
      }));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  /// Create a safe git command with isolated environment
  ///
  /// - Sets working directory to repo path
  /// - Clears environment variables
  /// - Whitelists only PATH and HOME
  pub(crate) fn git_cmd(&self) -> Command {
    let mut cmd = Command::new(&self.git_bin);

    cmd.arg("-C").arg(&self.repo_path);

    // Isolated environment (don't trust global config)
    cmd.env_clear();
    if let Ok(path) = std::env::var("PATH") {
      cmd.env("PATH", path);
    }
    if let Ok(home) = std::env::var("HOME") {
      cmd.env("HOME", home);
    }

    cmd.arg("-c").arg("core.quotePath=false");

    cmd
  }
}

/// Order `for-each-ref` output so annotated tags win over lightweight ones
fn order_tags(stdout: &str) -> Vec<String> {
  let mut annotated = Vec::new();
  let mut lightweight = Vec::new();

  for line in stdout.lines() {
    let Some((kind, name)) = line.trim().split_once(' ') else {
      continue;
    };
    if kind == "tag" {
      annotated.push(name.to_string());
    } else {
      lightweight.push(name.to_string());
    }
  }

  annotated.sort();
  lightweight.sort();
  annotated.extend(lightweight);
  annotated
}
