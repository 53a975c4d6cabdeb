//! Container engine access
//!
//! Publishing needs four engine operations: check that a local image exists,
//! tag it under a registry reference, push that reference, and create a
//! multi-platform manifest list from already pushed references.
//! [`SystemDocker`] implements them with the `docker` CLI. Registry
//! credentials come from the ambient docker config, so the subprocess keeps
//! the caller's environment.

use crate::core::error::{ShipError, ShipResult, ToolError};
use std::process::{Command, Output};

/// Operations the publisher performs against a container engine
pub trait ContainerEngine {
  /// Whether `image` is present in the local image store
  fn image_exists(&self, image: &str) -> ShipResult<bool>;

  /// Tag local image `source` as `destination`
  fn tag(&self, source: &str, destination: &str) -> ShipResult<()>;

  /// Push `destination` to its registry
  fn push(&self, destination: &str) -> ShipResult<()>;

  /// Create and push a manifest list `destination` over pushed `legs`, in order
  fn create_manifest(&self, destination: &str, legs: &[String]) -> ShipResult<()>;
}

/// Docker CLI backend
pub struct SystemDocker {
  bin: String,
}

impl SystemDocker {
  pub fn new(bin: impl Into<String>) -> Self {
    Self { bin: bin.into() }
  }

  fn output(&self, args: &[&str]) -> ShipResult<Output> {
    tracing::debug!(bin = %self.bin, args = %args.join(" "), "running container engine");
    Command::new(&self.bin).args(args).output().map_err(|e| {
      ShipError::Tool(ToolError::NotFound {
        tool: self.bin.clone(),
        reason: e.to_string(),
      })
    })
  }

  fn run(&self, args: &[&str]) -> ShipResult<()> {
    let output = self.output(args)?;
    if !output.status.success() {
      return Err(ShipError::Tool(ToolError::CommandFailed {
        tool: "docker".to_string(),
        command: format!("{} {}", self.bin, args.join(" ")),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }
    Ok(())
  }
}

impl ContainerEngine for SystemDocker {
  fn image_exists(&self, image: &str) -> ShipResult<bool> {
    // Non-zero exit means "no such image"; only a spawn failure is an error
    let output = self.output(&["image", "inspect", "--format", "{{.Id}}", image])?;
    Ok(output.status.success())
  }

  fn tag(&self, source: &str, destination: &str) -> ShipResult<()> {
    self.run(&["tag", source, destination])
  }

  fn push(&self, destination: &str) -> ShipResult<()> {
    self.run(&["push", destination])
  }

  fn create_manifest(&self, destination: &str, legs: &[String]) -> ShipResult<()> {
    let mut args = vec!["buildx", "imagetools", "create", "--tag", destination];
    args.extend(legs.iter().map(String::as_str));
    self.run(&args)
  }
}
