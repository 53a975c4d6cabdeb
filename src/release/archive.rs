//! Release archives
//!
//! Each platform's output directory becomes one gzipped tarball whose entries
//! are relative to that directory.

use crate::core::error::{ShipError, ShipResult, ToolError};
use crate::tagging::monorepo::MonoTag;
use crate::utils::platform_suffix;
use std::path::Path;
use std::process::Command;

/// `<prefix>-<os>_<arch>.tar.gz`
///
/// The prefix is the tag's declared project path with every `/` turned into
/// `-` for monorepo tags, and `repo_name` for repo-wide tags.
pub fn archive_name(tag: &str, repo_name: &str, platform: &str) -> String {
  let prefix = match MonoTag::parse(tag) {
    Some(mono) => mono.path.replace('/', "-"),
    None => repo_name.to_string(),
  };
  format!("{}-{}.tar.gz", prefix, platform_suffix(platform))
}

/// Packs a directory into an archive
pub trait Archiver {
  /// Archive the contents of `source` into `destination`
  fn archive(&self, source: &Path, destination: &Path) -> ShipResult<()>;
}

/// `tar -C <source> -czf <destination> .`
pub struct TarArchiver {
  bin: String,
}

impl TarArchiver {
  pub fn new(bin: impl Into<String>) -> Self {
    Self { bin: bin.into() }
  }
}

impl Archiver for TarArchiver {
  fn archive(&self, source: &Path, destination: &Path) -> ShipResult<()> {
    tracing::debug!(source = %source.display(), destination = %destination.display(), "archiving");

    let output = Command::new(&self.bin)
      .arg("-C")
      .arg(source)
      .arg("-czf")
      .arg(destination)
      .arg(".")
      .output()
      .map_err(|e| ToolError::NotFound {
        tool: self.bin.clone(),
        reason: e.to_string(),
      })?;

    if !output.status.success() {
      return Err(ShipError::Tool(ToolError::CommandFailed {
        tool: "tar".to_string(),
        command: format!("{} -C {} -czf {} .", self.bin, source.display(), destination.display()),
        stderr: String::from_utf8_lossy(&output.stderr).to_string(),
      }));
    }

    Ok(())
  }
}
