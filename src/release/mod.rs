//! Release creation from build artifacts
//!
//! A release turns the per-platform output directories of a target into one
//! archive per platform and attaches them to a hosted release named after the
//! git tag:
//!
//! ```text
//! <path>/linux/amd64/...   ->  cli-linux_amd64.tar.gz  ┐
//! <path>/darwin/arm64/...  ->  cli-darwin_arm64.tar.gz ┴─> release "cli/v1.2.0"
//! ```
//!
//! # Architecture
//!
//! - **archive**: archive naming and the `tar` backend
//! - **host**: the release host trait and the `gh` backend
//! - this module: [`ReleasePlan`] and its execution

pub mod archive;
pub mod host;

pub use archive::{Archiver, TarArchiver, archive_name};
pub use host::{GhCli, ReleaseHost};

use crate::core::error::ShipResult;
use crate::platform::PlatformPlan;
use crate::tagging::monorepo::MonoTag;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// One archive to build and upload
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseAsset {
  pub platform: String,
  /// Platform output directory being archived
  pub source: PathBuf,
  /// Archive file written by the archiver
  pub archive: PathBuf,
}

/// Everything a release will do, in order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleasePlan {
  /// Full git tag, including any monorepo prefix
  pub tag: String,
  pub name: String,
  pub prerelease: bool,
  pub assets: Vec<ReleaseAsset>,
}

/// Whether the version segment of `tag` is a semver pre-release.
///
/// A leading `v` is ignored. Tags that are not semver are regular releases.
pub fn is_prerelease(tag: &str) -> bool {
  let version = MonoTag::parse(tag).map(|m| m.version).unwrap_or(tag);
  let version = version.strip_prefix('v').unwrap_or(version);
  semver::Version::parse(version).is_ok_and(|v| !v.pre.is_empty())
}

impl ReleasePlan {
  /// Plan archives of `base/<platform>` into `out_dir`, in platform order
  pub fn build(tag: &str, repo_name: &str, platforms: &PlatformPlan, base: &Path, out_dir: &Path) -> Self {
    let assets = platforms
      .iter()
      .map(|platform| ReleaseAsset {
        platform: platform.to_string(),
        source: base.join(platform),
        archive: out_dir.join(archive_name(tag, repo_name, platform)),
      })
      .collect();

    Self {
      tag: tag.to_string(),
      name: tag.to_string(),
      prerelease: is_prerelease(tag),
      assets,
    }
  }

  pub fn to_human_readable(&self) -> String {
    let mut output = String::new();
    output.push_str(&format!("📋 Plan: release {}", self.name));
    if self.prerelease {
      output.push_str(" (pre-release)");
    }
    output.push('\n');

    output.push_str(&format!("\n   Assets ({}):\n", self.assets.len()));
    for (i, asset) in self.assets.iter().enumerate() {
      output.push_str(&format!(
        "   {}. {} ← {}\n",
        i + 1,
        asset.archive.file_name().map(|n| n.to_string_lossy()).unwrap_or_default(),
        asset.source.display()
      ));
    }
    output
  }

  /// Build every archive, create the release, then upload archives in plan order.
  ///
  /// All archives are built before the release exists, so an archiving failure
  /// leaves nothing behind on the host.
  pub fn execute(&self, archiver: &dyn Archiver, host: &dyn ReleaseHost) -> ShipResult<()> {
    for asset in &self.assets {
      tracing::info!(archive = %asset.archive.display(), platform = %asset.platform, "creating archive");
      archiver.archive(&asset.source, &asset.archive)?;
    }

    tracing::info!(release = %self.name, prerelease = self.prerelease, "creating release");
    host.create_release(&self.tag, &self.name, self.prerelease)?;

    for asset in &self.assets {
      tracing::info!(asset = %asset.archive.display(), "uploading asset");
      host.upload_asset(&self.tag, &asset.archive)?;
    }

    Ok(())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::blueprint::TargetConfig;
  use crate::core::error::ShipError;
  use crate::platform::build_plan;
  use super::archive::testing::RecordingArchiver;
  use super::host::testing::{HostCall, RecordingHost};

  fn platforms(list: &[&str]) -> PlatformPlan {
    let target = TargetConfig {
      platforms: Some(list.iter().map(|p| p.to_string()).collect()),
    };
    build_plan(Some(&target), "linux/amd64")
  }

  #[test]
  fn test_prerelease_detection() {
    assert!(is_prerelease("v1.0.0-rc.1"));
    assert!(is_prerelease("cli/v2.0.0-beta"));
    assert!(is_prerelease("1.0.0-alpha"));
    assert!(!is_prerelease("v1.0.0"));
    assert!(!is_prerelease("cli/v1.0.0"));
    assert!(!is_prerelease("nightly"));
  }

  #[test]
  fn test_plan_archives_each_platform_directory() {
    let plan = ReleasePlan::build(
      "tools/cli/v1.2.0",
      "catalyst",
      &platforms(&["linux/amd64", "darwin/arm64"]),
      Path::new("out"),
      Path::new("."),
    );

    assert_eq!(plan.name, "tools/cli/v1.2.0");
    assert!(!plan.prerelease);
    assert_eq!(plan.assets[0].source, Path::new("out/linux/amd64"));
    assert_eq!(plan.assets[0].archive, Path::new("./tools-cli-linux_amd64.tar.gz"));
    assert_eq!(plan.assets[1].source, Path::new("out/darwin/arm64"));
    assert_eq!(plan.assets[1].archive, Path::new("./tools-cli-darwin_arm64.tar.gz"));
  }

  #[test]
  fn test_execute_order() {
    let plan = ReleasePlan::build(
      "v1.0.0-rc.1",
      "catalyst",
      &platforms(&["linux/amd64", "linux/arm64"]),
      Path::new("out"),
      Path::new("dist"),
    );
    let archiver = RecordingArchiver::default();
    let host = RecordingHost::default();
    plan.execute(&archiver, &host).unwrap();

    assert_eq!(archiver.archived().len(), 2);
    assert_eq!(
      host.calls(),
      vec![
        HostCall::Create {
          tag: "v1.0.0-rc.1".into(),
          name: "v1.0.0-rc.1".into(),
          prerelease: true
        },
        HostCall::Upload {
          tag: "v1.0.0-rc.1".into(),
          asset: "catalyst-linux_amd64.tar.gz".into()
        },
        HostCall::Upload {
          tag: "v1.0.0-rc.1".into(),
          asset: "catalyst-linux_arm64.tar.gz".into()
        },
      ]
    );
  }

  #[test]
  fn test_failed_create_uploads_nothing() {
    let plan = ReleasePlan::build("v1.0.0", "catalyst", &PlatformPlan::native("linux/amd64"), Path::new("out"), Path::new("."));
    let host = RecordingHost::failing_create();
    let err = plan.execute(&RecordingArchiver::default(), &host).unwrap_err();
    assert!(matches!(err, ShipError::Message { .. }));
    assert!(host.calls().is_empty());
  }

  #[test]
  fn test_human_readable_lists_assets() {
    let plan = ReleasePlan::build("cli/v1.0.0-rc.1", "catalyst", &PlatformPlan::native("linux/amd64"), Path::new("out"), Path::new("."));
    let text = plan.to_human_readable();
    assert!(text.contains("release cli/v1.0.0-rc.1 (pre-release)"));
    assert!(text.contains("cli-linux_amd64.tar.gz"));
  }
}
