//! `monoship release` end to end

use crate::helpers::{TestRepo, run_monoship, run_ok};
use anyhow::Result;

const BLUEPRINT: &str = r#"{
  "project": {"ci": {"targets": {"release": {"platforms": ["linux/amd64", "darwin/arm64"]}}}},
  "global": {"ci": {"tagging": {"aliases": {"cli": "tools/cli"}}}}
}"#;

fn repo_with_artifacts() -> Result<TestRepo> {
  let repo = TestRepo::new(BLUEPRINT)?;
  repo.add_artifact("dist", "linux/amd64")?;
  repo.add_artifact("dist", "darwin/arm64")?;
  Ok(repo)
}

#[test]
fn test_release_archives_and_uploads() -> Result<()> {
  let repo = repo_with_artifacts()?;

  let stdout = run_ok(
    &repo.path,
    &["--project", "tools/cli", "release", "--path", "dist", "--target", "release"],
    &[("GITHUB_REF", "refs/tags/cli/v1.2.0"), ("GITHUB_REPOSITORY", "acme/catalyst")],
  )?;
  assert!(stdout.contains("Released cli/v1.2.0 with 2 asset(s)"));

  let tar = repo.calls("tar")?;
  assert_eq!(tar.len(), 2);
  assert!(tar[0].ends_with("cli-linux_amd64.tar.gz ."));
  assert!(repo.path.join("cli-darwin_arm64.tar.gz").exists());

  let gh = repo.calls("gh")?;
  assert_eq!(gh[0], "release create cli/v1.2.0 --title cli/v1.2.0 --notes  --repo acme/catalyst");
  assert!(gh[1].starts_with("release upload cli/v1.2.0 "));
  assert!(gh[1].contains("cli-linux_amd64.tar.gz"));
  assert!(gh[2].contains("cli-darwin_arm64.tar.gz"));
  Ok(())
}

#[test]
fn test_repo_wide_prerelease() -> Result<()> {
  let repo = repo_with_artifacts()?;

  run_ok(
    &repo.path,
    &["release", "--path", "dist", "--target", "release"],
    &[("GITHUB_REF", "refs/tags/v2.0.0-rc.1"), ("GITHUB_REPOSITORY", "acme/catalyst")],
  )?;

  assert!(repo.path.join("catalyst-linux_amd64.tar.gz").exists());
  assert!(repo.calls("gh")?[0].contains("--prerelease"));
  Ok(())
}

#[test]
fn test_missing_artifact_fails_with_validation_code() -> Result<()> {
  let repo = TestRepo::new(BLUEPRINT)?;
  repo.add_artifact("dist", "linux/amd64")?;

  let output = run_monoship(
    &repo.path,
    &["--project", "tools/cli", "release", "--path", "dist", "--target", "release"],
    &[("GITHUB_REF", "refs/tags/cli/v1.2.0"), ("GITHUB_REPOSITORY", "acme/catalyst")],
  )?;

  assert_eq!(output.status.code(), Some(3));
  assert!(String::from_utf8_lossy(&output.stderr).contains("darwin/arm64"));
  assert!(repo.calls("tar")?.is_empty());
  assert!(repo.calls("gh")?.is_empty());
  Ok(())
}

#[test]
fn test_branch_run_releases_nothing() -> Result<()> {
  let repo = repo_with_artifacts()?;

  let stdout = run_ok(
    &repo.path,
    &["--project", "tools/cli", "release", "--path", "dist", "--target", "release"],
    &[("GITHUB_REF", "refs/heads/main")],
  )?;

  assert!(stdout.contains("No Git tag detected"));
  assert!(repo.calls("gh")?.is_empty());
  Ok(())
}

#[test]
fn test_release_dry_run() -> Result<()> {
  let repo = repo_with_artifacts()?;

  let stdout = run_ok(
    &repo.path,
    &["--project", "tools/cli", "release", "--path", "dist", "--target", "release", "--dry-run"],
    &[("GITHUB_REF", "refs/tags/cli/v1.2.0-beta.1")],
  )?;

  assert!(stdout.contains("release cli/v1.2.0-beta.1 (pre-release)"));
  assert!(stdout.contains("cli-darwin_arm64.tar.gz"));
  assert!(repo.calls("tar")?.is_empty());
  assert!(repo.calls("gh")?.is_empty());
  Ok(())
}
