//! `monoship tag` end to end

use crate::helpers::{TestRepo, run_monoship, run_ok};
use anyhow::Result;

const BLUEPRINT: &str = r#"{
  "project": {"container": "api"},
  "global": {"ci": {"registries": ["ghcr.io/acme"], "tagging": {"strategy": "commit", "aliases": {"api": "services/api"}}}}
}"#;

#[test]
fn test_tag_from_ci_ref() -> Result<()> {
  let repo = TestRepo::new(BLUEPRINT)?;

  let stdout = run_ok(
    &repo.path,
    &["tag", "--trim"],
    &[
      ("MONOSHIP_PROJECT", "services/api"),
      ("GITHUB_REF", "refs/tags/services/api/v1.0.0"),
      ("GITHUB_SHA", "abc123"),
    ],
  )?;

  assert_eq!(stdout.trim(), r#"{"generated":"abc123","git":"v1.0.0"}"#);
  assert_eq!(repo.calls("forge")?, vec!["dump services/api"]);
  Ok(())
}

#[test]
fn test_tag_alias_keeps_full_tag_untrimmed() -> Result<()> {
  let repo = TestRepo::new(BLUEPRINT)?;

  let stdout = run_ok(
    &repo.path,
    &["--project", "services/api", "--ref", "refs/tags/api/v2.1.0", "--sha", "abc123", "tag"],
    &[],
  )?;

  let output: serde_json::Value = serde_json::from_str(&stdout)?;
  assert_eq!(output["git"], "api/v2.1.0");
  Ok(())
}

#[test]
fn test_tag_falls_back_to_local_git() -> Result<()> {
  let repo = TestRepo::new(BLUEPRINT)?;
  repo.tag_head("services/api/v3.0.0")?;
  let head = repo.head_sha()?;

  let stdout = run_ok(&repo.path, &["--project", "services/api", "tag", "--trim"], &[])?;

  let output: serde_json::Value = serde_json::from_str(&stdout)?;
  assert_eq!(output["generated"], head.as_str());
  assert_eq!(output["git"], "v3.0.0");
  Ok(())
}

#[test]
fn test_tag_for_other_project_is_empty() -> Result<()> {
  let repo = TestRepo::new(BLUEPRINT)?;

  let stdout = run_ok(
    &repo.path,
    &["--project", "services/api", "tag"],
    &[("GITHUB_REF", "refs/tags/web/v1.0.0"), ("GITHUB_SHA", "abc123")],
  )?;

  let output: serde_json::Value = serde_json::from_str(&stdout)?;
  assert_eq!(output["git"], "");
  assert_eq!(output["generated"], "abc123");
  Ok(())
}

#[test]
fn test_unknown_strategy_is_a_user_error() -> Result<()> {
  let repo = TestRepo::new(
    r#"{"project": {"container": "api"}, "global": {"ci": {"tagging": {"strategy": "calendar"}}}}"#,
  )?;

  let output = run_monoship(&repo.path, &["tag"], &[("GITHUB_SHA", "abc123")])?;

  assert_eq!(output.status.code(), Some(1));
  assert!(output.stdout.is_empty());
  assert!(String::from_utf8_lossy(&output.stderr).contains("calendar"));
  Ok(())
}

#[test]
fn test_blueprint_file_flag_skips_command() -> Result<()> {
  let repo = TestRepo::new(BLUEPRINT)?;
  repo.write("alt.json", r#"{"global": {"ci": {"tagging": {"strategy": "commit"}}}}"#)?;

  let stdout = run_ok(&repo.path, &["--blueprint", "alt.json", "tag"], &[("GITHUB_SHA", "def456")])?;

  assert!(stdout.contains(r#""generated":"def456""#));
  assert!(repo.calls("forge")?.is_empty());
  Ok(())
}
