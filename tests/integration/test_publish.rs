//! `monoship plan` and `monoship publish` end to end

use crate::helpers::{TestRepo, run_monoship, run_ok};
use anyhow::Result;

const BLUEPRINT: &str = r#"{
  "project": {"container": "api", "ci": {"targets": {"docker": {"platforms": ["linux/amd64", "linux/arm64"]}}}},
  "global": {"ci": {"registries": ["ghcr.io/acme", "registry.example.com"], "tagging": {"strategy": "commit"}}}
}"#;

const TAG_RUN: &[(&str, &str)] = &[
  ("MONOSHIP_PROJECT", "services/api"),
  ("GITHUB_REF", "refs/tags/services/api/v1.0.0"),
  ("GITHUB_SHA", "abc123"),
];

fn repo_with_images() -> Result<TestRepo> {
  let repo = TestRepo::new(BLUEPRINT)?;
  repo.add_images(&["app_linux_amd64", "app_linux_arm64"])?;
  Ok(repo)
}

#[test]
fn test_publish_fans_out_in_order() -> Result<()> {
  let repo = repo_with_images()?;

  let stdout = run_ok(&repo.path, &["publish", "--image", "app", "--target", "docker"], TAG_RUN)?;
  assert!(stdout.contains("Published 2 reference(s)"));

  let g = "ghcr.io/acme/api:v1.0.0";
  let r = "registry.example.com/api:v1.0.0";
  assert_eq!(
    repo.calls("docker")?,
    vec![
      "image inspect --format {{.Id}} app_linux_amd64".to_string(),
      "image inspect --format {{.Id}} app_linux_arm64".to_string(),
      format!("tag app_linux_amd64 {g}_linux_amd64"),
      format!("push {g}_linux_amd64"),
      format!("tag app_linux_arm64 {g}_linux_arm64"),
      format!("push {g}_linux_arm64"),
      format!("buildx imagetools create --tag {g} {g}_linux_amd64 {g}_linux_arm64"),
      format!("tag app_linux_amd64 {r}_linux_amd64"),
      format!("push {r}_linux_amd64"),
      format!("tag app_linux_arm64 {r}_linux_arm64"),
      format!("push {r}_linux_arm64"),
      format!("buildx imagetools create --tag {r} {r}_linux_amd64 {r}_linux_arm64"),
    ]
  );
  Ok(())
}

#[test]
fn test_publish_json_report() -> Result<()> {
  let repo = repo_with_images()?;

  let stdout = run_ok(&repo.path, &["publish", "--image", "app", "--target", "docker", "--json"], TAG_RUN)?;

  let output: serde_json::Value = serde_json::from_str(&stdout)?;
  assert_eq!(output["status"], "done");
  assert_eq!(output["result"]["mode"], "published");
  assert_eq!(
    output["result"]["report"]["manifests"],
    serde_json::json!(["ghcr.io/acme/api:v1.0.0", "registry.example.com/api:v1.0.0"])
  );
  Ok(())
}

#[test]
fn test_missing_image_fails_before_pushing() -> Result<()> {
  let repo = TestRepo::new(BLUEPRINT)?;
  repo.add_images(&["app_linux_amd64"])?;

  let output = run_monoship(&repo.path, &["publish", "--image", "app", "--target", "docker"], TAG_RUN)?;

  assert_eq!(output.status.code(), Some(3));
  assert!(String::from_utf8_lossy(&output.stderr).contains("app_linux_arm64"));
  assert!(repo.calls("docker")?.iter().all(|call| call.starts_with("image inspect")));
  Ok(())
}

#[test]
fn test_push_failure_reports_completed_references() -> Result<()> {
  let repo = repo_with_images()?;
  let mut envs = TAG_RUN.to_vec();
  envs.push(("MONOSHIP_FAIL_ON", "registry.example.com/api:v1.0.0_linux_amd64"));

  let output = run_monoship(&repo.path, &["publish", "--image", "app", "--target", "docker"], &envs)?;

  assert_eq!(output.status.code(), Some(2));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("push registry.example.com/api:v1.0.0_linux_amd64"));
  assert!(stderr.contains("ghcr.io/acme/api:v1.0.0_linux_arm64"));

  let calls = repo.calls("docker")?;
  assert_eq!(calls.last().map(String::as_str), Some("push registry.example.com/api:v1.0.0_linux_amd64"));
  Ok(())
}

#[test]
fn test_tag_failure_stops_before_pushing_the_leg() -> Result<()> {
  let repo = repo_with_images()?;
  let mut envs = TAG_RUN.to_vec();
  envs.push(("MONOSHIP_FAIL_TAG_ON", "ghcr.io/acme/api:v1.0.0_linux_arm64"));

  let output = run_monoship(&repo.path, &["publish", "--image", "app", "--target", "docker"], &envs)?;

  assert_eq!(output.status.code(), Some(2));
  let stderr = String::from_utf8_lossy(&output.stderr);
  assert!(stderr.contains("tag app_linux_arm64 ghcr.io/acme/api:v1.0.0_linux_arm64"));
  assert!(stderr.contains("ghcr.io/acme/api:v1.0.0_linux_amd64"));

  let calls = repo.calls("docker")?;
  assert_eq!(
    calls.last().map(String::as_str),
    Some("tag app_linux_arm64 ghcr.io/acme/api:v1.0.0_linux_arm64")
  );
  assert!(!calls.iter().any(|call| call.contains("registry.example.com")));
  Ok(())
}

#[test]
fn test_feature_branch_publishes_nothing() -> Result<()> {
  let repo = repo_with_images()?;

  let stdout = run_ok(
    &repo.path,
    &["--project", "services/api", "publish", "--image", "app", "--target", "docker"],
    &[("GITHUB_REF", "refs/heads/feature/login"), ("GITHUB_SHA", "abc123")],
  )?;

  assert!(stdout.contains("Nothing to do"));
  assert!(repo.calls("docker")?.is_empty());
  Ok(())
}

#[test]
fn test_incomplete_blueprint_skips_with_annotation() -> Result<()> {
  let repo = TestRepo::new(r#"{"project": {"container": "api"}, "global": {"ci": {"tagging": {"strategy": "commit"}}}}"#)?;

  let output = run_monoship(
    &repo.path,
    &["publish", "--image", "app"],
    &[("GITHUB_REF", "refs/heads/main"), ("GITHUB_SHA", "abc123"), ("GITHUB_ACTIONS", "true")],
  )?;

  assert!(output.status.success());
  assert!(String::from_utf8_lossy(&output.stderr).contains("::warning::"));
  assert!(repo.calls("docker")?.is_empty());
  Ok(())
}

#[test]
fn test_dry_run_only_inspects() -> Result<()> {
  let repo = repo_with_images()?;

  let stdout = run_ok(
    &repo.path,
    &["publish", "--image", "app", "--target", "docker", "--dry-run"],
    TAG_RUN,
  )?;

  assert!(stdout.contains("Operations (10)"));
  assert_eq!(repo.calls("docker")?.len(), 2);
  Ok(())
}

#[test]
fn test_plan_json_never_calls_docker() -> Result<()> {
  let repo = TestRepo::new(BLUEPRINT)?;

  let stdout = run_ok(
    &repo.path,
    &["plan", "--image", "app", "--target", "docker", "--json"],
    &[("MONOSHIP_PROJECT", "services/api"), ("GITHUB_REF", "refs/heads/main"), ("GITHUB_SHA", "abc123")],
  )?;

  let plan: serde_json::Value = serde_json::from_str(&stdout)?;
  assert_eq!(plan["groups"][0]["manifest"], "ghcr.io/acme/api:abc123");
  assert!(repo.calls("docker")?.is_empty());
  Ok(())
}
