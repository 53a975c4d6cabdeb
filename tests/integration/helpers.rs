//! Test helpers for integration tests

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Variables a CI runner may have set that would leak into the binary
const CI_VARS: &[&str] = &[
  "GITHUB_ACTIONS",
  "GITHUB_REF",
  "GITHUB_SHA",
  "GITHUB_REPOSITORY",
  "MONOSHIP_PROJECT",
  "MONOSHIP_NATIVE_PLATFORM",
  "RUST_LOG",
];

/// A git repository with fake `forge`, `docker`, `gh` and `tar` wired in
/// through `monoship.toml`
pub struct TestRepo {
  _root: TempDir,
  pub path: PathBuf,
}

impl TestRepo {
  /// Create a repository with one commit and the given blueprint
  pub fn new(blueprint: &str) -> Result<Self> {
    let root = TempDir::new()?;
    let path = root.path().to_path_buf();

    git(&path, &["init", "--initial-branch=main"])?;
    git(&path, &["config", "user.name", "Test User"])?;
    git(&path, &["config", "user.email", "test@example.com"])?;

    let repo = Self { _root: root, path };
    repo.write(".tools/blueprint.json", blueprint)?;
    repo.write(".tools/images", "")?;

    let forge = repo.fake_tool(
      "forge",
      &format!("echo \"$@\" >> {log}\ncat {bp}\n", log = repo.log("forge"), bp = repo.tool_file("blueprint.json")),
    )?;
    // `image inspect` succeeds only for images listed in .tools/images.
    // MONOSHIP_FAIL_ON fails one push, MONOSHIP_FAIL_TAG_ON one tag destination.
    let docker = repo.fake_tool(
      "docker",
      &format!(
        "echo \"$@\" >> {log}\nif [ \"$1\" = image ]; then\n  for last; do :; done\n  grep -qx \"$last\" {images} || exit 1\n  echo sha256:0000\nfi\nif [ -n \"$MONOSHIP_FAIL_ON\" ] && [ \"$1\" = push ] && [ \"$2\" = \"$MONOSHIP_FAIL_ON\" ]; then\n  echo \"denied: $2\" >&2\n  exit 1\nfi\nif [ -n \"$MONOSHIP_FAIL_TAG_ON\" ] && [ \"$1\" = tag ] && [ \"$3\" = \"$MONOSHIP_FAIL_TAG_ON\" ]; then\n  echo \"No such image: $2\" >&2\n  exit 1\nfi\n",
        log = repo.log("docker"),
        images = repo.tool_file("images"),
      ),
    )?;
    let gh = repo.fake_tool("gh", &format!("echo \"$@\" >> {log}\n", log = repo.log("gh")))?;
    // tar -C <source> -czf <destination> .
    let tar = repo.fake_tool("tar", &format!("echo \"$@\" >> {log}\n: > \"$4\"\n", log = repo.log("tar")))?;

    repo.write(
      "monoship.toml",
      &format!(
        "[tools]\ndocker = \"{}\"\ngh = \"{}\"\ntar = \"{}\"\n\n[blueprint]\ncommand = \"{}\"\nargs = [\"dump\"]\n",
        docker.display(),
        gh.display(),
        tar.display(),
        forge.display()
      ),
    )?;

    git(&repo.path, &["add", "."])?;
    git(&repo.path, &["commit", "-m", "Initial commit"])?;

    Ok(repo)
  }

  /// Write a file relative to the repository root, creating parent directories
  pub fn write(&self, rel: &str, content: &str) -> Result<PathBuf> {
    let path = self.path.join(rel);
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)?;
    }
    std::fs::write(&path, content)?;
    Ok(path)
  }

  /// Mark local images as built
  pub fn add_images(&self, images: &[&str]) -> Result<()> {
    let mut list = images.join("\n");
    list.push('\n');
    self.write(".tools/images", &list)?;
    Ok(())
  }

  /// Create a non-empty artifact directory for `platform` under `dir`
  pub fn add_artifact(&self, dir: &str, platform: &str) -> Result<()> {
    self.write(&format!("{}/{}/app", dir, platform), "binary")?;
    Ok(())
  }

  /// Arguments of each recorded invocation of a fake tool
  pub fn calls(&self, tool: &str) -> Result<Vec<String>> {
    let path = self.path.join(".tools").join(format!("{}.log", tool));
    if !path.exists() {
      return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&path).with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(content.lines().map(String::from).collect())
  }

  /// Commit everything and tag HEAD
  pub fn tag_head(&self, tag: &str) -> Result<()> {
    git(&self.path, &["add", "."])?;
    git(&self.path, &["commit", "--allow-empty", "-m", "release"])?;
    git(&self.path, &["tag", "-a", tag, "-m", tag])?;
    Ok(())
  }

  pub fn head_sha(&self) -> Result<String> {
    let output = git(&self.path, &["rev-parse", "HEAD"])?;
    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
  }

  fn tool_file(&self, name: &str) -> String {
    self.path.join(".tools").join(name).display().to_string()
  }

  fn log(&self, tool: &str) -> String {
    self.tool_file(&format!("{}.log", tool))
  }

  fn fake_tool(&self, name: &str, body: &str) -> Result<PathBuf> {
    use std::os::unix::fs::PermissionsExt;

    let path = self.write(&format!(".tools/bin/{}", name), &format!("#!/bin/sh\n{}exit 0\n", body))?;
    std::fs::set_permissions(&path, std::fs::Permissions::from_mode(0o755))?;
    Ok(path)
  }
}

/// Run git command in a directory
pub fn git(cwd: &Path, args: &[&str]) -> Result<Output> {
  let output = Command::new("git")
    .current_dir(cwd)
    .args(args)
    .output()
    .context("Failed to run git command")?;

  if !output.status.success() {
    let stderr = String::from_utf8_lossy(&output.stderr);
    anyhow::bail!("Git command failed: git {}\n{}", args.join(" "), stderr);
  }

  Ok(output)
}

/// Run the monoship binary with a clean CI environment plus `envs`.
///
/// Returns the output whatever the exit status; callers assert on it.
pub fn run_monoship(cwd: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<Output> {
  let mut cmd = Command::new(env!("CARGO_BIN_EXE_monoship"));
  cmd.current_dir(cwd).args(args);
  for var in CI_VARS {
    cmd.env_remove(var);
  }
  cmd.envs(envs.iter().copied());

  cmd.output().context("Failed to run monoship")
}

/// Like [`run_monoship`], failing unless the command exits successfully
pub fn run_ok(cwd: &Path, args: &[&str], envs: &[(&str, &str)]) -> Result<String> {
  let output = run_monoship(cwd, args, envs)?;
  if !output.status.success() {
    anyhow::bail!(
      "monoship {} failed\nstdout: {}\nstderr: {}",
      args.join(" "),
      String::from_utf8_lossy(&output.stdout),
      String::from_utf8_lossy(&output.stderr)
    );
  }
  Ok(String::from_utf8_lossy(&output.stdout).to_string())
}
