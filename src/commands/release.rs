//! `monoship release`: archive per-platform artifacts and publish a release

use super::plan::print_skipped;
use super::{Outcome, SkipReason, detect_git_tag, load_blueprint};
use crate::blueprint::BlueprintProvider;
use crate::core::context::RunContext;
use crate::core::error::{ConfigError, ShipResult};
use crate::platform::build_plan;
use crate::release::{Archiver, ReleaseHost, ReleasePlan};
use crate::tagging::GitTag;
use crate::tagging::monorepo::MonoTag;
use crate::validate::validate_release_artifacts;
use std::path::Path;

#[derive(Debug, Clone, Copy)]
pub struct ReleaseRequest<'a> {
  /// Directory holding one output folder per platform (`<path>/<os>/<arch>`)
  pub path: &'a Path,
  /// Blueprint target whose platforms are released
  pub target: Option<&'a str>,
  pub dry_run: bool,
}

/// Validate artifacts, resolve the tag, then archive and release.
pub fn release_project(
  ctx: &RunContext,
  provider: &dyn BlueprintProvider,
  archiver: &dyn Archiver,
  host: &dyn ReleaseHost,
  request: ReleaseRequest<'_>,
) -> ShipResult<Outcome<ReleasePlan>> {
  let blueprint = load_blueprint(ctx, provider)?;
  let target = request.target.and_then(|name| blueprint.target(name));
  let platforms = build_plan(target, &ctx.inputs.native_platform);

  let base = ctx.root.join(request.path);
  validate_release_artifacts(&platforms, &base)?;

  let tag = match detect_git_tag(ctx, &blueprint.aliases(), false) {
    GitTag::Applicable { tag } => tag,
    GitTag::NotApplicable { tag } => return Ok(Outcome::skipped(SkipReason::TagNotApplicable { tag })),
    GitTag::None => return Ok(Outcome::skipped(SkipReason::NoGitTag)),
  };

  // Only repo-wide tags need the repository name for their archive prefix
  let repo_name = match MonoTag::parse(&tag) {
    Some(_) => "",
    None => ctx.repository_name().ok_or_else(|| ConfigError::MissingInput {
      name: "repository".to_string(),
      env: Some("GITHUB_REPOSITORY".to_string()),
    })?,
  };

  let plan = ReleasePlan::build(&tag, repo_name, &platforms, &base, &ctx.root);
  if request.dry_run {
    tracing::info!(release = %plan.name, "dry run, nothing released");
  } else {
    plan.execute(archiver, host)?;
  }

  Ok(Outcome::Done(plan))
}

/// Run the release command
pub fn run_release(
  ctx: &RunContext,
  provider: &dyn BlueprintProvider,
  archiver: &dyn Archiver,
  host: &dyn ReleaseHost,
  request: ReleaseRequest<'_>,
) -> ShipResult<()> {
  let outcome = release_project(ctx, provider, archiver, host, request)?;

  match &outcome {
    Outcome::Done(plan) if request.dry_run => print!("{}", plan.to_human_readable()),
    Outcome::Done(plan) => println!("✅ Released {} with {} asset(s)", plan.name, plan.assets.len()),
    Outcome::Skipped(_) => print_skipped(&outcome, false)?,
  }

  Ok(())
}
