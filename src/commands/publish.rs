//! `monoship publish`: tag and push the project's images

use super::plan::{PublishRequest, prepare_publish, print_skipped};
use super::{Outcome, SkipReason, load_blueprint};
use crate::blueprint::BlueprintProvider;
use crate::core::context::RunContext;
use crate::core::error::ShipResult;
use crate::docker::ContainerEngine;
use crate::publish::{self, PublishPlan, PublishReport};
use crate::tagging::{StrategyRegistry, parse_branch_ref, parse_tag_ref};
use crate::ui::progress::PublishProgress;

#[derive(Debug, Clone, Copy, Default)]
pub struct PublishOptions {
  pub skip_branch_check: bool,
  pub dry_run: bool,
  pub json: bool,
}

/// Result of a publish: executed, or planned only
#[derive(Debug, Clone, serde::Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum PublishResult {
  Published { report: PublishReport },
  DryRun { plan: PublishPlan },
}

/// Whether `git_ref` may publish: a tag, or the default branch
pub fn on_release_ref(git_ref: Option<&str>, default_branch: &str) -> bool {
  let Some(git_ref) = git_ref else {
    return false;
  };
  parse_tag_ref(git_ref).is_some() || parse_branch_ref(git_ref) == Some(default_branch)
}

/// Plan and (unless dry-running) execute a publish.
pub fn publish_project(
  ctx: &RunContext,
  provider: &dyn BlueprintProvider,
  strategies: &StrategyRegistry,
  engine: &dyn ContainerEngine,
  request: PublishRequest<'_>,
  options: PublishOptions,
) -> ShipResult<Outcome<PublishResult>> {
  let git_ref = ctx.inputs.git_ref.as_deref();
  if !options.skip_branch_check && !on_release_ref(git_ref, &ctx.settings.publish.default_branch) {
    return Ok(Outcome::skipped(SkipReason::NotReleaseBranch {
      git_ref: git_ref.map(String::from),
    }));
  }

  let blueprint = load_blueprint(ctx, provider)?;
  let plan = match prepare_publish(ctx, &blueprint, strategies, request)? {
    Outcome::Done(plan) => plan,
    Outcome::Skipped(reason) => return Ok(Outcome::Skipped(reason)),
  };

  if options.dry_run {
    // Read-only, so dry runs still catch a missing image
    publish::check_images(engine, &plan.handles)?;
    tracing::info!(plan = %plan.id, references = plan.references().len(), "dry run, nothing pushed");
    return Ok(Outcome::Done(PublishResult::DryRun { plan }));
  }

  let steps = plan.operations().len();
  let mut progress = if options.json {
    None
  } else {
    PublishProgress::for_terminal(steps, format!("Publishing {}", plan.container))
  };

  let report = publish::execute(engine, &plan, progress.as_mut())?;
  Ok(Outcome::Done(PublishResult::Published { report }))
}

/// Run the publish command
pub fn run_publish(
  ctx: &RunContext,
  provider: &dyn BlueprintProvider,
  strategies: &StrategyRegistry,
  engine: &dyn ContainerEngine,
  request: PublishRequest<'_>,
  options: PublishOptions,
) -> ShipResult<()> {
  let outcome = publish_project(ctx, provider, strategies, engine, request, options)?;

  match &outcome {
    Outcome::Done(result) if options.json => println!("{}", serde_json::to_string_pretty(result)?),
    Outcome::Done(PublishResult::DryRun { plan }) => print!("{}", plan.to_human_readable()),
    Outcome::Done(PublishResult::Published { report }) => print!("{}", report.to_human_readable()),
    Outcome::Skipped(_) => print_skipped(&outcome, options.json)?,
  }

  Ok(())
}
