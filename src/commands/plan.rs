//! `monoship plan`: the ordered publish plan, without touching a registry

use super::{Outcome, SkipReason, detect_git_tag, load_blueprint};
use crate::blueprint::{Blueprint, BlueprintProvider};
use crate::core::context::RunContext;
use crate::core::error::ShipResult;
use crate::platform::build_plan;
use crate::publish::{PublishPlan, image_handles};
use crate::tagging::{GitTag, StrategyRegistry, tag_set};
use crate::validate::validate_publishable;

/// What to publish
#[derive(Debug, Clone, Copy)]
pub struct PublishRequest<'a> {
  /// Base name of the locally built image(s)
  pub image: &'a str,
  /// Blueprint target whose platforms are published
  pub target: Option<&'a str>,
}

/// Turn the blueprint and run context into a publish plan.
///
/// Steps, in order: blueprint completeness (skip), tagging strategy lookup
/// (fatal when unknown), git tag applicability (skip), tag set, platform plan,
/// image handles, fan-out.
pub fn prepare_publish(
  ctx: &RunContext,
  blueprint: &Blueprint,
  strategies: &StrategyRegistry,
  request: PublishRequest<'_>,
) -> ShipResult<Outcome<PublishPlan>> {
  let publish = match validate_publishable(blueprint, true) {
    Ok(publish) => publish,
    Err(reason) => return Ok(Outcome::skipped(reason.into())),
  };

  let strategy = strategies.resolve(publish.strategy.as_deref().unwrap_or_default())?;

  let git = detect_git_tag(ctx, &publish.aliases, true);
  if let GitTag::NotApplicable { tag } = &git {
    return Ok(Outcome::skipped(SkipReason::TagNotApplicable { tag: tag.clone() }));
  }

  let generated = strategy.generate(ctx)?;
  let tags = tag_set(ctx.settings.publish.tag_policy, git.applicable(), &generated);
  tracing::info!(tags = %tags.join(", "), "resolved image tags");

  let target = request.target.and_then(|name| {
    let config = blueprint.target(name);
    if config.is_none() {
      tracing::debug!(target = name, "target not found in blueprint");
    }
    config
  });
  let platforms = build_plan(target, &ctx.inputs.native_platform);
  let handles = image_handles(request.image, &platforms, &ctx.settings.publish.image_suffix_separator);

  Ok(Outcome::Done(PublishPlan::build(
    &publish.container,
    &publish.registries,
    &tags,
    &platforms,
    handles,
  )))
}

/// Print a skipped outcome
pub(crate) fn print_skipped<T: serde::Serialize>(outcome: &Outcome<T>, json: bool) -> ShipResult<()> {
  if json {
    println!("{}", serde_json::to_string_pretty(outcome)?);
  } else if let Some(reason) = outcome.skip_reason() {
    println!("ℹ️  Nothing to do: {}", reason);
  }
  Ok(())
}

/// Run the plan command
pub fn run_plan(
  ctx: &RunContext,
  provider: &dyn BlueprintProvider,
  strategies: &StrategyRegistry,
  request: PublishRequest<'_>,
  json: bool,
) -> ShipResult<()> {
  let blueprint = load_blueprint(ctx, provider)?;
  let outcome = prepare_publish(ctx, &blueprint, strategies, request)?;

  match &outcome {
    Outcome::Done(plan) if json => println!("{}", plan.to_json()?),
    Outcome::Done(plan) => print!("{}", plan.to_human_readable()),
    Outcome::Skipped(_) => print_skipped(&outcome, json)?,
  }

  Ok(())
}
