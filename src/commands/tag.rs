//! `monoship tag`: the tags a run would publish under

use super::{detect_git_tag, load_blueprint};
use crate::blueprint::{Blueprint, BlueprintProvider};
use crate::core::context::RunContext;
use crate::core::error::ShipResult;
use crate::tagging::StrategyRegistry;
use serde::Serialize;

/// Printed as `{"generated": "...", "git": "..."}`; absent tags are empty strings
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TagOutput {
  pub generated: String,
  pub git: String,
}

/// Compute both tags for `blueprint`.
///
/// A blueprint without a tagging strategy yields an empty generated tag; an
/// unknown strategy is an error.
pub fn resolve_tags(
  ctx: &RunContext,
  blueprint: &Blueprint,
  strategies: &StrategyRegistry,
  trim: bool,
) -> ShipResult<TagOutput> {
  let generated = match blueprint.tagging_strategy() {
    Some(name) => strategies.resolve(name)?.generate(ctx)?,
    None => {
      tracing::warn!("no tagging strategy defined, leaving the generated tag empty");
      String::new()
    }
  };

  let git = detect_git_tag(ctx, &blueprint.aliases(), trim)
    .applicable()
    .unwrap_or_default()
    .to_string();

  Ok(TagOutput { generated, git })
}

/// Run the tag command
pub fn run_tag(
  ctx: &RunContext,
  provider: &dyn BlueprintProvider,
  strategies: &StrategyRegistry,
  trim: bool,
  pretty: bool,
) -> ShipResult<()> {
  let blueprint = load_blueprint(ctx, provider)?;
  let output = resolve_tags(ctx, &blueprint, strategies, trim)?;

  let json = if pretty {
    serde_json::to_string_pretty(&output)?
  } else {
    serde_json::to_string(&output)?
  };
  println!("{}", json);

  Ok(())
}
