//! CLI commands for monoship
//!
//! - **tag**: print the generated and git tags of the current run
//! - **plan**: print the ordered publish plan without touching a registry
//! - **publish**: tag and push the project's images to every registry
//! - **release**: archive per-platform artifacts and attach them to a release
//!
//! Commands take `&RunContext` plus their collaborators explicitly, so tests
//! can drive them with in-memory fakes. A run that has nothing to do returns
//! [`Outcome::Skipped`]; only real failures are errors.

pub mod plan;
pub mod publish;
pub mod release;
pub mod tag;

pub use plan::run_plan;
pub use publish::run_publish;
pub use release::run_release;
pub use tag::run_tag;

use crate::blueprint::{Blueprint, BlueprintProvider};
use crate::core::context::RunContext;
use crate::core::error::ShipResult;
use crate::core::vcs::SystemGit;
use crate::tagging::{self, GitTag};
use crate::ui::annotations;
use crate::validate::Incomplete;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// Why a command did nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
  /// The blueprint lacks what the command needs
  ConfigIncomplete { detail: String },
  /// The triggering tag addresses another project
  TagNotApplicable { tag: String },
  /// Publishes only run on the default branch or a tag
  NotReleaseBranch { git_ref: Option<String> },
  /// Releases need a git tag
  NoGitTag,
}

impl From<Incomplete> for SkipReason {
  fn from(reason: Incomplete) -> Self {
    SkipReason::ConfigIncomplete {
      detail: reason.to_string(),
    }
  }
}

impl fmt::Display for SkipReason {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      SkipReason::ConfigIncomplete { detail } => write!(f, "{}", detail),
      SkipReason::TagNotApplicable { tag } => write!(f, "git tag '{}' does not apply to this project", tag),
      SkipReason::NotReleaseBranch { git_ref } => match git_ref {
        Some(git_ref) => write!(f, "{} is neither the default branch nor a tag", git_ref),
        None => write!(f, "no git ref supplied"),
      },
      SkipReason::NoGitTag => write!(f, "No Git tag detected"),
    }
  }
}

/// Result of a command that may legitimately do nothing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", content = "result", rename_all = "snake_case")]
pub enum Outcome<T> {
  Done(T),
  Skipped(SkipReason),
}

impl<T> Outcome<T> {
  /// Skip, logging a warning for configuration gaps and info otherwise
  pub fn skipped(reason: SkipReason) -> Self {
    match &reason {
      SkipReason::ConfigIncomplete { .. } => {
        let message = format!("{}. Skipping", reason);
        tracing::warn!("{}", message);
        annotations::warning(&message);
      }
      _ => tracing::info!("{}. Skipping", reason),
    }
    Outcome::Skipped(reason)
  }

  pub fn skip_reason(&self) -> Option<&SkipReason> {
    match self {
      Outcome::Skipped(reason) => Some(reason),
      Outcome::Done(_) => None,
    }
  }
}

/// Load the project blueprint named by the context
pub fn load_blueprint(ctx: &RunContext, provider: &dyn BlueprintProvider) -> ShipResult<Blueprint> {
  provider.blueprint(&ctx.inputs.project)
}

/// Resolve the git tag of this run.
///
/// CI runs read the supplied ref. Without a ref, the tag pointing at the local
/// `HEAD` is used (annotated tags first); outside a git checkout there is none.
pub fn detect_git_tag(ctx: &RunContext, aliases: &BTreeMap<String, String>, trim: bool) -> GitTag {
  if ctx.inputs.git_ref.is_some() {
    return tagging::resolve_git_tag(ctx.inputs.git_ref.as_deref(), &ctx.inputs.project, aliases, trim);
  }

  let local = SystemGit::open(&ctx.root, &ctx.settings.tools.git).and_then(|git| git.tags_at_head());
  let tag = match local {
    Ok(tags) => tags.into_iter().next(),
    Err(e) => {
      tracing::debug!(error = %e, "unable to read local tags");
      None
    }
  };

  if let Some(tag) = &tag {
    tracing::info!(tag = %tag, "detected local git tag at HEAD");
  }
  tagging::resolve_tag_name(tag.as_deref(), &ctx.inputs.project, aliases, trim)
}
