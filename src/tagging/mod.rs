//! Release tag resolution
//!
//! - **git_ref**: extract tag/branch names from CI refs
//! - **monorepo**: decide whether a tag addresses the current project
//! - **strategy**: name-keyed registry of generated-tag strategies
//!
//! [`resolve_git_tag`] combines the first two into the git-derived tag of a
//! run; [`tag_set`] combines it with the generated tag per [`TagPolicy`].

pub mod git_ref;
pub mod monorepo;
pub mod strategy;

pub use git_ref::{parse_branch_ref, parse_tag_ref};
pub use monorepo::{resolve_monorepo_tag, resolve_monorepo_tag_untrimmed};
pub use strategy::StrategyRegistry;

use crate::core::config::TagPolicy;
use serde::Serialize;
use std::collections::BTreeMap;

/// Outcome of resolving the git tag of a run for one project
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum GitTag {
  /// The run was not triggered by a tag
  None,
  /// The tag applies to this project; `tag` is trimmed or full per the request
  Applicable { tag: String },
  /// The run was triggered by a tag that addresses another project
  NotApplicable { tag: String },
}

impl GitTag {
  pub fn applicable(&self) -> Option<&str> {
    match self {
      GitTag::Applicable { tag } => Some(tag),
      _ => None,
    }
  }
}

/// Resolve the git tag of a raw tag name for `project`
pub fn resolve_tag_name(tag: Option<&str>, project: &str, aliases: &BTreeMap<String, String>, trim: bool) -> GitTag {
  let Some(tag) = tag.filter(|t| !t.is_empty()) else {
    return GitTag::None;
  };

  let resolved = if trim {
    resolve_monorepo_tag(tag, project, aliases)
  } else {
    resolve_monorepo_tag_untrimmed(tag, project, aliases)
  };

  match resolved {
    Some(resolved) => GitTag::Applicable { tag: resolved },
    None => GitTag::NotApplicable { tag: tag.to_string() },
  }
}

/// Resolve the git tag of a CI ref for `project`
pub fn resolve_git_tag(
  git_ref: Option<&str>,
  project: &str,
  aliases: &BTreeMap<String, String>,
  trim: bool,
) -> GitTag {
  let tag = git_ref.and_then(parse_tag_ref);
  match tag {
    Some(tag) => tracing::info!(tag, "detected git tag"),
    None => tracing::info!("no git tag detected"),
  }
  resolve_tag_name(tag, project, aliases, trim)
}

/// The ordered, de-duplicated tags a publish pushes
pub fn tag_set(policy: TagPolicy, git: Option<&str>, generated: &str) -> Vec<String> {
  let candidates: Vec<&str> = match (policy, git) {
    (TagPolicy::GitOrGenerated, Some(git)) => vec![git],
    (TagPolicy::GitOrGenerated, None) => vec![generated],
    (TagPolicy::All, Some(git)) => vec![git, generated],
    (TagPolicy::All, None) => vec![generated],
  };

  let mut tags: Vec<String> = Vec::with_capacity(candidates.len());
  for tag in candidates {
    if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
      tags.push(tag.to_string());
    }
  }
  tags
}
