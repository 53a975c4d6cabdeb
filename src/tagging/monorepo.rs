//! Monorepo tag resolution
//!
//! Tags share one namespace across every project in the repository. A tag is
//! scoped to a project by prefixing it with the project's path:
//!
//! ```text
//! v1.2.3                  repo-wide, applies to every project
//! services/api/v1.2.3     applies to the project at services/api
//! team/api/v1.2.3         applies to services/api if aliased to it
//! ```

use crate::utils::normalize_project_path;
use std::collections::BTreeMap;

/// A tag split into its declared project path and version segment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonoTag<'a> {
  /// Everything before the last `/`, rejoined
  pub path: &'a str,
  /// The last segment
  pub version: &'a str,
}

impl<'a> MonoTag<'a> {
  /// Split a tag; `None` for single-segment (repo-wide) tags
  pub fn parse(tag: &'a str) -> Option<Self> {
    let (path, version) = tag.rsplit_once('/')?;
    Some(Self { path, version })
  }

  /// Whether this tag addresses the project at `project` (already normalised)
  ///
  /// The alias table is consulted first, then the declared path is compared
  /// verbatim. Both comparisons use the full joined prefix.
  pub fn matches(&self, project: &str, aliases: &BTreeMap<String, String>) -> bool {
    if let Some(alias) = aliases.get(self.path) {
      if normalize_project_path(alias) == project {
        tracing::info!(path = self.path, alias = %alias, "monorepo tag matched via alias");
        return true;
      }
      tracing::info!(path = self.path, alias = %alias, project, "alias does not match project path");
    }

    self.path == project
  }
}

/// Resolve the version a git tag contributes to `project`, if any.
///
/// - Repo-wide (single segment) tags are returned unchanged.
/// - Monorepo tags return their version segment when their path (or its alias)
///   is the project path, and `None` otherwise.
///
/// `None` is the normal "this tag is for another project" outcome, not an error.
pub fn resolve_monorepo_tag(tag: &str, project: &str, aliases: &BTreeMap<String, String>) -> Option<String> {
  resolve(tag, project, aliases, true)
}

/// Like [`resolve_monorepo_tag`] but returns the full tag name on a match
pub fn resolve_monorepo_tag_untrimmed(tag: &str, project: &str, aliases: &BTreeMap<String, String>) -> Option<String> {
  resolve(tag, project, aliases, false)
}

fn resolve(tag: &str, project: &str, aliases: &BTreeMap<String, String>, trim: bool) -> Option<String> {
  if tag.is_empty() {
    return None;
  }

  let Some(mono) = MonoTag::parse(tag) else {
    tracing::info!(tag, "detected repo-wide tag, using it as is");
    return Some(tag.to_string());
  };

  let project = normalize_project_path(project);
  tracing::info!(path = mono.path, tag = mono.version, project = %project, "detected monorepo tag");

  if mono.matches(&project, aliases) {
    Some(if trim { mono.version.to_string() } else { tag.to_string() })
  } else {
    tracing::info!(tag, project = %project, "skipping tag as it does not match the project");
    None
  }
}
