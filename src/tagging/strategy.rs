//! Tagging strategies
//!
//! A strategy produces the "generated" tag every publish can fall back to.
//! Strategies are registered by name and looked up once, before any external
//! call, so an unsupported `global.ci.tagging.strategy` fails the run up front.

use crate::core::context::RunContext;
use crate::core::error::{ConfigError, ShipResult};
use crate::core::vcs::SystemGit;
use std::collections::BTreeMap;

/// Produces a tag for the current run
pub trait TagStrategy {
  fn generate(&self, ctx: &RunContext) -> ShipResult<String>;
}

/// The `commit` strategy: the full SHA of the commit being built
pub struct CommitStrategy;

impl TagStrategy for CommitStrategy {
  fn generate(&self, ctx: &RunContext) -> ShipResult<String> {
    if let Some(sha) = &ctx.inputs.sha {
      return Ok(sha.clone());
    }

    tracing::debug!("no commit SHA supplied, asking git for HEAD");
    SystemGit::open(&ctx.root, &ctx.settings.tools.git)?.head_commit()
  }
}

/// Name-keyed table of tagging strategies
pub struct StrategyRegistry {
  strategies: BTreeMap<String, Box<dyn TagStrategy>>,
}

impl StrategyRegistry {
  /// Registry with no strategies
  pub fn empty() -> Self {
    Self {
      strategies: BTreeMap::new(),
    }
  }

  /// Registry with the built-in strategies
  pub fn builtin() -> Self {
    let mut registry = Self::empty();
    registry.register("commit", CommitStrategy);
    registry
  }

  pub fn register(&mut self, name: impl Into<String>, strategy: impl TagStrategy + 'static) {
    self.strategies.insert(name.into(), Box::new(strategy));
  }

  /// Look up a strategy, failing with `UnknownTaggingStrategy`
  pub fn resolve(&self, name: &str) -> ShipResult<&dyn TagStrategy> {
    self.strategies.get(name).map(|s| s.as_ref()).ok_or_else(|| {
      ConfigError::UnknownTaggingStrategy {
        name: name.to_string(),
        known: self.names(),
      }
      .into()
    })
  }

  pub fn names(&self) -> Vec<String> {
    self.strategies.keys().cloned().collect()
  }
}

impl Default for StrategyRegistry {
  fn default() -> Self {
    Self::builtin()
  }
}
