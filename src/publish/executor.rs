//! Publish execution
//!
//! Runs a [`PublishPlan`] against a [`ContainerEngine`], one call at a time, in
//! plan order. Every local image is checked before the first mutating call.
//! The first failing call aborts the run; nothing already pushed is undone, and
//! the resulting [`PublishError`] lists what made it out.

use super::plan::{ImageHandle, PlanId, PublishGroup, PublishPlan};
use crate::core::error::{PublishError, ShipError, ShipResult, ValidationError};
use crate::docker::ContainerEngine;
use crate::ui::progress::PublishProgress;
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Lifecycle of one `(registry, tag)` group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitState {
  Pending,
  LegsPushing,
  /// Multi-platform: every leg pushed, manifest not yet created
  AllLegsPushed,
  /// Multi-platform: done
  ManifestCreated,
  /// Single-platform: done
  Pushed,
}

impl UnitState {
  pub fn is_done(self) -> bool {
    matches!(self, UnitState::ManifestCreated | UnitState::Pushed)
  }

  pub fn as_str(self) -> &'static str {
    match self {
      UnitState::Pending => "pending",
      UnitState::LegsPushing => "legs_pushing",
      UnitState::AllLegsPushed => "all_legs_pushed",
      UnitState::ManifestCreated => "manifest_created",
      UnitState::Pushed => "pushed",
    }
  }
}

impl std::fmt::Display for UnitState {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.write_str(self.as_str())
  }
}

/// Final state of one group
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnitReport {
  pub registry: String,
  pub tag: String,
  pub reference: String,
  pub state: UnitState,
}

/// What a successful publish did
#[derive(Debug, Clone, Serialize)]
pub struct PublishReport {
  pub plan_id: PlanId,
  pub started_at: DateTime<Utc>,
  pub finished_at: DateTime<Utc>,
  /// Pushed references in push order
  pub pushed: Vec<String>,
  /// Created manifest lists in creation order
  pub manifests: Vec<String>,
  pub units: Vec<UnitReport>,
}

impl PublishReport {
  pub fn to_human_readable(&self) -> String {
    let mut output = String::new();
    let elapsed = self.finished_at - self.started_at;
    output.push_str(&format!(
      "✅ Published {} reference(s) in {:.1}s (plan {})\n",
      self.units.iter().filter(|u| u.state.is_done()).count(),
      elapsed.num_milliseconds() as f64 / 1000.0,
      self.plan_id
    ));
    for unit in &self.units {
      output.push_str(&format!("   {}\n", unit.reference));
    }
    output
  }
}

/// Fail unless every handle exists locally. Performs no mutating call.
pub fn check_images(engine: &dyn ContainerEngine, handles: &[ImageHandle]) -> ShipResult<()> {
  for handle in handles {
    tracing::debug!(image = %handle.image, platform = %handle.platform, "checking local image");
    if !engine.image_exists(&handle.image)? {
      return Err(
        ValidationError::ImageMissing {
          platform: handle.platform.clone(),
          image: handle.image.clone(),
        }
        .into(),
      );
    }
  }
  Ok(())
}

/// Progress of a run, shared between groups
struct Run<'a> {
  engine: &'a dyn ContainerEngine,
  progress: Option<&'a mut PublishProgress>,
  pushed: Vec<String>,
  manifests: Vec<String>,
  /// Pushes and manifests in call order; they stay in the registry if the run stops now
  completed: Vec<String>,
}

impl Run<'_> {
  fn fail(&self, group: &PublishGroup, state: UnitState, failed_at: String, cause: ShipError) -> PublishError {
    tracing::error!(
      failed_at = %failed_at,
      unit = %group.reference(),
      %state,
      completed = self.completed.len(),
      "publish aborted"
    );
    PublishError {
      failed_at,
      cause,
      unit: group.reference().to_string(),
      state,
      completed: self.completed.clone(),
    }
  }

  fn step(&mut self) {
    if let Some(progress) = self.progress.as_deref_mut() {
      progress.inc();
    }
  }

  fn run_group(&mut self, group: &PublishGroup) -> Result<UnitState, PublishError> {
    let mut state = UnitState::Pending;
    tracing::info!(registry = %group.registry, tag = %group.tag, "publishing");

    for leg in &group.legs {
      if let Err(e) = self.engine.tag(&leg.source, &leg.destination) {
        return Err(self.fail(group, state, format!("tag {} {}", leg.source, leg.destination), e));
      }
      state = UnitState::LegsPushing;
      self.step();

      if let Err(e) = self.engine.push(&leg.destination) {
        return Err(self.fail(group, state, format!("push {}", leg.destination), e));
      }
      tracing::info!(destination = %leg.destination, platform = %leg.platform, "pushed");
      self.pushed.push(leg.destination.clone());
      self.completed.push(leg.destination.clone());
      self.step();
    }

    let Some(manifest) = &group.manifest else {
      return Ok(UnitState::Pushed);
    };

    state = UnitState::AllLegsPushed;
    tracing::debug!(%state, manifest = %manifest, "creating manifest");

    let legs: Vec<String> = group.legs.iter().map(|l| l.destination.clone()).collect();
    if let Err(e) = self.engine.create_manifest(manifest, &legs) {
      return Err(self.fail(group, state, format!("manifest {}", manifest), e));
    }
    tracing::info!(manifest = %manifest, legs = legs.len(), "created manifest");
    self.manifests.push(manifest.clone());
    self.completed.push(manifest.clone());
    self.step();

    Ok(UnitState::ManifestCreated)
  }
}

/// Check every image, then execute `plan` in order.
pub fn execute(
  engine: &dyn ContainerEngine,
  plan: &PublishPlan,
  progress: Option<&mut PublishProgress>,
) -> ShipResult<PublishReport> {
  check_images(engine, &plan.handles)?;

  let started_at = Utc::now();
  let mut run = Run {
    engine,
    progress,
    pushed: Vec::new(),
    manifests: Vec::new(),
    completed: Vec::new(),
  };

  let mut units = Vec::with_capacity(plan.groups.len());
  for group in &plan.groups {
    let state = run.run_group(group)?;
    units.push(UnitReport {
      registry: group.registry.clone(),
      tag: group.tag.clone(),
      reference: group.reference().to_string(),
      state,
    });
  }

  Ok(PublishReport {
    plan_id: plan.id.clone(),
    started_at,
    finished_at: Utc::now(),
    pushed: run.pushed,
    manifests: run.manifests,
    units,
  })
}
