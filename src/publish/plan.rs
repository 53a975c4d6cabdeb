//! Publish plans
//!
//! A publish is planned in full before anything touches a registry. The plan
//! fixes the execution order:
//!
//! ```text
//! for registry in registries          (outer)
//!   for tag in tags                   (middle)
//!     for platform in platforms       (inner, multi-platform only)
//!       tag  handle -> leg
//!       push leg
//!     create manifest tag <- legs     (multi-platform only, after the legs)
//! ```
//!
//! The plan id is a SHA-256 over the serialized operations, so identical inputs
//! produce identical ids and identical destination references.

use crate::core::error::ShipResult;
use crate::platform::PlatformPlan;
use crate::utils::platform_suffix;
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::fmt;

/// Plan identifier (SHA256 hash of the operations)
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlanId(String);

impl PlanId {
  pub fn from_contents(contents: &[u8]) -> Self {
    let mut hasher = Sha256::new();
    hasher.update(contents);
    Self(format!("{:x}", hasher.finalize()))
  }

  /// First 12 characters
  pub fn short(&self) -> &str {
    &self.0[..12.min(self.0.len())]
  }
}

impl fmt::Display for PlanId {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "{}", self.short())
  }
}

/// A locally built image expected for one platform
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ImageHandle {
  pub platform: String,
  pub image: String,
}

/// Expected local image names for `plan`.
///
/// Single-platform plans expect the base image itself; multi-platform plans
/// expect one `<image><sep><os>_<arch>` image per platform.
pub fn image_handles(image: &str, plan: &PlatformPlan, separator: &str) -> Vec<ImageHandle> {
  plan
    .iter()
    .map(|platform| ImageHandle {
      platform: platform.to_string(),
      image: if plan.is_multi_platform() {
        format!("{}{}{}", image, separator, platform_suffix(platform))
      } else {
        image.to_string()
      },
    })
    .collect()
}

/// One external call of a publish
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Operation {
  Tag { source: String, destination: String },
  Push { destination: String },
  CreateManifest { destination: String, legs: Vec<String> },
}

impl fmt::Display for Operation {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      Operation::Tag { source, destination } => write!(f, "Tag {} → {}", source, destination),
      Operation::Push { destination } => write!(f, "Push {}", destination),
      Operation::CreateManifest { destination, legs } => {
        write!(f, "Create manifest {} from {} legs", destination, legs.len())
      }
    }
  }
}

/// A per-platform image pushed under a platform-suffixed tag
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Leg {
  pub platform: String,
  pub source: String,
  pub destination: String,
}

/// Everything published for one `(registry, tag)` pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PublishGroup {
  pub registry: String,
  pub tag: String,
  /// Tag+push pairs, in platform order
  pub legs: Vec<Leg>,
  /// Manifest list assembled from `legs`; `None` for single-platform plans
  pub manifest: Option<String>,
}

impl PublishGroup {
  /// Operations of this group in execution order
  pub fn operations(&self) -> Vec<Operation> {
    let mut ops = Vec::with_capacity(self.legs.len() * 2 + 1);
    for leg in &self.legs {
      ops.push(Operation::Tag {
        source: leg.source.clone(),
        destination: leg.destination.clone(),
      });
      ops.push(Operation::Push {
        destination: leg.destination.clone(),
      });
    }
    if let Some(manifest) = &self.manifest {
      ops.push(Operation::CreateManifest {
        destination: manifest.clone(),
        legs: self.legs.iter().map(|l| l.destination.clone()).collect(),
      });
    }
    ops
  }

  /// The reference users pull for this group
  pub fn reference(&self) -> &str {
    match &self.manifest {
      Some(manifest) => manifest,
      None => self.legs.first().map(|l| l.destination.as_str()).unwrap_or(&self.tag),
    }
  }
}

/// Ordered publish plan for one project
#[derive(Debug, Clone, Serialize)]
pub struct PublishPlan {
  pub id: PlanId,
  pub container: String,
  pub multi_platform: bool,
  pub handles: Vec<ImageHandle>,
  pub groups: Vec<PublishGroup>,
}

/// `registry/container:tag`
pub fn destination(registry: &str, container: &str, tag: &str) -> String {
  format!("{}/{}:{}", registry.trim_end_matches('/'), container, tag)
}

/// `registry/container:tag_os_arch`
pub fn leg_destination(registry: &str, container: &str, tag: &str, platform: &str) -> String {
  destination(registry, container, &format!("{}_{}", tag, platform_suffix(platform)))
}

impl PublishPlan {
  /// Plan the fan-out of `handles` over every registry and tag
  pub fn build(
    container: &str,
    registries: &[String],
    tags: &[String],
    plan: &PlatformPlan,
    handles: Vec<ImageHandle>,
  ) -> Self {
    let multi_platform = plan.is_multi_platform();
    let mut groups = Vec::with_capacity(registries.len() * tags.len());

    for registry in registries {
      for tag in tags {
        let group = if multi_platform {
          PublishGroup {
            registry: registry.clone(),
            tag: tag.clone(),
            legs: handles
              .iter()
              .map(|h| Leg {
                platform: h.platform.clone(),
                source: h.image.clone(),
                destination: leg_destination(registry, container, tag, &h.platform),
              })
              .collect(),
            manifest: Some(destination(registry, container, tag)),
          }
        } else {
          PublishGroup {
            registry: registry.clone(),
            tag: tag.clone(),
            legs: handles
              .iter()
              .map(|h| Leg {
                platform: h.platform.clone(),
                source: h.image.clone(),
                destination: destination(registry, container, tag),
              })
              .collect(),
            manifest: None,
          }
        };
        groups.push(group);
      }
    }

    let mut plan = Self {
      id: PlanId::from_contents(&[]),
      container: container.to_string(),
      multi_platform,
      handles,
      groups,
    };
    plan.recompute_id();
    plan
  }

  fn recompute_id(&mut self) {
    let json = serde_json::to_vec(&self.operations()).unwrap_or_default();
    self.id = PlanId::from_contents(&json);
  }

  /// Every operation in execution order
  pub fn operations(&self) -> Vec<Operation> {
    self.groups.iter().flat_map(PublishGroup::operations).collect()
  }

  /// Every reference the plan writes, in execution order
  pub fn references(&self) -> Vec<String> {
    self
      .operations()
      .into_iter()
      .filter_map(|op| match op {
        Operation::Push { destination } | Operation::CreateManifest { destination, .. } => Some(destination),
        Operation::Tag { .. } => None,
      })
      .collect()
  }

  pub fn to_json(&self) -> ShipResult<String> {
    Ok(serde_json::to_string_pretty(self)?)
  }

  pub fn to_human_readable(&self) -> String {
    let mut output = String::new();

    output.push_str(&format!("📋 Plan: publish ({})\n", self.id));
    output.push_str(&format!("   Container: {}\n", self.container));
    output.push_str("   Local images:\n");
    for handle in &self.handles {
      output.push_str(&format!("     {} ({})\n", handle.image, handle.platform));
    }

    let operations = self.operations();
    output.push_str(&format!("\n   Operations ({}):\n", operations.len()));
    for (i, op) in operations.iter().enumerate() {
      output.push_str(&format!("   {}. {}\n", i + 1, op));
    }

    output
  }
}
