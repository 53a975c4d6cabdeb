//! Container image publishing
//!
//! - **plan**: expected local images and the ordered fan-out of tag/push/manifest calls
//! - **executor**: runs a plan against a container engine and reports what was published

pub mod executor;
pub mod plan;

pub use executor::{PublishReport, check_images, execute};
pub use plan::{PublishPlan, image_handles};
