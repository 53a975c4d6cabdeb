pub mod annotations;
pub mod progress;
