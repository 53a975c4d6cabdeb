//! Core engine for monoship
//!
//! - **config**: Settings file (monoship.toml) parsing and validation
//! - **context**: Run context built once per invocation
//! - **error**: Error types with contextual help messages and exit codes
//! - **vcs**: Git operations (SystemGit)

pub mod config;
pub mod context;
pub mod error;
pub mod vcs;
