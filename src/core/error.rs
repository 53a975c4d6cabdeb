//! Error types for monoship with contextual messages and exit codes
//!
//! Every fatal condition in a run maps onto one `ShipError` variant. Non-fatal
//! outcomes (incomplete configuration, a tag addressing another project) are not
//! errors at all: commands return `Ok` with a skipped outcome instead.

use crate::publish::executor::UnitState;
use std::fmt;
use std::io;
use std::path::PathBuf;

/// Exit codes for monoship
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
  /// User error (config, invalid args, unknown strategy)
  User = 1,
  /// System error (external tool, I/O)
  System = 2,
  /// Validation failure (missing artifacts or images)
  Validation = 3,
}

impl ExitCode {
  /// Convert to i32 for process exit
  pub fn as_i32(self) -> i32 {
    self as i32
  }
}

/// Main error type for monoship
#[derive(Debug)]
pub enum ShipError {
  /// Configuration errors
  Config(ConfigError),

  /// External tool errors (docker, git, gh, tar, blueprint command)
  Tool(ToolError),

  /// Precondition failures
  Validation(ValidationError),

  /// A publish that failed part way through the fan-out
  Publish(Box<PublishError>),

  /// I/O errors
  Io(io::Error),

  /// Generic error with message and optional context
  Message {
    message: String,
    context: Option<String>,
    help: Option<String>,
  },
}

impl ShipError {
  /// Create a simple error message
  pub fn message(msg: impl Into<String>) -> Self {
    ShipError::Message {
      message: msg.into(),
      context: None,
      help: None,
    }
  }

  /// Add context to an existing error
  pub fn context(self, ctx: impl Into<String>) -> Self {
    let ctx_str = ctx.into();
    match self {
      ShipError::Message { message, context, help } => ShipError::Message {
        message,
        context: Some(context.map(|c| format!("{}\n{}", ctx_str, c)).unwrap_or(ctx_str)),
        help,
      },
      ShipError::Io(err) => ShipError::Message {
        message: format!("{}: {}", ctx_str, err),
        context: None,
        help: None,
      },
      _ => self,
    }
  }

  /// Get the appropriate exit code for this error
  pub fn exit_code(&self) -> ExitCode {
    match self {
      ShipError::Config(_) => ExitCode::User,
      ShipError::Tool(_) => ExitCode::System,
      ShipError::Validation(_) => ExitCode::Validation,
      ShipError::Publish(_) => ExitCode::System,
      ShipError::Io(_) => ExitCode::System,
      ShipError::Message { .. } => ExitCode::User,
    }
  }

  /// Get contextual help message for this error
  pub fn help_message(&self) -> Option<String> {
    match self {
      ShipError::Config(e) => e.help_message(),
      ShipError::Tool(e) => e.help_message(),
      ShipError::Validation(e) => e.help_message(),
      ShipError::Publish(e) => e.help_message(),
      ShipError::Message { help, .. } => help.clone(),
      ShipError::Io(_) => None,
    }
  }
}

impl fmt::Display for ShipError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ShipError::Config(e) => write!(f, "{}", e),
      ShipError::Tool(e) => write!(f, "{}", e),
      ShipError::Validation(e) => write!(f, "{}", e),
      ShipError::Publish(e) => write!(f, "{}", e),
      ShipError::Io(e) => write!(f, "I/O error: {}", e),
      ShipError::Message { message, context, .. } => {
        write!(f, "{}", message)?;
        if let Some(ctx) = context {
          write!(f, "\n{}", ctx)?;
        }
        Ok(())
      }
    }
  }
}

impl std::error::Error for ShipError {
  fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
    match self {
      ShipError::Io(e) => Some(e),
      _ => None,
    }
  }
}

impl From<io::Error> for ShipError {
  fn from(err: io::Error) -> Self {
    ShipError::Io(err)
  }
}

impl From<String> for ShipError {
  fn from(msg: String) -> Self {
    ShipError::message(msg)
  }
}

impl From<&str> for ShipError {
  fn from(msg: &str) -> Self {
    ShipError::message(msg)
  }
}

impl From<ConfigError> for ShipError {
  fn from(err: ConfigError) -> Self {
    ShipError::Config(err)
  }
}

impl From<ToolError> for ShipError {
  fn from(err: ToolError) -> Self {
    ShipError::Tool(err)
  }
}

impl From<ValidationError> for ShipError {
  fn from(err: ValidationError) -> Self {
    ShipError::Validation(err)
  }
}

impl From<PublishError> for ShipError {
  fn from(err: PublishError) -> Self {
    ShipError::Publish(Box::new(err))
  }
}

impl From<toml_edit::de::Error> for ShipError {
  fn from(err: toml_edit::de::Error) -> Self {
    ShipError::message(format!("TOML deserialization error: {}", err))
  }
}

impl From<serde_json::Error> for ShipError {
  fn from(err: serde_json::Error) -> Self {
    ShipError::message(format!("JSON error: {}", err))
  }
}

impl From<std::string::FromUtf8Error> for ShipError {
  fn from(err: std::string::FromUtf8Error) -> Self {
    ShipError::message(format!("UTF-8 conversion error: {}", err))
  }
}

/// Configuration-related errors
#[derive(Debug)]
pub enum ConfigError {
  /// Invalid monoship.toml
  InvalidSettings { path: PathBuf, reason: String },

  /// Blueprint could not be obtained or parsed
  Blueprint { project: String, message: String },

  /// Tagging strategy name has no registered implementation
  UnknownTaggingStrategy { name: String, known: Vec<String> },

  /// Required CLI input missing
  MissingInput { name: String, env: Option<String> },
}

impl ConfigError {
  fn help_message(&self) -> Option<String> {
    match self {
      ConfigError::InvalidSettings { path, .. } => Some(format!("Check the settings in {}", path.display())),
      ConfigError::Blueprint { project, .. } => Some(format!(
        "Verify that '{}' contains a blueprint and that the blueprint command works locally.",
        project
      )),
      ConfigError::UnknownTaggingStrategy { known, .. } => Some(format!(
        "Set global.ci.tagging.strategy to one of: {}",
        known.join(", ")
      )),
      ConfigError::MissingInput { name, env } => match env {
        Some(var) => Some(format!("Pass --{} or set {}", name, var)),
        None => Some(format!("Pass --{}", name)),
      },
    }
  }
}

impl fmt::Display for ConfigError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ConfigError::InvalidSettings { path, reason } => {
        write!(f, "Invalid settings in {}: {}", path.display(), reason)
      }
      ConfigError::Blueprint { project, message } => {
        write!(f, "Failed to load blueprint for project '{}': {}", project, message)
      }
      ConfigError::UnknownTaggingStrategy { name, .. } => {
        write!(f, "Unknown tagging strategy: {}", name)
      }
      ConfigError::MissingInput { name, .. } => {
        write!(f, "Missing required input: {}", name)
      }
    }
  }
}

/// External tool errors
#[derive(Debug)]
pub enum ToolError {
  /// Tool could not be spawned
  NotFound { tool: String, reason: String },

  /// Tool ran and exited non-zero
  CommandFailed {
    tool: String,
    command: String,
    stderr: String,
  },
}

impl ToolError {
  fn help_message(&self) -> Option<String> {
    match self {
      ToolError::NotFound { tool, .. } => Some(format!(
        "Install '{}' or point [tools] in monoship.toml at the right binary.",
        tool
      )),
      ToolError::CommandFailed { tool, stderr, .. } => {
        if tool == "docker" && (stderr.contains("denied") || stderr.contains("unauthorized")) {
          Some("Log in to the registry (docker login) before publishing.".to_string())
        } else {
          None
        }
      }
    }
  }
}

impl fmt::Display for ToolError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ToolError::NotFound { tool, reason } => write!(f, "Failed to run {}: {}", tool, reason),
      ToolError::CommandFailed { command, stderr, .. } => {
        write!(f, "Command failed: {}", command)?;
        if !stderr.trim().is_empty() {
          write!(f, "\n{}", stderr.trim_end())?;
        }
        Ok(())
      }
    }
  }
}

/// Why a platform's artifact directory was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArtifactProblem {
  Missing,
  Empty,
}

/// Validation errors
#[derive(Debug)]
pub enum ValidationError {
  /// Release artifacts missing for a platform
  ArtifactMissing {
    platform: String,
    path: PathBuf,
    problem: ArtifactProblem,
  },

  /// No local image for a planned platform
  ImageMissing { platform: String, image: String },
}

impl ValidationError {
  fn help_message(&self) -> Option<String> {
    match self {
      ValidationError::ArtifactMissing { platform, .. } => Some(format!(
        "Make sure the build step writes its outputs for {} under the artifact path.",
        platform
      )),
      ValidationError::ImageMissing { .. } => {
        Some("Did you add a 'container' and 'tag' argument to your target?".to_string())
      }
    }
  }
}

impl fmt::Display for ValidationError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      ValidationError::ArtifactMissing {
        platform,
        path,
        problem: ArtifactProblem::Missing,
      } => write!(
        f,
        "Unable to find output folder for platform: {} ({})",
        platform,
        path.display()
      ),
      ValidationError::ArtifactMissing {
        platform,
        problem: ArtifactProblem::Empty,
        ..
      } => write!(f, "No artifacts found for platform: {}", platform),
      ValidationError::ImageMissing { platform, image } => {
        write!(f, "Unable to find image '{}' for platform {} in the local Docker daemon", image, platform)
      }
    }
  }
}

/// A publish that stopped part way through.
///
/// `completed` lists the destination references that were already pushed (or
/// manifests already created) before `cause`, in call order; they stay in the
/// registry. `unit` is the reference of the group that failed and `state` the
/// point it had reached.
#[derive(Debug)]
pub struct PublishError {
  pub failed_at: String,
  pub cause: ShipError,
  pub unit: String,
  pub state: UnitState,
  pub completed: Vec<String>,
}

impl PublishError {
  fn help_message(&self) -> Option<String> {
    let cause_help = self.cause.help_message();
    if self.completed.is_empty() {
      return cause_help;
    }
    let rerun = "Re-running the publish is safe: tags and pushes are idempotent.".to_string();
    Some(match cause_help {
      Some(help) => format!("{}\n{}", help, rerun),
      None => rerun,
    })
  }
}

impl fmt::Display for PublishError {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(f, "Publish failed at {}: {}", self.failed_at, self.cause)?;
    write!(f, "\n{} stopped in state {}", self.unit, self.state)?;
    if self.completed.is_empty() {
      write!(f, "\nNothing was published before the failure")
    } else {
      write!(f, "\nAlready published before the failure:")?;
      for reference in &self.completed {
        write!(f, "\n  {}", reference)?;
      }
      Ok(())
    }
  }
}

/// Result type alias for monoship
pub type ShipResult<T> = Result<T, ShipError>;

/// Helper trait to add context to Results
pub trait ResultExt<T> {
  /// Add context to an error result
  fn context(self, ctx: impl Into<String>) -> ShipResult<T>;

  /// Add context using a closure (lazy evaluation)
  fn with_context<F>(self, f: F) -> ShipResult<T>
  where
    F: FnOnce() -> String;
}

impl<T, E> ResultExt<T> for Result<T, E>
where
  E: Into<ShipError>,
{
  fn context(self, ctx: impl Into<String>) -> ShipResult<T> {
    self.map_err(|e| e.into().context(ctx))
  }

  fn with_context<F>(self, f: F) -> ShipResult<T>
  where
    F: FnOnce() -> String,
  {
    self.map_err(|e| e.into().context(f()))
  }
}

/// Pretty-print an error to stderr with help text
pub fn print_error(error: &ShipError) {
  eprintln!("\n❌ {}\n", error);

  if let Some(help) = error.help_message() {
    eprintln!("💡 Help: {}\n", help);
  }

  crate::ui::annotations::error(&error.to_string());
}
