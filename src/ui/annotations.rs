//! GitHub Actions workflow annotations
//!
//! When running under Actions, warnings and errors are also emitted as
//! `::warning::` / `::error::` workflow commands so they show up on
//! the run summary. Outside Actions these are no-ops.

/// Whether we are running inside a GitHub Actions job
pub fn in_github_actions() -> bool {
  std::env::var("GITHUB_ACTIONS").is_ok_and(|v| v == "true")
}

/// Escape a message for a workflow command
fn escape(message: &str) -> String {
  message.replace('%', "%25").replace('\r', "%0D").replace('\n', "%0A")
}

fn command(kind: &str, message: &str) -> String {
  format!("::{}::{}", kind, escape(message))
}

pub fn warning(message: &str) {
  if in_github_actions() {
    eprintln!("{}", command("warning", message));
  }
}

pub fn error(message: &str) {
  if in_github_actions() {
    eprintln!("{}", command("error", message));
  }
}
