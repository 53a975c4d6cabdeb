//! Progress indicators for the publish fan-out
//!
//! Uses `linya` for allocation-free progress bars. Bars are only drawn when
//! stderr is a terminal; CI logs get the tracing lines instead.

use linya::{Bar, Progress};
use std::io::IsTerminal;

/// One bar counting tag, push and manifest calls
pub struct PublishProgress {
  progress: Progress,
  bar: Bar,
}

impl PublishProgress {
  pub fn new(total: usize, label: impl Into<String>) -> Self {
    let mut progress = Progress::new();
    let bar = progress.bar(total, label.into());
    Self { progress, bar }
  }

  /// A bar when stderr is interactive and there is more than one step
  pub fn for_terminal(total: usize, label: impl Into<String>) -> Option<Self> {
    if total > 1 && std::io::stderr().is_terminal() {
      Some(Self::new(total, label))
    } else {
      None
    }
  }

  /// Increment progress by 1
  pub fn inc(&mut self) {
    self.progress.inc_and_draw(&self.bar, 1);
  }
}
