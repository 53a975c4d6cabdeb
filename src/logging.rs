//! Tracing setup
//!
//! Logs go to stderr so that `--json` output on stdout stays machine-readable.
//! `RUST_LOG` wins over the `-v` count when set.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, fmt};

/// Default filter for a `-v` count
pub fn default_filter(verbosity: u8) -> &'static str {
  match verbosity {
    0 => "info",
    1 => "debug",
    _ => "trace",
  }
}

/// Install the global subscriber. Only the first call takes effect.
pub fn init_tracing(verbosity: u8, json: bool) {
  let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter(verbosity)));

  if json {
    tracing_subscriber::registry()
      .with(env_filter)
      .with(fmt::layer().with_writer(std::io::stderr).with_target(false).json())
      .try_init()
      .ok();
  } else {
    tracing_subscriber::registry()
      .with(env_filter)
      .with(fmt::layer().with_writer(std::io::stderr).with_target(false).without_time())
      .try_init()
      .ok();
  }
}
