//! End-to-end tests driving the monoship binary against fake tools
//!
//! The fake tools are shell scripts, so these only run on unix.
#![cfg(unix)]

mod helpers;
mod test_publish;
mod test_release;
mod test_tag;
