//! Command handlers
//!
//! This module contains all command handler implementations organized by command category.

pub mod feeds;
pub mod report;

pub use feeds::{handle_feed_command, handle_watch_command};
pub use report::{PickResult, handle_pick_command, handle_report_command};

use indicatif::{ProgressBar, ProgressStyle};
use is_terminal::IsTerminal;
use std::time::Duration;

/// Spinner for slow steps, only for interactive table output
pub(crate) fn spinner(message: &'static str, output_format: &str) -> Option<ProgressBar> {
    if output_format == "json" || !std::io::stderr().is_terminal() {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.blue} {msg}") {
        pb.set_style(style);
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}
