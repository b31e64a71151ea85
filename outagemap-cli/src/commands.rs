//! Command enum definitions
//!
//! This module contains all CLI command enums that define the command structure.

use crate::args::*;
use clap::Subcommand;

#[derive(Subcommand)]
pub enum Commands {
    /// Display version information
    Version,

    /// Run diagnostic checks
    Diagnose,

    /// Outage report commands
    #[command(subcommand)]
    Report(ReportCommands),

    /// Pick a location for a draft and confirm, merge or create
    #[command(
        alias = "select",
        long_about = r#"
Pick a location for a draft report, the way the map does.

The point is compared with existing reports within 50 meters:
  • same service and provider  -> the existing report is confirmed
  • same service, new provider -> the provider is merged into it
  • nothing matching           -> a new report is created (sign in required)

Anonymous confirmations are remembered in the data directory so this device
confirms each report at most once.

EXAMPLES:
  outagemap-cli --user ana pick water AyA --lat 9.9346 --lng -84.0789
  outagemap-cli pick luz ICE --lat 9.9281 --lng -84.0907 --dry-run
"#
    )]
    Pick(PickArgs),

    /// Service status and nearby feeds
    #[command(subcommand)]
    Feed(FeedCommands),

    /// Print report snapshots as they change
    Watch(WatchArgs),

    /// Generate shell completion scripts
    Completions(CompletionsArgs),
}

#[derive(Subcommand)]
pub enum ReportCommands {
    /// Create a new report (sign in required)
    #[command(alias = "new")]
    Create(CreateReportArgs),

    /// Get a report by ID
    Get(GetReportArgs),

    /// List reports, newest first
    List(ListReportsArgs),

    /// Confirm a report
    Confirm(ConfirmArgs),
}

#[derive(Subcommand)]
pub enum FeedCommands {
    /// Report counts per service over the status window
    Status,

    /// Recent reports near a point, nearest first
    Nearby(NearbyArgs),
}
