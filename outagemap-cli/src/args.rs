//! Command argument structures
//!
//! This module contains all CLI argument structs organized by command category.

use clap::Args;

// Report command arguments
#[derive(Args)]
pub struct CreateReportArgs {
    /// Service type (electricity, water, internet, other; luz, agua, otros accepted)
    pub service_type: String,

    /// Affected provider
    pub provider: String,

    /// Latitude of the outage
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude of the outage
    #[arg(long, allow_negative_numbers = true)]
    pub lng: f64,

    /// Title (default: "{service} - {provider}")
    #[arg(long)]
    pub title: Option<String>,

    /// Free-text description
    #[arg(long)]
    pub description: Option<String>,

    /// Place name; reverse geocoded when omitted
    #[arg(long)]
    pub location_name: Option<String>,
}

#[derive(Args)]
pub struct PickArgs {
    /// Service type (electricity, water, internet, other)
    pub service_type: String,

    /// Affected provider
    pub provider: String,

    /// Latitude of the picked point
    #[arg(long, allow_negative_numbers = true)]
    pub lat: f64,

    /// Longitude of the picked point
    #[arg(long, allow_negative_numbers = true)]
    pub lng: f64,

    /// Only show what would happen
    #[arg(long)]
    pub dry_run: bool,

    /// Create a new report when the matched report has been deleted meanwhile
    #[arg(long)]
    pub create_if_vanished: bool,

    /// Title used when a new report is created
    #[arg(long)]
    pub title: Option<String>,

    /// Description used when a new report is created
    #[arg(long)]
    pub description: Option<String>,
}

#[derive(Args)]
pub struct ConfirmArgs {
    /// Report ID or unique ID prefix
    pub id: String,
}

#[derive(Args)]
pub struct GetReportArgs {
    /// Report ID or unique ID prefix
    pub id: String,
}

#[derive(Args)]
pub struct ListReportsArgs {
    /// Maximum number of results
    #[arg(short, long, default_value_t = 20)]
    pub limit: usize,

    /// Filter by service type
    #[arg(long)]
    pub service_type: Option<String>,

    /// Filter by provider (substring match)
    #[arg(long)]
    pub provider: Option<String>,
}

// Feed command arguments
#[derive(Args)]
pub struct NearbyArgs {
    /// Origin latitude (default: configured origin)
    #[arg(long, allow_negative_numbers = true, requires = "lng")]
    pub lat: Option<f64>,

    /// Origin longitude (default: configured origin)
    #[arg(long, allow_negative_numbers = true, requires = "lat")]
    pub lng: Option<f64>,
}

#[derive(Args)]
pub struct WatchArgs {
    /// Stop after this many snapshots
    #[arg(long)]
    pub count: Option<usize>,
}

#[derive(Args)]
pub struct CompletionsArgs {
    /// Shell type
    #[arg(value_enum)]
    pub shell: Shell,
}

#[derive(clap::ValueEnum, Clone)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    #[clap(name = "powershell")]
    Power,
    Elvish,
}
