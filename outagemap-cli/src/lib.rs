pub mod args;
pub mod commands;
pub mod context;
pub mod handlers;
pub mod output;
pub mod utils;

pub use context::OutageMapCliContext;
pub use output::{
    CliColors, format_error, format_info, format_level, format_service, format_success,
    format_warning, output_error_json, print_nearby, print_outcome, print_report,
    print_report_list, print_selection, print_status,
};
pub use utils::{identity_from, parse_service_type, resolve_report_id};
