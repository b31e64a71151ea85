use chrono::Utc;
use colored::*;
use outagemap::OutageMapError;
use outagemap::dedup::{DedupAction, Selection, SelectionError, SelectionOutcome};
use outagemap::feeds::{NearbyReport, ServiceStatus, StatusLevel, format_distance, format_time_ago};
use outagemap::models::{Report, ServiceType};
use outagemap::storage::StorageError;
use serde_json::json;

pub struct CliColors;

impl CliColors {
    pub fn success() -> Color {
        Color::TrueColor {
            r: 34,
            g: 197,
            b: 94,
        }
    }

    pub fn error() -> Color {
        Color::TrueColor {
            r: 239,
            g: 68,
            b: 68,
        }
    }

    pub fn warning() -> Color {
        Color::TrueColor {
            r: 245,
            g: 158,
            b: 11,
        }
    }

    pub fn info() -> Color {
        Color::TrueColor {
            r: 59,
            g: 130,
            b: 246,
        }
    }

    pub fn electricity() -> Color {
        Color::TrueColor {
            r: 234,
            g: 179,
            b: 8,
        }
    }

    pub fn water() -> Color {
        Color::TrueColor {
            r: 14,
            g: 165,
            b: 233,
        }
    }

    pub fn internet() -> Color {
        Color::TrueColor {
            r: 168,
            g: 85,
            b: 247,
        }
    }

    pub fn muted() -> Color {
        Color::TrueColor {
            r: 148,
            g: 163,
            b: 184,
        }
    }

    pub fn primary() -> Color {
        Color::White
    }

    pub fn accent() -> Color {
        Color::TrueColor {
            r: 59,
            g: 130,
            b: 246,
        }
    }
}

pub fn is_json(output_format: &str) -> bool {
    output_format == "json"
}

/// Print any serializable value as pretty JSON
pub fn print_json<T: serde::Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    );
}

/// Output an OutageMapError in structured JSON format
pub fn output_error_json(error: &OutageMapError, output_format: &str) {
    if is_json(output_format) {
        let (code, details) = match error {
            OutageMapError::Storage(StorageError::NotFound(_)) => ("NOT_FOUND", None),
            OutageMapError::Storage(_) => ("STORAGE_ERROR", None),
            OutageMapError::Configuration(_) => ("CONFIGURATION_ERROR", None),
            OutageMapError::Validation(_) => ("VALIDATION_ERROR", None),
            OutageMapError::Selection(SelectionError::Store { draft, point, .. }) => (
                "STORE_UNAVAILABLE",
                Some(json!({
                    "retryable": true,
                    "draft": draft,
                    "point": point
                })),
            ),
            OutageMapError::Selection(_) => ("SELECTION_ERROR", None),
            OutageMapError::Geocoding(_) => ("GEOCODING_ERROR", None),
            OutageMapError::Logging(_) => ("LOGGING_ERROR", None),
            OutageMapError::Guard(_) => ("GUARD_ERROR", None),
        };

        let mut error_response = json!({
            "error": true,
            "code": code,
            "message": error.to_string(),
            "retryable": error.is_retryable(),
            "timestamp": Utc::now().to_rfc3339()
        });

        if let Some(details) = details {
            error_response["details"] = details;
        }

        eprintln!(
            "{}",
            serde_json::to_string_pretty(&error_response).unwrap_or_else(|_| "{}".to_string())
        );
    } else {
        eprintln!("{}", format_error(&error.to_string()));
        if error.is_retryable() {
            eprintln!("{}", format_info("The store may be temporarily unavailable; try again."));
        }
    }
}

pub fn format_success(msg: &str) -> String {
    format!(
        "{} {}",
        "✓".color(CliColors::success()).bold(),
        msg.color(CliColors::success())
    )
}

pub fn format_error(msg: &str) -> String {
    format!(
        "{} {}",
        "✗".color(CliColors::error()).bold(),
        msg.color(CliColors::error())
    )
}

pub fn format_warning(msg: &str) -> String {
    format!(
        "{} {}",
        "⚠".color(CliColors::warning()).bold(),
        msg.color(CliColors::warning())
    )
}

pub fn format_info(msg: &str) -> String {
    format!(
        "{} {}",
        "ℹ".color(CliColors::info()).bold(),
        msg.color(CliColors::info())
    )
}

pub fn format_service(service_type: ServiceType) -> ColoredString {
    let label = service_type.label();
    match service_type {
        ServiceType::Electricity => label.color(CliColors::electricity()),
        ServiceType::Water => label.color(CliColors::water()),
        ServiceType::Internet => label.color(CliColors::internet()),
        ServiceType::Other => label.color(CliColors::muted()),
    }
}

pub fn format_level(level: StatusLevel) -> ColoredString {
    let text = level.to_string();
    match level {
        StatusLevel::Critical => text.color(CliColors::error()).bold(),
        StatusLevel::Moderate => text.color(CliColors::warning()),
        StatusLevel::Minor => text.color(CliColors::electricity()),
        StatusLevel::Normal => text.color(CliColors::success()),
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let cut: String = text.chars().take(max.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

pub fn print_report(report: &Report) {
    println!(
        "{}",
        "━━━ Report Details ━━━".color(CliColors::accent()).bold()
    );
    println!(
        "{}: {}",
        "ID".color(CliColors::muted()),
        report.id.color(CliColors::accent()).bold()
    );
    println!(
        "{}: {}",
        "Service".color(CliColors::muted()),
        format_service(report.service_type)
    );
    println!(
        "{}: {}",
        "Provider".color(CliColors::muted()),
        report.provider.color(CliColors::primary())
    );
    if report.providers().is_merged() {
        println!(
            "{}: {}",
            "Providers".color(CliColors::muted()),
            report
                .providers()
                .iter()
                .collect::<Vec<_>>()
                .join(", ")
                .color(CliColors::info())
        );
    }
    println!("{}: {}", "Title".color(CliColors::muted()), report.display_title());
    if let Some(description) = &report.description {
        println!("{}: {}", "Description".color(CliColors::muted()), description);
    }
    println!(
        "{}: {}",
        "Location".color(CliColors::muted()),
        report.display_location()
    );
    println!(
        "{}: {}",
        "Created".color(CliColors::muted()),
        format!(
            "{} ({})",
            report.created_at.format("%Y-%m-%d %H:%M:%S UTC"),
            format_time_ago(report.created_at, Utc::now())
        )
        .color(CliColors::primary())
    );
    println!(
        "{}: {}",
        "Confirmations".color(CliColors::muted()),
        report.confirmations.to_string().color(CliColors::success())
    );
    println!(
        "{}: {}",
        "Reported by".color(CliColors::muted()),
        report.user_name.as_deref().unwrap_or(&report.user_id)
    );
}

pub fn print_report_list(reports: &[Report]) {
    if reports.is_empty() {
        println!("{}", format_info("No reports found."));
        return;
    }

    println!(
        "{}",
        format_info(&format!("Found {} reports:", reports.len()))
    );
    println!();

    println!(
        "{:<10} {:<16} {:<6} {:<10} {}",
        "ID".color(CliColors::muted()).bold(),
        "Service".color(CliColors::muted()).bold(),
        "Conf.".color(CliColors::muted()).bold(),
        "Age".color(CliColors::muted()).bold(),
        "Title".color(CliColors::muted()).bold()
    );
    println!("{}", "─".repeat(80).color(CliColors::muted()));

    let now = Utc::now();
    for report in reports {
        println!(
            "{:<10} {:<16} {:<6} {:<10} {}",
            truncate(&report.id, 8).color(CliColors::accent()),
            format_service(report.service_type),
            report.confirmations,
            format_time_ago(report.created_at, now),
            truncate(&report.display_title(), 50).color(CliColors::primary())
        );
    }
}

pub fn print_selection(selection: &Selection) {
    match &selection.action {
        DedupAction::ConfirmExisting { report } => println!(
            "{}",
            format_info(&format!(
                "Matches report {} ({}); it would be confirmed",
                report.id,
                report.display_title()
            ))
        ),
        DedupAction::MergeProvider { report, provider } => println!(
            "{}",
            format_info(&format!(
                "Report {} covers {}; {} would be added",
                report.id, report.provider, provider
            ))
        ),
        DedupAction::CreateNew { point } => println!(
            "{}",
            format_info(&format!("No matching report near {}; a new one would be created", point))
        ),
    }
}

pub fn print_outcome(outcome: &SelectionOutcome) {
    match outcome {
        SelectionOutcome::Confirmed { report } => println!(
            "{}",
            format_success(&format!(
                "Confirmed {} ({} confirmations)",
                report.display_title(),
                report.confirmations
            ))
        ),
        SelectionOutcome::AlreadyConfirmed { report_id } => println!(
            "{}",
            format_warning(&format!("You already confirmed report {}", report_id))
        ),
        SelectionOutcome::Merged {
            report_id,
            provider,
        } => println!(
            "{}",
            format_success(&format!("Report {} now covers {}", report_id, provider))
        ),
        SelectionOutcome::AlreadyMerged { report_id } => println!(
            "{}",
            format_warning(&format!("Provider already part of report {}", report_id))
        ),
        SelectionOutcome::ReadyToCreate { point } => println!(
            "{}",
            format_info(&format!("No matching report near {}", point))
        ),
        SelectionOutcome::ReportVanished { point } => println!(
            "{}",
            format_warning(&format!(
                "The matching report was deleted. Re-run with --create-if-vanished to report at {}",
                point
            ))
        ),
    }
}

pub fn print_status(statuses: &[ServiceStatus]) {
    println!(
        "{:<16} {:<8} {}",
        "Service".color(CliColors::muted()).bold(),
        "Reports".color(CliColors::muted()).bold(),
        "Level".color(CliColors::muted()).bold()
    );
    println!("{}", "─".repeat(40).color(CliColors::muted()));
    for status in statuses {
        println!(
            "{:<16} {:<8} {}",
            format_service(status.service_type),
            status.count,
            format_level(status.level)
        );
    }
}

pub fn print_nearby(nearby: &[NearbyReport]) {
    if nearby.is_empty() {
        println!("{}", format_info("No recent reports nearby."));
        return;
    }

    let now = Utc::now();
    for entry in nearby {
        println!(
            "{:>8}  {:<16} {} {}",
            format_distance(entry.distance_m).color(CliColors::accent()),
            format_service(entry.report.service_type),
            truncate(&entry.report.display_title(), 40).color(CliColors::primary()),
            format!("({})", format_time_ago(entry.report.created_at, now)).color(CliColors::muted())
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate() {
        assert_eq!(truncate("short", 10), "short");
        assert_eq!(truncate("Electricity - ICE", 10), "Electri...");
        assert_eq!(truncate("Agua en Curridabat", 8).chars().count(), 8);
    }
}
