//! Dashboard feeds derived from a report snapshot

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::config::FeedConfig;
use crate::geo::{Coordinates, haversine_distance};
use crate::models::{Report, ServiceType};

/// Severity of a service based on recent report volume
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusLevel {
    Normal,
    Minor,
    Moderate,
    Critical,
}

impl StatusLevel {
    /// 0 normal, 1-2 minor, 3-5 moderate, more critical
    pub fn from_count(count: usize) -> Self {
        match count {
            0 => StatusLevel::Normal,
            1..=2 => StatusLevel::Minor,
            3..=5 => StatusLevel::Moderate,
            _ => StatusLevel::Critical,
        }
    }
}

impl fmt::Display for StatusLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            StatusLevel::Normal => "normal",
            StatusLevel::Minor => "minor",
            StatusLevel::Moderate => "moderate",
            StatusLevel::Critical => "critical",
        };
        f.write_str(s)
    }
}

/// Recent report count for one service type
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceStatus {
    pub service_type: ServiceType,
    pub count: usize,
    pub level: StatusLevel,
}

/// Per-service counts over the status window. Every service type is present.
pub fn service_status(reports: &[Report], now: DateTime<Utc>, config: &FeedConfig) -> Vec<ServiceStatus> {
    let since = now - Duration::hours(config.status_window_hours);

    ServiceType::ALL
        .iter()
        .map(|&service_type| {
            let count = reports
                .iter()
                .filter(|r| r.service_type == service_type && r.created_at >= since)
                .count();
            ServiceStatus {
                service_type,
                count,
                level: StatusLevel::from_count(count),
            }
        })
        .collect()
}

/// A report near the origin
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyReport {
    pub report: Report,
    pub distance_m: f64,
}

/// Recent reports within the configured radius, nearest first.
///
/// Reports with invalid coordinates are skipped.
pub fn nearby_reports(
    reports: &[Report],
    origin: &Coordinates,
    now: DateTime<Utc>,
    config: &FeedConfig,
) -> Vec<NearbyReport> {
    let since = now - Duration::hours(config.nearby_window_hours);

    let mut nearby: Vec<NearbyReport> = reports
        .iter()
        .filter(|r| r.created_at >= since && r.location.is_valid())
        .filter_map(|report| {
            let distance_m = haversine_distance(origin, &report.location);
            (distance_m <= config.nearby_radius_m).then(|| NearbyReport {
                report: report.clone(),
                distance_m,
            })
        })
        .collect();

    nearby.sort_by(|a, b| a.distance_m.total_cmp(&b.distance_m));
    nearby.truncate(config.nearby_limit);
    nearby
}

/// Short relative age: "12m ago", "5h ago", "3d ago"
pub fn format_time_ago(created_at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let elapsed = (now - created_at).abs();
    if elapsed < Duration::hours(1) {
        format!("{}m ago", elapsed.num_minutes())
    } else if elapsed < Duration::days(1) {
        format!("{}h ago", elapsed.num_hours())
    } else {
        format!("{}d ago", elapsed.num_days())
    }
}

/// Distance for display: meters below 1 km, otherwise km with one decimal
pub fn format_distance(distance_m: f64) -> String {
    if distance_m < 1_000.0 {
        format!("{:.0} m", distance_m)
    } else {
        format!("{:.1} km", distance_m / 1_000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::{DEFAULT_ORIGIN, offset_meters};
    use crate::models::{Identity, NewReport, ReportDraft};

    fn report(id: &str, service_type: ServiceType, location: Coordinates, age: Duration, now: DateTime<Utc>) -> Report {
        let new_report = NewReport::from_draft(
            &ReportDraft::new(service_type, "Other"),
            location,
            &Identity::new("creator"),
        )
        .unwrap();
        Report::from_new(id, new_report, now - age)
    }

    #[test]
    fn test_level_thresholds() {
        assert_eq!(StatusLevel::from_count(0), StatusLevel::Normal);
        assert_eq!(StatusLevel::from_count(1), StatusLevel::Minor);
        assert_eq!(StatusLevel::from_count(2), StatusLevel::Minor);
        assert_eq!(StatusLevel::from_count(3), StatusLevel::Moderate);
        assert_eq!(StatusLevel::from_count(5), StatusLevel::Moderate);
        assert_eq!(StatusLevel::from_count(6), StatusLevel::Critical);
    }

    #[test]
    fn test_service_status_window() {
        let now = Utc::now();
        let reports = vec![
            report("a", ServiceType::Water, DEFAULT_ORIGIN, Duration::hours(1), now),
            report("b", ServiceType::Water, DEFAULT_ORIGIN, Duration::hours(23), now),
            report("c", ServiceType::Water, DEFAULT_ORIGIN, Duration::hours(25), now),
            report("d", ServiceType::Electricity, DEFAULT_ORIGIN, Duration::minutes(5), now),
        ];

        let status = service_status(&reports, now, &FeedConfig::default());
        assert_eq!(status.len(), 4);

        let water = status.iter().find(|s| s.service_type == ServiceType::Water).unwrap();
        assert_eq!(water.count, 2);
        assert_eq!(water.level, StatusLevel::Minor);

        let internet = status.iter().find(|s| s.service_type == ServiceType::Internet).unwrap();
        assert_eq!(internet.count, 0);
        assert_eq!(internet.level, StatusLevel::Normal);
    }

    #[test]
    fn test_nearby_sorted_and_limited() {
        let now = Utc::now();
        let hour = Duration::hours(1);
        let reports = vec![
            report("far", ServiceType::Water, offset_meters(&DEFAULT_ORIGIN, 4_000.0, 0.0), hour, now),
            report("out", ServiceType::Water, offset_meters(&DEFAULT_ORIGIN, 6_000.0, 0.0), hour, now),
            report("near", ServiceType::Water, offset_meters(&DEFAULT_ORIGIN, 100.0, 0.0), hour, now),
            report("mid", ServiceType::Water, offset_meters(&DEFAULT_ORIGIN, 1_000.0, 0.0), hour, now),
            report("old", ServiceType::Water, DEFAULT_ORIGIN, Duration::hours(49), now),
            report("next", ServiceType::Water, offset_meters(&DEFAULT_ORIGIN, 2_000.0, 0.0), hour, now),
        ];

        let nearby = nearby_reports(&reports, &DEFAULT_ORIGIN, now, &FeedConfig::default());
        let ids: Vec<&str> = nearby.iter().map(|n| n.report.id.as_str()).collect();
        assert_eq!(ids, vec!["near", "mid", "next"]);
        assert!((nearby[0].distance_m - 100.0).abs() < 1.0);
    }

    #[test]
    fn test_nearby_skips_invalid_coordinates() {
        let now = Utc::now();
        let reports = vec![report(
            "broken",
            ServiceType::Water,
            Coordinates::new(f64::NAN, 0.0),
            Duration::hours(1),
            now,
        )];
        assert!(nearby_reports(&reports, &DEFAULT_ORIGIN, now, &FeedConfig::default()).is_empty());
    }

    #[test]
    fn test_formatting_helpers() {
        let now = Utc::now();
        assert_eq!(format_time_ago(now - Duration::minutes(12), now), "12m ago");
        assert_eq!(format_time_ago(now - Duration::hours(5), now), "5h ago");
        assert_eq!(format_time_ago(now - Duration::days(3), now), "3d ago");
        assert_eq!(format_distance(420.4), "420 m");
        assert_eq!(format_distance(2_345.0), "2.3 km");
    }
}
