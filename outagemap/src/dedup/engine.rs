//! Classification of a picked point against existing reports

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::geo::{Coordinates, EXACT_LOCATION_THRESHOLD_M, haversine_distance};
use crate::models::{Report, ReportDraft, ValidationError};

/// What to do with a picked point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum DedupAction {
    /// Same service and provider already reported here
    ConfirmExisting { report: Report },

    /// Same service here under another provider; add ours to it
    MergeProvider { report: Report, provider: String },

    /// Nothing matching here; a new report may be created at the point
    CreateNew { point: Coordinates },
}

impl DedupAction {
    /// The existing report this action targets, if any
    pub fn target(&self) -> Option<&Report> {
        match self {
            DedupAction::ConfirmExisting { report } | DedupAction::MergeProvider { report, .. } => {
                Some(report)
            }
            DedupAction::CreateNew { .. } => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            DedupAction::ConfirmExisting { .. } => "confirm_existing",
            DedupAction::MergeProvider { .. } => "merge_provider",
            DedupAction::CreateNew { .. } => "create_new",
        }
    }
}

/// A report near the picked point with its distance in meters
#[derive(Debug, Clone, PartialEq)]
pub struct Colocated<'a> {
    pub report: &'a Report,
    pub distance_m: f64,
}

/// Reports within the exact-location threshold of `point`, in snapshot order.
///
/// Reports with invalid coordinates are skipped.
pub fn colocated_reports<'a>(point: &Coordinates, reports: &'a [Report]) -> Vec<Colocated<'a>> {
    reports
        .iter()
        .filter(|r| r.location.is_valid())
        .filter_map(|report| {
            let distance_m = haversine_distance(point, &report.location);
            (distance_m <= EXACT_LOCATION_THRESHOLD_M).then_some(Colocated { report, distance_m })
        })
        .collect()
}

/// Decide whether the point confirms, merges into, or creates a report.
///
/// An exact service and provider match always wins over a merge candidate,
/// whatever their order in the snapshot. A merge is only proposed when the
/// existing provider string does not already contain the draft provider.
pub fn classify(
    point: Coordinates,
    draft: &ReportDraft,
    reports: &[Report],
) -> Result<DedupAction, ValidationError> {
    let (service_type, provider) = draft.validate()?;

    if !point.is_valid() {
        return Err(ValidationError::InvalidCoordinates(format!(
            "{}, {}",
            point.latitude, point.longitude
        )));
    }

    let colocated = colocated_reports(&point, reports);
    if colocated.is_empty() {
        debug!(%point, "No reports at this location");
        return Ok(DedupAction::CreateNew { point });
    }

    if let Some(existing) = colocated
        .iter()
        .find(|c| c.report.service_type == service_type && c.report.provider == provider)
    {
        debug!(
            report_id = %existing.report.id,
            distance_m = existing.distance_m,
            "Exact match at location"
        );
        return Ok(DedupAction::ConfirmExisting {
            report: existing.report.clone(),
        });
    }

    if let Some(existing) = colocated.iter().find(|c| {
        c.report.service_type == service_type
            && c.report.provider != provider
            && !c.report.providers().contains(provider)
    }) {
        debug!(
            report_id = %existing.report.id,
            existing_provider = %existing.report.provider,
            provider,
            "Merge candidate at location"
        );
        return Ok(DedupAction::MergeProvider {
            report: existing.report.clone(),
            provider: provider.to_string(),
        });
    }

    debug!(
        %point,
        colocated = colocated.len(),
        "No compatible report at location"
    );
    Ok(DedupAction::CreateNew { point })
}
