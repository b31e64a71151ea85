//! Applying a classification through the report store

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::engine::DedupAction;
use crate::geo::Coordinates;
use crate::guard::AnonymousGuard;
use crate::models::{Identity, Report, ReportDraft, ValidationError};
use crate::storage::{ReportStore, StorageError};

/// A classified point together with the draft it was classified for
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Selection {
    pub draft: ReportDraft,
    pub point: Coordinates,
    pub action: DedupAction,
}

/// Result of applying a selection. None of these are failures.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum SelectionOutcome {
    /// One confirmation was added
    Confirmed { report: Report },

    /// This actor (or device) had already confirmed; nothing changed
    AlreadyConfirmed { report_id: String },

    /// The draft provider was appended
    Merged { report_id: String, provider: String },

    /// Someone merged the same provider first; nothing changed
    AlreadyMerged { report_id: String },

    /// No matching report; the caller may create one at `point`
    ReadyToCreate { point: Coordinates },

    /// The targeted report disappeared. Creating at `point` needs the
    /// user's explicit go-ahead.
    ReportVanished { point: Coordinates },
}

/// Failures while classifying or applying a selection
#[derive(Debug, thiserror::Error)]
pub enum SelectionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The store could not be reached. The draft and point are kept so the
    /// same selection can be retried.
    #[error("Report store unavailable: {source}")]
    Store {
        source: StorageError,
        draft: ReportDraft,
        point: Coordinates,
    },

    #[error("No location has been selected")]
    NoSelection,
}

impl SelectionError {
    pub fn is_retryable(&self) -> bool {
        matches!(self, SelectionError::Store { .. })
    }
}

/// The draft is complete and the action is one `classify` could have produced for it
fn check_selection(selection: &Selection) -> Result<(), ValidationError> {
    let (service_type, provider) = selection.draft.validate()?;

    let consistent = match &selection.action {
        DedupAction::ConfirmExisting { report } => {
            report.service_type == service_type && report.provider == provider
        }
        DedupAction::MergeProvider {
            report,
            provider: merged,
        } => report.service_type == service_type && merged == provider,
        DedupAction::CreateNew { point } => *point == selection.point,
    };

    if !consistent {
        warn!(action = selection.action.name(), "Selection does not match its draft");
        return Err(ValidationError::Invalid(
            "selection action does not match the draft".to_string(),
        ));
    }
    if !selection.point.is_valid() {
        return Err(ValidationError::InvalidCoordinates(selection.point.to_string()));
    }
    Ok(())
}

/// Applies selections and direct confirmations against a store
#[derive(Clone, Copy)]
pub struct Resolver<'a> {
    store: &'a dyn ReportStore,
    guard: Option<&'a AnonymousGuard>,
}

impl<'a> Resolver<'a> {
    pub fn new(store: &'a dyn ReportStore) -> Self {
        Self { store, guard: None }
    }

    /// Consult and update this device guard for anonymous confirmations
    pub fn with_guard(mut self, guard: &'a AnonymousGuard) -> Self {
        self.guard = Some(guard);
        self
    }

    /// Apply a classified selection.
    ///
    /// Selections may arrive from outside the process, so the draft is
    /// validated and the action must agree with it before the store is touched.
    pub async fn resolve(
        &self,
        selection: &Selection,
        actor: Option<&Identity>,
    ) -> Result<SelectionOutcome, SelectionError> {
        check_selection(selection)?;
        let point = selection.point;
        debug!(action = selection.action.name(), %point, "Resolving selection");

        let result = match &selection.action {
            DedupAction::CreateNew { point } => {
                return Ok(SelectionOutcome::ReadyToCreate { point: *point });
            }
            DedupAction::ConfirmExisting { report } => self.confirm(&report.id, actor).await,
            DedupAction::MergeProvider { report, provider } => {
                self.merge(&report.id, provider, actor).await
            }
        };

        match result {
            Ok(outcome) => Ok(outcome),
            Err(StorageError::NotFound(_)) => {
                warn!(%point, "Selected report no longer exists");
                Ok(SelectionOutcome::ReportVanished { point })
            }
            Err(StorageError::Validation(msg)) => {
                Err(SelectionError::Validation(ValidationError::Invalid(msg)))
            }
            Err(source) => Err(SelectionError::Store {
                source,
                draft: selection.draft.clone(),
                point,
            }),
        }
    }

    /// Confirm a report directly. `AlreadyConfirmed` is folded into the outcome.
    pub async fn confirm(
        &self,
        report_id: &str,
        actor: Option<&Identity>,
    ) -> Result<SelectionOutcome, StorageError> {
        let actor_id = actor.map(|a| a.id.as_str());

        if actor_id.is_none()
            && let Some(guard) = self.guard
            && guard.has_confirmed(report_id)
        {
            debug!(report_id, "Device already confirmed this report");
            return Ok(SelectionOutcome::AlreadyConfirmed {
                report_id: report_id.to_string(),
            });
        }

        match self.store.confirm_report(report_id, actor_id).await {
            Ok(report) => {
                if actor_id.is_none()
                    && let Some(guard) = self.guard
                {
                    guard.record_confirmed(report_id);
                }
                info!(report_id, confirmations = report.confirmations, "Report confirmed");
                Ok(SelectionOutcome::Confirmed { report })
            }
            Err(StorageError::AlreadyConfirmed(_)) => Ok(SelectionOutcome::AlreadyConfirmed {
                report_id: report_id.to_string(),
            }),
            Err(e) => Err(e),
        }
    }

    async fn merge(
        &self,
        report_id: &str,
        provider: &str,
        actor: Option<&Identity>,
    ) -> Result<SelectionOutcome, StorageError> {
        let actor_id = actor.map(|a| a.id.as_str());
        match self.store.merge_provider(report_id, provider, actor_id).await {
            Ok(provider) => Ok(SelectionOutcome::Merged {
                report_id: report_id.to_string(),
                provider,
            }),
            Err(StorageError::AlreadyMerged(_)) => Ok(SelectionOutcome::AlreadyMerged {
                report_id: report_id.to_string(),
            }),
            Err(e) => Err(e),
        }
    }
}
