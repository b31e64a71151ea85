//! The "pick location" mode of the report form

use tracing::debug;

use super::engine::{DedupAction, classify};
use super::resolver::{Resolver, Selection, SelectionError, SelectionOutcome};
use crate::geo::Coordinates;
use crate::models::{Identity, Report, ReportDraft, ValidationError};

#[derive(Debug, Clone, Default)]
enum SessionState {
    #[default]
    Idle,
    Selecting {
        draft: ReportDraft,
        pending: Option<Selection>,
    },
}

/// Tracks one draft through location selection.
///
/// Clicks only count while selecting; each click replaces the previous
/// classification. Nothing reaches the store until [`commit`](Self::commit).
#[derive(Debug, Clone, Default)]
pub struct SelectionSession {
    state: SessionState,
}

impl SelectionSession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enter selection mode for `draft`. The draft is validated on the first click.
    pub fn begin(&mut self, draft: ReportDraft) {
        debug!("Entering location selection mode");
        self.state = SessionState::Selecting {
            draft,
            pending: None,
        };
    }

    pub fn is_selecting(&self) -> bool {
        matches!(self.state, SessionState::Selecting { .. })
    }

    pub fn draft(&self) -> Option<&ReportDraft> {
        match &self.state {
            SessionState::Selecting { draft, .. } => Some(draft),
            SessionState::Idle => None,
        }
    }

    pub fn pending(&self) -> Option<&Selection> {
        match &self.state {
            SessionState::Selecting { pending, .. } => pending.as_ref(),
            SessionState::Idle => None,
        }
    }

    /// Handle a map click. Returns `None` when not in selection mode.
    pub fn select_point(
        &mut self,
        point: Coordinates,
        snapshot: &[Report],
    ) -> Option<Result<DedupAction, ValidationError>> {
        let SessionState::Selecting { draft, pending } = &mut self.state else {
            debug!(%point, "Ignoring click outside selection mode");
            return None;
        };

        let result = classify(point, draft, snapshot);
        *pending = match &result {
            Ok(action) => Some(Selection {
                draft: draft.clone(),
                point,
                action: action.clone(),
            }),
            Err(_) => None,
        };

        Some(result)
    }

    /// Leave selection mode, discarding any pending classification
    pub fn cancel(&mut self) -> bool {
        let was_selecting = self.is_selecting();
        self.state = SessionState::Idle;
        if was_selecting {
            debug!("Location selection cancelled");
        }
        was_selecting
    }

    /// Apply the pending classification once and leave selection mode.
    ///
    /// On failure the session keeps its draft and point so the same
    /// selection can be committed again.
    pub async fn commit(
        &mut self,
        resolver: &Resolver<'_>,
        actor: Option<&Identity>,
    ) -> Result<SelectionOutcome, SelectionError> {
        let selection = self.pending().cloned().ok_or(SelectionError::NoSelection)?;

        let outcome = resolver.resolve(&selection, actor).await?;
        self.state = SessionState::Idle;
        Ok(outcome)
    }
}
