//! Inline cell editing.
//!
//! Per-cell state machine: `Viewing -> Editing -> {Committing -> Viewing |
//! Cancelled -> Viewing}`. Editing is not optimistic: the grid keeps
//! rendering the stored value until the external persist layer confirms,
//! at which point the host applies the confirmed value to the shared store.

use pursuit_core::model::item::WorkItem;
use pursuit_core::model::value::CellValue;
use pursuit_core::transition::GatewayError;

use crate::column::{ColumnKind, ColumnModel};
use crate::state::CellRef;

/// External persist collaborator for committed cell edits.
pub trait CellGateway {
    /// Ask the backend to persist the new value.
    ///
    /// # Errors
    ///
    /// Any [`GatewayError`] leaves the previous value in effect.
    fn persist_cell(
        &mut self,
        item_id: &str,
        column_key: &str,
        value: &CellValue,
    ) -> Result<(), GatewayError>;
}

/// Structurally invalid edit request; refused locally with no gateway call.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("column '{0}' does not accept inline edits")]
    NonEditable(String),
    #[error("no edit in progress")]
    NoActiveEdit,
    #[error("'{draft}' is not a valid {kind} value")]
    InvalidValue { draft: String, kind: ColumnKind },
}

/// What came of a commit gesture.
#[derive(Debug, Clone, PartialEq)]
pub enum CommitOutcome {
    /// The backend confirmed; the host should apply `value` to the store.
    Persisted {
        item_id: String,
        column_key: String,
        value: CellValue,
    },
    /// The backend refused; the cell reverted to the last-known-good value.
    Failed { item_id: String, reason: String },
}

#[derive(Debug)]
struct ActiveEdit {
    row_id: String,
    column_key: String,
    kind: ColumnKind,
    draft: String,
}

/// Drives at most one in-flight edit for a grid view.
#[derive(Debug, Default)]
pub struct EditController {
    active: Option<ActiveEdit>,
}

impl EditController {
    /// Enter editing on `column` for `item` (double-activate gesture).
    ///
    /// The draft starts from the cell's current display text.
    ///
    /// # Errors
    ///
    /// [`EditError::NonEditable`] unless the column is flagged editable and
    /// of a scalar kind. Refusal is silent at the UI level: no network call,
    /// no state change.
    pub fn begin(&mut self, item: &WorkItem, column: &ColumnModel) -> Result<CellRef, EditError> {
        if !column.editable || !column.kind.is_scalar() {
            return Err(EditError::NonEditable(column.key.clone()));
        }
        let draft = item.value(&column.key).display();
        self.active = Some(ActiveEdit {
            row_id: item.id.clone(),
            column_key: column.key.clone(),
            kind: column.kind,
            draft,
        });
        Ok(CellRef {
            row_id: item.id.clone(),
            column_key: column.key.clone(),
        })
    }

    #[must_use]
    pub const fn is_editing(&self) -> bool {
        self.active.is_some()
    }

    #[must_use]
    pub fn cell(&self) -> Option<CellRef> {
        self.active.as_ref().map(|a| CellRef {
            row_id: a.row_id.clone(),
            column_key: a.column_key.clone(),
        })
    }

    #[must_use]
    pub fn draft(&self) -> Option<&str> {
        self.active.as_ref().map(|a| a.draft.as_str())
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(active) = &mut self.active {
            active.draft.push(c);
        }
    }

    pub fn backspace(&mut self) {
        if let Some(active) = &mut self.active {
            active.draft.pop();
        }
    }

    pub fn set_draft(&mut self, draft: &str) {
        if let Some(active) = &mut self.active {
            active.draft = draft.to_string();
        }
    }

    /// Escape gesture: discard the draft, return to Viewing. No gateway call.
    /// Returns true if an edit was actually cancelled.
    pub fn cancel(&mut self) -> bool {
        self.active.take().is_some()
    }

    /// Confirm gesture (Enter / focus loss): parse the draft and hand it to
    /// the persist collaborator.
    ///
    /// On parse failure the edit stays active so the user can fix the draft.
    /// On gateway failure the edit ends and the previous value stands.
    ///
    /// # Errors
    ///
    /// [`EditError::NoActiveEdit`] without an edit in progress;
    /// [`EditError::InvalidValue`] when the draft does not parse for the
    /// column kind.
    pub fn commit(&mut self, gateway: &mut dyn CellGateway) -> Result<CommitOutcome, EditError> {
        let active = self.active.as_ref().ok_or(EditError::NoActiveEdit)?;
        let value = parse_draft(&active.draft, active.kind).ok_or_else(|| {
            EditError::InvalidValue {
                draft: active.draft.clone(),
                kind: active.kind,
            }
        })?;

        // Draft parsed; the edit ends now whichever way the backend answers.
        let active = self.active.take().ok_or(EditError::NoActiveEdit)?;
        match gateway.persist_cell(&active.row_id, &active.column_key, &value) {
            Ok(()) => Ok(CommitOutcome::Persisted {
                item_id: active.row_id,
                column_key: active.column_key,
                value,
            }),
            Err(err) => {
                tracing::warn!(
                    item_id = active.row_id,
                    column = active.column_key,
                    error = %err,
                    "cell persist rejected"
                );
                Ok(CommitOutcome::Failed {
                    item_id: active.row_id,
                    reason: err.to_string(),
                })
            }
        }
    }
}

/// Parse a draft string according to the column kind. Empty drafts clear
/// optional cells. `None` means the draft is structurally invalid.
fn parse_draft(draft: &str, kind: ColumnKind) -> Option<CellValue> {
    let trimmed = draft.trim();
    match kind {
        ColumnKind::Text => Some(CellValue::Text(trimmed.to_string())),
        ColumnKind::Number => {
            if trimmed.is_empty() {
                return Some(CellValue::Missing);
            }
            trimmed.parse::<f64>().ok().map(CellValue::Number)
        }
        ColumnKind::Currency => {
            if trimmed.is_empty() {
                return Some(CellValue::Missing);
            }
            let cleaned: String = trimmed
                .trim_start_matches('$')
                .chars()
                .filter(|c| *c != ',')
                .collect();
            cleaned.parse::<f64>().ok().map(CellValue::Currency)
        }
        ColumnKind::Date => {
            if trimmed.is_empty() {
                return Some(CellValue::Missing);
            }
            chrono::NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .map(CellValue::Date)
        }
        // Badge/progress/link/structural kinds never reach here; begin()
        // refuses them.
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::{CellGateway, CommitOutcome, EditController, EditError, parse_draft};
    use crate::column::{ColumnKind, ColumnModel, ColumnRegistry};
    use pursuit_core::model::item::WorkItem;
    use pursuit_core::model::value::CellValue;
    use pursuit_core::transition::GatewayError;

    struct RecordingGateway {
        fail: bool,
        calls: Vec<(String, String)>,
    }

    impl RecordingGateway {
        fn ok() -> Self {
            Self {
                fail: false,
                calls: vec![],
            }
        }

        fn failing() -> Self {
            Self {
                fail: true,
                calls: vec![],
            }
        }
    }

    impl CellGateway for RecordingGateway {
        fn persist_cell(
            &mut self,
            item_id: &str,
            column_key: &str,
            _value: &CellValue,
        ) -> Result<(), GatewayError> {
            self.calls.push((item_id.to_string(), column_key.to_string()));
            if self.fail {
                Err(GatewayError::Rejected("conflict".into()))
            } else {
                Ok(())
            }
        }
    }

    fn fixture() -> WorkItem {
        WorkItem {
            id: "rfp-9".into(),
            title: "Depot expansion".into(),
            budget: Some(75_000.0),
            ..WorkItem::default()
        }
    }

    fn column(key: &str) -> ColumnModel {
        ColumnRegistry::standard().get(key).cloned().expect("column")
    }

    #[test]
    fn begin_on_non_editable_kind_is_refused() {
        let mut controller = EditController::default();
        let err = controller
            .begin(&fixture(), &column("stage"))
            .unwrap_err();
        assert_eq!(err, EditError::NonEditable("stage".into()));
        assert!(!controller.is_editing());
    }

    #[test]
    fn draft_starts_from_current_display_value() {
        let mut controller = EditController::default();
        controller.begin(&fixture(), &column("title")).unwrap();
        assert_eq!(controller.draft(), Some("Depot expansion"));
    }

    #[test]
    fn cancel_discards_draft_without_gateway_call() {
        let mut controller = EditController::default();
        let mut gateway = RecordingGateway::ok();
        controller.begin(&fixture(), &column("title")).unwrap();
        controller.set_draft("Something else");
        assert!(controller.cancel());
        assert!(!controller.is_editing());
        assert!(gateway.calls.is_empty());
        // Committing now is a structural error.
        assert_eq!(
            controller.commit(&mut gateway).unwrap_err(),
            EditError::NoActiveEdit
        );
    }

    #[test]
    fn commit_hands_parsed_value_to_gateway() {
        let mut controller = EditController::default();
        let mut gateway = RecordingGateway::ok();
        controller.begin(&fixture(), &column("budget")).unwrap();
        controller.set_draft("$120,500");
        let outcome = controller.commit(&mut gateway).unwrap();
        assert_eq!(
            outcome,
            CommitOutcome::Persisted {
                item_id: "rfp-9".into(),
                column_key: "budget".into(),
                value: CellValue::Currency(120_500.0),
            }
        );
        assert_eq!(gateway.calls.len(), 1);
        assert!(!controller.is_editing());
    }

    #[test]
    fn invalid_draft_keeps_editing_and_skips_gateway() {
        let mut controller = EditController::default();
        let mut gateway = RecordingGateway::ok();
        controller.begin(&fixture(), &column("budget")).unwrap();
        controller.set_draft("not a number");
        let err = controller.commit(&mut gateway).unwrap_err();
        assert!(matches!(err, EditError::InvalidValue { .. }));
        assert!(controller.is_editing());
        assert!(gateway.calls.is_empty());
    }

    #[test]
    fn gateway_failure_reverts_to_viewing() {
        let mut controller = EditController::default();
        let mut gateway = RecordingGateway::failing();
        controller.begin(&fixture(), &column("title")).unwrap();
        controller.set_draft("New title");
        let outcome = controller.commit(&mut gateway).unwrap();
        assert!(matches!(outcome, CommitOutcome::Failed { .. }));
        assert!(!controller.is_editing());
    }

    #[test]
    fn draft_parsing_by_kind() {
        assert_eq!(
            parse_draft("2026-01-15", ColumnKind::Date),
            Some(CellValue::Date(
                chrono::NaiveDate::from_ymd_opt(2026, 1, 15).unwrap()
            ))
        );
        assert_eq!(parse_draft("junk", ColumnKind::Date), None);
        assert_eq!(
            parse_draft("12.5", ColumnKind::Number),
            Some(CellValue::Number(12.5))
        );
        assert_eq!(parse_draft("", ColumnKind::Number), Some(CellValue::Missing));
        assert_eq!(parse_draft("x", ColumnKind::StageBadge), None);
    }
}
