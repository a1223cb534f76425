//! Completion state tracking for the active checklist.
//!
//! The tracker owns one [`RowState`] per instruction of the active
//! checklist, in the same order. It is single-writer and synchronous: one
//! thread drives every read and write.
//!
//! Comment edits can be staged before they are committed. The submission
//! workflow always flushes the staged edit before reading final state, so
//! an edit still in progress when the operator submits is never lost.

use crate::model::Checklist;
use crate::store::ChecklistStore;
use crate::{TrackerError, TrackerResult};

/// Mutable per-row completion state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RowState {
    /// Instruction body, copied for rendering.
    pub text: String,

    /// Whether the operator has ticked this row. Header rows start ticked.
    pub checked: bool,

    /// Operator comment. Starts from the instruction's preset comment,
    /// empty when there is none.
    pub comment: String,

    /// Reference link, copied for rendering.
    pub help_url: Option<String>,

    /// Header rows are not meant to be verified and render distinctly.
    pub header_only: bool,
}

#[derive(Clone, Debug)]
struct PendingEdit {
    row: usize,
    comment: String,
}

/// Tracks checked/comment state for the rows of the active checklist.
#[derive(Debug, Default)]
pub struct CompletionTracker {
    active_title: Option<String>,
    rows: Vec<RowState>,
    pending: Option<PendingEdit>,
}

impl CompletionTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activates a checklist from the store, rebuilding the row sequence.
    ///
    /// Previous rows and any staged edit are discarded either way.
    ///
    /// # Errors
    /// `TrackerError::ChecklistNotFound` when the title is absent; the
    /// tracker is left empty so the caller can show an empty table.
    pub fn activate(&mut self, store: &ChecklistStore, title: &str) -> TrackerResult<()> {
        self.pending = None;

        let Some(checklist) = store.get(title) else {
            self.active_title = None;
            self.rows.clear();
            return Err(TrackerError::ChecklistNotFound(title.to_string()));
        };

        self.active_title = Some(checklist.title.clone());
        self.rows = Self::rows_from(checklist);
        Ok(())
    }

    fn rows_from(checklist: &Checklist) -> Vec<RowState> {
        checklist
            .instructions
            .iter()
            .map(|instruction| RowState {
                text: instruction.text.clone(),
                checked: instruction.header_only,
                comment: instruction.preset_comment.clone().unwrap_or_default(),
                help_url: instruction.help_url.clone(),
                header_only: instruction.header_only,
            })
            .collect()
    }

    /// Sets the checked flag of one row.
    ///
    /// # Errors
    /// `TrackerError::IndexOutOfRange` when `row` is outside the sequence.
    pub fn set_checked(&mut self, row: usize, value: bool) -> TrackerResult<()> {
        let state = self.row_mut(row)?;
        state.checked = value;
        Ok(())
    }

    /// Replaces the comment of one row immediately.
    ///
    /// # Errors
    /// `TrackerError::IndexOutOfRange` when `row` is outside the sequence.
    pub fn set_comment(&mut self, row: usize, text: impl Into<String>) -> TrackerResult<()> {
        let state = self.row_mut(row)?;
        state.comment = text.into();
        Ok(())
    }

    /// Records a comment edit in progress without touching row state.
    ///
    /// A later [`commit_pending`](Self::commit_pending) flushes it; a later
    /// stage for any row replaces it; `activate` discards it.
    ///
    /// # Errors
    /// `TrackerError::IndexOutOfRange` when `row` is outside the sequence.
    pub fn stage_comment(&mut self, row: usize, text: impl Into<String>) -> TrackerResult<()> {
        if row >= self.rows.len() {
            return Err(TrackerError::IndexOutOfRange {
                index: row,
                len: self.rows.len(),
            });
        }
        self.pending = Some(PendingEdit {
            row,
            comment: text.into(),
        });
        Ok(())
    }

    /// Flushes a staged comment edit into row state. Idempotent; a no-op
    /// when nothing is staged.
    pub fn commit_pending(&mut self) {
        if let Some(edit) = self.pending.take() {
            // The row was validated at stage time and the sequence only
            // changes through activate, which clears the stage first.
            if let Some(state) = self.rows.get_mut(edit.row) {
                state.comment = edit.comment;
            }
        }
    }

    pub fn rows(&self) -> &[RowState] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Title of the active checklist, `None` when nothing is active.
    pub fn active_title(&self) -> Option<&str> {
        self.active_title.as_deref()
    }

    fn row_mut(&mut self, row: usize) -> TrackerResult<&mut RowState> {
        let len = self.rows.len();
        self.rows
            .get_mut(row)
            .ok_or(TrackerError::IndexOutOfRange { index: row, len })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Checklist, Instruction};

    fn store_with(checklists: Vec<Checklist>) -> ChecklistStore {
        let mut store = ChecklistStore::new();
        for checklist in checklists {
            store.insert(checklist);
        }
        store
    }

    fn two_row_checklist() -> Checklist {
        let mut c = Checklist::new("startrun-HLT");
        c.instructions.push(Instruction {
            text: "Section header".into(),
            preset_comment: None,
            help_url: None,
            header_only: true,
        });
        c.instructions.push(Instruction {
            text: "Check power".into(),
            preset_comment: Some("nominal".into()),
            help_url: Some("https://wiki/power".into()),
            header_only: false,
        });
        c
    }

    #[test]
    fn activate_builds_rows_in_order() {
        let store = store_with(vec![two_row_checklist()]);
        let mut tracker = CompletionTracker::new();

        tracker
            .activate(&store, "startrun-HLT")
            .expect("title present");

        assert_eq!(tracker.len(), 2);
        assert_eq!(tracker.active_title(), Some("startrun-HLT"));
        assert_eq!(tracker.rows()[0].text, "Section header");
        assert_eq!(tracker.rows()[1].comment, "nominal");
    }

    #[test]
    fn checked_initialisation_follows_header_only() {
        let store = store_with(vec![two_row_checklist()]);
        let mut tracker = CompletionTracker::new();
        tracker
            .activate(&store, "startrun-HLT")
            .expect("title present");

        assert!(tracker.rows()[0].checked);
        assert!(!tracker.rows()[1].checked);
    }

    #[test]
    fn activate_absent_title_clears_rows() {
        let store = store_with(vec![two_row_checklist()]);
        let mut tracker = CompletionTracker::new();
        tracker
            .activate(&store, "startrun-HLT")
            .expect("title present");

        let result = tracker.activate(&store, "missing");

        assert_eq!(
            result,
            Err(TrackerError::ChecklistNotFound("missing".into()))
        );
        assert!(tracker.is_empty());
        assert_eq!(tracker.active_title(), None);
    }

    #[test]
    fn set_checked_out_of_range() {
        let store = store_with(vec![two_row_checklist()]);
        let mut tracker = CompletionTracker::new();
        tracker
            .activate(&store, "startrun-HLT")
            .expect("title present");

        let result = tracker.set_checked(5, true);
        assert_eq!(result, Err(TrackerError::IndexOutOfRange { index: 5, len: 2 }));
    }

    #[test]
    fn staged_comment_is_invisible_until_committed() {
        let store = store_with(vec![two_row_checklist()]);
        let mut tracker = CompletionTracker::new();
        tracker
            .activate(&store, "startrun-HLT")
            .expect("title present");

        tracker.stage_comment(1, "in progress").expect("row in range");
        assert_eq!(tracker.rows()[1].comment, "nominal");

        tracker.commit_pending();
        assert_eq!(tracker.rows()[1].comment, "in progress");

        // Idempotent: a second flush changes nothing.
        tracker.commit_pending();
        assert_eq!(tracker.rows()[1].comment, "in progress");
    }

    #[test]
    fn activate_discards_staged_edit() {
        let store = store_with(vec![two_row_checklist()]);
        let mut tracker = CompletionTracker::new();
        tracker
            .activate(&store, "startrun-HLT")
            .expect("title present");
        tracker.stage_comment(1, "lost").expect("row in range");

        tracker
            .activate(&store, "startrun-HLT")
            .expect("title present");
        tracker.commit_pending();

        assert_eq!(tracker.rows()[1].comment, "nominal");
    }
}
