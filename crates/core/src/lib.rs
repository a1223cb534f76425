//! # Checklist Core
//!
//! Core business logic for the operator checklist system.
//!
//! This crate contains the pure data model and the stateful completion
//! workflow:
//! - Checklist and Instruction value types
//! - The insertion-ordered [`ChecklistStore`]
//! - The [`CompletionTracker`] holding per-row checked/comment state
//! - The session state machine
//! - The submission workflow driven through collaborator traits
//!
//! **No I/O concerns**: document parsing lives in `checklist-xml`, the
//! external log client in `checklist-elog`, and operator interaction in the
//! embedding binary. The core reaches the outside world only through the
//! traits in [`collaborators`].

pub mod collaborators;
pub mod model;
pub mod session;
pub mod store;
pub mod tracker;
pub mod workflow;

pub use collaborators::{CollaboratorError, HostCallback, LogSubmitter, OperatorPrompt};
pub use model::{Checklist, Instruction};
pub use session::{SessionEvent, SessionState};
pub use store::ChecklistStore;
pub use tracker::{CompletionTracker, RowState};
pub use workflow::{build_report, CompletionReport, HostLink, SubmissionOutcome, SubmissionWorkflow};

/// Errors that can occur during tracker operations
#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TrackerError {
    /// The requested title is not present in the store (non-fatal; the
    /// tracker is left empty)
    #[error("no checklist titled '{0}' is loaded")]
    ChecklistNotFound(String),

    /// A row index fell outside the active row sequence (a programming
    /// fault in the caller, surfaced as an error rather than a panic)
    #[error("row index {index} out of range for {len} rows")]
    IndexOutOfRange { index: usize, len: usize },
}

pub type TrackerResult<T> = std::result::Result<T, TrackerError>;
