//! Collaborator interfaces at the edge of the core.
//!
//! The submission workflow reaches the outside world only through these
//! traits. The embedding binary supplies real implementations (stdin
//! prompts, the e-log command-line client); tests supply recording fakes.

use std::time::Duration;

/// Errors surfaced by collaborator calls.
///
/// Collaborator failures are reported to the operator and the workflow
/// continues; they never abort a submission that is already under way.
#[derive(Debug, thiserror::Error)]
pub enum CollaboratorError {
    /// The collaborator ran and failed (spawn error, non-zero exit,
    /// rejected callback).
    #[error("collaborator call failed: {0}")]
    Failed(String),

    /// The collaborator did not answer within its bounded wait.
    #[error("collaborator call timed out after {0:?}")]
    Timeout(Duration),
}

/// Yes/no questions and one-way notices to the operator.
pub trait OperatorPrompt {
    /// Asks a yes/no question; `true` means the operator accepted.
    fn confirm(&mut self, question: &str) -> bool;

    /// Shows a notice requiring no answer.
    fn notify(&mut self, notice: &str);
}

/// Inserts a completion report into the external logging service.
pub trait LogSubmitter {
    /// Submits one report. Never retried by the caller.
    ///
    /// # Arguments
    /// * `report` - the full textual report
    /// * `title` - the checklist title, used as the entry subject
    /// * `affected_systems` - systems the entry is filed against
    ///
    /// # Errors
    /// `CollaboratorError` when the submission fails or times out.
    fn submit_report(
        &mut self,
        report: &str,
        title: &str,
        affected_systems: &[String],
    ) -> Result<(), CollaboratorError>;
}

/// Notifies a host application that a checklist completed fully.
///
/// Absence of a host is expressed as `Option` at the workflow boundary;
/// there is no runtime discovery.
pub trait HostCallback {
    /// Called exactly once per fully-checked submission.
    ///
    /// # Arguments
    /// * `checklist_file` - identity of the document the checklist came from
    /// * `context_token` - opaque token the host handed out at startup
    ///
    /// # Errors
    /// `CollaboratorError` when the host rejects the call or times out.
    fn notify_completed(
        &mut self,
        checklist_file: &str,
        context_token: &str,
    ) -> Result<(), CollaboratorError>;
}
