//! Submission workflow.
//!
//! Drives a checklist from its edited row state to a closed form: flush the
//! pending edit, refuse empty forms, confirm with the operator, build the
//! textual report, notify the host on full completion, and offer to insert
//! the report into the external log. Collaborator failures are reported to
//! the operator and the flow continues; the form closes regardless.

use crate::collaborators::{HostCallback, LogSubmitter, OperatorPrompt};
use crate::model::Checklist;
use crate::tracker::{CompletionTracker, RowState};

/// Textual completion report plus the number of unchecked rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CompletionReport {
    pub text: String,
    pub unchecked: usize,
}

/// Builds the report for a row sequence.
///
/// Each row contributes a marker line (`OK:` when checked, `FAILED:` when
/// not), the instruction text, a `COMMENT:` line (present even when the
/// comment is empty) and a blank separator line.
pub fn build_report(rows: &[RowState]) -> CompletionReport {
    let mut text = String::new();
    let mut unchecked = 0;

    for row in rows {
        if row.checked {
            text.push_str("OK:\n");
        } else {
            text.push_str("FAILED:\n");
            unchecked += 1;
        }
        text.push_str(&row.text);
        text.push('\n');
        text.push_str("COMMENT: ");
        text.push_str(&row.comment);
        text.push_str("\n\n");
    }

    CompletionReport { text, unchecked }
}

/// How a submission ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SubmissionOutcome {
    /// The tracker held no rows; nothing was asked and nothing was sent.
    Empty,
    /// The operator declined the initial confirmation; no state changed.
    Cancelled,
    /// The form closed.
    Closed {
        /// Every row was checked.
        completed: bool,
        /// The report was accepted by the log submitter.
        logged: bool,
    },
}

/// Identity handed to the host callback on full completion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HostLink {
    /// Identity of the document the checklist came from.
    pub checklist_file: String,

    /// Opaque token the host handed out at startup.
    pub context_token: String,
}

/// One submission pass over a tracker, wired to its collaborators.
pub struct SubmissionWorkflow<'a> {
    prompt: &'a mut dyn OperatorPrompt,
    submitter: &'a mut dyn LogSubmitter,
    host: Option<(HostLink, &'a mut dyn HostCallback)>,
}

impl<'a> SubmissionWorkflow<'a> {
    /// Creates a workflow with no host link, the stand-alone configuration.
    pub fn new(prompt: &'a mut dyn OperatorPrompt, submitter: &'a mut dyn LogSubmitter) -> Self {
        Self {
            prompt,
            submitter,
            host: None,
        }
    }

    /// Attaches a host callback, invoked exactly once when the checklist
    /// submits fully checked.
    pub fn with_host(mut self, link: HostLink, callback: &'a mut dyn HostCallback) -> Self {
        self.host = Some((link, callback));
        self
    }

    /// Runs the submission.
    ///
    /// Steps: flush the pending comment edit, bail out on an empty form,
    /// confirm, build the report, then either the completed path (host
    /// callback, log offer) or the incomplete path (log offer only; the
    /// host is never notified of an incomplete submission).
    pub fn submit(
        &mut self,
        tracker: &mut CompletionTracker,
        checklist: &Checklist,
    ) -> SubmissionOutcome {
        tracker.commit_pending();

        if tracker.is_empty() {
            self.prompt
                .notify("There is nothing to tick off in this checklist.");
            return SubmissionOutcome::Empty;
        }

        if !self.prompt.confirm("Are you sure to proceed?") {
            return SubmissionOutcome::Cancelled;
        }

        let report = build_report(tracker.rows());

        if report.unchecked == 0 {
            self.notify_host();
            let logged = self.offer_log_entry(
                "Insert the completed checklist report into the log?",
                &report,
                checklist,
            );
            SubmissionOutcome::Closed {
                completed: true,
                logged,
            }
        } else {
            tracing::info!(
                unchecked = report.unchecked,
                title = %checklist.title,
                "checklist submitted incomplete"
            );
            let logged = self.offer_log_entry(
                "This checklist is not completed. Insert the report into the log anyway?",
                &report,
                checklist,
            );
            SubmissionOutcome::Closed {
                completed: false,
                logged,
            }
        }
    }

    fn notify_host(&mut self) {
        if let Some((link, callback)) = self.host.as_mut() {
            if let Err(e) = callback.notify_completed(&link.checklist_file, &link.context_token) {
                tracing::warn!("host notification failed: {e}");
                self.prompt
                    .notify(&format!("Could not notify the calling application: {e}"));
            }
        }
    }

    fn offer_log_entry(
        &mut self,
        question: &str,
        report: &CompletionReport,
        checklist: &Checklist,
    ) -> bool {
        if !self.prompt.confirm(question) {
            return false;
        }

        match self.submitter.submit_report(
            &report.text,
            &checklist.title,
            &checklist.affected_systems,
        ) {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(title = %checklist.title, "log submission failed: {e}");
                self.prompt
                    .notify(&format!("Could not insert the report into the log: {e}"));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::CollaboratorError;
    use crate::model::Instruction;
    use crate::store::ChecklistStore;

    /// Prompt fake answering every confirmation from a queue and recording
    /// everything it was asked or told.
    #[derive(Default)]
    struct ScriptedPrompt {
        answers: Vec<bool>,
        questions: Vec<String>,
        notices: Vec<String>,
    }

    impl ScriptedPrompt {
        fn answering(answers: Vec<bool>) -> Self {
            Self {
                answers,
                ..Self::default()
            }
        }
    }

    impl OperatorPrompt for ScriptedPrompt {
        fn confirm(&mut self, question: &str) -> bool {
            self.questions.push(question.to_string());
            if self.answers.is_empty() {
                false
            } else {
                self.answers.remove(0)
            }
        }

        fn notify(&mut self, notice: &str) {
            self.notices.push(notice.to_string());
        }
    }

    #[derive(Default)]
    struct RecordingSubmitter {
        calls: Vec<(String, String, Vec<String>)>,
        fail: bool,
    }

    impl LogSubmitter for RecordingSubmitter {
        fn submit_report(
            &mut self,
            report: &str,
            title: &str,
            affected_systems: &[String],
        ) -> Result<(), CollaboratorError> {
            self.calls
                .push((report.to_string(), title.to_string(), affected_systems.to_vec()));
            if self.fail {
                Err(CollaboratorError::Failed("log rejected the entry".into()))
            } else {
                Ok(())
            }
        }
    }

    #[derive(Default)]
    struct RecordingHost {
        calls: Vec<(String, String)>,
    }

    impl HostCallback for RecordingHost {
        fn notify_completed(
            &mut self,
            checklist_file: &str,
            context_token: &str,
        ) -> Result<(), CollaboratorError> {
            self.calls
                .push((checklist_file.to_string(), context_token.to_string()));
            Ok(())
        }
    }

    fn signin_daq() -> Checklist {
        let mut c = Checklist::new("signin-DAQ");
        c.instructions.push(Instruction::new("Check power"));
        c.affected_systems.push("DAQ".into());
        c
    }

    fn activated(checklist: &Checklist) -> CompletionTracker {
        let mut store = ChecklistStore::new();
        store.insert(checklist.clone());
        let mut tracker = CompletionTracker::new();
        tracker
            .activate(&store, &checklist.title)
            .expect("title present");
        tracker
    }

    fn link() -> HostLink {
        HostLink {
            checklist_file: "CheckList.xml".into(),
            context_token: "token-42".into(),
        }
    }

    #[test]
    fn report_marks_rows_and_counts_unchecked() {
        let checklist = signin_daq();
        let mut tracker = activated(&checklist);
        tracker.set_checked(0, true).expect("row in range");
        tracker.set_comment(0, "done").expect("row in range");

        let report = build_report(tracker.rows());

        assert_eq!(report.unchecked, 0);
        assert_eq!(report.text, "OK:\nCheck power\nCOMMENT: done\n\n");
    }

    #[test]
    fn empty_tracker_short_circuits() {
        let checklist = signin_daq();
        let mut tracker = CompletionTracker::new();
        let mut prompt = ScriptedPrompt::answering(vec![true, true]);
        let mut submitter = RecordingSubmitter::default();

        let outcome =
            SubmissionWorkflow::new(&mut prompt, &mut submitter).submit(&mut tracker, &checklist);

        assert_eq!(outcome, SubmissionOutcome::Empty);
        assert!(prompt.questions.is_empty());
        assert_eq!(prompt.notices.len(), 1);
        assert!(submitter.calls.is_empty());
    }

    #[test]
    fn declined_confirmation_cancels_without_side_effects() {
        let checklist = signin_daq();
        let mut tracker = activated(&checklist);
        let mut prompt = ScriptedPrompt::answering(vec![false]);
        let mut submitter = RecordingSubmitter::default();
        let mut host = RecordingHost::default();

        let outcome = SubmissionWorkflow::new(&mut prompt, &mut submitter)
            .with_host(link(), &mut host)
            .submit(&mut tracker, &checklist);

        assert_eq!(outcome, SubmissionOutcome::Cancelled);
        assert!(submitter.calls.is_empty());
        assert!(host.calls.is_empty());
    }

    #[test]
    fn completed_round_trip_reaches_submitter() {
        let checklist = signin_daq();
        let mut tracker = activated(&checklist);
        tracker.set_checked(0, true).expect("row in range");
        tracker.stage_comment(0, "done").expect("row in range");

        let mut prompt = ScriptedPrompt::answering(vec![true, true]);
        let mut submitter = RecordingSubmitter::default();

        let outcome =
            SubmissionWorkflow::new(&mut prompt, &mut submitter).submit(&mut tracker, &checklist);

        assert_eq!(
            outcome,
            SubmissionOutcome::Closed {
                completed: true,
                logged: true
            }
        );
        assert_eq!(submitter.calls.len(), 1);
        let (report, title, systems) = &submitter.calls[0];
        assert!(report.contains("OK:"));
        assert!(report.contains("Check power"));
        assert!(report.contains("COMMENT: done"));
        assert_eq!(title, "signin-DAQ");
        assert_eq!(systems, &vec!["DAQ".to_string()]);
    }

    #[test]
    fn host_notified_exactly_once_on_full_completion() {
        let checklist = signin_daq();
        let mut tracker = activated(&checklist);
        tracker.set_checked(0, true).expect("row in range");

        let mut prompt = ScriptedPrompt::answering(vec![true, true]);
        let mut submitter = RecordingSubmitter::default();
        let mut host = RecordingHost::default();

        let outcome = SubmissionWorkflow::new(&mut prompt, &mut submitter)
            .with_host(link(), &mut host)
            .submit(&mut tracker, &checklist);

        assert_eq!(
            outcome,
            SubmissionOutcome::Closed {
                completed: true,
                logged: true
            }
        );
        assert_eq!(host.calls.len(), 1);
        assert_eq!(host.calls[0], ("CheckList.xml".into(), "token-42".into()));
    }

    #[test]
    fn incomplete_submission_never_notifies_host() {
        let mut checklist = signin_daq();
        checklist.instructions.push(Instruction::new("Check gas"));
        let mut tracker = activated(&checklist);
        tracker.set_checked(0, true).expect("row in range");

        // Proceed, then decline the incomplete-log offer.
        let mut prompt = ScriptedPrompt::answering(vec![true, false]);
        let mut submitter = RecordingSubmitter::default();
        let mut host = RecordingHost::default();

        let outcome = SubmissionWorkflow::new(&mut prompt, &mut submitter)
            .with_host(link(), &mut host)
            .submit(&mut tracker, &checklist);

        assert_eq!(
            outcome,
            SubmissionOutcome::Closed {
                completed: false,
                logged: false
            }
        );
        assert!(host.calls.is_empty());
        assert!(submitter.calls.is_empty());
        assert!(prompt.questions[1].contains("not completed"));
    }

    #[test]
    fn submitter_failure_is_reported_and_form_still_closes() {
        let checklist = signin_daq();
        let mut tracker = activated(&checklist);
        tracker.set_checked(0, true).expect("row in range");

        let mut prompt = ScriptedPrompt::answering(vec![true, true]);
        let mut submitter = RecordingSubmitter {
            fail: true,
            ..RecordingSubmitter::default()
        };

        let outcome =
            SubmissionWorkflow::new(&mut prompt, &mut submitter).submit(&mut tracker, &checklist);

        assert_eq!(
            outcome,
            SubmissionOutcome::Closed {
                completed: true,
                logged: false
            }
        );
        assert_eq!(prompt.notices.len(), 1);
        assert!(prompt.notices[0].contains("log"));
    }

    #[test]
    fn pending_edit_is_flushed_before_report() {
        let checklist = signin_daq();
        let mut tracker = activated(&checklist);
        tracker.set_checked(0, true).expect("row in range");
        tracker
            .stage_comment(0, "edited at the last moment")
            .expect("row in range");

        let mut prompt = ScriptedPrompt::answering(vec![true, true]);
        let mut submitter = RecordingSubmitter::default();

        SubmissionWorkflow::new(&mut prompt, &mut submitter).submit(&mut tracker, &checklist);

        let (report, _, _) = &submitter.calls[0];
        assert!(report.contains("COMMENT: edited at the last moment"));
    }
}
