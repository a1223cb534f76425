//! Session state machine for one checklist form.
//!
//! `Loaded -> Active -> Submitting -> Closed`, with a cancelled submission
//! returning to `Active`. Closing is accepted from every live state, so an
//! operator can quit from the menu without activating anything. `Closed` is
//! terminal: viewing the checklist again
//! requires a fresh activation, which resets row state. There is no
//! saved-but-not-submitted state; edits are volatile and lost on close.

/// Lifecycle state of a checklist session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionState {
    /// Store built, no checklist active yet.
    Loaded,
    /// A checklist is active and editable.
    Active,
    /// The submission workflow is running.
    Submitting,
    /// The form is closed. Terminal.
    Closed,
}

/// Events that move a session between states.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SessionEvent {
    /// A checklist was activated (or re-activated, resetting rows).
    Activated,
    /// The operator triggered submission.
    SubmissionStarted,
    /// The operator declined the submission confirmation.
    SubmissionCancelled,
    /// The submission ran to completion, or the operator closed the form.
    SessionClosed,
}

impl SessionState {
    /// Applies one event. Total: invalid transitions leave the state
    /// unchanged, and `Closed` ignores every event.
    pub fn apply(self, event: SessionEvent) -> SessionState {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            (Loaded, Activated) => Active,
            (Loaded, SessionClosed) => Closed,
            (Active, Activated) => Active,
            (Active, SubmissionStarted) => Submitting,
            (Active, SessionClosed) => Closed,
            (Submitting, SubmissionCancelled) => Active,
            (Submitting, SessionClosed) => Closed,
            (state, _) => state,
        }
    }

    pub fn is_closed(self) -> bool {
        self == SessionState::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use SessionEvent::*;
    use SessionState::*;

    #[test]
    fn nominal_path_reaches_closed() {
        let state = Loaded
            .apply(Activated)
            .apply(SubmissionStarted)
            .apply(SessionClosed);
        assert_eq!(state, Closed);
    }

    #[test]
    fn cancelled_submission_returns_to_active() {
        let state = Loaded
            .apply(Activated)
            .apply(SubmissionStarted)
            .apply(SubmissionCancelled);
        assert_eq!(state, Active);
    }

    #[test]
    fn closed_is_terminal() {
        let closed = Loaded.apply(Activated).apply(SessionClosed);
        assert!(closed.is_closed());
        assert_eq!(closed.apply(Activated), Closed);
        assert_eq!(closed.apply(SubmissionStarted), Closed);
        assert_eq!(closed.apply(SubmissionCancelled), Closed);
    }

    #[test]
    fn invalid_transitions_are_identity() {
        assert_eq!(Loaded.apply(SubmissionStarted), Loaded);
        assert_eq!(Loaded.apply(SubmissionCancelled), Loaded);
        assert_eq!(Active.apply(SubmissionCancelled), Active);
        assert_eq!(Submitting.apply(Activated), Submitting);
    }

    #[test]
    fn closing_from_the_menu_is_allowed() {
        assert_eq!(Loaded.apply(SessionClosed), Closed);
    }

    #[test]
    fn reactivation_keeps_session_active() {
        let state = Loaded.apply(Activated).apply(Activated);
        assert_eq!(state, Active);
    }
}
