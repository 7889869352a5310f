//! Recording session state machine

use std::fmt;
use thiserror::Error;

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionState {
    #[default]
    Idle,
    Requesting,
    Recording,
    Stopping,
    Processing,
    Uploaded,
    Failed,
}

impl SessionState {
    /// Get the string representation
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Requesting => "requesting",
            Self::Recording => "recording",
            Self::Stopping => "stopping",
            Self::Processing => "processing",
            Self::Uploaded => "uploaded",
            Self::Failed => "failed",
        }
    }

    /// States in which buffered fragments may exist
    pub const fn may_hold_fragments(&self) -> bool {
        matches!(self, Self::Recording | Self::Stopping | Self::Processing)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Error when an invalid state transition is attempted
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("Invalid state transition: cannot {action} while in {current_state} state")]
pub struct InvalidStateTransition {
    pub current_state: SessionState,
    pub action: String,
}

/// Session lifecycle.
///
/// State machine:
///   IDLE -> REQUESTING (request_access)
///   REQUESTING -> RECORDING (access_granted)
///   RECORDING -> STOPPING (begin_stop)
///   STOPPING -> PROCESSING (finalized)
///   PROCESSING -> UPLOADED (uploaded)
///   any -> FAILED (fail)
///   any -> IDLE (reset)
#[derive(Debug, Default)]
pub struct SessionLifecycle {
    state: SessionState,
}

impl SessionLifecycle {
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == SessionState::Idle
    }

    pub fn is_recording(&self) -> bool {
        self.state == SessionState::Recording
    }

    fn transition(
        &mut self,
        from: SessionState,
        to: SessionState,
        action: &str,
    ) -> Result<(), InvalidStateTransition> {
        if self.state != from {
            return Err(InvalidStateTransition {
                current_state: self.state,
                action: action.to_string(),
            });
        }
        self.state = to;
        Ok(())
    }

    /// Transition from IDLE to REQUESTING
    pub fn request_access(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(SessionState::Idle, SessionState::Requesting, "start recording")
    }

    /// Transition from REQUESTING to RECORDING
    pub fn access_granted(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            SessionState::Requesting,
            SessionState::Recording,
            "begin capture",
        )
    }

    /// Transition from RECORDING to STOPPING
    pub fn begin_stop(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(SessionState::Recording, SessionState::Stopping, "stop recording")
    }

    /// Transition from STOPPING to PROCESSING
    pub fn finalized(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            SessionState::Stopping,
            SessionState::Processing,
            "finalize recording",
        )
    }

    /// Transition from PROCESSING to UPLOADED
    pub fn uploaded(&mut self) -> Result<(), InvalidStateTransition> {
        self.transition(
            SessionState::Processing,
            SessionState::Uploaded,
            "complete upload",
        )
    }

    /// Move to FAILED from whatever state the session is in
    pub fn fail(&mut self) {
        self.state = SessionState::Failed;
    }

    /// Return to IDLE unconditionally
    pub fn reset(&mut self) {
        self.state = SessionState::Idle;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn recording() -> SessionLifecycle {
        let mut lifecycle = SessionLifecycle::new();
        lifecycle.request_access().unwrap();
        lifecycle.access_granted().unwrap();
        lifecycle
    }

    #[test]
    fn new_lifecycle_is_idle() {
        let lifecycle = SessionLifecycle::new();
        assert!(lifecycle.is_idle());
        assert!(!lifecycle.is_recording());
    }

    #[test]
    fn full_cycle() {
        let mut lifecycle = recording();
        assert!(lifecycle.is_recording());

        lifecycle.begin_stop().unwrap();
        assert_eq!(lifecycle.state(), SessionState::Stopping);

        lifecycle.finalized().unwrap();
        assert_eq!(lifecycle.state(), SessionState::Processing);

        lifecycle.uploaded().unwrap();
        assert_eq!(lifecycle.state(), SessionState::Uploaded);

        lifecycle.reset();
        assert!(lifecycle.is_idle());

        // Can start another cycle
        lifecycle.request_access().unwrap();
        assert_eq!(lifecycle.state(), SessionState::Requesting);
    }

    #[test]
    fn request_access_twice_fails() {
        let mut lifecycle = SessionLifecycle::new();
        lifecycle.request_access().unwrap();

        let err = lifecycle.request_access().unwrap_err();
        assert_eq!(err.current_state, SessionState::Requesting);
        assert!(err.action.contains("start recording"));
    }

    #[test]
    fn stop_from_idle_fails() {
        let mut lifecycle = SessionLifecycle::new();
        let err = lifecycle.begin_stop().unwrap_err();
        assert_eq!(err.current_state, SessionState::Idle);
    }

    #[test]
    fn finalize_without_stop_fails() {
        let mut lifecycle = recording();
        let err = lifecycle.finalized().unwrap_err();
        assert_eq!(err.current_state, SessionState::Recording);
    }

    #[test]
    fn upload_before_processing_fails() {
        let mut lifecycle = recording();
        lifecycle.begin_stop().unwrap();
        assert!(lifecycle.uploaded().is_err());
    }

    #[test]
    fn fail_and_reset_from_anywhere() {
        let mut lifecycle = recording();
        lifecycle.fail();
        assert_eq!(lifecycle.state(), SessionState::Failed);
        assert!(lifecycle.request_access().is_err());

        lifecycle.reset();
        assert!(lifecycle.is_idle());
    }

    #[test]
    fn fragment_holding_states() {
        assert!(!SessionState::Idle.may_hold_fragments());
        assert!(!SessionState::Requesting.may_hold_fragments());
        assert!(SessionState::Recording.may_hold_fragments());
        assert!(SessionState::Stopping.may_hold_fragments());
        assert!(SessionState::Processing.may_hold_fragments());
        assert!(!SessionState::Uploaded.may_hold_fragments());
        assert!(!SessionState::Failed.may_hold_fragments());
    }

    #[test]
    fn state_display() {
        assert_eq!(SessionState::Idle.to_string(), "idle");
        assert_eq!(SessionState::Stopping.to_string(), "stopping");
        assert_eq!(SessionState::Failed.to_string(), "failed");
    }

    #[test]
    fn error_display() {
        let err = InvalidStateTransition {
            current_state: SessionState::Processing,
            action: "start recording".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("start recording"));
        assert!(msg.contains("processing"));
    }
}
