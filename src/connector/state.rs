//! Open-call state machine

use crate::credential::Slot;
use crate::{Error, Result};

/// State of a single `open` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenState {
    /// Nothing attempted yet
    Start,

    /// Connecting with the slot that was active before this call
    TryPrimary,

    /// Primary credentials rejected, re-reading the active slot
    Failover,

    /// Connecting with the re-read slot
    TrySecondary,

    /// Connected (terminal)
    Success,

    /// Both attempts rejected (terminal)
    BothFailed,

    /// Non-authentication failure (terminal)
    OtherFailure,
}

impl OpenState {
    /// Check if transition is valid
    pub fn can_transition_to(&self, next: OpenState) -> bool {
        use OpenState::*;

        matches!(
            (self, next),
            (Start, TryPrimary)
                | (TryPrimary, Success)
                | (TryPrimary, Failover)
                | (TryPrimary, OtherFailure)
                | (Failover, TrySecondary)
                | (TrySecondary, Success)
                | (TrySecondary, BothFailed)
                | (TrySecondary, OtherFailure)
        )
    }

    /// Transition to new state
    pub fn transition(&mut self, next: OpenState) -> Result<()> {
        if !self.can_transition_to(next) {
            return Err(Error::InvalidState {
                expected: format!("valid transition from {}", self),
                actual: next.to_string(),
            });
        }
        *self = next;
        Ok(())
    }

    /// Whether no further transitions are possible
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Success | Self::BothFailed | Self::OtherFailure)
    }
}

impl std::fmt::Display for OpenState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Start => write!(f, "start"),
            Self::TryPrimary => write!(f, "try_primary"),
            Self::Failover => write!(f, "failover"),
            Self::TrySecondary => write!(f, "try_secondary"),
            Self::Success => write!(f, "success"),
            Self::BothFailed => write!(f, "both_failed"),
            Self::OtherFailure => write!(f, "other_failure"),
        }
    }
}

/// Result of one connect attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// Connected
    Success,
    /// Credentials rejected
    AuthFailure,
    /// Any other failure
    OtherFailure,
}

impl AttemptOutcome {
    /// Lowercase name, also used as a metrics label
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::AuthFailure => "auth_failure",
            Self::OtherFailure => "other_failure",
        }
    }
}

/// Record of one connect attempt within an open call
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionAttempt {
    /// Template the connection string was rendered from (no credentials)
    pub dsn_template: String,
    /// Slot whose credentials were used
    pub tried_slot: Slot,
    /// How the attempt ended
    pub outcome: AttemptOutcome,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_primary_success_path() {
        let mut state = OpenState::Start;
        assert!(state.transition(OpenState::TryPrimary).is_ok());
        assert!(state.transition(OpenState::Success).is_ok());
        assert!(state.is_terminal());
    }

    #[test]
    fn test_failover_paths() {
        let mut state = OpenState::Start;
        state.transition(OpenState::TryPrimary).unwrap();
        state.transition(OpenState::Failover).unwrap();
        state.transition(OpenState::TrySecondary).unwrap();
        assert!(!state.is_terminal());
        assert!(state.can_transition_to(OpenState::Success));
        assert!(state.can_transition_to(OpenState::OtherFailure));
        assert!(state.transition(OpenState::BothFailed).is_ok());
    }

    #[test]
    fn test_no_third_attempt() {
        let mut state = OpenState::TrySecondary;
        assert!(state.transition(OpenState::Failover).is_err());
        assert!(state.transition(OpenState::TryPrimary).is_err());
    }

    #[test]
    fn test_cannot_skip_primary() {
        let mut state = OpenState::Start;
        assert!(state.transition(OpenState::TrySecondary).is_err());
        assert!(state.transition(OpenState::Success).is_err());
    }

    #[test]
    fn test_terminal_states_are_final() {
        for terminal in [
            OpenState::Success,
            OpenState::BothFailed,
            OpenState::OtherFailure,
        ] {
            let mut state = terminal;
            assert!(state.transition(OpenState::TryPrimary).is_err());
            assert_eq!(state, terminal);
        }
    }

    #[test]
    fn test_invalid_transition_error() {
        let mut state = OpenState::Start;
        let err = state.transition(OpenState::BothFailed).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid state: expected valid transition from start, got both_failed"
        );
    }
}
