//! Error types for the alarm core

use thiserror::Error;

use crate::state::RunState;

/// Errors raised when a user intent cannot be applied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AlarmError {
    /// Requested duration is outside the selectable range
    #[error("Duration of {minutes} minutes is outside the allowed range of 1 to 60")]
    DurationOutOfRange { minutes: u32 },

    /// The action is not valid in the current run state
    #[error("Cannot {action} while the timer is {state}")]
    InvalidTransition {
        action: &'static str,
        state: RunState,
    },

    /// A shared lock was poisoned by a panicking holder
    #[error("Failed to lock alarm state: {0}")]
    LockPoisoned(String),
}

impl AlarmError {
    pub(crate) fn invalid(action: &'static str, state: RunState) -> Self {
        Self::InvalidTransition { action, state }
    }
}
