//! Render-ready view of the countdown

use serde::{Deserialize, Serialize};

use super::{AlertView, Minutes, RunState};
use crate::utils::format::{format_hm, format_hms, minutes_label};

/// Everything a renderer needs to draw the current screen
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerSnapshot {
    pub state: RunState,
    /// Number of runs started so far; bumps on every start
    pub run: u64,
    pub selected_minutes: u32,
    pub selected_label: String,
    pub remaining_seconds: Option<u64>,
    pub time_left: Option<String>,
    pub time_left_compact: Option<String>,
    pub alert: Option<AlertView>,
}

impl TimerSnapshot {
    /// Snapshot of an idle timer with the given selection
    pub fn idle(selected_minutes: u32) -> Self {
        Self {
            state: RunState::Idle,
            run: 0,
            selected_minutes,
            selected_label: minutes_label(selected_minutes),
            remaining_seconds: None,
            time_left: None,
            time_left_compact: None,
            alert: None,
        }
    }

    /// Snapshot of a running timer
    pub fn running(selected_minutes: u32, remaining_seconds: u64) -> Self {
        Self {
            state: RunState::Running,
            remaining_seconds: Some(remaining_seconds),
            time_left: Some(format_hms(remaining_seconds)),
            time_left_compact: Some(format_hm(remaining_seconds)),
            ..Self::idle(selected_minutes)
        }
    }

    /// Snapshot of an expired timer showing the alert
    pub fn expired(selected_minutes: u32, alert: AlertView) -> Self {
        Self {
            state: RunState::Expired,
            alert: Some(alert),
            ..Self::idle(selected_minutes)
        }
    }

    /// Tag the snapshot with the run it belongs to
    pub fn for_run(self, run: u64) -> Self {
        Self { run, ..self }
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn is_expired(&self) -> bool {
        self.state == RunState::Expired
    }
}

impl Default for TimerSnapshot {
    fn default() -> Self {
        Self::idle(Minutes::default().get())
    }
}
