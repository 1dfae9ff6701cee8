//! Countdown controller state machine
//!
//! The controller is purely synchronous: every intent or tick returns the
//! transition it caused, and callers decide how to publish it.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::duration::Minutes;
use crate::error::AlarmError;

/// Lifecycle of a single countdown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunState {
    #[default]
    Idle,
    Running,
    Expired,
}

impl RunState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunState::Idle => "idle",
            RunState::Running => "running",
            RunState::Expired => "expired",
        }
    }
}

impl fmt::Display for RunState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state change produced by the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Transition {
    Started { remaining_seconds: u64 },
    Ticked { remaining_seconds: u64 },
    Expired,
    Stopped,
    Acknowledged,
}

/// Idle -> Running -> Expired -> Idle, with stop as the only way out of Running early
#[derive(Debug, Clone, Default)]
pub struct Countdown {
    state: RunState,
    remaining_seconds: u64,
}

impl Countdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn run_state(&self) -> RunState {
        self.state
    }

    /// Seconds left; only present while running
    pub fn remaining_seconds(&self) -> Option<u64> {
        match self.state {
            RunState::Running => Some(self.remaining_seconds),
            _ => None,
        }
    }

    pub fn start(&mut self, duration: Minutes) -> Result<Transition, AlarmError> {
        if self.state != RunState::Idle {
            return Err(AlarmError::invalid("start", self.state));
        }

        self.state = RunState::Running;
        self.remaining_seconds = duration.as_seconds();
        Ok(Transition::Started {
            remaining_seconds: self.remaining_seconds,
        })
    }

    /// Start from an unvalidated minute count; a rejected value leaves the controller idle
    pub fn start_minutes(&mut self, minutes: u32) -> Result<Transition, AlarmError> {
        let duration = Minutes::new(minutes)?;
        self.start(duration)
    }

    /// Apply one tick. Ticks outside a run are dropped.
    pub fn tick(&mut self) -> Option<Transition> {
        if self.state != RunState::Running {
            return None;
        }

        self.remaining_seconds = self.remaining_seconds.saturating_sub(1);
        if self.remaining_seconds == 0 {
            self.state = RunState::Expired;
            Some(Transition::Expired)
        } else {
            Some(Transition::Ticked {
                remaining_seconds: self.remaining_seconds,
            })
        }
    }

    pub fn stop(&mut self) -> Result<Transition, AlarmError> {
        if self.state != RunState::Running {
            return Err(AlarmError::invalid("stop", self.state));
        }

        self.reset();
        Ok(Transition::Stopped)
    }

    pub fn acknowledge(&mut self) -> Result<Transition, AlarmError> {
        if self.state != RunState::Expired {
            return Err(AlarmError::invalid("acknowledge", self.state));
        }

        self.reset();
        Ok(Transition::Acknowledged)
    }

    fn reset(&mut self) {
        self.state = RunState::Idle;
        self.remaining_seconds = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minutes(n: u32) -> Minutes {
        Minutes::new(n).unwrap()
    }

    #[test]
    fn start_sets_full_duration() {
        for d in Minutes::MIN..=Minutes::MAX {
            let mut countdown = Countdown::new();
            countdown.start(minutes(d)).unwrap();
            assert_eq!(countdown.run_state(), RunState::Running);
            assert_eq!(countdown.remaining_seconds(), Some(u64::from(d) * 60));
        }
    }

    #[test]
    fn one_minute_run_expires_after_sixty_ticks() {
        let mut countdown = Countdown::new();
        assert_eq!(
            countdown.start(minutes(1)),
            Ok(Transition::Started { remaining_seconds: 60 })
        );

        for expected in (1..60).rev() {
            assert_eq!(
                countdown.tick(),
                Some(Transition::Ticked { remaining_seconds: expected })
            );
            assert_eq!(countdown.remaining_seconds(), Some(expected));
        }

        assert_eq!(countdown.tick(), Some(Transition::Expired));
        assert_eq!(countdown.run_state(), RunState::Expired);
        assert_eq!(countdown.remaining_seconds(), None);
    }

    #[test]
    fn expiry_fires_once() {
        let mut countdown = Countdown::new();
        countdown.start(minutes(1)).unwrap();
        let expirations = (0..200)
            .filter_map(|_| countdown.tick())
            .filter(|t| *t == Transition::Expired)
            .count();
        assert_eq!(expirations, 1);
        assert_eq!(countdown.run_state(), RunState::Expired);
    }

    #[test]
    fn ticks_ignored_when_idle() {
        let mut countdown = Countdown::new();
        assert_eq!(countdown.tick(), None);
        assert_eq!(countdown.run_state(), RunState::Idle);
    }

    #[test]
    fn stop_returns_to_idle_and_ignores_late_ticks() {
        let mut countdown = Countdown::new();
        countdown.start(minutes(3)).unwrap();
        countdown.tick();
        assert_eq!(countdown.stop(), Ok(Transition::Stopped));
        assert_eq!(countdown.run_state(), RunState::Idle);
        assert_eq!(countdown.tick(), None);
        assert_eq!(countdown.remaining_seconds(), None);

        countdown.start(minutes(2)).unwrap();
        assert_eq!(countdown.remaining_seconds(), Some(120));
    }

    #[test]
    fn acknowledge_clears_expired_run() {
        let mut countdown = Countdown::new();
        countdown.start(minutes(1)).unwrap();
        for _ in 0..60 {
            countdown.tick();
        }
        assert_eq!(countdown.acknowledge(), Ok(Transition::Acknowledged));
        assert_eq!(countdown.run_state(), RunState::Idle);
    }

    #[test]
    fn rejects_out_of_order_actions() {
        let mut countdown = Countdown::new();
        assert_eq!(
            countdown.stop(),
            Err(AlarmError::invalid("stop", RunState::Idle))
        );
        assert_eq!(
            countdown.acknowledge(),
            Err(AlarmError::invalid("acknowledge", RunState::Idle))
        );

        countdown.start(minutes(1)).unwrap();
        assert_eq!(
            countdown.start(minutes(5)),
            Err(AlarmError::invalid("start", RunState::Running))
        );
        assert_eq!(
            countdown.acknowledge(),
            Err(AlarmError::invalid("acknowledge", RunState::Running))
        );
        assert_eq!(countdown.remaining_seconds(), Some(60));
    }

    #[test]
    fn invalid_duration_keeps_controller_idle() {
        let mut countdown = Countdown::new();
        assert_eq!(
            countdown.start_minutes(0),
            Err(AlarmError::DurationOutOfRange { minutes: 0 })
        );
        assert_eq!(countdown.run_state(), RunState::Idle);
        assert_eq!(countdown.tick(), None);
    }

    #[test]
    fn transition_serializes_with_kind_tag() {
        let json = serde_json::to_value(Transition::Ticked { remaining_seconds: 42 }).unwrap();
        assert_eq!(json["kind"], "ticked");
        assert_eq!(json["remaining_seconds"], 42);
    }
}
