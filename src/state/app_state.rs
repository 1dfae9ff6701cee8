//! Main application state management

use std::{sync::Mutex, time::Instant};
use chrono::{DateTime, Utc};
use tokio::sync::{broadcast, watch};
use tracing::{debug, info, warn};

use super::{AlertView, Countdown, DurationSelector, Minutes, RunState, TimerSnapshot, Transition};
use crate::error::AlarmError;

/// Selector and controller, always mutated together under one lock
#[derive(Debug, Default)]
struct Session {
    selector: DurationSelector,
    countdown: Countdown,
    expired_at: Option<Instant>,
    runs: u64,
}

impl Session {
    fn snapshot(&self) -> TimerSnapshot {
        let selected = self.selector.selected().get();
        let snapshot = match self.countdown.run_state() {
            RunState::Idle => TimerSnapshot::idle(selected),
            RunState::Running => {
                TimerSnapshot::running(selected, self.countdown.remaining_seconds().unwrap_or(0))
            }
            RunState::Expired => {
                let elapsed = self.expired_at.map(|at| at.elapsed()).unwrap_or_default();
                TimerSnapshot::expired(selected, AlertView::at(elapsed))
            }
        };
        snapshot.for_run(self.runs)
    }

    fn require_idle(&self, action: &'static str) -> Result<(), AlarmError> {
        match self.countdown.run_state() {
            RunState::Idle => Ok(()),
            state => Err(AlarmError::invalid(action, state)),
        }
    }
}

/// Main application state shared by the API and background tasks
#[derive(Debug)]
pub struct AppState {
    session: Mutex<Session>,
    /// Server metadata
    pub start_time: Instant,
    pub port: u16,
    pub host: String,
    /// Last user action tracking
    pub last_action: Mutex<Option<String>>,
    pub last_action_time: Mutex<Option<DateTime<Utc>>>,
    /// Every transition the controller produces
    pub event_tx: broadcast::Sender<Transition>,
    /// Latest snapshot for renderers and the tick task
    pub snapshot_tx: watch::Sender<TimerSnapshot>,
    /// Keep the receiver alive to prevent channel closure
    _snapshot_rx: watch::Receiver<TimerSnapshot>,
}

impl AppState {
    /// Create a new idle AppState with the given initial selection
    pub fn new(port: u16, host: String, default_minutes: Minutes) -> Self {
        let session = Session {
            selector: DurationSelector::new(default_minutes),
            ..Session::default()
        };
        let (event_tx, _) = broadcast::channel(100);
        let (snapshot_tx, snapshot_rx) = watch::channel(session.snapshot());

        Self {
            session: Mutex::new(session),
            start_time: Instant::now(),
            port,
            host,
            last_action: Mutex::new(None),
            last_action_time: Mutex::new(None),
            event_tx,
            snapshot_tx,
            _snapshot_rx: snapshot_rx,
        }
    }

    /// Apply a change to the session and publish the result
    fn apply<F>(&self, action: Option<&str>, updater: F) -> Result<Option<Transition>, AlarmError>
    where
        F: FnOnce(&mut Session) -> Result<Option<Transition>, AlarmError>,
    {
        let mut session = self.session.lock()
            .map_err(|e| AlarmError::LockPoisoned(e.to_string()))?;

        let transition = updater(&mut *session)?;
        if action.is_none() && transition.is_none() {
            return Ok(None);
        }
        let snapshot = session.snapshot();
        drop(session); // Release the lock early

        if let Some(action) = action {
            self.record_action(action);
        }

        if let Some(transition) = transition {
            // No subscribers is fine; the announcer may not be running
            if self.event_tx.send(transition).is_err() {
                debug!("No event subscribers for {:?}", transition);
            }
        }

        if let Err(e) = self.snapshot_tx.send(snapshot) {
            warn!("Failed to publish timer snapshot: {}", e);
        }

        Ok(transition)
    }

    fn record_action(&self, action: &str) {
        if let Ok(mut last_action) = self.last_action.lock() {
            *last_action = Some(action.to_string());
        }
        if let Ok(mut last_time) = self.last_action_time.lock() {
            *last_time = Some(Utc::now());
        }
    }

    /// Change the selected duration; only allowed while idle
    pub fn set_duration(&self, minutes: u32) -> Result<TimerSnapshot, AlarmError> {
        self.apply(Some("set-duration"), |session| {
            session.require_idle("change the duration")?;
            let selected = session.selector.select(minutes)?;
            info!("Selected duration: {}", selected);
            Ok(None)
        })?;
        self.snapshot()
    }

    /// Start a run with the selected duration, or with `minutes` if given
    pub fn start(&self, minutes: Option<u32>) -> Result<TimerSnapshot, AlarmError> {
        self.apply(Some("start"), |session| {
            session.require_idle("start")?;
            if let Some(minutes) = minutes {
                session.selector.select(minutes)?;
            }
            let duration = session.selector.selected();
            let transition = session.countdown.start(duration)?;
            session.expired_at = None;
            session.runs += 1;
            info!("Countdown started for {}", duration);
            Ok(Some(transition))
        })?;
        self.snapshot()
    }

    /// Cancel a running countdown
    pub fn stop(&self) -> Result<TimerSnapshot, AlarmError> {
        self.apply(Some("stop"), |session| {
            let transition = session.countdown.stop()?;
            info!("Countdown stopped");
            Ok(Some(transition))
        })?;
        self.snapshot()
    }

    /// Dismiss the expiry alert
    pub fn acknowledge(&self) -> Result<TimerSnapshot, AlarmError> {
        self.apply(Some("acknowledge"), |session| {
            let transition = session.countdown.acknowledge()?;
            session.expired_at = None;
            info!("Alert acknowledged");
            Ok(Some(transition))
        })?;
        self.snapshot()
    }

    /// Deliver one tick; returns the transition it caused, if any
    pub fn tick(&self) -> Result<Option<Transition>, AlarmError> {
        self.apply(None, |session| {
            let transition = session.countdown.tick();
            match transition {
                Some(Transition::Expired) => {
                    session.expired_at = Some(Instant::now());
                    info!("Countdown expired");
                }
                Some(_) => {}
                None => debug!("Ignoring tick while {}", session.countdown.run_state()),
            }
            Ok(transition)
        })
    }

    /// Republish the snapshot so the alert's pulse and age stay current.
    ///
    /// Returns false without publishing unless the alert is showing.
    pub fn refresh_alert(&self) -> Result<bool, AlarmError> {
        let session = self.session.lock()
            .map_err(|e| AlarmError::LockPoisoned(e.to_string()))?;

        if session.countdown.run_state() != RunState::Expired {
            return Ok(false);
        }
        let snapshot = session.snapshot();
        drop(session);

        if let Err(e) = self.snapshot_tx.send(snapshot) {
            warn!("Failed to publish alert snapshot: {}", e);
        }
        Ok(true)
    }

    /// Get the current snapshot
    pub fn snapshot(&self) -> Result<TimerSnapshot, AlarmError> {
        self.session.lock()
            .map(|session| session.snapshot())
            .map_err(|e| AlarmError::LockPoisoned(e.to_string()))
    }

    pub fn run_state(&self) -> Result<RunState, AlarmError> {
        self.snapshot().map(|snapshot| snapshot.state)
    }

    /// Subscribe to every transition
    pub fn subscribe_events(&self) -> broadcast::Receiver<Transition> {
        self.event_tx.subscribe()
    }

    /// Watch published snapshots
    pub fn watch_snapshots(&self) -> watch::Receiver<TimerSnapshot> {
        self.snapshot_tx.subscribe()
    }

    /// Calculate server uptime as a formatted string
    pub fn get_uptime(&self) -> String {
        let duration = self.start_time.elapsed();
        let hours = duration.as_secs() / 3600;
        let minutes = (duration.as_secs() % 3600) / 60;
        let seconds = duration.as_secs() % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}s", seconds)
        }
    }

    /// Get last action information
    pub fn get_last_action(&self) -> (Option<String>, Option<DateTime<Utc>>) {
        let last_action = self.last_action.lock().ok().and_then(|a| a.clone());
        let last_action_time = self.last_action_time.lock().ok().and_then(|t| *t);
        (last_action, last_action_time)
    }
}
