//! State management module
//! 
//! This module contains the duration selector, the countdown state machine
//! and the shared application state that publishes their changes.

pub mod alert;
pub mod app_state;
pub mod countdown;
pub mod duration;
pub mod timer_state;

// Re-export main types
pub use alert::{AlertPulse, AlertView};
pub use app_state::AppState;
pub use countdown::{Countdown, RunState, Transition};
pub use duration::{DurationChoice, DurationSelector, Minutes};
pub use timer_state::TimerSnapshot;
