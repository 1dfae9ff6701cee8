//! Full-screen alert shown once a countdown expires

use std::time::Duration;

use serde::{Deserialize, Serialize};

pub const ALERT_MESSAGE: &str = "Time's up!";

/// Opacity curve of the blinking alert background.
///
/// Eases from fully opaque down to `min_opacity` over `half_period`, then back,
/// repeating until the alert is acknowledged.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlertPulse {
    pub half_period: Duration,
    pub max_opacity: f64,
    pub min_opacity: f64,
}

impl Default for AlertPulse {
    fn default() -> Self {
        Self {
            half_period: Duration::from_secs(1),
            max_opacity: 1.0,
            min_opacity: 0.1,
        }
    }
}

impl AlertPulse {
    pub fn opacity_at(&self, elapsed: Duration) -> f64 {
        let half = self.half_period.as_secs_f64();
        if half <= 0.0 {
            return self.max_opacity;
        }

        let phase = elapsed.as_secs_f64() % (2.0 * half);
        let progress = if phase < half {
            phase / half
        } else {
            (2.0 * half - phase) / half
        };
        let eased = progress * progress * (3.0 - 2.0 * progress);

        self.max_opacity - (self.max_opacity - self.min_opacity) * eased
    }
}

/// What a renderer needs to draw the alert
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertView {
    pub message: String,
    pub expired_for_seconds: u64,
    pub opacity: f64,
}

impl AlertView {
    pub fn at(elapsed: Duration) -> Self {
        Self {
            message: ALERT_MESSAGE.to_string(),
            expired_for_seconds: elapsed.as_secs(),
            opacity: AlertPulse::default().opacity_at(elapsed),
        }
    }
}
