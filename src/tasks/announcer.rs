//! Console announcer for countdown transitions

use std::sync::Arc;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, info, warn};

use crate::{
    state::{alert::ALERT_MESSAGE, AppState, Transition},
    utils::format::format_hms,
};

/// Log a single transition the way the console shows it
pub fn announce(transition: &Transition) {
    match transition {
        Transition::Started { remaining_seconds } => {
            info!("Countdown running, {} left", format_hms(*remaining_seconds));
        }
        Transition::Ticked { remaining_seconds } => {
            debug!("Time remaining: {}", format_hms(*remaining_seconds));
        }
        Transition::Expired => warn!("{}", ALERT_MESSAGE),
        Transition::Stopped => info!("Countdown cancelled"),
        Transition::Acknowledged => info!("Alert dismissed, ready for another countdown"),
    }
}

/// Background task that observes every transition and logs it
pub async fn announcer_task(state: Arc<AppState>) {
    info!("Starting announcer task");

    let mut events = state.subscribe_events();

    loop {
        match events.recv().await {
            Ok(transition) => announce(&transition),
            Err(RecvError::Lagged(skipped)) => {
                warn!("Announcer fell behind, skipped {} events", skipped);
            }
            Err(RecvError::Closed) => {
                info!("Event channel closed, stopping announcer");
                return;
            }
        }
    }
}
