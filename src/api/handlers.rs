//! HTTP endpoint handlers

use std::{convert::Infallible, sync::Arc};
use axum::{
    extract::State,
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Json,
    },
};
use futures::stream::{self, Stream};
use tracing::{error, info, warn};

use crate::{
    error::AlarmError,
    state::{AppState, DurationChoice, DurationSelector, TimerSnapshot},
};
use super::responses::{ApiResponse, DurationRequest, HealthResponse, StartRequest, StatusResponse};

type ActionResult = Result<Json<ApiResponse>, (StatusCode, Json<ApiResponse>)>;

/// Turn a rejected intent into an error response carrying the current timer
fn reject(state: &AppState, err: AlarmError) -> (StatusCode, Json<ApiResponse>) {
    let status = match err {
        AlarmError::DurationOutOfRange { .. } => StatusCode::UNPROCESSABLE_ENTITY,
        AlarmError::InvalidTransition { .. } => StatusCode::CONFLICT,
        AlarmError::LockPoisoned(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };

    if status.is_server_error() {
        error!("Request failed: {}", err);
    } else {
        warn!("Request rejected: {}", err);
    }

    let timer = state.snapshot().unwrap_or_default();
    (status, Json(ApiResponse::error(err.to_string(), timer)))
}

/// Handle GET /durations - List picker choices
pub async fn durations_handler() -> Json<Vec<DurationChoice>> {
    Json(DurationSelector::choices().collect())
}

/// Handle POST /duration - Change the selected duration
pub async fn duration_handler(
    State(state): State<Arc<AppState>>,
    Json(request): Json<DurationRequest>,
) -> ActionResult {
    match state.set_duration(request.minutes) {
        Ok(timer) => {
            info!("Duration endpoint called - {} selected", timer.selected_label);
            Ok(Json(ApiResponse::from_snapshot(
                format!("Duration set to {}", timer.selected_label),
                timer,
            )))
        }
        Err(e) => Err(reject(&state, e)),
    }
}

/// Handle POST /start - Start the countdown
pub async fn start_handler(
    State(state): State<Arc<AppState>>,
    request: Option<Json<StartRequest>>,
) -> ActionResult {
    let minutes = request.and_then(|Json(body)| body.minutes);

    match state.start(minutes) {
        Ok(timer) => {
            info!("Start endpoint called - countdown running");
            Ok(Json(ApiResponse::from_snapshot(
                format!("Countdown started for {}", timer.selected_label),
                timer,
            )))
        }
        Err(e) => Err(reject(&state, e)),
    }
}

/// Handle POST /stop - Cancel the countdown
pub async fn stop_handler(State(state): State<Arc<AppState>>) -> ActionResult {
    match state.stop() {
        Ok(timer) => {
            info!("Stop endpoint called - countdown cancelled");
            Ok(Json(ApiResponse::from_snapshot(
                "Countdown stopped".to_string(),
                timer,
            )))
        }
        Err(e) => Err(reject(&state, e)),
    }
}

/// Handle POST /acknowledge - Dismiss the expiry alert
pub async fn acknowledge_handler(State(state): State<Arc<AppState>>) -> ActionResult {
    match state.acknowledge() {
        Ok(timer) => {
            info!("Acknowledge endpoint called - alert dismissed");
            Ok(Json(ApiResponse::from_snapshot(
                "Alert acknowledged".to_string(),
                timer,
            )))
        }
        Err(e) => Err(reject(&state, e)),
    }
}

/// Handle GET /status - Return current timer status
pub async fn status_handler(
    State(state): State<Arc<AppState>>,
) -> Result<Json<StatusResponse>, StatusCode> {
    let timer = match state.snapshot() {
        Ok(t) => t,
        Err(e) => {
            error!("Failed to get timer snapshot: {}", e);
            return Err(StatusCode::INTERNAL_SERVER_ERROR);
        }
    };

    let (last_action, last_action_time) = state.get_last_action();

    Ok(Json(StatusResponse {
        timer,
        uptime: state.get_uptime(),
        port: state.port,
        host: state.host.clone(),
        last_action,
        last_action_time,
    }))
}

/// Handle GET /events - Stream snapshots as server-sent events
pub async fn events_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let snapshots = state.watch_snapshots();

    let events = stream::unfold((snapshots, true), |(mut rx, first)| async move {
        if !first && rx.changed().await.is_err() {
            return None;
        }
        let snapshot: TimerSnapshot = rx.borrow_and_update().clone();
        let event = match Event::default().event("snapshot").json_data(&snapshot) {
            Ok(event) => event,
            Err(e) => {
                warn!("Failed to encode snapshot event: {}", e);
                Event::default().event("error").data(e.to_string())
            }
        };
        Some((Ok::<_, Infallible>(event), (rx, false)))
    });

    Sse::new(events).keep_alive(KeepAlive::default())
}

/// Handle GET /health - Health check endpoint
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::ok())
}
