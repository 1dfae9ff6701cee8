//! Silent Alarm - A single countdown that ends in a silent full-screen alert
//! 
//! This is the main entry point for the silent-alarm server.

use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::info;

use silent_alarm::{
    config::Config,
    state::AppState,
    api::create_router,
    tasks::{announcer_task, interval_ticks, tick_task},
    utils::shutdown_signal,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::parse();

    // Initialize tracing with appropriate log level
    tracing_subscriber::fmt()
        .with_env_filter(format!("silent_alarm={},tower_http=info", config.log_level()))
        .init();

    info!("Starting silent-alarm server v{}", env!("CARGO_PKG_VERSION"));
    info!("Configuration: host={}, port={}, minutes={}, tick={}ms",
          config.host, config.port, config.minutes, config.tick_millis);

    // Create application state
    let state = Arc::new(AppState::new(config.port, config.host.clone(), config.default_minutes()));

    // Start the tick and announcer background tasks
    let tick_period = config.tick_period();
    tokio::spawn(tick_task(Arc::clone(&state), move || interval_ticks(tick_period)));
    tokio::spawn(announcer_task(Arc::clone(&state)));

    // Create HTTP router with all endpoints
    let app = create_router(state);

    // Bind to the specified address
    let addr = config.address();
    let listener = TcpListener::bind(&addr).await?;

    info!("Server running on http://{}", addr);
    info!("Endpoints:");
    info!("  GET  /durations   - List selectable durations");
    info!("  POST /duration    - Select the countdown duration");
    info!("  POST /start       - Start the countdown");
    info!("  POST /stop        - Cancel the countdown");
    info!("  POST /acknowledge - Dismiss the expiry alert");
    info!("  GET  /status      - Check current status and time left");
    info!("  GET  /events      - Stream status updates");
    info!("  GET  /health      - Health check");

    // Setup graceful shutdown
    let server = axum::serve(listener, app);

    tokio::select! {
        result = server => {
            if let Err(e) = result {
                tracing::error!("Server error: {}", e);
            }
        }
        _ = shutdown_signal() => {
            info!("Shutdown signal received");
        }
    }

    info!("Server shutdown complete");
    Ok(())
}
