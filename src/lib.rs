//! Silent Alarm - A single countdown that ends in a silent full-screen alert
//! 
//! This library provides the duration selector and countdown state machine,
//! plus the HTTP API and background tasks that let a renderer drive them.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::AlarmError;
pub use state::AppState;
pub use api::create_router;
pub use utils::signals::shutdown_signal;
