//! Background tasks module
//! 
//! This module contains background tasks that run alongside the HTTP server.

pub mod announcer;
pub mod ticker;

// Re-export main functions
pub use announcer::announcer_task;
pub use ticker::{interval_ticks, tick_task};
