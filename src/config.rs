//! Configuration and CLI argument handling

use std::time::Duration;
use clap::Parser;

use crate::state::Minutes;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "silent-alarm")]
#[command(about = "A silent countdown alarm served over a small local HTTP API")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Initially selected countdown length in minutes
    #[arg(short, long, default_value = "15", value_parser = clap::value_parser!(u32).range(1..=60))]
    pub minutes: u32,

    /// Tick period in milliseconds
    #[arg(long, default_value = "1000", value_parser = clap::value_parser!(u64).range(1..))]
    pub tick_millis: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    /// The initial selection; falls back to the default if out of range
    pub fn default_minutes(&self) -> Minutes {
        Minutes::new(self.minutes).unwrap_or_default()
    }

    /// Get the tick period as a Duration
    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_millis)
    }
}
