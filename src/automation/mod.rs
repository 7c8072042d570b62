//! Unattended view recognition and input replay.
//!
//! This module provides:
//! - Daemon settings loaded from config.json
//! - View matching against a captured screen
//! - The dispatch loop with staircase backoff
//! - Structured dispatch events and their log rendering

pub mod config;
pub mod detection;
pub mod events;
pub mod runner;
pub mod state;

pub use config::{default_config_path, load_config, BotConfig};
pub use detection::find_match;
pub use events::LogSink;
pub use runner::Dispatcher;
pub use state::ThreadPacer;
