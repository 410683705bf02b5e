//! Subscriber setup for the `docstore` binary.
//!
//! The library only emits `tracing` events; installing a subscriber is left
//! to the binary.

mod init;
pub use init::{default_filter, init_logging, parse_rotation};

use crate::utils::docstore_home;
use std::path::PathBuf;
use tracing::Level;
use tracing_appender::rolling::Rotation;

pub const LOG_FILENAME: &str = "docstore.log";

pub struct LogConfig {
    pub log_dir: PathBuf,
    /// Level for this crate's events when `RUST_LOG` is unset.
    pub log_level: Level,
    pub json_format: bool,
    pub rotation: Rotation,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            log_dir: docstore_home().join("logs"),
            log_level: Level::INFO,
            json_format: false,
            rotation: Rotation::DAILY,
        }
    }
}

impl LogConfig {
    #[must_use]
    pub fn log_file(&self) -> PathBuf {
        self.log_dir.join(LOG_FILENAME)
    }
}

#[cfg(test)]
#[path = "../logging_tests.rs"]
mod logging_tests;
