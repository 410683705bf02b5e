//! Store configuration loaded from `~/.docstore/config.toml`.
//!
//! The file is optional; every field falls back to its `Default`.
//! Durations are human-readable strings such as `"24h"` or `"5s"`.

mod duration;
mod loader;

pub use loader::{config_path, load_config, load_config_from};

use crate::storage::StorageKind;
use crate::utils::docstore_home;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use thiserror::Error;

/// Default TTL for key-value entries.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Default per-call timeout for the key-value substrate.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);
/// Hard ceiling for attachments stored in the key-value backend (10 MiB).
pub const DEFAULT_MAX_FILE_SIZE: usize = 10 * 1024 * 1024;
/// Free space below which the filesystem backend reports itself degraded.
pub const DEFAULT_MIN_FREE_BYTES: u64 = 100 * 1024 * 1024;
pub const DEFAULT_KEY_PREFIX: &str = "docstore:";
pub const DEFAULT_KV_URL: &str = "redis://127.0.0.1:6379";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Toml(#[from] toml::de::Error),
}

fn default_root() -> PathBuf {
    docstore_home().join("data")
}

fn default_min_free_bytes() -> u64 {
    DEFAULT_MIN_FREE_BYTES
}

fn default_url() -> String {
    DEFAULT_KV_URL.to_string()
}

fn default_prefix() -> String {
    DEFAULT_KEY_PREFIX.to_string()
}

fn default_ttl() -> Duration {
    DEFAULT_TTL
}

fn default_timeout() -> Duration {
    DEFAULT_TIMEOUT
}

fn default_max_file_size() -> usize {
    DEFAULT_MAX_FILE_SIZE
}

/// `[filesystem]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct FilesystemConfig {
    #[serde(default = "default_root")]
    pub root: PathBuf,
    #[serde(default = "default_min_free_bytes")]
    pub min_free_bytes: u64,
}

impl Default for FilesystemConfig {
    fn default() -> Self {
        Self {
            root: default_root(),
            min_free_bytes: DEFAULT_MIN_FREE_BYTES,
        }
    }
}

impl FilesystemConfig {
    #[must_use]
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Self::default()
        }
    }
}

/// `[key_value]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct KeyValueConfig {
    /// Substrate to connect to: a Redis URL, or `memory://` for an
    /// in-process store.
    #[serde(default = "default_url")]
    pub url: String,
    /// Namespace prepended to every key.
    #[serde(default = "default_prefix")]
    pub prefix: String,
    #[serde(default = "default_ttl", with = "duration")]
    pub ttl: Duration,
    #[serde(default = "default_timeout", with = "duration")]
    pub timeout: Duration,
    #[serde(default = "default_max_file_size")]
    pub max_file_size: usize,
    /// Memory ceiling of the `memory://` substrate; `None` means unbounded.
    /// A Redis server enforces its own `maxmemory`.
    #[serde(default)]
    pub max_memory_bytes: Option<u64>,
}

impl Default for KeyValueConfig {
    fn default() -> Self {
        Self {
            url: default_url(),
            prefix: default_prefix(),
            ttl: DEFAULT_TTL,
            timeout: DEFAULT_TIMEOUT,
            max_file_size: DEFAULT_MAX_FILE_SIZE,
            max_memory_bytes: None,
        }
    }
}

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StorageKind,
    #[serde(default)]
    pub filesystem: FilesystemConfig,
    #[serde(default)]
    pub key_value: KeyValueConfig,
}

#[cfg(test)]
#[path = "config_tests.rs"]
mod config_tests;
