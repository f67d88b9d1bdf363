//! Configuration schema definitions.
//!
//! All types derive Serde traits for deserialization from TOML files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the page builder.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct BuilderConfig {
    /// Where configuration documents are read from and published to.
    pub channel: ChannelConfig,

    /// Publish behaviour.
    pub publisher: PublisherConfig,

    /// Logging settings.
    pub observability: ObservabilityConfig,
}

/// Where documents are read from and published to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ChannelBackend {
    /// One JSON file per key under `directory`.
    #[default]
    File,
    /// Replaceable events on `relays`, signed with `secret_key`.
    Relay,
}

/// Configuration channel settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ChannelConfig {
    pub backend: ChannelBackend,

    /// Prefix of every channel key ("<namespace>_<name>").
    pub namespace: String,

    /// Storage root of the file-backed channel.
    pub directory: String,

    /// Nostr relay URLs (ws:// or wss://).
    pub relays: Vec<String>,

    /// Merchant secret key (nsec or hex) signing relay events.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub secret_key: Option<String>,

    /// Per-relay request timeout in seconds.
    pub request_timeout_secs: u64,
}

impl ChannelConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            backend: ChannelBackend::File,
            namespace: "market".to_string(),
            directory: "./site-config".to_string(),
            relays: vec![
                "wss://relay.damus.io".to_string(),
                "wss://nos.lol".to_string(),
            ],
            secret_key: None,
            request_timeout_secs: 10,
        }
    }
}

/// Publisher settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PublisherConfig {
    /// Upper bound for a single publish in seconds.
    pub timeout_secs: u64,

    /// Send user-facing status messages.
    pub notify: bool,
}

impl PublisherConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for PublisherConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 15,
            notify: true,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
        }
    }
}
