//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0)
//! - Check relay URLs are websocket URLs
//! - Require relays and a parseable secret key for the relay backend
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: BuilderConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use nostr_sdk::Keys;
use thiserror::Error;
use url::Url;

use crate::config::schema::{BuilderConfig, ChannelBackend};

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("channel.namespace must not be empty")]
    EmptyNamespace,

    #[error("channel.namespace '{0}' must not contain whitespace")]
    NamespaceWhitespace(String),

    #[error("{0} must be greater than zero")]
    ZeroTimeout(&'static str),

    #[error("relay URL '{url}' is invalid: {reason}")]
    InvalidRelay { url: String, reason: String },

    #[error("channel.backend = \"relay\" needs at least one relay")]
    NoRelays,

    #[error("channel.secret_key is required for the relay backend")]
    MissingSecretKey,

    /// The reason never echoes the key.
    #[error("channel.secret_key is invalid: {0}")]
    InvalidSecretKey(String),
}

/// Validate a loaded configuration.
pub fn validate_config(config: &BuilderConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let namespace = &config.channel.namespace;
    if namespace.is_empty() {
        errors.push(ValidationError::EmptyNamespace);
    } else if namespace.chars().any(char::is_whitespace) {
        errors.push(ValidationError::NamespaceWhitespace(namespace.clone()));
    }

    if config.channel.request_timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("channel.request_timeout_secs"));
    }
    if config.publisher.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout("publisher.timeout_secs"));
    }

    for relay in &config.channel.relays {
        if let Err(reason) = check_relay_url(relay) {
            errors.push(ValidationError::InvalidRelay {
                url: relay.clone(),
                reason,
            });
        }
    }

    if config.channel.backend == ChannelBackend::Relay {
        if config.channel.relays.is_empty() {
            errors.push(ValidationError::NoRelays);
        }
        match config.channel.secret_key.as_deref() {
            None => errors.push(ValidationError::MissingSecretKey),
            Some(secret) => {
                if Keys::parse(secret).is_err() {
                    errors.push(ValidationError::InvalidSecretKey("not an nsec or hex secret key".to_string()));
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_relay_url(relay: &str) -> Result<(), String> {
    let url = Url::parse(relay).map_err(|e| e.to_string())?;
    match url.scheme() {
        "ws" | "wss" => {}
        other => return Err(format!("scheme '{}' is not ws or wss", other)),
    }
    if url.host_str().is_none() {
        return Err("missing host".to_string());
    }
    Ok(())
}
