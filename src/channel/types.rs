//! Channel contracts and error definitions.

use async_trait::async_trait;
use serde_json::Value;
use thiserror::Error;

/// Errors that can occur while reading or publishing configuration.
#[derive(Debug, Error)]
pub enum ChannelError {
    /// Local storage failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Payload could not be encoded or decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Relay connection or protocol failure.
    #[error("Relay error: {0}")]
    Relay(String),

    /// Relay did not answer in time.
    #[error("Relay timeout after {0} seconds")]
    Timeout(u64),

    /// Every relay refused the event.
    #[error("Publish rejected: {0}")]
    Rejected(String),

    /// The event signer failed.
    #[error("Signer error: {0}")]
    Signer(String),

    /// The channel has nothing to talk to.
    #[error("Channel not configured: {0}")]
    NotConfigured(String),
}

/// Result type for channel operations.
pub type ChannelResult<T> = Result<T, ChannelError>;

/// Fetches the currently published document for a key.
#[async_trait]
pub trait ConfigurationReadChannel: Send + Sync {
    /// Returns `None` if nothing was ever published under the key.
    async fn get(&self, key: &str) -> ChannelResult<Option<Value>>;
}

/// Persists a document under a key, replacing any previous one.
#[async_trait]
pub trait ConfigurationWriteChannel: Send + Sync {
    async fn publish(&self, key: &str, value: &Value) -> ChannelResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        assert_eq!(ChannelError::Timeout(10).to_string(), "Relay timeout after 10 seconds");
        let err = ChannelError::Rejected("wss://a: blocked".into());
        assert!(err.to_string().contains("blocked"));
    }
}
