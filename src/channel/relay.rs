//! Nostr relay configuration channel.
//!
//! # Responsibilities
//! - Publish documents as kind 30078 replaceable events, `d` tag = channel key
//! - Fetch the newest document for a key across relays
//! - Bound every relay round trip with the configured timeout
//!
//! # Design Decisions
//! - One `nostr_sdk::Client` per channel, connected on first use
//! - Events are signed with the configured secret key; reads only trust that author
//! - A publish succeeds when at least one relay accepts the event
//! - `created_at` is strictly increasing per channel, so later publishes win on relays

use async_trait::async_trait;
use nostr_sdk::prelude::*;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::OnceCell;
use tokio::time::timeout;

use crate::channel::types::{ChannelError, ChannelResult, ConfigurationReadChannel, ConfigurationWriteChannel};
use crate::config::ChannelConfig;

/// NIP-78 application-specific data.
pub const APP_DATA_KIND: u16 = 30078;

/// Configuration channel backed by Nostr relays.
pub struct RelayChannel {
    client: Client,
    keys: Keys,
    relays: Vec<String>,
    timeout_duration: Duration,
    connected: OnceCell<()>,
    /// Last `created_at` used, so back-to-back publishes stay strictly ordered.
    last_created_at: AtomicU64,
}

impl RelayChannel {
    /// Build the channel from config; `channel.secret_key` is required.
    pub fn new(config: &ChannelConfig) -> ChannelResult<Self> {
        let secret = config
            .secret_key
            .as_deref()
            .ok_or_else(|| ChannelError::NotConfigured("channel.secret_key is required for relays".to_string()))?;
        let keys = Keys::parse(secret).map_err(|e| ChannelError::Signer(e.to_string()))?;
        Ok(Self::with_keys(config.relays.clone(), keys, config.request_timeout()))
    }

    pub fn with_keys(relays: Vec<String>, keys: Keys, timeout_duration: Duration) -> Self {
        Self {
            client: Client::new(keys.clone()),
            keys,
            relays,
            timeout_duration,
            connected: OnceCell::new(),
            last_created_at: AtomicU64::new(0),
        }
    }

    pub fn relays(&self) -> &[String] {
        &self.relays
    }

    /// Author of every event this channel writes and reads.
    pub fn public_key(&self) -> PublicKey {
        self.keys.public_key()
    }

    fn next_created_at(&self) -> Timestamp {
        let now = Timestamp::now().as_u64();
        let mut previous = self.last_created_at.load(Ordering::SeqCst);
        loop {
            let next = now.max(previous + 1);
            match self
                .last_created_at
                .compare_exchange(previous, next, Ordering::SeqCst, Ordering::SeqCst)
            {
                Ok(_) => return Timestamp::from(next),
                Err(actual) => previous = actual,
            }
        }
    }

    /// Add the relays once, then wait until at least one of them is connected.
    async fn ensure_connected(&self) -> ChannelResult<()> {
        if self.relays.is_empty() {
            return Err(ChannelError::NotConfigured("no relays configured".to_string()));
        }

        self.connected
            .get_or_try_init(|| async {
                for relay in &self.relays {
                    self.client
                        .add_relay(relay.as_str())
                        .await
                        .map_err(|e| ChannelError::Relay(format!("{}: {}", relay, e)))?;
                }
                self.client.connect().await;
                Ok::<(), ChannelError>(())
            })
            .await?;

        let wait = async {
            loop {
                for relay in self.client.relays().await.values() {
                    if relay.is_connected().await {
                        return;
                    }
                }
                tokio::time::sleep(Duration::from_millis(50)).await;
            }
        };
        timeout(self.timeout_duration, wait)
            .await
            .map_err(|_| ChannelError::Relay(format!("no relay connected: {}", self.relays.join(", "))))
    }

    fn filter_for(&self, key: &str) -> Filter {
        Filter::new()
            .kind(Kind::Custom(APP_DATA_KIND))
            .author(self.keys.public_key())
            .custom_tag(SingleLetterTag::lowercase(Alphabet::D), vec![key.to_string()])
    }
}

/// Event content for a document: strings travel raw, everything else as JSON.
fn encode_content(value: &Value) -> ChannelResult<String> {
    match value {
        Value::String(text) => Ok(text.clone()),
        other => Ok(serde_json::to_string(other)?),
    }
}

fn decode_content(content: &str) -> Value {
    serde_json::from_str(content).unwrap_or_else(|_| Value::String(content.to_string()))
}

fn d_tag(event: &Event) -> Option<String> {
    event.tags.iter().find_map(|tag| match tag.as_standardized() {
        Some(TagStandard::Identifier(id)) => Some(id.clone()),
        _ => None,
    })
}

/// Newest event for `key`; equal timestamps fall back to the lowest id.
fn newest_for(events: Vec<Event>, key: &str) -> Option<Event> {
    events
        .into_iter()
        .filter(|event| d_tag(event).as_deref() == Some(key))
        .max_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| b.id.to_hex().cmp(&a.id.to_hex()))
        })
}

#[async_trait]
impl ConfigurationWriteChannel for RelayChannel {
    async fn publish(&self, key: &str, value: &Value) -> ChannelResult<()> {
        self.ensure_connected().await?;

        let event = EventBuilder::new(
            Kind::Custom(APP_DATA_KIND),
            encode_content(value)?,
            vec![Tag::identifier(key)],
        )
        .custom_created_at(self.next_created_at())
        .to_event(&self.keys)
        .map_err(|e| ChannelError::Signer(e.to_string()))?;
        let event_id = event.id;

        let output = timeout(self.timeout_duration, self.client.send_event(event))
            .await
            .map_err(|_| ChannelError::Timeout(self.timeout_duration.as_secs()))?
            .map_err(|e| ChannelError::Rejected(e.to_string()))?;

        if output.success.is_empty() {
            let reasons: Vec<String> = output
                .failed
                .iter()
                .map(|(url, reason)| format!("{}: {}", url, reason.as_deref().unwrap_or("no answer")))
                .collect();
            return Err(ChannelError::Rejected(reasons.join("; ")));
        }

        for (url, reason) in output.failed.iter() {
            tracing::warn!(relay = %url, reason = ?reason, "Relay did not accept configuration");
        }
        tracing::info!(
            key = %key,
            event_id = %event_id,
            accepted = output.success.len(),
            total = self.relays.len(),
            "Configuration published to relays"
        );
        Ok(())
    }
}

#[async_trait]
impl ConfigurationReadChannel for RelayChannel {
    async fn get(&self, key: &str) -> ChannelResult<Option<Value>> {
        self.ensure_connected().await?;

        let source = EventSource::relays(Some(self.timeout_duration));
        let events = self
            .client
            .get_events_of(vec![self.filter_for(key)], source)
            .await
            .map_err(|e| ChannelError::Relay(e.to_string()))?;

        tracing::debug!(key = %key, events = events.len(), "Relay query finished");
        Ok(newest_for(events, key).map(|event| decode_content(&event.content)))
    }
}

impl std::fmt::Debug for RelayChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RelayChannel")
            .field("relays", &self.relays)
            .field("public_key", &self.keys.public_key().to_hex())
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .finish()
    }
}
