//! Shared utilities for integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::{accept_async, tungstenite::Message};

use nostr_sdk::prelude::{Event, Filter, TagStandard};

use market_pagebuilder::channel::{
    ChannelError, ChannelResult, ConfigurationReadChannel, ConfigurationWriteChannel, MemoryChannel,
};
use market_pagebuilder::config::PublisherConfig;
use market_pagebuilder::publish::{ChannelKeys, ConfigurationPublisher, NotificationSink};
use market_pagebuilder::store::ConfigurationStore;
use market_pagebuilder::PageBuilder;

pub const SITE_KEY: &str = "market_site_specific_config";

/// Write channel that remembers every publish in order.
#[derive(Clone, Default)]
pub struct RecordingChannel {
    published: Arc<Mutex<Vec<(String, Value)>>>,
    store: MemoryChannel,
    delay: Option<Duration>,
    first_delay: Option<Duration>,
    calls: Arc<AtomicU64>,
}

impl RecordingChannel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every publish waits this long before completing.
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Self::default()
        }
    }

    /// Only the first publish waits this long.
    pub fn with_first_delay(delay: Duration) -> Self {
        Self {
            first_delay: Some(delay),
            ..Self::default()
        }
    }

    pub fn published(&self) -> Vec<(String, Value)> {
        self.published.lock().unwrap().clone()
    }

    pub fn published_to(&self, key: &str) -> Vec<Value> {
        self.published()
            .into_iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v)
            .collect()
    }

    pub fn count(&self) -> usize {
        self.published.lock().unwrap().len()
    }

    pub fn seed(&self, key: &str, value: Value) {
        self.store.insert(key, value);
    }
}

#[async_trait]
impl ConfigurationWriteChannel for RecordingChannel {
    async fn publish(&self, key: &str, value: &Value) -> ChannelResult<()> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.first_delay.filter(|_| call == 0) {
            tokio::time::sleep(delay).await;
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.published.lock().unwrap().push((key.to_string(), value.clone()));
        self.store.publish(key, value).await
    }
}

#[async_trait]
impl ConfigurationReadChannel for RecordingChannel {
    async fn get(&self, key: &str) -> ChannelResult<Option<Value>> {
        self.store.get(key).await
    }
}

/// Write channel that refuses everything.
#[derive(Clone, Default)]
pub struct FailingChannel {
    attempts: Arc<AtomicU64>,
}

impl FailingChannel {
    pub fn attempts(&self) -> u64 {
        self.attempts.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigurationWriteChannel for FailingChannel {
    async fn publish(&self, _key: &str, _value: &Value) -> ChannelResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(ChannelError::Relay("relay unreachable".into()))
    }
}

#[async_trait]
impl ConfigurationReadChannel for FailingChannel {
    async fn get(&self, _key: &str) -> ChannelResult<Option<Value>> {
        Err(ChannelError::Relay("relay unreachable".into()))
    }
}

/// Notification sink that keeps every message.
#[derive(Default)]
pub struct RecordingNotifier {
    messages: Mutex<Vec<(bool, String)>>,
}

impl RecordingNotifier {
    pub fn infos(&self) -> Vec<String> {
        self.collect(false)
    }

    pub fn errors(&self) -> Vec<String> {
        self.collect(true)
    }

    fn collect(&self, error: bool) -> Vec<String> {
        self.messages
            .lock()
            .unwrap()
            .iter()
            .filter(|(is_error, _)| *is_error == error)
            .map(|(_, message)| message.clone())
            .collect()
    }
}

impl NotificationSink for RecordingNotifier {
    fn info(&self, message: &str) {
        self.messages.lock().unwrap().push((false, message.to_string()));
    }

    fn error(&self, message: &str) {
        self.messages.lock().unwrap().push((true, message.to_string()));
    }
}

/// Builder over a fresh store, publishing and reading through `channel`.
pub fn builder_with<C>(channel: C, notifier: Arc<RecordingNotifier>, config: &PublisherConfig) -> PageBuilder
where
    C: ConfigurationWriteChannel + ConfigurationReadChannel + Clone + 'static,
{
    let publisher = ConfigurationPublisher::new(Arc::new(channel.clone()), ChannelKeys::new("market"), config)
        .with_notifier(notifier);
    PageBuilder::new(Arc::new(ConfigurationStore::new()), Arc::new(publisher), Arc::new(channel))
}

pub fn recording_builder() -> (PageBuilder, RecordingChannel) {
    let channel = RecordingChannel::new();
    let builder = builder_with(
        channel.clone(),
        Arc::new(RecordingNotifier::default()),
        &PublisherConfig::default(),
    );
    (builder, channel)
}

/// In-process NIP-01 relay.
///
/// Checks ids and signatures and keeps only the newest event per
/// (author, kind, d tag), like a relay honouring parameterized replaceable events.
#[derive(Clone, Default)]
pub struct MockRelay {
    events: Arc<Mutex<Vec<Event>>>,
    reject: Arc<AtomicBool>,
    silent: Arc<AtomicBool>,
}

fn d_tag(event: &Event) -> Option<String> {
    event.tags.iter().find_map(|tag| match tag.as_standardized() {
        Some(TagStandard::Identifier(id)) => Some(id.clone()),
        _ => None,
    })
}

impl MockRelay {
    /// Answer EVENT with `OK false`.
    pub fn reject_all(&self) {
        self.reject.store(true, Ordering::SeqCst);
    }

    /// Never answer anything.
    pub fn go_silent(&self) {
        self.silent.store(true, Ordering::SeqCst);
    }

    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn d_tags(&self) -> Vec<Option<String>> {
        self.events().iter().map(d_tag).collect()
    }

    /// Store an event unless a newer one with the same address exists.
    ///
    /// Returns false when the event lost to the stored one.
    pub fn insert(&self, event: Event) -> bool {
        let mut events = self.events.lock().unwrap();
        let same_address =
            |existing: &Event| existing.pubkey == event.pubkey && existing.kind == event.kind && d_tag(existing) == d_tag(&event);

        if let Some(current) = events.iter().find(|existing| same_address(existing)) {
            let newer = event.created_at > current.created_at
                || (event.created_at == current.created_at && event.id.to_hex() < current.id.to_hex());
            if !newer {
                return false;
            }
        }
        events.retain(|existing| !same_address(existing));
        events.push(event);
        true
    }

    fn answer(&self, text: &str) -> Vec<Value> {
        if self.silent.load(Ordering::SeqCst) {
            return Vec::new();
        }
        let Ok(Value::Array(frame)) = serde_json::from_str::<Value>(text) else {
            return vec![json!(["NOTICE", "invalid message"])];
        };

        match frame.first().and_then(Value::as_str) {
            Some("EVENT") => {
                let Some(Ok(event)) = frame.get(1).cloned().map(serde_json::from_value::<Event>) else {
                    return vec![json!(["NOTICE", "invalid event"])];
                };
                let id = event.id.to_hex();
                if event.verify().is_err() {
                    return vec![json!(["OK", id, false, "invalid: bad id or signature"])];
                }
                if self.reject.load(Ordering::SeqCst) {
                    return vec![json!(["OK", id, false, "blocked: test relay"])];
                }
                self.insert(event);
                vec![json!(["OK", id, true, ""])]
            }
            Some("REQ") => {
                let sub = frame.get(1).and_then(Value::as_str).unwrap_or_default().to_string();
                let mut filters = Vec::new();
                for raw in frame.iter().skip(2) {
                    match serde_json::from_value::<Filter>(raw.clone()) {
                        Ok(filter) => filters.push(filter),
                        Err(_) => return vec![json!(["CLOSED", sub, "invalid filter"])],
                    }
                }
                let mut replies: Vec<Value> = self
                    .events()
                    .into_iter()
                    .filter(|event| filters.iter().any(|filter| filter.match_event(event)))
                    .map(|event| json!(["EVENT", sub, event]))
                    .collect();
                replies.push(json!(["EOSE", sub]));
                replies
            }
            _ => Vec::new(),
        }
    }
}

/// Start a mock relay on a random local port and return it with its URL.
pub async fn start_mock_relay() -> (MockRelay, String) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("ws://{}", listener.local_addr().unwrap());
    let relay = MockRelay::default();
    let shared = relay.clone();

    tokio::spawn(async move {
        while let Ok((stream, _)) = listener.accept().await {
            let relay = shared.clone();
            tokio::spawn(async move {
                let Ok(mut ws) = accept_async(stream).await else {
                    return;
                };
                while let Some(Ok(message)) = ws.next().await {
                    let Message::Text(text) = message else {
                        continue;
                    };
                    for reply in relay.answer(text.as_str()) {
                        if ws.send(Message::Text(reply.to_string().into())).await.is_err() {
                            return;
                        }
                    }
                }
            });
        }
    });

    (relay, url)
}
