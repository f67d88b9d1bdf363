//! Background publishing of the site configuration and section texts.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use thiserror::Error;
use tokio::runtime::Handle;
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use uuid::Uuid;

use crate::channel::{ChannelError, ConfigurationWriteChannel};
use crate::config::PublisherConfig;
use crate::document::{PageId, SectionId, SiteConfig, LEGACY_HOMEPAGE_INCLUDE_STALLS};
use crate::observability::metrics;
use crate::publish::keys::ChannelKeys;
use crate::publish::notifier::{NotificationSink, TracingNotifier};

/// Errors that can occur while publishing.
#[derive(Debug, Error)]
pub enum PublishError {
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("Publish timed out after {0} seconds")]
    Timeout(u64),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Publishing needs a Tokio runtime to spawn onto.
    #[error("No async runtime available for publishing")]
    NoRuntime,

    /// The publish task panicked or was cancelled.
    #[error("Publish task aborted: {0}")]
    Aborted(String),
}

/// Latest publish outcome, observable through [`ConfigurationPublisher::status`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum PublishStatus {
    #[default]
    Idle,
    Pending { publish_id: Uuid, key: String },
    Published { publish_id: Uuid, key: String },
    Failed { publish_id: Uuid, key: String, error: String },
}

impl PublishStatus {
    pub fn publish_id(&self) -> Option<Uuid> {
        match self {
            PublishStatus::Idle => None,
            PublishStatus::Pending { publish_id, .. }
            | PublishStatus::Published { publish_id, .. }
            | PublishStatus::Failed { publish_id, .. } => Some(*publish_id),
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, PublishStatus::Failed { .. })
    }
}

/// A publish running in the background.
///
/// Dropping the handle does not cancel the publish.
#[derive(Debug)]
pub struct PublishHandle {
    publish_id: Uuid,
    key: String,
    task: JoinHandle<Result<(), PublishError>>,
}

impl PublishHandle {
    pub fn id(&self) -> Uuid {
        self.publish_id
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Wait for the channel to confirm (or refuse) the document.
    pub async fn wait(self) -> Result<(), PublishError> {
        match self.task.await {
            Ok(result) => result,
            Err(e) => Err(PublishError::Aborted(e.to_string())),
        }
    }
}

/// Hands serialized documents to a write channel without blocking the caller.
///
/// Publishes to the same key reach the channel one at a time, in the order
/// they were started, so a slow publish can never land after a newer one.
pub struct ConfigurationPublisher {
    channel: Arc<dyn ConfigurationWriteChannel>,
    keys: ChannelKeys,
    timeout_duration: Duration,
    notifier: Arc<dyn NotificationSink>,
    notify: bool,
    status: Arc<watch::Sender<PublishStatus>>,
    /// Completion signal of the last publish started per key.
    tails: Mutex<HashMap<String, oneshot::Receiver<()>>>,
}

impl ConfigurationPublisher {
    pub fn new(channel: Arc<dyn ConfigurationWriteChannel>, keys: ChannelKeys, config: &PublisherConfig) -> Self {
        let (status, _) = watch::channel(PublishStatus::Idle);
        Self {
            channel,
            keys,
            timeout_duration: config.timeout(),
            notifier: Arc::new(TracingNotifier),
            notify: config.notify,
            status: Arc::new(status),
            tails: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_notifier(mut self, notifier: Arc<dyn NotificationSink>) -> Self {
        self.notifier = notifier;
        self
    }

    pub fn keys(&self) -> &ChannelKeys {
        &self.keys
    }

    /// Subscribe to publish outcomes.
    pub fn status(&self) -> watch::Receiver<PublishStatus> {
        self.status.subscribe()
    }

    /// Publish the whole site configuration under the site key.
    ///
    /// The legacy `homepage_include_stalls` field never leaves the process.
    pub fn publish_site(&self, site: &SiteConfig) -> Result<PublishHandle, PublishError> {
        let mut value = serde_json::to_value(site)?;
        if let Some(envelope) = value.as_object_mut() {
            envelope.remove(LEGACY_HOMEPAGE_INCLUDE_STALLS);
        }
        self.spawn(self.keys.site(), value, "Configuration saved.")
    }

    /// Publish the free text of one section under its own key.
    pub fn publish_section_text(
        &self,
        page_id: &PageId,
        section_id: &SectionId,
        text: &str,
    ) -> Result<PublishHandle, PublishError> {
        self.spawn(
            self.keys.section_text(page_id, section_id),
            Value::String(text.to_string()),
            "Section text saved.",
        )
    }

    fn spawn(&self, key: String, value: Value, success_message: &'static str) -> Result<PublishHandle, PublishError> {
        let runtime = Handle::try_current().map_err(|_| {
            metrics::record_publish("skipped");
            PublishError::NoRuntime
        })?;

        let publish_id = Uuid::new_v4();
        let (done, tail) = oneshot::channel::<()>();
        let previous = self
            .tails
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), tail);
        self.status.send_replace(PublishStatus::Pending {
            publish_id,
            key: key.clone(),
        });
        tracing::debug!(key = %key, publish_id = %publish_id, "Publishing configuration");

        let channel = self.channel.clone();
        let status = self.status.clone();
        let notifier = self.notifier.clone();
        let notify = self.notify;
        let timeout_duration = self.timeout_duration;
        let task_key = key.clone();

        let task = runtime.spawn(async move {
            if let Some(previous) = previous {
                // Fired or dropped, the earlier publish is over either way.
                let _ = previous.await;
            }

            let result = match timeout(timeout_duration, channel.publish(&task_key, &value)).await {
                Ok(Ok(())) => Ok(()),
                Ok(Err(e)) => Err(PublishError::Channel(e)),
                Err(_) => Err(PublishError::Timeout(timeout_duration.as_secs())),
            };

            match &result {
                Ok(()) => {
                    metrics::record_publish("published");
                    tracing::info!(key = %task_key, publish_id = %publish_id, "Configuration published");
                    status.send_replace(PublishStatus::Published {
                        publish_id,
                        key: task_key,
                    });
                    if notify {
                        notifier.info(success_message);
                    }
                }
                Err(e) => {
                    let outcome = match e {
                        PublishError::Timeout(_) => "timeout",
                        _ => "failed",
                    };
                    metrics::record_publish(outcome);
                    tracing::warn!(key = %task_key, publish_id = %publish_id, error = %e, "Configuration publish failed");
                    status.send_replace(PublishStatus::Failed {
                        publish_id,
                        key: task_key,
                        error: e.to_string(),
                    });
                    if notify {
                        notifier.error(&format!("Configuration could not be saved: {}", e));
                    }
                }
            }

            let _ = done.send(());
            result
        });

        Ok(PublishHandle { publish_id, key, task })
    }
}

impl std::fmt::Debug for ConfigurationPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConfigurationPublisher")
            .field("namespace", &self.keys.namespace())
            .field("timeout_secs", &self.timeout_duration.as_secs())
            .field("notify", &self.notify)
            .finish()
    }
}
