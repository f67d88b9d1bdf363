//! User-facing status messages.

/// Receives short status messages meant for the person editing the site.
pub trait NotificationSink: Send + Sync {
    fn info(&self, message: &str);

    fn error(&self, message: &str) {
        self.info(message);
    }
}

/// Forwards notifications to the log.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingNotifier;

impl NotificationSink for TracingNotifier {
    fn info(&self, message: &str) {
        tracing::info!(target: "notifications", "{}", message);
    }

    fn error(&self, message: &str) {
        tracing::warn!(target: "notifications", "{}", message);
    }
}
