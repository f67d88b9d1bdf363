//! Publishing subsystem.
//!
//! # Data Flow
//! ```text
//! PageBuilder edit → store.set
//!     → ConfigurationPublisher::publish_site / publish_section_text
//!         → tokio task (timeout) → ConfigurationWriteChannel::publish
//!         → PublishStatus (watch) + NotificationSink + metrics
//!     → PublishHandle returned to the caller immediately
//! ```
//!
//! # Design Decisions
//! - The local edit is already applied when publishing starts; failures never roll it back
//! - No retries: the next edit republishes the whole document anyway
//! - Callers may await the handle, watch the status, or ignore both

pub mod keys;
pub mod notifier;
pub mod publisher;

pub use keys::ChannelKeys;
pub use notifier::{NotificationSink, TracingNotifier};
pub use publisher::{ConfigurationPublisher, PublishError, PublishHandle, PublishStatus};
