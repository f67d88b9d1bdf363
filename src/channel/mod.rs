//! Configuration channel subsystem.
//!
//! # Data Flow
//! ```text
//! ConfigurationPublisher / PageBuilder::load
//!     → ConfigurationWriteChannel / ConfigurationReadChannel (types.rs)
//!         → memory.rs (DashMap, tests and embedding)
//!         → file.rs   (one JSON file per key)
//!         → relay.rs  (Nostr replaceable events through nostr-sdk)
//!
//! External edits:
//!     watcher.rs (notify) → file changed → ConfigurationStore::reload
//! ```
//!
//! # Design Decisions
//! - Documents cross the channel as `serde_json::Value`; typing happens in `document`
//! - Relay events are signed with the configured key; reads only accept that author
//! - Every network round trip is bounded by a timeout

pub mod file;
pub mod memory;
pub mod relay;
pub mod types;
pub mod watcher;

pub use file::FileChannel;
pub use memory::MemoryChannel;
pub use relay::{RelayChannel, APP_DATA_KIND};
pub use types::{ChannelError, ChannelResult, ConfigurationReadChannel, ConfigurationWriteChannel};
pub use watcher::DocumentWatcher;
