//! Configuration store subsystem.
//!
//! # Data Flow
//! ```text
//! builder edit / channel load / file watcher
//!     → ConfigurationStore::set (new Arc<SiteConfig>, version += 1)
//!     → watch channel → every subscriber (UI re-render, CLI watch)
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable `Arc`s swapped atomically; readers never lock
//! - One announcement per logical edit, carrying a monotonically increasing version
//! - No persistence here; publishing is the publisher's job

pub mod config_store;

pub use config_store::{ConfigurationStore, StoreSnapshot};
