//! Page builder facade.
//!
//! # Data Flow
//! ```text
//! caller (UI handler / CLI)
//!     → PageBuilder edit (serialized by an internal lock)
//!         → clone store snapshot → engine mutates the clone
//!         → store.set (exactly one announcement)
//!         → ConfigurationPublisher (background task)
//!     ← Edit { value, version, changed, publish }
//! ```
//!
//! # Design Decisions
//! - Optimistic: the store reflects an edit before its publish completes
//! - Edits that change nothing neither announce nor publish (moves excepted)
//! - Failed edits leave the store untouched

pub mod edit;
pub mod page_builder;

pub use edit::Edit;
pub use page_builder::PageBuilder;
