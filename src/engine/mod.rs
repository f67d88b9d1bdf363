//! Editing engines for the page layout.
//!
//! # Data Flow
//! ```text
//! UI action
//!     → builder (clone current snapshot)
//!     → lifecycle.rs / ordering.rs / items.rs (mutate the clone)
//!     → builder (store.set once, publish once)
//! ```
//!
//! # Design Decisions
//! - Engines are plain functions over `&mut SiteConfig`; they never touch the store or the network
//! - Mutations report NotFound/InvalidIndex instead of silently doing nothing
//! - Each engine reports whether it changed anything so callers skip no-op publishes

pub mod items;
pub mod lifecycle;
pub mod ordering;
pub mod types;

pub use items::{add_item_to_section, items_from_section, places_where_item_is_present, remove_item_from_section};
pub use lifecycle::{add_section_to_page, remove_section, save_section_setup};
pub use ordering::handle_move;
pub use types::{SectionMove, SectionSetup};
