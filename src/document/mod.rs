//! Site configuration document model.
//!
//! # Data Flow
//! ```text
//! published JSON (site key)
//!     → types.rs (SiteConfig envelope → pages → sections)
//!     → validation.rs (semantic checks, reported only)
//!     → store (shared snapshot) → engine (edits on a private clone)
//! ```
//!
//! # Design Decisions
//! - Page and section ids are string newtypes, never array indices
//! - Maps are ordered by id for stable serialization; display order comes from `order`
//! - Unknown settings, section fields and widget types survive every load/save cycle

pub mod ids;
pub mod types;
pub mod validation;
pub mod widget;

pub use ids::{PageId, SectionId};
pub use types::{
    ConfigurationDocument, Page, Section, SectionParams, SiteConfig, HOMEPAGE_TITLE, LEGACY_HOMEPAGE_INCLUDE_STALLS,
};
pub use validation::{validate_document, ValidationError};
pub use widget::{EntityKind, SectionType, WidgetSpec, WidgetType, WIDGET_CATALOG};
