//! Marketplace page builder configuration library

pub mod builder;
pub mod channel;
pub mod config;
pub mod document;
pub mod engine;
pub mod error;
pub mod observability;
pub mod publish;
pub mod store;

pub use builder::{Edit, PageBuilder};
pub use config::schema::BuilderConfig;
pub use document::{PageId, SectionId, SiteConfig};
pub use error::{BuilderError, BuilderResult};
pub use store::ConfigurationStore;
