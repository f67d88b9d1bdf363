//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → BuilderConfig (validated, immutable)
//!     → channel / publisher / logging setup
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - This is the tool's own configuration, not the site configuration it edits

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::BuilderConfig;
pub use schema::ChannelBackend;
pub use schema::ChannelConfig;
pub use schema::ObservabilityConfig;
pub use schema::PublisherConfig;
