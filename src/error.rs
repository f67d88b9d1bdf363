//! Page builder error definitions.

use thiserror::Error;

use crate::channel::ChannelError;
use crate::document::{PageId, SectionId};

/// Errors returned by page builder mutations and loads.
#[derive(Debug, Error)]
pub enum BuilderError {
    /// The page does not exist or has no sections map.
    #[error("Page {0} not found")]
    PageNotFound(PageId),

    /// The section does not exist in the page.
    #[error("Section {section} not found in page {page}")]
    SectionNotFound { page: PageId, section: SectionId },

    /// Caller supplied an unusable value.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// A move referenced a position outside the section list.
    #[error("Index {index} out of range for {len} sections")]
    InvalidIndex { index: usize, len: usize },

    /// Reading from the configuration channel failed.
    #[error("Channel error: {0}")]
    Channel(#[from] ChannelError),

    /// Stored document could not be decoded.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Result type for page builder operations.
pub type BuilderResult<T> = Result<T, BuilderError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = BuilderError::SectionNotFound {
            page: PageId::homepage(),
            section: SectionId::from("4"),
        };
        assert_eq!(err.to_string(), "Section 4 not found in page 0");

        let err = BuilderError::InvalidIndex { index: 5, len: 3 };
        assert_eq!(err.to_string(), "Index 5 out of range for 3 sections");
    }
}
