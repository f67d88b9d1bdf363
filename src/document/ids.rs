//! Strongly typed page and section identifiers.
//!
//! Stored documents key pages and sections by stringified numbers ("0", "1", ...).
//! Both ids wrap the raw string so a numeric-looking id is never mistaken for an
//! array index.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a page inside the configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PageId(String);

/// Identifier of a section, unique within its page.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SectionId(String);

impl PageId {
    /// The homepage always lives under page id `0`.
    pub fn homepage() -> Self {
        Self("0".to_string())
    }

    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_homepage(&self) -> bool {
        self.0 == "0"
    }
}

impl SectionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Numeric value of the id, if it looks like one.
    pub fn as_number(&self) -> Option<u64> {
        self.0.parse().ok()
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl fmt::Display for SectionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for PageId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for PageId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl From<&str> for SectionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<u64> for SectionId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_numeric_ids_stay_strings() {
        let id = SectionId::from(10u64);
        assert_eq!(id.as_str(), "10");
        assert_eq!(id.as_number(), Some(10));
        assert_eq!(SectionId::from("intro").as_number(), None);
    }

    #[test]
    fn test_homepage_id() {
        assert!(PageId::homepage().is_homepage());
        assert!(PageId::from(0u64).is_homepage());
        assert!(!PageId::from("about").is_homepage());
    }

    #[test]
    fn test_ids_serialize_as_plain_strings() {
        let json = serde_json::to_string(&PageId::from(3u64)).unwrap();
        assert_eq!(json, "\"3\"");
        let decoded: SectionId = serde_json::from_str("\"7\"").unwrap();
        assert_eq!(decoded, SectionId::from(7u64));
    }
}
