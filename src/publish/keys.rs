//! Channel key derivation.

use crate::config::ChannelConfig;
use crate::document::{PageId, SectionId};

/// Logical name of the site configuration document.
pub const SITE_CONFIG_NAME: &str = "site_specific_config";

/// Builds namespaced keys ("<namespace>_<name>").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelKeys {
    namespace: String,
}

impl ChannelKeys {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn from_config(config: &ChannelConfig) -> Self {
        Self::new(config.namespace.clone())
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    pub fn key(&self, name: &str) -> String {
        format!("{}_{}", self.namespace, name)
    }

    /// Key of the whole site configuration.
    pub fn site(&self) -> String {
        self.key(SITE_CONFIG_NAME)
    }

    /// Key of the free text attached to one section.
    pub fn section_text(&self, page_id: &PageId, section_id: &SectionId) -> String {
        self.key(&format!("sectionText_{}_{}", page_id, section_id))
    }
}

impl Default for ChannelKeys {
    fn default() -> Self {
        Self::from_config(&ChannelConfig::default())
    }
}
