//! Inputs to the editing engines.

use serde::{Deserialize, Serialize};

use crate::document::WidgetType;

/// A drag-and-drop gesture over the order-sorted section list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMove {
    /// Position the section was picked up from.
    pub old_index: usize,
    /// Position the section was dropped at.
    pub new_index: usize,
}

impl SectionMove {
    pub fn new(old_index: usize, new_index: usize) -> Self {
        Self { old_index, new_index }
    }
}

/// Values submitted from the section setup form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSetup {
    pub section_title: String,
    pub section_type: WidgetType,
    /// Zero or absent leaves an existing cap untouched.
    #[serde(default)]
    pub max_products_shown: Option<u32>,
    /// Free text, published separately under the section text key.
    #[serde(default)]
    pub markdown_content: Option<String>,
}

impl SectionSetup {
    pub fn new(section_title: impl Into<String>, section_type: WidgetType) -> Self {
        Self {
            section_title: section_title.into(),
            section_type,
            max_products_shown: None,
            markdown_content: None,
        }
    }

    pub fn with_max_products(mut self, max: u32) -> Self {
        self.max_products_shown = Some(max);
        self
    }

    pub fn with_markdown(mut self, text: impl Into<String>) -> Self {
        self.markdown_content = Some(text.into());
        self
    }

    /// Text to publish, if any non-empty text was supplied.
    pub fn text(&self) -> Option<&str> {
        self.markdown_content.as_deref().filter(|text| !text.is_empty())
    }
}
