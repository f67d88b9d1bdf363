//! Page builder document definitions.
//!
//! The site configuration published under the site key is an open JSON object.
//! The page layout lives under its `content` field; every other top-level field
//! belongs to other settings screens and is carried through untouched.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::document::ids::{PageId, SectionId};
use crate::document::widget::{SectionType, WidgetType};

/// Legacy top-level field removed before every publish.
pub const LEGACY_HOMEPAGE_INCLUDE_STALLS: &str = "homepage_include_stalls";

/// Title given to the homepage when it is created implicitly.
pub const HOMEPAGE_TITLE: &str = "Homepage";

static NO_PAGES: BTreeMap<PageId, Page> = BTreeMap::new();

/// Root site configuration object.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Page builder document, created on the first structural edit.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<ConfigurationDocument>,

    /// Other site settings, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Nested page layout: pages → sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConfigurationDocument {
    #[serde(default)]
    pub pages: BTreeMap<PageId, Page>,
}

/// A named collection of ordered sections.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Page {
    #[serde(default)]
    pub title: String,

    /// `None` marks a page that was never given a sections map.
    #[serde(default)]
    pub sections: Option<BTreeMap<SectionId, Section>>,
}

/// A positioned, configurable content block within a page.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Section {
    #[serde(default)]
    pub title: String,

    /// Display position among siblings.
    #[serde(default)]
    pub order: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub params: Option<SectionParams>,

    /// Entity kind → ordered, de-duplicated identifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub values: Option<BTreeMap<String, Vec<String>>>,

    /// Fields this builder does not edit, preserved verbatim.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Widget configuration of a section.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_type: Option<SectionType>,

    /// Only meaningful for widgets with `max_num_available`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_products_shown: Option<u32>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SiteConfig {
    /// All pages, or an empty map when no layout exists yet.
    pub fn pages(&self) -> &BTreeMap<PageId, Page> {
        self.content.as_ref().map_or(&NO_PAGES, |doc| &doc.pages)
    }

    /// A page that exists and has a sections map.
    pub fn page(&self, page_id: &PageId) -> Option<&Page> {
        self.pages().get(page_id).filter(|page| page.sections.is_some())
    }

    pub fn section(&self, page_id: &PageId, section_id: &SectionId) -> Option<&Section> {
        self.page(page_id)?.sections.as_ref()?.get(section_id)
    }

    pub fn page_mut(&mut self, page_id: &PageId) -> Option<&mut Page> {
        self.content
            .as_mut()?
            .pages
            .get_mut(page_id)
            .filter(|page| page.sections.is_some())
    }

    pub fn section_mut(&mut self, page_id: &PageId, section_id: &SectionId) -> Option<&mut Section> {
        self.page_mut(page_id)?.sections.as_mut()?.get_mut(section_id)
    }

    /// Remove fields that older clients wrote at the top level.
    ///
    /// Returns true if anything was removed.
    pub fn strip_legacy_fields(&mut self) -> bool {
        self.extra.remove(LEGACY_HOMEPAGE_INCLUDE_STALLS).is_some()
    }

    /// Total number of sections across all pages.
    pub fn section_count(&self) -> usize {
        self.pages()
            .values()
            .filter_map(|page| page.sections.as_ref())
            .map(BTreeMap::len)
            .sum()
    }
}

impl Page {
    /// Sections map, created empty if the page had none.
    pub fn sections_mut(&mut self) -> &mut BTreeMap<SectionId, Section> {
        self.sections.get_or_insert_with(BTreeMap::new)
    }

    /// Section ids sorted by ascending `order`; ties keep id order.
    pub fn ordered_section_ids(&self) -> Vec<SectionId> {
        let Some(sections) = self.sections.as_ref() else {
            return Vec::new();
        };
        let mut entries: Vec<(&SectionId, &Section)> = sections.iter().collect();
        entries.sort_by_key(|(_, section)| section.order);
        entries.into_iter().map(|(id, _)| id.clone()).collect()
    }
}

impl Section {
    pub fn new(title: impl Into<String>, order: i64) -> Self {
        Self {
            title: title.into(),
            order,
            params: None,
            values: None,
            extra: Map::new(),
        }
    }

    /// Catalog widget of the section; `None` when unset or unknown.
    pub fn widget(&self) -> Option<WidgetType> {
        self.section_type().and_then(SectionType::widget)
    }

    pub fn section_type(&self) -> Option<&SectionType> {
        self.params.as_ref()?.section_type.as_ref()
    }

    /// Identifiers stored under an entity kind, empty if none.
    pub fn items(&self, entity_key: &str) -> &[String] {
        self.values
            .as_ref()
            .and_then(|values| values.get(entity_key))
            .map_or(&[][..], Vec::as_slice)
    }
}
