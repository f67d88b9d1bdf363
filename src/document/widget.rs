//! Static catalog of section widget types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;

/// Category of domain object a section can reference by identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Products,
    Stalls,
}

impl EntityKind {
    /// Key used for this kind inside a section's `values` map.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Products => "products",
            EntityKind::Stalls => "stalls",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EntityKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "products" => Ok(EntityKind::Products),
            "stalls" => Ok(EntityKind::Stalls),
            other => Err(format!("unknown entity kind '{}'", other)),
        }
    }
}

/// Widget type of a section, stored as `params.sectionType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WidgetType {
    /// Free markdown text.
    Text,
    /// Hand-picked products.
    Products,
    /// Hand-picked stalls.
    Stalls,
    /// Every product of the selected stalls, optionally capped.
    StallProducts,
}

/// Stored value of `params.sectionType`.
///
/// Types missing from the catalog (older clients wrote `banner`) are kept
/// verbatim so the document still loads and saves unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SectionType {
    Known(WidgetType),
    Unknown(Value),
}

impl SectionType {
    /// The catalog widget, if this type is one.
    pub fn widget(&self) -> Option<WidgetType> {
        match self {
            SectionType::Known(widget) => Some(*widget),
            SectionType::Unknown(_) => None,
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, SectionType::Known(_))
    }
}

impl From<WidgetType> for SectionType {
    fn from(widget: WidgetType) -> Self {
        SectionType::Known(widget)
    }
}

impl PartialEq<WidgetType> for SectionType {
    fn eq(&self, other: &WidgetType) -> bool {
        self.widget() == Some(*other)
    }
}

impl fmt::Display for SectionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SectionType::Known(widget) => widget.fmt(f),
            SectionType::Unknown(Value::String(raw)) => f.write_str(raw),
            SectionType::Unknown(other) => write!(f, "{}", other),
        }
    }
}

/// Catalog entry describing the configuration shape of a widget type.
#[derive(Debug, Clone, Serialize)]
pub struct WidgetSpec {
    pub widget: WidgetType,
    pub title: &'static str,
    pub description: &'static str,
    /// Entity kinds the widget accepts in its `values`.
    pub items: &'static [EntityKind],
    /// Whether `maxProductsShown` applies.
    pub max_num_available: bool,
    /// Whether the widget is edited as free text.
    pub long_text: bool,
}

pub static WIDGET_CATALOG: [WidgetSpec; 4] = [
    WidgetSpec {
        widget: WidgetType::Text,
        title: "Show a long Text",
        description: "Choose this widget to be able to write a text to explain your customers something.",
        items: &[],
        max_num_available: false,
        long_text: true,
    },
    WidgetSpec {
        widget: WidgetType::Products,
        title: "Show selected Products",
        description: "Choose this widget type to be able to select which products you want shown on this section.",
        items: &[EntityKind::Products],
        max_num_available: false,
        long_text: false,
    },
    WidgetSpec {
        widget: WidgetType::Stalls,
        title: "Show selected Stalls",
        description: "Choose this widget type to be able to select which stalls you want shown on this section.",
        items: &[EntityKind::Stalls],
        max_num_available: false,
        long_text: false,
    },
    WidgetSpec {
        widget: WidgetType::StallProducts,
        title: "Show all Products from several stalls",
        description: "Choose this widget type to be able to select one or several stalls to have all their products automatically shown in the section.",
        items: &[EntityKind::Stalls],
        max_num_available: true,
        long_text: false,
    },
];

impl WidgetType {
    pub fn spec(&self) -> &'static WidgetSpec {
        match self {
            WidgetType::Text => &WIDGET_CATALOG[0],
            WidgetType::Products => &WIDGET_CATALOG[1],
            WidgetType::Stalls => &WIDGET_CATALOG[2],
            WidgetType::StallProducts => &WIDGET_CATALOG[3],
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WidgetType::Text => "text",
            WidgetType::Products => "products",
            WidgetType::Stalls => "stalls",
            WidgetType::StallProducts => "stall_products",
        }
    }

    /// Whether a `values` bucket with the given key is meaningful for this widget.
    pub fn accepts(&self, entity_key: &str) -> bool {
        self.spec().items.iter().any(|kind| kind.as_str() == entity_key)
    }
}

impl fmt::Display for WidgetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for WidgetType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        WIDGET_CATALOG
            .iter()
            .map(|spec| spec.widget)
            .find(|widget| widget.as_str() == s)
            .ok_or_else(|| format!("unknown widget type '{}'", s))
    }
}
