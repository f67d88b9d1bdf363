//! Document validation.
//!
//! # Responsibilities
//! - Detect sections sharing an `order` within a page
//! - Check widget params against the widget catalog
//! - Report widget types the catalog does not know
//! - Check `values` buckets against the entity kinds a widget accepts
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Never blocks loading: documents written by older clients are reported, not rejected

use std::collections::{HashMap, HashSet};
use std::fmt;

use crate::document::ids::{PageId, SectionId};
use crate::document::types::SiteConfig;

/// A single problem found in a stored document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    DuplicateOrder {
        page: PageId,
        order: i64,
        sections: Vec<SectionId>,
    },
    UnknownWidget {
        page: PageId,
        section: SectionId,
        widget: String,
    },
    ZeroCap {
        page: PageId,
        section: SectionId,
    },
    CapNotSupported {
        page: PageId,
        section: SectionId,
        widget: String,
    },
    UnexpectedEntityKind {
        page: PageId,
        section: SectionId,
        entity_kind: String,
    },
    DuplicateItem {
        page: PageId,
        section: SectionId,
        entity_kind: String,
        item: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::DuplicateOrder { page, order, sections } => {
                let ids: Vec<&str> = sections.iter().map(SectionId::as_str).collect();
                write!(f, "page {}: sections [{}] share order {}", page, ids.join(", "), order)
            }
            ValidationError::UnknownWidget { page, section, widget } => {
                write!(f, "page {} section {}: unknown widget type '{}'", page, section, widget)
            }
            ValidationError::ZeroCap { page, section } => {
                write!(f, "page {} section {}: maxProductsShown must be positive", page, section)
            }
            ValidationError::CapNotSupported { page, section, widget } => write!(
                f,
                "page {} section {}: widget '{}' does not support maxProductsShown",
                page, section, widget
            ),
            ValidationError::UnexpectedEntityKind { page, section, entity_kind } => write!(
                f,
                "page {} section {}: widget does not accept '{}' items",
                page, section, entity_kind
            ),
            ValidationError::DuplicateItem { page, section, entity_kind, item } => write!(
                f,
                "page {} section {}: '{}' listed twice under '{}'",
                page, section, item, entity_kind
            ),
        }
    }
}

/// Validate the page layout of a site configuration.
pub fn validate_document(site: &SiteConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    for (page_id, page) in site.pages() {
        let Some(sections) = page.sections.as_ref() else {
            continue;
        };

        let mut by_order: HashMap<i64, Vec<SectionId>> = HashMap::new();
        for (section_id, section) in sections {
            by_order.entry(section.order).or_default().push(section_id.clone());
        }
        let mut shared: Vec<_> = by_order.into_iter().filter(|(_, ids)| ids.len() > 1).collect();
        shared.sort_by_key(|(order, _)| *order);
        for (order, ids) in shared {
            errors.push(ValidationError::DuplicateOrder {
                page: page_id.clone(),
                order,
                sections: ids,
            });
        }

        for (section_id, section) in sections {
            if let Some(unknown) = section.section_type().filter(|t| !t.is_known()) {
                errors.push(ValidationError::UnknownWidget {
                    page: page_id.clone(),
                    section: section_id.clone(),
                    widget: unknown.to_string(),
                });
            }
            let widget = section.widget();

            if let Some(cap) = section.params.as_ref().and_then(|p| p.max_products_shown) {
                if cap == 0 {
                    errors.push(ValidationError::ZeroCap {
                        page: page_id.clone(),
                        section: section_id.clone(),
                    });
                } else if let Some(widget) = widget.filter(|w| !w.spec().max_num_available) {
                    errors.push(ValidationError::CapNotSupported {
                        page: page_id.clone(),
                        section: section_id.clone(),
                        widget: widget.to_string(),
                    });
                }
            }

            let Some(values) = section.values.as_ref() else {
                continue;
            };
            for (entity_kind, items) in values {
                // Sections without a widget type yet may hold anything.
                if widget.is_some_and(|w| !items.is_empty() && !w.accepts(entity_kind)) {
                    errors.push(ValidationError::UnexpectedEntityKind {
                        page: page_id.clone(),
                        section: section_id.clone(),
                        entity_kind: entity_kind.clone(),
                    });
                }

                let mut seen = HashSet::new();
                for item in items {
                    if !seen.insert(item.as_str()) {
                        errors.push(ValidationError::DuplicateItem {
                            page: page_id.clone(),
                            section: section_id.clone(),
                            entity_kind: entity_kind.clone(),
                            item: item.clone(),
                        });
                    }
                }
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
