//! Association of products and stalls with sections.

use std::collections::BTreeMap;

use crate::document::{EntityKind, PageId, SectionId, SiteConfig};
use crate::error::{BuilderError, BuilderResult};

fn missing_section(page_id: &PageId, section_id: &SectionId) -> BuilderError {
    BuilderError::SectionNotFound {
        page: page_id.clone(),
        section: section_id.clone(),
    }
}

/// Append an item to a section's bucket unless it is already there.
///
/// Returns true if the item was inserted.
pub fn add_item_to_section(
    site: &mut SiteConfig,
    page_id: &PageId,
    section_id: &SectionId,
    item_id: &str,
    kind: EntityKind,
) -> BuilderResult<bool> {
    let section = site
        .section_mut(page_id, section_id)
        .ok_or_else(|| missing_section(page_id, section_id))?;

    let bucket = section
        .values
        .get_or_insert_with(BTreeMap::new)
        .entry(kind.as_str().to_string())
        .or_default();

    if bucket.iter().any(|existing| existing == item_id) {
        return Ok(false);
    }
    bucket.push(item_id.to_string());
    Ok(true)
}

/// Remove an item from a section's bucket.
///
/// Returns true if the item was present.
pub fn remove_item_from_section(
    site: &mut SiteConfig,
    page_id: &PageId,
    section_id: &SectionId,
    item_id: &str,
    kind: EntityKind,
) -> BuilderResult<bool> {
    let section = site
        .section_mut(page_id, section_id)
        .ok_or_else(|| missing_section(page_id, section_id))?;

    let Some(bucket) = section.values.as_mut().and_then(|values| values.get_mut(kind.as_str())) else {
        return Ok(false);
    };
    let before = bucket.len();
    bucket.retain(|existing| existing != item_id);
    Ok(bucket.len() != before)
}

/// Items of a kind stored in a section; empty when anything is missing.
pub fn items_from_section(site: &SiteConfig, page_id: &PageId, section_id: &SectionId, kind: EntityKind) -> Vec<String> {
    site.section(page_id, section_id)
        .map(|section| section.items(kind.as_str()).to_vec())
        .unwrap_or_default()
}

/// Every section listing the item, keyed `"<page>-<section>"` with a
/// `"<page title> / <section title>"` label.
pub fn places_where_item_is_present(site: &SiteConfig, item_id: &str, kind: EntityKind) -> BTreeMap<String, String> {
    let mut places = BTreeMap::new();

    for (page_id, page) in site.pages() {
        let Some(sections) = page.sections.as_ref() else {
            continue;
        };
        for (section_id, section) in sections {
            if section.items(kind.as_str()).iter().any(|existing| existing == item_id) {
                places.insert(
                    format!("{}-{}", page_id, section_id),
                    format!("{} / {}", page.title, section.title),
                );
            }
        }
    }

    places
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn site() -> SiteConfig {
        serde_json::from_value(json!({
            "content": {"pages": {
                "0": {"title": "Homepage", "sections": {
                    "0": {"title": "Intro", "order": 0},
                    "1": {"title": "Stalls", "order": 1, "values": {"stalls": ["s1"]}},
                    "2": {"title": "Featured", "order": 2, "values": {"products": ["p1", "p2"]}}
                }},
                "1": {"title": "Shop", "sections": {
                    "0": {"title": "All", "order": 0, "values": {"products": ["p2"]}}
                }}
            }}
        }))
        .unwrap()
    }

    fn home() -> PageId {
        PageId::homepage()
    }

    #[test]
    fn test_add_is_idempotent() {
        let mut site = site();
        let section = SectionId::from("0");
        assert!(add_item_to_section(&mut site, &home(), &section, "p9", EntityKind::Products).unwrap());
        let once = site.clone();
        assert!(!add_item_to_section(&mut site, &home(), &section, "p9", EntityKind::Products).unwrap());
        assert_eq!(site, once);
        assert_eq!(items_from_section(&site, &home(), &section, EntityKind::Products), ["p9"]);
    }

    #[test]
    fn test_add_preserves_insertion_order() {
        let mut site = site();
        let section = SectionId::from("2");
        add_item_to_section(&mut site, &home(), &section, "p0", EntityKind::Products).unwrap();
        assert_eq!(
            items_from_section(&site, &home(), &section, EntityKind::Products),
            ["p1", "p2", "p0"]
        );
    }

    #[test]
    fn test_remove_reports_change() {
        let mut site = site();
        let section = SectionId::from("2");
        assert!(remove_item_from_section(&mut site, &home(), &section, "p1", EntityKind::Products).unwrap());
        assert!(!remove_item_from_section(&mut site, &home(), &section, "p1", EntityKind::Products).unwrap());
        assert!(!remove_item_from_section(&mut site, &home(), &section, "s1", EntityKind::Stalls).unwrap());
        assert_eq!(items_from_section(&site, &home(), &section, EntityKind::Products), ["p2"]);
    }

    #[test]
    fn test_missing_section_is_an_error_for_mutations_only() {
        let mut site = site();
        let missing = SectionId::from("7");
        let err = add_item_to_section(&mut site, &home(), &missing, "p1", EntityKind::Products).unwrap_err();
        assert!(matches!(err, BuilderError::SectionNotFound { .. }));
        let err = remove_item_from_section(&mut site, &PageId::from("9"), &missing, "p1", EntityKind::Products)
            .unwrap_err();
        assert!(matches!(err, BuilderError::SectionNotFound { .. }));
        assert!(items_from_section(&site, &home(), &missing, EntityKind::Products).is_empty());
    }

    #[test]
    fn test_places_where_item_is_present() {
        let site = site();
        let places = places_where_item_is_present(&site, "p1", EntityKind::Products);
        assert_eq!(places.len(), 1);
        assert_eq!(places["0-2"], "Homepage / Featured");

        let places = places_where_item_is_present(&site, "p2", EntityKind::Products);
        assert_eq!(places.keys().collect::<Vec<_>>(), ["0-2", "1-0"]);
        assert_eq!(places["1-0"], "Shop / All");

        assert!(places_where_item_is_present(&site, "p2", EntityKind::Stalls).is_empty());
        assert!(places_where_item_is_present(&SiteConfig::default(), "p1", EntityKind::Products).is_empty());
    }
}
