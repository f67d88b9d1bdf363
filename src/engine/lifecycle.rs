//! Section creation, removal and setup.

use std::collections::BTreeMap;

use crate::document::types::HOMEPAGE_TITLE;
use crate::document::{ConfigurationDocument, Page, PageId, Section, SectionId, SectionParams, SiteConfig};
use crate::engine::types::SectionSetup;
use crate::error::{BuilderError, BuilderResult};

/// Add a section at the end of a page.
///
/// An empty title is a no-op and yields `Ok(None)`. Adding to the homepage
/// before it exists creates the whole layout with this section as id `0`.
pub fn add_section_to_page(site: &mut SiteConfig, title: &str, page_id: &PageId) -> BuilderResult<Option<SectionId>> {
    if title.is_empty() {
        return Ok(None);
    }

    if page_id.is_homepage() && site.page(page_id).is_none() {
        let section_id = SectionId::from(0u64);
        let mut sections = BTreeMap::new();
        sections.insert(section_id.clone(), Section::new(title, 0));

        let mut document = ConfigurationDocument::default();
        document.pages.insert(
            page_id.clone(),
            Page {
                title: HOMEPAGE_TITLE.to_string(),
                sections: Some(sections),
            },
        );
        // Other pages written by older layouts are kept.
        if let Some(previous) = site.content.take() {
            for (id, page) in previous.pages {
                document.pages.entry(id).or_insert(page);
            }
        }
        site.content = Some(document);

        tracing::info!(page_id = %page_id, "Homepage layout initialized");
        return Ok(Some(section_id));
    }

    let page = site
        .page_mut(page_id)
        .ok_or_else(|| BuilderError::PageNotFound(page_id.clone()))?;

    let order = next_order(page);
    let section_id = next_section_id(page);
    page.sections_mut().insert(section_id.clone(), Section::new(title, order));

    tracing::info!(page_id = %page_id, section_id = %section_id, order, "Section added");
    Ok(Some(section_id))
}

/// One past the order of the last section in display order.
fn next_order(page: &Page) -> i64 {
    page.sections
        .as_ref()
        .and_then(|sections| sections.values().map(|section| section.order).max())
        .map_or(0, |last| last + 1)
}

/// One past the highest numeric id, skipping ids already taken.
fn next_section_id(page: &Page) -> SectionId {
    let Some(sections) = page.sections.as_ref() else {
        return SectionId::from(0u64);
    };
    let mut candidate = sections
        .keys()
        .filter_map(SectionId::as_number)
        .max()
        .map_or(0, |highest| highest + 1);
    while sections.contains_key(&SectionId::from(candidate)) {
        candidate += 1;
    }
    SectionId::from(candidate)
}

/// Delete a section. Remaining sections keep their `order` values.
pub fn remove_section(site: &mut SiteConfig, page_id: &PageId, section_id: &SectionId) -> BuilderResult<Section> {
    let page = site
        .page_mut(page_id)
        .ok_or_else(|| BuilderError::PageNotFound(page_id.clone()))?;

    let removed = page
        .sections_mut()
        .remove(section_id)
        .ok_or_else(|| BuilderError::SectionNotFound {
            page: page_id.clone(),
            section: section_id.clone(),
        })?;

    tracing::info!(page_id = %page_id, section_id = %section_id, "Section removed");
    Ok(removed)
}

/// Apply the setup form to an existing section.
///
/// The title and widget type are always replaced; the cap only when a
/// non-zero value is given.
pub fn save_section_setup(
    site: &mut SiteConfig,
    page_id: &PageId,
    section_id: &SectionId,
    setup: &SectionSetup,
) -> BuilderResult<()> {
    let section = site
        .section_mut(page_id, section_id)
        .ok_or_else(|| BuilderError::SectionNotFound {
            page: page_id.clone(),
            section: section_id.clone(),
        })?;

    section.title = setup.section_title.clone();

    let params = section.params.get_or_insert_with(SectionParams::default);
    params.section_type = Some(setup.section_type.into());
    if let Some(max) = setup.max_products_shown.filter(|max| *max != 0) {
        params.max_products_shown = Some(max);
    }

    tracing::info!(
        page_id = %page_id,
        section_id = %section_id,
        section_type = %setup.section_type,
        "Section setup saved"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::WidgetType;
    use serde_json::json;

    fn home() -> PageId {
        PageId::homepage()
    }

    #[test]
    fn test_empty_title_is_a_no_op() {
        let mut site = SiteConfig::default();
        assert_eq!(add_section_to_page(&mut site, "", &home()).unwrap(), None);
        assert_eq!(site, SiteConfig::default());
    }

    #[test]
    fn test_first_section_initializes_homepage() {
        let mut site = SiteConfig::default();
        let id = add_section_to_page(&mut site, "Intro", &home()).unwrap();
        assert_eq!(id, Some(SectionId::from("0")));

        let encoded = serde_json::to_value(&site).unwrap();
        assert_eq!(
            encoded,
            json!({"content": {"pages": {"0": {"title": "Homepage", "sections": {
                "0": {"title": "Intro", "order": 0}
            }}}}})
        );
    }

    #[test]
    fn test_next_ids_and_orders() {
        let mut site = SiteConfig::default();
        for title in ["A", "B", "C"] {
            add_section_to_page(&mut site, title, &home()).unwrap();
        }
        let page = site.page(&home()).unwrap();
        assert_eq!(page.ordered_section_ids(), vec![SectionId::from("0"), SectionId::from("1"), SectionId::from("2")]);
        assert_eq!(page.sections.as_ref().unwrap()[&SectionId::from("2")].order, 2);
    }

    #[test]
    fn test_numeric_ids_compare_numerically() {
        let mut site: SiteConfig = serde_json::from_value(json!({
            "content": {"pages": {"0": {"title": "Homepage", "sections": {
                "9": {"title": "A", "order": 0},
                "10": {"title": "B", "order": 5}
            }}}}
        }))
        .unwrap();
        let id = add_section_to_page(&mut site, "C", &home()).unwrap().unwrap();
        assert_eq!(id, SectionId::from("11"));
        assert_eq!(site.section(&home(), &id).unwrap().order, 6);
    }

    #[test]
    fn test_missing_non_home_page() {
        let mut site = SiteConfig::default();
        let err = add_section_to_page(&mut site, "X", &PageId::from("3")).unwrap_err();
        assert!(matches!(err, BuilderError::PageNotFound(_)));
    }

    #[test]
    fn test_remove_keeps_orders() {
        let mut site = SiteConfig::default();
        for title in ["A", "B", "C"] {
            add_section_to_page(&mut site, title, &home()).unwrap();
        }
        let removed = remove_section(&mut site, &home(), &SectionId::from("1")).unwrap();
        assert_eq!(removed.title, "B");
        assert_eq!(site.section(&home(), &SectionId::from("0")).unwrap().order, 0);
        assert_eq!(site.section(&home(), &SectionId::from("2")).unwrap().order, 2);

        let err = remove_section(&mut site, &home(), &SectionId::from("1")).unwrap_err();
        assert!(matches!(err, BuilderError::SectionNotFound { .. }));

        // Gaps left by removal do not lead to order collisions.
        let id = add_section_to_page(&mut site, "D", &home()).unwrap().unwrap();
        assert_eq!(id, SectionId::from("3"));
        assert_eq!(site.section(&home(), &id).unwrap().order, 3);
    }

    #[test]
    fn test_section_setup_partial_cap_update() {
        let mut site = SiteConfig::default();
        let id = add_section_to_page(&mut site, "Picks", &home()).unwrap().unwrap();

        let setup = SectionSetup::new("Stall picks", WidgetType::StallProducts).with_max_products(6);
        save_section_setup(&mut site, &home(), &id, &setup).unwrap();

        let setup = SectionSetup::new("Renamed", WidgetType::StallProducts).with_max_products(0);
        save_section_setup(&mut site, &home(), &id, &setup).unwrap();

        let section = site.section(&home(), &id).unwrap();
        assert_eq!(section.title, "Renamed");
        assert_eq!(section.widget(), Some(WidgetType::StallProducts));
        assert_eq!(section.params.as_ref().unwrap().max_products_shown, Some(6));
    }

    #[test]
    fn test_section_setup_requires_existing_section() {
        let mut site = SiteConfig::default();
        let setup = SectionSetup::new("Text", WidgetType::Text);
        let err = save_section_setup(&mut site, &home(), &SectionId::from("0"), &setup).unwrap_err();
        assert!(matches!(err, BuilderError::SectionNotFound { .. }));
    }
}
