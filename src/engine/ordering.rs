//! Section reordering after a drag-and-drop move.

use crate::document::{PageId, SectionId, SiteConfig};
use crate::engine::types::SectionMove;
use crate::error::{BuilderError, BuilderResult};

/// Apply a move to a page and renumber every section densely from zero.
///
/// Returns the section ids in their new display order.
pub fn handle_move(site: &mut SiteConfig, page_id: &PageId, movement: SectionMove) -> BuilderResult<Vec<SectionId>> {
    let page = site
        .page_mut(page_id)
        .ok_or_else(|| BuilderError::PageNotFound(page_id.clone()))?;

    let mut ordered = page.ordered_section_ids();
    let len = ordered.len();
    for index in [movement.old_index, movement.new_index] {
        if index >= len {
            return Err(BuilderError::InvalidIndex { index, len });
        }
    }

    let moved = ordered.remove(movement.old_index);
    ordered.insert(movement.new_index, moved);

    let sections = page.sections_mut();
    for (order, section_id) in ordered.iter().enumerate() {
        if let Some(section) = sections.get_mut(section_id) {
            section.order = order as i64;
        }
    }

    tracing::debug!(
        page_id = %page_id,
        from = movement.old_index,
        to = movement.new_index,
        "Sections reordered"
    );

    Ok(ordered)
}
