//! Metrics collection.
//!
//! # Metrics
//! - `pagebuilder_edits_total` (counter): applied edits by operation
//! - `pagebuilder_publish_total` (counter): publish attempts by outcome
//! - `pagebuilder_store_version` (gauge): last announced store version
//! - `pagebuilder_sections` (gauge): sections across all pages

use metrics::{counter, gauge};

/// Record an edit that changed the document.
pub fn record_edit(operation: &'static str) {
    counter!("pagebuilder_edits_total", "operation" => operation).increment(1);
}

/// Record a publish outcome ("published", "failed", "timeout", "skipped").
pub fn record_publish(outcome: &'static str) {
    counter!("pagebuilder_publish_total", "outcome" => outcome).increment(1);
}

/// Record the store version and section count after an announcement.
pub fn record_store_version(version: u64, sections: usize) {
    gauge!("pagebuilder_store_version").set(version as f64);
    gauge!("pagebuilder_sections").set(sections as f64);
}
