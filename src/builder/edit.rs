//! Outcome of a page builder mutation.

use crate::publish::{PublishError, PublishHandle};

/// Result of an applied edit.
///
/// The store already holds the edited document when this is returned; the
/// publish may still be in flight.
#[derive(Debug)]
pub struct Edit<T> {
    /// Operation-specific result.
    pub value: T,
    /// Store version after the edit (unchanged when nothing was modified).
    pub version: u64,
    /// Whether the document was modified and announced.
    pub changed: bool,
    /// Background publish of the whole document, if one was started.
    pub publish: Option<PublishHandle>,
}

impl<T> Edit<T> {
    pub(crate) fn unchanged(value: T, version: u64) -> Self {
        Self {
            value,
            version,
            changed: false,
            publish: None,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Edit<U> {
        Edit {
            value: f(self.value),
            version: self.version,
            changed: self.changed,
            publish: self.publish,
        }
    }

    pub fn into_value(self) -> T {
        self.value
    }

    /// Wait for the document publish (if any) and return the value.
    pub async fn published(self) -> Result<T, PublishError> {
        if let Some(handle) = self.publish {
            handle.wait().await?;
        }
        Ok(self.value)
    }
}
