//! Opaque references to documents held by the external upload pipeline.

use serde::{Deserialize, Serialize};

/// A `{url, storage_id}` pair produced by the upload pipeline.
///
/// The workflow never inspects file bytes; it only records where a document
/// lives and whether a reference was supplied at all.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentRef {
    pub url: String,
    pub storage_id: String,
}

impl DocumentRef {
    pub fn new(url: impl Into<String>, storage_id: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            storage_id: storage_id.into(),
        }
    }

    /// Whether this reference points at an uploaded document.
    pub fn is_present(&self) -> bool {
        !self.url.trim().is_empty()
    }
}
