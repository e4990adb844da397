//! Catalog entries: display metadata plus a reference to a stored keymap.

use crate::id::KeymapId;
use serde::{Deserialize, Serialize};
use sheet::SheetMeta;

/// What the library shows for an imported sheet.
///
/// Serializes flat, in the sheet list's camelCase wire format:
/// `{"name": .., "author": .., "transcribedBy": .., "bpm": .., "keyMap": ".."}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogEntry {
    #[serde(flatten)]
    pub meta: SheetMeta,
    pub key_map: KeymapId,
}

impl CatalogEntry {
    pub fn new(meta: SheetMeta, key_map: KeymapId) -> Self {
        Self { meta, key_map }
    }

    /// Title to display, `Untitled` when the sheet has none.
    pub fn display_name(&self) -> &str {
        self.meta
            .name
            .as_deref()
            .unwrap_or(sheet::export::DEFAULT_NAME)
    }
}
