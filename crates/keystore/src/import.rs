//! Sheet import: read, decode, compile, store.
//!
//! Each file is handled on its own. A bad file is recorded in the
//! [`ImportReport`] and the batch carries on.

use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use sheet::{KeyAlphabet, SheetDocument};
use tracing::{info, warn};

use crate::catalog::CatalogEntry;
use crate::store::KeymapStore;

/// Import one sheet from raw bytes. `fallback_name` titles sheets without
/// a name of their own.
pub fn import_bytes(
    store: &dyn KeymapStore,
    bytes: &[u8],
    alphabet: &KeyAlphabet,
    fallback_name: Option<&str>,
) -> Result<CatalogEntry> {
    let doc = SheetDocument::from_bytes(bytes)?;
    let schedule = doc.compile(alphabet)?;
    let key_map = store.put(&schedule)?;

    let mut meta = doc.meta;
    if meta.name.is_none() {
        meta.name = fallback_name.map(str::to_string);
    }
    Ok(CatalogEntry::new(meta, key_map))
}

/// Import one sheet file.
pub fn import_file(
    store: &dyn KeymapStore,
    path: &Path,
    alphabet: &KeyAlphabet,
) -> Result<CatalogEntry> {
    let bytes =
        fs::read(path).with_context(|| format!("failed to read sheet: {}", path.display()))?;
    let stem = path.file_stem().and_then(|s| s.to_str());
    import_bytes(store, &bytes, alphabet, stem)
        .with_context(|| format!("failed to import {}", path.display()))
}

/// A file that could not be imported.
#[derive(Debug, Clone, Serialize)]
pub struct ImportFailure {
    pub path: PathBuf,
    pub reason: String,
}

/// Outcome of a batch import.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportReport {
    pub imported: Vec<CatalogEntry>,
    pub failed: Vec<ImportFailure>,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }
}

impl fmt::Display for ImportReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Success: {}. Error: {}",
            self.imported.len(),
            self.failed.len()
        )
    }
}

/// Import many sheet files.
pub fn import_batch<P: AsRef<Path>>(
    store: &dyn KeymapStore,
    paths: &[P],
    alphabet: &KeyAlphabet,
) -> ImportReport {
    let mut report = ImportReport::default();

    for path in paths {
        let path = path.as_ref();
        match import_file(store, path, alphabet) {
            Ok(entry) => {
                info!(
                    path = %path.display(),
                    name = entry.display_name(),
                    key_map = %entry.key_map,
                    "imported sheet"
                );
                report.imported.push(entry);
            }
            Err(e) => {
                let reason = format!("{:#}", e);
                warn!(path = %path.display(), error = %reason, "sheet import failed");
                report.failed.push(ImportFailure {
                    path: path.to_path_buf(),
                    reason,
                });
            }
        }
    }

    info!(
        imported = report.imported.len(),
        failed = report.failed.len(),
        "batch import finished"
    );
    report
}
