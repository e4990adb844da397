//! Compiled keymap storage and sheet import for skypiano.
//!
//! Keymaps are stored by content hash, separate from the catalog entries
//! that describe them, so editing display metadata never touches a keymap
//! and recompiling never touches metadata.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use keystore::{import_batch, FileStore, KeymapStore};
//! use sheet::KeyAlphabet;
//!
//! let store = FileStore::at_path("/home/me/.local/share/skypiano/data").unwrap();
//!
//! let report = import_batch(&store, &["song.txt", "other.json"], &KeyAlphabet::default());
//! println!("{}", report);
//!
//! for entry in &report.imported {
//!     let schedule = store.get(&entry.key_map).unwrap().expect("just stored");
//!     println!("{}: {} entries", entry.display_name(), schedule.len());
//! }
//! ```

pub mod catalog;
pub mod config;
pub mod id;
pub mod import;
pub mod store;

pub use catalog::CatalogEntry;
pub use config::StoreConfig;
pub use id::{IdError, KeymapId};
pub use import::{import_batch, import_bytes, import_file, ImportFailure, ImportReport};
pub use store::{FileStore, KeymapStore};
