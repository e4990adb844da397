//! Sky sheet decoding and keymap compilation.
//!
//! This crate reads transcribed sheets (plain or encrypted), compiles their
//! notes into a [`KeySchedule`], and resolves schedule symbols to the keys
//! a player actually presses.
//!
//! # Example
//!
//! ```
//! use sheet::{KeyAlphabet, SheetDocument};
//!
//! let text = r#"[{"name": "Two notes", "songNotes": [
//!     {"time": 0, "key": "Key0"},
//!     {"time": 500, "key": "Key1"}
//! ]}]"#;
//!
//! let doc = SheetDocument::parse(text).unwrap();
//! let schedule = doc.compile(&KeyAlphabet::default()).unwrap();
//! assert_eq!(schedule.to_json(), r#"{"0":["y"],"500":["u"],"1000":[]}"#);
//! ```

pub mod codec;
pub mod compile;
pub mod document;
pub mod error;
pub mod export;
pub mod keys;
pub mod note;
pub mod schedule;

pub use compile::compile;
pub use document::{decode_text, SheetDocument, SheetMeta};
pub use error::{Result, SheetError};
pub use export::export_sheet;
pub use keys::{KeyAlphabet, KeyTranslator, KeyboardLayout, DEFAULT_ALPHABET, KEY_COUNT};
pub use note::{key_name, notes_from_value, parse_key_name, NoteEvent, MAX_TIME_MS};
pub use schedule::{sentinel_for, KeySchedule};
