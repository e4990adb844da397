//! Sheet files: text decoding, metadata, and note extraction.
//!
//! A sheet file is a JSON list whose first element describes the piece:
//!
//! ```json
//! [{"name": "Song", "author": "Someone", "transcribedBy": "Someone else",
//!   "bpm": 120, "isEncrypted": false,
//!   "songNotes": [{"time": 0, "key": "1Key0"}, {"time": 500, "key": "1Key1"}]}]
//! ```
//!
//! Encrypted sheets carry `songNotes` as a list of integers instead; see
//! [`crate::codec`].

use crate::codec;
use crate::compile::compile;
use crate::error::{Result, SheetError};
use crate::keys::KeyAlphabet;
use crate::note::{notes_from_value, NoteEvent};
use crate::schedule::KeySchedule;
use encoding_rs::{Encoding, UTF_16LE, UTF_8};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, warn};

/// Display metadata for a sheet. Carries no timing data.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SheetMeta {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub transcribed_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bpm: Option<f64>,
}

impl SheetMeta {
    fn from_object(object: &Map<String, Value>) -> Self {
        let text = |field: &str| {
            object
                .get(field)
                .and_then(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        // Some transcribers store bpm as a string
        let bpm = object.get("bpm").and_then(|v| match v {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        });

        Self {
            name: text("name"),
            author: text("author"),
            transcribed_by: text("transcribedBy"),
            bpm,
        }
    }
}

/// A parsed sheet file.
#[derive(Debug, Clone, PartialEq)]
pub struct SheetDocument {
    pub meta: SheetMeta,
    pub is_encrypted: bool,
    song_notes: Option<Value>,
}

impl SheetDocument {
    /// Decode raw file bytes and parse the sheet.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        Self::parse(&decode_text(bytes))
    }

    /// Parse sheet text.
    pub fn parse(text: &str) -> Result<Self> {
        let text = text.trim_start_matches('\u{feff}').trim();
        if !text.starts_with('[') {
            return Err(SheetError::format("sheet is not a JSON list"));
        }

        let value: Value = serde_json::from_str(text)
            .map_err(|e| SheetError::format(format!("sheet is not valid JSON: {}", e)))?;

        let object = value
            .as_array()
            .and_then(|list| list.first())
            .and_then(Value::as_object)
            .ok_or_else(|| SheetError::format("sheet list does not start with a sheet object"))?;

        Ok(Self {
            meta: SheetMeta::from_object(object),
            is_encrypted: object
                .get("isEncrypted")
                .and_then(Value::as_bool)
                .unwrap_or(false),
            song_notes: object.get("songNotes").cloned(),
        })
    }

    /// Whether the note list needs the codec before it can be read.
    ///
    /// True when the sheet says so, or when the note entries are numbers.
    pub fn needs_decoding(&self) -> bool {
        self.is_encrypted
            || self
                .song_notes
                .as_ref()
                .and_then(Value::as_array)
                .and_then(|list| list.first())
                .is_some_and(Value::is_number)
    }

    /// Plaintext note-list JSON, running the codec when needed.
    pub fn plain_notes_text(&self) -> Result<String> {
        let song_notes = self
            .song_notes
            .as_ref()
            .ok_or_else(|| SheetError::format("sheet has no songNotes"))?;

        if !self.needs_decoding() {
            return Ok(song_notes.to_string());
        }

        let payload = song_notes
            .as_array()
            .ok_or_else(|| SheetError::format("encrypted songNotes is not a list"))?
            .iter()
            .enumerate()
            .map(|(i, v)| {
                v.as_i64().ok_or_else(|| {
                    SheetError::decode(format!("encrypted entry {} is not an integer", i))
                })
            })
            .collect::<Result<Vec<i64>>>()?;

        debug!(units = payload.len(), "decoding encrypted song notes");
        codec::decode(&payload)
    }

    /// The sheet's note events.
    pub fn notes(&self) -> Result<Vec<NoteEvent>> {
        if self.needs_decoding() {
            let text = self.plain_notes_text()?;
            let value: Value = serde_json::from_str(&text)
                .map_err(|e| SheetError::decode(format!("decoded notes are not JSON: {}", e)))?;
            return notes_from_value(&value);
        }

        let song_notes = self
            .song_notes
            .as_ref()
            .ok_or_else(|| SheetError::format("sheet has no songNotes"))?;
        notes_from_value(song_notes)
    }

    /// Read the notes and compile them.
    pub fn compile(&self, alphabet: &KeyAlphabet) -> Result<KeySchedule> {
        compile(&self.notes()?, alphabet)
    }
}

/// Decode sheet file bytes to text.
///
/// Honours a UTF-8 or UTF-16 byte order mark. Without one, a zero second
/// byte means UTF-16LE (a sheet always starts with `[`), otherwise UTF-8.
/// Malformed sequences become U+FFFD.
pub fn decode_text(bytes: &[u8]) -> String {
    let (encoding, skip): (&'static Encoding, usize) = match Encoding::for_bom(bytes) {
        Some(found) => found,
        None if bytes.len() >= 2 && bytes[0] != 0 && bytes[1] == 0 => (UTF_16LE, 0),
        None => (UTF_8, 0),
    };

    let (text, had_errors) = encoding.decode_without_bom_handling(&bytes[skip..]);
    if had_errors {
        warn!(encoding = encoding.name(), "sheet text had malformed sequences");
    }
    text.into_owned()
}
