//! Rebuild a sheet file from a compiled schedule.

use crate::codec;
use crate::document::SheetMeta;
use crate::keys::KeyAlphabet;
use crate::note::key_name;
use crate::schedule::KeySchedule;
use serde_json::{json, Value};
use tracing::debug;

pub const DEFAULT_NAME: &str = "Untitled";
pub const DEFAULT_AUTHOR: &str = "Unknown";
pub const DEFAULT_BPM: f64 = 120.0;

/// Export a schedule in the sheet-file format.
///
/// Notes are sorted by time, then by key name; empty entries vanish and
/// symbols outside `alphabet` are skipped. With `encrypt`, `songNotes` holds
/// the codec encoding of the note list.
pub fn export_sheet(
    meta: &SheetMeta,
    schedule: &KeySchedule,
    alphabet: &KeyAlphabet,
    encrypt: bool,
) -> Value {
    let mut notes: Vec<(u64, String)> = Vec::with_capacity(schedule.key_count());
    for (time, symbol) in schedule.expand() {
        match alphabet.index_of(&symbol) {
            Some(index) => notes.push((time, key_name(index as u8))),
            None => debug!(time, symbol = %symbol, "skipping symbol outside the key alphabet"),
        }
    }
    notes.sort();

    let song_notes = Value::Array(
        notes
            .into_iter()
            .map(|(time, key)| json!({ "time": time, "key": key }))
            .collect(),
    );
    let song_notes = if encrypt {
        Value::from(codec::encode(&song_notes.to_string()))
    } else {
        song_notes
    };

    let or_default = |field: &Option<String>, default: &str| {
        field.clone().unwrap_or_else(|| default.to_string())
    };

    json!([{
        "name": or_default(&meta.name, DEFAULT_NAME),
        "author": or_default(&meta.author, DEFAULT_AUTHOR),
        "transcribedBy": or_default(&meta.transcribed_by, DEFAULT_AUTHOR),
        "isComposed": true,
        "bpm": meta.bpm.unwrap_or(DEFAULT_BPM),
        "isEncrypted": encrypt,
        "songNotes": song_notes,
    }])
}
