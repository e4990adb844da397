//! Note events as they appear in a sheet's `songNotes` list.

use crate::error::{Result, SheetError};
use crate::keys::KEY_COUNT;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Latest accepted note time in milliseconds; every value below it is exact
/// as an `f64`.
pub const MAX_TIME_MS: u64 = 1 << 53;

/// One transcribed keystroke.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NoteEvent {
    /// Absolute time from the start of the piece, in milliseconds.
    pub time_ms: u64,
    /// Key index in `0..KEY_COUNT`.
    pub key_index: u8,
}

impl NoteEvent {
    pub fn new(time_ms: u64, key_index: u8) -> Self {
        Self { time_ms, key_index }
    }
}

/// Parse a key name such as `"Key3"` or `"1Key14"` into its index.
///
/// The number after the last `Key` is the index; any prefix (instrument
/// layer in exported sheets) is ignored.
pub fn parse_key_name(name: &str) -> Result<u8> {
    let digits = name
        .rsplit_once("Key")
        .map(|(_, rest)| rest)
        .ok_or_else(|| SheetError::format(format!("note key {:?} has no Key<N> suffix", name)))?;

    let index: u8 = digits
        .trim()
        .parse()
        .map_err(|_| SheetError::format(format!("note key {:?} has no valid index", name)))?;

    if usize::from(index) >= KEY_COUNT {
        return Err(SheetError::format(format!(
            "note key {:?} is outside 0..{}",
            name, KEY_COUNT
        )));
    }
    Ok(index)
}

/// Name used for a key index when writing a sheet back out.
pub fn key_name(index: u8) -> String {
    format!("1Key{}", index)
}

fn note_from_value(position: usize, value: &Value) -> Result<NoteEvent> {
    let object = value.as_object().ok_or_else(|| {
        SheetError::format(format!("note {} is not an object; sheet may still be encoded", position))
    })?;

    let time = object
        .get("time")
        .and_then(Value::as_f64)
        .ok_or_else(|| SheetError::format(format!("note {} has no numeric time", position)))?;
    if !time.is_finite() || time < 0.0 || time >= MAX_TIME_MS as f64 {
        return Err(SheetError::format(format!(
            "note {} has invalid time {}",
            position, time
        )));
    }

    let key_index = match object.get("key") {
        Some(Value::String(name)) => parse_key_name(name)?,
        Some(Value::Number(n)) => n
            .as_u64()
            .filter(|i| (*i as usize) < KEY_COUNT)
            .map(|i| i as u8)
            .ok_or_else(|| SheetError::format(format!("note {} has invalid key {}", position, n)))?,
        _ => return Err(SheetError::format(format!("note {} has no key", position))),
    };

    Ok(NoteEvent {
        // Whole milliseconds; fractional times truncate
        time_ms: time.trunc() as u64,
        key_index,
    })
}

/// Read a `songNotes` array of note objects.
///
/// An empty list, or a list whose entries are not objects, is a format error:
/// numeric entries mean the notes are still encoded.
pub fn notes_from_value(song_notes: &Value) -> Result<Vec<NoteEvent>> {
    let entries = song_notes
        .as_array()
        .ok_or_else(|| SheetError::format("songNotes is not a list"))?;

    match entries.first() {
        None => return Err(SheetError::format("songNotes is empty")),
        Some(first) if !first.is_object() => {
            return Err(SheetError::format(
                "note entries are not objects; sheet is encoded or in an unknown format",
            ))
        }
        Some(_) => {}
    }

    entries
        .iter()
        .enumerate()
        .map(|(i, v)| note_from_value(i, v))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_key_name_variants() {
        assert_eq!(parse_key_name("Key0").unwrap(), 0);
        assert_eq!(parse_key_name("1Key3").unwrap(), 3);
        assert_eq!(parse_key_name("2Key14").unwrap(), 14);
    }

    #[test]
    fn test_parse_key_name_rejects_garbage() {
        assert!(parse_key_name("Key15").is_err());
        assert!(parse_key_name("Key").is_err());
        assert!(parse_key_name("y").is_err());
        assert!(parse_key_name("Key-1").is_err());
    }

    #[test]
    fn test_key_name_matches_export_format() {
        assert_eq!(key_name(7), "1Key7");
        assert_eq!(parse_key_name(&key_name(7)).unwrap(), 7);
    }

    #[test]
    fn test_notes_from_value() {
        let notes = notes_from_value(&json!([
            {"time": 0, "key": "Key0"},
            {"time": 500.9, "key": "1Key1"},
        ]))
        .unwrap();
        assert_eq!(notes, vec![NoteEvent::new(0, 0), NoteEvent::new(500, 1)]);
    }

    #[test]
    fn test_out_of_range_time_is_format_error() {
        let err = notes_from_value(&json!([
            {"time": 0, "key": "Key0"},
            {"time": 1.8446744073709552e19, "key": "Key1"},
        ]))
        .unwrap_err();
        assert!(matches!(err, SheetError::Format(ref m) if m.contains("invalid time")));
        assert!(notes_from_value(&json!([{"time": -1, "key": "Key0"}])).is_err());
    }

    #[test]
    fn test_numeric_entries_are_format_error() {
        let err = notes_from_value(&json!([12, 40, 7])).unwrap_err();
        assert!(matches!(err, SheetError::Format(ref m) if m.contains("encoded")));
    }

    #[test]
    fn test_empty_and_missing_fields() {
        assert!(notes_from_value(&json!([])).is_err());
        assert!(notes_from_value(&json!({"time": 0})).is_err());
        assert!(notes_from_value(&json!([{"key": "Key0"}])).is_err());
        assert!(notes_from_value(&json!([{"time": -5, "key": "Key0"}])).is_err());
        assert!(notes_from_value(&json!([{"time": 5}])).is_err());
    }
}
