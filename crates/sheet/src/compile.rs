//! Note list → key schedule compilation.

use crate::error::{Result, SheetError};
use crate::keys::KeyAlphabet;
use crate::note::NoteEvent;
use crate::schedule::{sentinel_for, KeySchedule};
use tracing::debug;

/// Compile note events into a canonical [`KeySchedule`].
///
/// Notes sharing a timestamp collapse into one entry; input order does not
/// matter. The result always has an entry at `0` and an empty sentinel
/// entry one whole second past the last note.
pub fn compile(notes: &[NoteEvent], alphabet: &KeyAlphabet) -> Result<KeySchedule> {
    if notes.is_empty() {
        return Err(SheetError::format("sheet has no notes"));
    }

    let mut schedule = KeySchedule::new();
    for note in notes {
        let symbol = alphabet
            .symbol(usize::from(note.key_index))
            .ok_or_else(|| SheetError::format(format!("key index {} has no symbol", note.key_index)))?;
        schedule.push_key(note.time_ms, symbol);
    }

    let max_time = schedule.last_timestamp().unwrap_or(0);
    let sentinel = sentinel_for(max_time)
        .ok_or_else(|| SheetError::format(format!("note time {} ms is out of range", max_time)))?;
    schedule.ensure_entry(sentinel);
    schedule.ensure_entry(0);

    debug!(
        notes = notes.len(),
        entries = schedule.len(),
        max_time,
        "compiled key schedule"
    );
    Ok(schedule)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_two_note_scenario() {
        let notes = [NoteEvent::new(0, 0), NoteEvent::new(500, 1)];
        let schedule = compile(&notes, &KeyAlphabet::default()).unwrap();
        assert_eq!(schedule.to_json(), r#"{"0":["y"],"500":["u"],"1000":[]}"#);
    }

    #[test]
    fn test_groups_by_timestamp_regardless_of_order() {
        let notes = [
            NoteEvent::new(1200, 14),
            NoteEvent::new(300, 5),
            NoteEvent::new(1200, 0),
            NoteEvent::new(300, 9),
        ];
        let schedule = compile(&notes, &KeyAlphabet::default()).unwrap();
        assert_eq!(schedule.get(0), Some(&[][..]));
        assert_eq!(schedule.get(300).unwrap().len(), 2);
        assert_eq!(schedule.get(1200).unwrap().len(), 2);
        assert_eq!(schedule.get(2000), Some(&[][..]));
        assert_eq!(schedule.len(), 4);
    }

    #[test]
    fn test_sentinel_on_exact_second_boundary() {
        let notes = [NoteEvent::new(2000, 3)];
        let schedule = compile(&notes, &KeyAlphabet::default()).unwrap();
        assert_eq!(schedule.last_timestamp(), Some(3000));
        assert_eq!(schedule.get(3000), Some(&[][..]));
    }

    #[test]
    fn test_single_note_at_zero() {
        let schedule = compile(&[NoteEvent::new(0, 2)], &KeyAlphabet::default()).unwrap();
        assert_eq!(schedule.to_json(), r#"{"0":["i"],"1000":[]}"#);
    }

    #[test]
    fn test_empty_notes_is_format_error() {
        let err = compile(&[], &KeyAlphabet::default()).unwrap_err();
        assert!(matches!(err, SheetError::Format(_)));
    }

    #[test]
    fn test_time_without_sentinel_is_format_error() {
        let notes = [NoteEvent::new(0, 0), NoteEvent::new(u64::MAX, 1)];
        let err = compile(&notes, &KeyAlphabet::default()).unwrap_err();
        assert!(matches!(err, SheetError::Format(_)));
    }

    #[test]
    fn test_custom_alphabet() {
        let symbols: Vec<String> = "abcdefghijklmno".chars().map(String::from).collect();
        let alphabet = KeyAlphabet::new(symbols).unwrap();
        let schedule = compile(&[NoteEvent::new(10, 14)], &alphabet).unwrap();
        assert_eq!(schedule.get(10), Some(&["o".to_string()][..]));
    }
}
