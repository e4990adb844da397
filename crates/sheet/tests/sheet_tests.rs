//! Fixture and property tests for sheet compilation.

use pretty_assertions::assert_eq;
use proptest::prelude::*;
use sheet::{
    codec, compile, export_sheet, KeyAlphabet, KeySchedule, NoteEvent, SheetDocument,
    SheetError, DEFAULT_ALPHABET,
};
use std::fs;
use std::path::Path;

fn read_fixture(name: &str) -> Vec<u8> {
    let path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    fs::read(&path).unwrap_or_else(|e| panic!("Failed to read fixture {}: {}", name, e))
}

fn compile_fixture(name: &str) -> Result<KeySchedule, SheetError> {
    SheetDocument::from_bytes(&read_fixture(name))?.compile(&KeyAlphabet::default())
}

#[test]
fn test_fixture_two_notes() {
    let schedule = compile_fixture("two_notes.json").unwrap();
    assert_eq!(schedule.to_json(), r#"{"0":["y"],"500":["u"],"1000":[]}"#);
}

#[test]
fn test_fixture_chords() {
    let schedule = compile_fixture("chords.json").unwrap();
    assert_eq!(
        schedule.to_json(),
        r#"{"0":["y","p","k"],"667":["h"],"1333":["n","/"],"2000":["i"],"3000":[]}"#
    );
    assert_eq!(schedule.total_seconds(), 3);
}

#[test]
fn test_fixture_not_a_sheet() {
    let err = compile_fixture("not_a_sheet.json").unwrap_err();
    assert!(matches!(err, SheetError::Format(_)));
}

#[test]
fn test_huge_note_time_is_rejected() {
    let doc = SheetDocument::parse(
        r#"[{"songNotes":[{"time":0,"key":"Key0"},{"time":1.8446744073709552e19,"key":"Key1"}]}]"#,
    )
    .unwrap();
    let err = doc.compile(&KeyAlphabet::default()).unwrap_err();
    assert!(matches!(err, SheetError::Format(_)));
}

#[test]
fn test_fixture_survives_encrypted_export() {
    let doc = SheetDocument::from_bytes(&read_fixture("chords.json")).unwrap();
    let alphabet = KeyAlphabet::default();
    let schedule = doc.compile(&alphabet).unwrap();

    let exported = export_sheet(&doc.meta, &schedule, &alphabet, true);
    let reread = SheetDocument::parse(&exported.to_string()).unwrap();
    assert_eq!(reread.meta, doc.meta);
    assert_eq!(reread.compile(&alphabet).unwrap(), {
        // Export sorts each timestamp's keys by key name
        let mut expected = KeySchedule::new();
        for (time, symbol) in [
            (0, "y"),
            (0, "p"),
            (0, "k"),
            (667, "h"),
            (1333, "n"),
            (1333, "/"),
            (2000, "i"),
        ] {
            expected.push_key(time, symbol);
        }
        expected.ensure_entry(3000);
        expected
    });
}

#[test]
fn test_scenario_resume_from_offset() {
    let schedule = compile_fixture("two_notes.json").unwrap();
    let resumed = schedule.from_offset(0.5);
    assert_eq!(resumed.to_json(), r#"{"500":["u"],"1000":[]}"#);
}

fn note_strategy() -> impl Strategy<Value = NoteEvent> {
    (0u64..600_000, 0u8..15).prop_map(|(time, key)| NoteEvent::new(time, key))
}

proptest! {
    #[test]
    fn prop_compile_expand_round_trip(notes in prop::collection::vec(note_strategy(), 1..200)) {
        let schedule = compile(&notes, &KeyAlphabet::default()).unwrap();

        let mut expected: Vec<(u64, String)> = notes
            .iter()
            .map(|n| (n.time_ms, DEFAULT_ALPHABET[n.key_index as usize].to_string()))
            .collect();
        let mut actual = schedule.expand();
        expected.sort();
        actual.sort();
        prop_assert_eq!(actual, expected);
    }

    #[test]
    fn prop_sentinel_invariants(notes in prop::collection::vec(note_strategy(), 1..200)) {
        let schedule = compile(&notes, &KeyAlphabet::default()).unwrap();
        let max_note = notes.iter().map(|n| n.time_ms).max().unwrap();
        let sentinel = schedule.last_timestamp().unwrap();

        prop_assert!(schedule.get(0).is_some());
        prop_assert!(sentinel > max_note);
        prop_assert!(sentinel - max_note <= 1000);
        prop_assert_eq!(sentinel % 1000, 0);
        prop_assert_eq!(schedule.get(sentinel).map(|k| k.len()), Some(0));
    }

    #[test]
    fn prop_decode_inverts_encode(text in "\\PC{0,64}") {
        let list = serde_json::Value::from(vec![text]).to_string();
        prop_assert_eq!(codec::decode(&codec::encode(&list)).unwrap(), list);
    }
}
