//! The compiled keymap: a time-indexed key schedule.

use crate::error::{Result, SheetError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Canonical time → keys mapping, the unit of playback.
///
/// Serializes as a JSON object keyed by decimal millisecond strings:
///
/// ```
/// # use sheet::KeySchedule;
/// let mut schedule = KeySchedule::new();
/// schedule.push_key(0, "y");
/// schedule.push_key(500, "u");
/// schedule.ensure_entry(1000);
/// assert_eq!(schedule.to_json(), r#"{"0":["y"],"500":["u"],"1000":[]}"#);
/// ```
///
/// Iteration is always ascending by numeric timestamp.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeySchedule {
    entries: BTreeMap<u64, Vec<String>>,
}

impl KeySchedule {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key at `time_ms`, creating the entry if needed.
    pub fn push_key(&mut self, time_ms: u64, symbol: impl Into<String>) {
        self.entries.entry(time_ms).or_default().push(symbol.into());
    }

    /// Make sure an entry exists at `time_ms`, empty if it was absent.
    pub fn ensure_entry(&mut self, time_ms: u64) {
        self.entries.entry(time_ms).or_default();
    }

    pub fn get(&self, time_ms: u64) -> Option<&[String]> {
        self.entries.get(&time_ms).map(Vec::as_slice)
    }

    /// Entries in ascending timestamp order.
    pub fn iter(&self) -> impl Iterator<Item = (u64, &[String])> {
        self.entries.iter().map(|(t, keys)| (*t, keys.as_slice()))
    }

    pub fn timestamps(&self) -> impl Iterator<Item = u64> + '_ {
        self.entries.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Greatest timestamp, which for a compiled schedule is the sentinel.
    pub fn last_timestamp(&self) -> Option<u64> {
        self.entries.keys().next_back().copied()
    }

    /// Whole seconds covered by the schedule.
    pub fn total_seconds(&self) -> u64 {
        self.last_timestamp().map(|t| t / 1000).unwrap_or(0)
    }

    /// Total number of key presses across all entries.
    pub fn key_count(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    /// The part of the schedule at or after `offset_sec`.
    ///
    /// Used when resuming: entries before the offset are dropped so
    /// already-passed keys are never replayed.
    pub fn from_offset(&self, offset_sec: f64) -> KeySchedule {
        let cutoff = offset_sec.max(0.0) * 1000.0;
        let entries = self
            .entries
            .iter()
            .filter(|(t, _)| **t as f64 >= cutoff)
            .map(|(t, keys)| (*t, keys.clone()))
            .collect();
        KeySchedule { entries }
    }

    /// Reconstruct `(time_ms, symbol)` pairs in schedule order.
    ///
    /// Empty entries (the start frame and sentinel) contribute nothing.
    pub fn expand(&self) -> Vec<(u64, String)> {
        self.entries
            .iter()
            .flat_map(|(t, keys)| keys.iter().map(move |k| (*t, k.clone())))
            .collect()
    }

    /// Keymap artifact text: compact JSON with ascending decimal-string keys.
    pub fn to_json(&self) -> String {
        // Integer keys and string lists always serialize
        serde_json::to_string(&self.entries).unwrap_or_default()
    }

    /// Parse a keymap artifact.
    pub fn from_json(text: &str) -> Result<Self> {
        serde_json::from_str(text).map_err(|e| SheetError::format(format!("invalid keymap: {}", e)))
    }
}

impl FromIterator<(u64, Vec<String>)> for KeySchedule {
    fn from_iter<I: IntoIterator<Item = (u64, Vec<String>)>>(iter: I) -> Self {
        let mut schedule = KeySchedule::new();
        for (time, keys) in iter {
            schedule.entries.entry(time).or_default().extend(keys);
        }
        schedule
    }
}

/// Timestamp of the terminal sentinel for a piece whose last event is at
/// `max_time_ms`: the next whole second, always strictly later.
///
/// `None` when that second is not representable.
pub fn sentinel_for(max_time_ms: u64) -> Option<u64> {
    (max_time_ms / 1000).checked_add(1)?.checked_mul(1000)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn sample() -> KeySchedule {
        let mut schedule = KeySchedule::new();
        schedule.push_key(0, "y");
        schedule.push_key(500, "u");
        schedule.push_key(500, "i");
        schedule.ensure_entry(1000);
        schedule
    }

    #[test]
    fn test_sentinel_for() {
        assert_eq!(sentinel_for(0), Some(1000));
        assert_eq!(sentinel_for(500), Some(1000));
        assert_eq!(sentinel_for(999), Some(1000));
        assert_eq!(sentinel_for(1000), Some(2000));
        assert_eq!(sentinel_for(12_345), Some(13_000));
        assert_eq!(sentinel_for(u64::MAX), None);
    }

    #[test]
    fn test_iteration_is_numeric_order() {
        let mut schedule = KeySchedule::new();
        schedule.push_key(10_000, "p");
        schedule.push_key(900, "o");
        schedule.push_key(2000, "i");
        let order: Vec<u64> = schedule.timestamps().collect();
        assert_eq!(order, vec![900, 2000, 10_000]);
    }

    #[test]
    fn test_from_offset_drops_earlier_entries() {
        let schedule = sample();
        let resumed = schedule.from_offset(0.5);
        assert_eq!(resumed.timestamps().collect::<Vec<_>>(), vec![500, 1000]);
        assert_eq!(resumed.get(0), None);

        assert_eq!(schedule.from_offset(0.0), schedule);
        assert_eq!(schedule.from_offset(0.501).len(), 1);
        assert!(schedule.from_offset(5.0).is_empty());
    }

    #[test]
    fn test_json_round_trip() {
        let schedule = sample();
        let json = schedule.to_json();
        assert_eq!(json, r#"{"0":["y"],"500":["u","i"],"1000":[]}"#);
        assert_eq!(KeySchedule::from_json(&json).unwrap(), schedule);
    }

    #[test]
    fn test_from_json_rejects_bad_keys() {
        assert!(KeySchedule::from_json(r#"{"abc":["y"]}"#).is_err());
        assert!(KeySchedule::from_json(r#"["y"]"#).is_err());
    }

    #[test]
    fn test_expand_and_counts() {
        let schedule = sample();
        assert_eq!(
            schedule.expand(),
            vec![
                (0, "y".to_string()),
                (500, "u".to_string()),
                (500, "i".to_string())
            ]
        );
        assert_eq!(schedule.key_count(), 3);
        assert_eq!(schedule.total_seconds(), 1);
        assert_eq!(schedule.last_timestamp(), Some(1000));
    }
}
