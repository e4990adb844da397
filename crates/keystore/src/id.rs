//! KeymapId: a BLAKE3 hash of the keymap artifact truncated to 128 bits.
//!
//! Identical schedules always get the same id, so re-importing a sheet
//! never duplicates its keymap.

use serde::{Deserialize, Serialize};
use sheet::KeySchedule;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Identifier of a stored keymap - 32 lowercase hex chars.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeymapId(String);

#[derive(Debug, Error)]
pub enum IdError {
    #[error("invalid keymap id length: expected 32 hex chars, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex character in keymap id")]
    InvalidHex,
}

impl KeymapId {
    /// Hash raw artifact bytes.
    pub fn from_data(data: &[u8]) -> Self {
        let hash = blake3::hash(data);
        Self(hex::encode(&hash.as_bytes()[..16]))
    }

    /// Id of a schedule's canonical JSON text.
    pub fn for_schedule(schedule: &KeySchedule) -> Self {
        Self::from_data(schedule.to_json().as_bytes())
    }

    /// Parse an id string, validating its format.
    pub fn from_str_checked(s: &str) -> Result<Self, IdError> {
        if s.len() != 32 {
            return Err(IdError::InvalidLength(s.len()));
        }
        if !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(IdError::InvalidHex);
        }
        Ok(Self(s.to_lowercase()))
    }

    /// First 2 characters (directory shard).
    pub fn prefix(&self) -> &str {
        &self.0[0..2]
    }

    /// Characters after the shard (file stem).
    pub fn remainder(&self) -> &str {
        &self.0[2..]
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for KeymapId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for KeymapId {
    type Err = IdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::from_str_checked(s)
    }
}
