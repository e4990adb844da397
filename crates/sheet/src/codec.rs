//! Encrypted-sheet codec.
//!
//! Encrypted sheets store their note list as a JSON array of integers. Each
//! integer is a UTF-16 code unit of the note-list text minus a mask value;
//! the 32-entry mask repeats over the whole payload. This is obfuscation,
//! not cryptography: the mask is a published constant.
//!
//! The encoder may leave padding after the note list, so decoding keeps only
//! the text up to the first top-level closing `]`.

use crate::error::{Result, SheetError};

const MASK: [i64; 32] = [
    -17, 42, -3, 88, 11, -64, 27, 5, //
    -39, 73, 14, -8, 56, -21, 9, 33, //
    -50, 4, 61, -12, 19, -77, 38, 2, //
    -45, 67, -6, 23, 81, -29, 15, -58,
];

fn mask_at(position: usize) -> i64 {
    MASK[position % MASK.len()]
}

/// Recover the plaintext note-list JSON from an encrypted payload.
///
/// Fails with [`SheetError::Decode`] if any value falls outside the UTF-16
/// code unit range, or if the recovered text is not JSON after truncation.
pub fn decode(numbers: &[i64]) -> Result<String> {
    let units = numbers
        .iter()
        .enumerate()
        .map(|(i, n)| {
            let unit = n
                .checked_add(mask_at(i))
                .filter(|u| (0..=i64::from(u16::MAX)).contains(u))
                .ok_or_else(|| {
                    SheetError::decode(format!("value {} at position {} is not a code unit", n, i))
                })?;
            Ok(unit as u16)
        })
        .collect::<Result<Vec<u16>>>()?;

    let text: String = char::decode_utf16(units)
        .map(|c| c.unwrap_or(char::REPLACEMENT_CHARACTER))
        .collect();

    let body = truncate_after_list(&text);
    serde_json::from_str::<serde_json::Value>(body)
        .map_err(|e| SheetError::decode(format!("decoded text is not JSON: {}", e)))?;

    Ok(body.to_string())
}

/// Encode note-list text into an encrypted payload. Inverse of [`decode`].
pub fn encode(text: &str) -> Vec<i64> {
    text.encode_utf16()
        .enumerate()
        .map(|(i, unit)| i64::from(unit) - mask_at(i))
        .collect()
}

/// Text up to and including the first `]` that closes a top-level list.
///
/// Brackets inside string literals do not count. Text that never closes a
/// top-level list is returned unchanged.
fn truncate_after_list(text: &str) -> &str {
    let mut depth: usize = 0;
    let mut in_string = false;
    let mut escaped = false;

    for (offset, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '[' | '{' => depth += 1,
            '}' => depth = depth.saturating_sub(1),
            ']' => {
                depth = depth.saturating_sub(1);
                if depth == 0 {
                    return &text[..offset + c.len_utf8()];
                }
            }
            _ => {}
        }
    }

    text
}
