//! Key alphabet, custom keyboard layouts, and symbol translation.
//!
//! Notes address keys by index `0..15`, laid out as three rows of five:
//!
//! ```text
//!  0 y   1 u   2 i   3 o   4 p
//!  5 h   6 j   7 k   8 l   9 ;
//! 10 n  11 m  12 ,  13 .  14 /
//! ```

use crate::error::{Result, SheetError};
use tracing::warn;

/// Number of playable keys.
pub const KEY_COUNT: usize = 15;

/// Default symbol for each key index.
pub const DEFAULT_ALPHABET: [&str; KEY_COUNT] = [
    "y", "u", "i", "o", "p", //
    "h", "j", "k", "l", ";", //
    "n", "m", ",", ".", "/",
];

/// Maps key indexes to the symbols stored in a compiled schedule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyAlphabet {
    symbols: Vec<String>,
}

impl KeyAlphabet {
    /// Build an alphabet from exactly `KEY_COUNT` distinct, non-empty symbols.
    pub fn new(symbols: Vec<String>) -> Result<Self> {
        if symbols.len() != KEY_COUNT {
            return Err(SheetError::format(format!(
                "key alphabet needs {} symbols, got {}",
                KEY_COUNT,
                symbols.len()
            )));
        }
        if let Some(blank) = symbols.iter().position(|s| s.is_empty()) {
            return Err(SheetError::format(format!("key alphabet entry {} is empty", blank)));
        }
        for (i, symbol) in symbols.iter().enumerate() {
            if symbols[..i].contains(symbol) {
                return Err(SheetError::format(format!(
                    "key alphabet repeats symbol {:?}",
                    symbol
                )));
            }
        }
        Ok(Self { symbols })
    }

    /// Symbol for a key index.
    pub fn symbol(&self, index: usize) -> Option<&str> {
        self.symbols.get(index).map(String::as_str)
    }

    /// Ordinal of a symbol within the alphabet.
    pub fn index_of(&self, symbol: &str) -> Option<usize> {
        self.symbols.iter().position(|s| s == symbol)
    }

    pub fn symbols(&self) -> &[String] {
        &self.symbols
    }
}

impl Default for KeyAlphabet {
    fn default() -> Self {
        Self {
            symbols: DEFAULT_ALPHABET.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// User remapping of the 15 keys to physical keys.
///
/// Entries that are missing or blank keep the default symbol, so a partially
/// configured layout still plays.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyboardLayout {
    overrides: Vec<Option<String>>,
}

impl KeyboardLayout {
    /// Build a layout from a configured override table.
    pub fn from_overrides(keys: &[String]) -> Self {
        if keys.len() != KEY_COUNT {
            warn!(
                configured = keys.len(),
                expected = KEY_COUNT,
                "keyboard override table has the wrong length, missing entries keep their default key"
            );
        }

        let overrides = (0..KEY_COUNT)
            .map(|i| {
                keys.get(i)
                    .map(|k| k.trim())
                    .filter(|k| !k.is_empty())
                    .map(str::to_string)
            })
            .collect::<Vec<_>>();

        let blanks = keys.iter().take(KEY_COUNT).filter(|k| k.trim().is_empty()).count();
        if blanks > 0 {
            warn!(blanks, "keyboard override table has blank entries, they keep their default key");
        }

        Self { overrides }
    }

    /// Override for a key index, if one is configured.
    pub fn get(&self, index: usize) -> Option<&str> {
        self.overrides.get(index).and_then(|k| k.as_deref())
    }
}

/// Resolves schedule symbols to the keys actually pressed.
#[derive(Debug, Clone, Default)]
pub struct KeyTranslator {
    alphabet: KeyAlphabet,
    layout: Option<KeyboardLayout>,
}

impl KeyTranslator {
    /// Translator that emits schedule symbols unchanged.
    pub fn identity() -> Self {
        Self::default()
    }

    /// Translator that remaps through a custom layout.
    pub fn with_layout(alphabet: KeyAlphabet, layout: KeyboardLayout) -> Self {
        Self {
            alphabet,
            layout: Some(layout),
        }
    }

    /// Build from the keyboard settings: remap only when custom keyboard mode
    /// is on.
    pub fn from_settings(custom_keyboard: bool, keys: &[String]) -> Self {
        if custom_keyboard {
            Self::with_layout(KeyAlphabet::default(), KeyboardLayout::from_overrides(keys))
        } else {
            Self::identity()
        }
    }

    pub fn is_remapping(&self) -> bool {
        self.layout.is_some()
    }

    pub fn alphabet(&self) -> &KeyAlphabet {
        &self.alphabet
    }

    /// Key to press for a schedule symbol.
    ///
    /// Symbols outside the alphabet pass through unchanged.
    pub fn translate<'a>(&'a self, symbol: &'a str) -> &'a str {
        let Some(layout) = &self.layout else {
            return symbol;
        };
        self.alphabet
            .index_of(symbol)
            .and_then(|index| layout.get(index))
            .unwrap_or(symbol)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn keys(list: &[&str]) -> Vec<String> {
        list.iter().map(|k| k.to_string()).collect()
    }

    #[test]
    fn test_default_alphabet_lookup() {
        let alphabet = KeyAlphabet::default();
        assert_eq!(alphabet.symbol(0), Some("y"));
        assert_eq!(alphabet.symbol(9), Some(";"));
        assert_eq!(alphabet.symbol(14), Some("/"));
        assert_eq!(alphabet.symbol(15), None);
        assert_eq!(alphabet.index_of(","), Some(12));
        assert_eq!(alphabet.index_of("q"), None);
    }

    #[test]
    fn test_alphabet_rejects_wrong_length_and_duplicates() {
        assert!(KeyAlphabet::new(keys(&["a", "b"])).is_err());

        let mut dup = DEFAULT_ALPHABET.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        dup[3] = "y".to_string();
        let err = KeyAlphabet::new(dup).unwrap_err();
        assert!(matches!(err, SheetError::Format(_)));
    }

    #[test]
    fn test_identity_translator_passes_through() {
        let translator = KeyTranslator::identity();
        assert!(!translator.is_remapping());
        assert_eq!(translator.translate("y"), "y");
        assert_eq!(translator.translate("/"), "/");
    }

    #[test]
    fn test_custom_layout_substitutes_by_ordinal() {
        let layout = keys(&[
            "q", "w", "e", "r", "t", "a", "s", "d", "f", "g", "z", "x", "c", "v", "b",
        ]);
        let translator = KeyTranslator::from_settings(true, &layout);
        assert_eq!(translator.translate("y"), "q");
        assert_eq!(translator.translate(";"), "g");
        assert_eq!(translator.translate("/"), "b");
    }

    #[test]
    fn test_custom_keyboard_off_ignores_layout() {
        let layout = keys(&["q"; 15]);
        let translator = KeyTranslator::from_settings(false, &layout);
        assert_eq!(translator.translate("u"), "u");
    }

    #[test]
    fn test_partial_layout_falls_back_per_entry() {
        // Too short, and with a blank entry
        let layout = keys(&["q", "", "e"]);
        let translator = KeyTranslator::from_settings(true, &layout);
        assert_eq!(translator.translate("y"), "q");
        assert_eq!(translator.translate("u"), "u");
        assert_eq!(translator.translate("i"), "e");
        assert_eq!(translator.translate("o"), "o");
        assert_eq!(translator.translate("/"), "/");
    }

    #[test]
    fn test_unknown_symbol_passes_through_layout() {
        let translator = KeyTranslator::from_settings(true, &keys(&["q"; 15]));
        assert_eq!(translator.translate("space"), "space");
    }
}
