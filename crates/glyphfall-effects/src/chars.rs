//! Character sets for the rain.

use glyphfall_core::CharSet;

/// Code points of the custom set after the digits.
const CUSTOM_SYMBOLS: &[u32] = &[
    0x25aa, 0x254c, 0x00a9, 0x00a6, 0x007c, 0x007a, 0x003e, 0x003c, 0x003a, 0x0022, 0x002a,
    0x002b, 0x30a2, 0x30a6, 0x30a8, 0x30aa, 0x30ab, 0x30ad, 0x30b1, 0x30b3, 0x30b5, 0x30b7,
    0x30b9, 0x30bb, 0x30bd, 0x30bf, 0x30c4, 0x30c6, 0x30ca, 0x30cb, 0x30cc, 0x30cd, 0x30cf,
    0x30d2, 0x30db, 0x30de, 0x30df, 0x30e0, 0x30e1, 0x30e2, 0x30e4, 0x30e8, 0x30e9, 0x30ea,
    0x30ef, 0x30fc, 0xa78a, 0xe937,
];

/// Every character from `start` to `end` inclusive, skipping invalid code points.
pub fn range(start: u32, end: u32) -> Vec<char> {
    (start..=end).filter_map(char::from_u32).collect()
}

/// Katakana `ァ`..=`ヶ`.
pub fn katakana() -> Vec<char> {
    range(0x30a1, 0x30f6)
}

/// Hiragana `ぁ`..=`ゖ`.
pub fn hiragana() -> Vec<char> {
    range(0x3041, 0x3096)
}

/// Katakana followed by hiragana.
pub fn default_chars() -> Vec<char> {
    let mut chars = katakana();
    chars.extend(hiragana());
    chars
}

/// Digits (without `6`) followed by box-drawing, punctuation and katakana symbols.
pub fn custom_chars() -> Vec<char> {
    let mut chars = range('0' as u32, '5' as u32);
    chars.extend(range('7' as u32, '9' as u32));
    chars.extend(CUSTOM_SYMBOLS.iter().copied().filter_map(char::from_u32));
    chars
}

/// Expand a configured set into its characters. An empty literal falls back
/// to the default set.
pub fn resolve(set: &CharSet) -> Vec<char> {
    match set {
        CharSet::Default => default_chars(),
        CharSet::Custom => custom_chars(),
        CharSet::Literal(s) => {
            let chars: Vec<char> = s.chars().filter(|c| !c.is_whitespace()).collect();
            if chars.is_empty() {
                default_chars()
            } else {
                chars
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_is_inclusive() {
        assert_eq!(range(0x41, 0x43), vec!['A', 'B', 'C']);
        assert!(range(0x43, 0x41).is_empty());
        // Surrogates are skipped.
        assert_eq!(range(0xd7ff, 0xe000), vec!['\u{d7ff}', '\u{e000}']);
    }

    #[test]
    fn test_default_set() {
        let chars = default_chars();
        assert_eq!(chars.len(), 86 + 86);
        assert_eq!(chars.first(), Some(&'ァ'));
        assert_eq!(chars.last(), Some(&'ゖ'));
    }

    #[test]
    fn test_custom_set_skips_six() {
        let chars = custom_chars();
        assert!(!chars.contains(&'6'));
        assert_eq!(&chars[..9], &['0', '1', '2', '3', '4', '5', '7', '8', '9']);
        assert_eq!(chars.len(), 9 + CUSTOM_SYMBOLS.len());
        assert!(chars.contains(&'ア'));
    }

    #[test]
    fn test_resolve() {
        assert_eq!(resolve(&CharSet::Default), default_chars());
        assert_eq!(resolve(&CharSet::Custom), custom_chars());
        assert_eq!(resolve(&CharSet::Literal("0 1".into())), vec!['0', '1']);
        assert_eq!(resolve(&CharSet::Literal("  ".into())), default_chars());
    }
}
