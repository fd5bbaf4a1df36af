//! Case and diacritic folding onto the block font's repertoire.

/// Accented lowercase letters and the base letter they render as.
const FOLDS: &[(&str, char)] = &[
    ("àáảãạăằắẳẵặâầấẩẫậäåā", 'a'),
    ("èéẻẽẹêềếểễệëē", 'e'),
    ("ìíỉĩịïī", 'i'),
    ("òóỏõọôồốổỗộơờớởỡợöøō", 'o'),
    ("ùúủũụưừứửữựüū", 'u'),
    ("ỳýỷỹỵÿ", 'y'),
    ("đ", 'd'),
    ("çćč", 'c'),
    ("ñń", 'n'),
    ("šś", 's'),
    ("žź", 'z'),
];

/// Map a character to the key used by the glyph table.
///
/// Letters become uppercase ASCII, accented Latin letters lose their marks,
/// everything else passes through unchanged.
pub fn fold_char(ch: char) -> char {
    let lower = ch.to_lowercase().next().unwrap_or(ch);
    let base = FOLDS
        .iter()
        .find(|(set, _)| set.contains(lower))
        .map(|&(_, base)| base)
        .unwrap_or(lower);
    base.to_ascii_uppercase()
}
