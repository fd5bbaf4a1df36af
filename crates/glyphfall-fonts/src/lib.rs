//! Block-letter fonts and the offscreen text rasterizer for glyphfall.
//!
//! Messages are drawn with a 5×7 block font, rasterized into an alpha bitmap
//! and sampled into sparse LED point clouds.

mod fold;
mod raster;

pub use fold::fold_char;
pub use raster::{Bitmap, FontFamily, FontSpec, Point, led_points, rasterize};

/// Glyph rows.
pub const GLYPH_HEIGHT: usize = 7;

/// Glyph columns.
pub const GLYPH_WIDTH: usize = 5;

/// One block glyph, top row first. `█` marks a lit cell.
pub type Glyph = [&'static str; GLYPH_HEIGHT];

/// Block glyphs (7 lines tall, 5 chars wide).
const GLYPHS: &[(char, Glyph)] = &[
    ('A', [" ███ ", "█   █", "█   █", "█████", "█   █", "█   █", "█   █"]),
    ('B', ["████ ", "█   █", "█   █", "████ ", "█   █", "█   █", "████ "]),
    ('C', [" ███ ", "█   █", "█    ", "█    ", "█    ", "█   █", " ███ "]),
    ('D', ["████ ", "█   █", "█   █", "█   █", "█   █", "█   █", "████ "]),
    ('E', ["█████", "█    ", "█    ", "████ ", "█    ", "█    ", "█████"]),
    ('F', ["█████", "█    ", "█    ", "████ ", "█    ", "█    ", "█    "]),
    ('G', [" ███ ", "█   █", "█    ", "█ ███", "█   █", "█   █", " ████"]),
    ('H', ["█   █", "█   █", "█   █", "█████", "█   █", "█   █", "█   █"]),
    ('I', [" ███ ", "  █  ", "  █  ", "  █  ", "  █  ", "  █  ", " ███ "]),
    ('J', ["  ███", "   █ ", "   █ ", "   █ ", "   █ ", "█  █ ", " ██  "]),
    ('K', ["█   █", "█  █ ", "█ █  ", "██   ", "█ █  ", "█  █ ", "█   █"]),
    ('L', ["█    ", "█    ", "█    ", "█    ", "█    ", "█    ", "█████"]),
    ('M', ["█   █", "██ ██", "█ █ █", "█ █ █", "█   █", "█   █", "█   █"]),
    ('N', ["█   █", "█   █", "██  █", "█ █ █", "█  ██", "█   █", "█   █"]),
    ('O', [" ███ ", "█   █", "█   █", "█   █", "█   █", "█   █", " ███ "]),
    ('P', ["████ ", "█   █", "█   █", "████ ", "█    ", "█    ", "█    "]),
    ('Q', [" ███ ", "█   █", "█   █", "█   █", "█ █ █", "█  █ ", " ██ █"]),
    ('R', ["████ ", "█   █", "█   █", "████ ", "█ █  ", "█  █ ", "█   █"]),
    ('S', [" ████", "█    ", "█    ", " ███ ", "    █", "    █", "████ "]),
    ('T', ["█████", "  █  ", "  █  ", "  █  ", "  █  ", "  █  ", "  █  "]),
    ('U', ["█   █", "█   █", "█   █", "█   █", "█   █", "█   █", " ███ "]),
    ('V', ["█   █", "█   █", "█   █", "█   █", "█   █", " █ █ ", "  █  "]),
    ('W', ["█   █", "█   █", "█   █", "█ █ █", "█ █ █", "█ █ █", " █ █ "]),
    ('X', ["█   █", "█   █", " █ █ ", "  █  ", " █ █ ", "█   █", "█   █"]),
    ('Y', ["█   █", "█   █", " █ █ ", "  █  ", "  █  ", "  █  ", "  █  "]),
    ('Z', ["█████", "    █", "   █ ", "  █  ", " █   ", "█    ", "█████"]),
    ('0', [" ███ ", "█   █", "█  ██", "█ █ █", "██  █", "█   █", " ███ "]),
    ('1', ["  █  ", " ██  ", "  █  ", "  █  ", "  █  ", "  █  ", " ███ "]),
    ('2', [" ███ ", "█   █", "    █", "   █ ", "  █  ", " █   ", "█████"]),
    ('3', ["█████", "   █ ", "  █  ", "   █ ", "    █", "█   █", " ███ "]),
    ('4', ["   █ ", "  ██ ", " █ █ ", "█  █ ", "█████", "   █ ", "   █ "]),
    ('5', ["█████", "█    ", "████ ", "    █", "    █", "█   █", " ███ "]),
    ('6', ["  ██ ", " █   ", "█    ", "████ ", "█   █", "█   █", " ███ "]),
    ('7', ["█████", "    █", "   █ ", "  █  ", " █   ", " █   ", " █   "]),
    ('8', [" ███ ", "█   █", "█   █", " ███ ", "█   █", "█   █", " ███ "]),
    ('9', [" ███ ", "█   █", "█   █", " ████", "    █", "   █ ", " ██  "]),
    ('.', ["     ", "     ", "     ", "     ", "     ", " ██  ", " ██  "]),
    (',', ["     ", "     ", "     ", "     ", " ██  ", "  █  ", " █   "]),
    ('!', ["  █  ", "  █  ", "  █  ", "  █  ", "  █  ", "     ", "  █  "]),
    ('?', [" ███ ", "█   █", "    █", "   █ ", "  █  ", "     ", "  █  "]),
    ('-', ["     ", "     ", "     ", "█████", "     ", "     ", "     "]),
    (':', ["     ", " ██  ", " ██  ", "     ", " ██  ", " ██  ", "     "]),
    ('\'', ["  █  ", "  █  ", " █   ", "     ", "     ", "     ", "     "]),
    ('/', ["    █", "    █", "   █ ", "  █  ", " █   ", "█    ", "█    "]),
    ('♥', ["     ", " █ █ ", "█████", "█████", " ███ ", "  █  ", "     "]),
];

/// Look up the block glyph for a character after folding case and diacritics.
pub fn glyph(ch: char) -> Option<&'static Glyph> {
    let key = fold_char(ch);
    GLYPHS.iter().find(|(c, _)| *c == key).map(|(_, g)| g)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_glyph_table_is_well_formed() {
        for (ch, rows) in GLYPHS {
            for row in rows {
                assert_eq!(row.chars().count(), GLYPH_WIDTH, "glyph {ch:?}");
                assert!(row.chars().all(|c| c == '█' || c == ' '), "glyph {ch:?}");
            }
        }
    }

    #[test]
    fn test_glyph_lookup_folds_case() {
        assert_eq!(glyph('a'), glyph('A'));
        assert_eq!(glyph('ễ'), glyph('E'));
        assert!(glyph('3').is_some());
        assert!(glyph(' ').is_none());
        assert!(glyph('ア').is_none());
    }
}
