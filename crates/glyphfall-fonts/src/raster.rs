//! Offscreen text rasterization and LED point sampling.

use crate::{GLYPH_HEIGHT, GLYPH_WIDTH, Glyph, glyph};

/// Sampled opacity must exceed this to produce a point.
const ALPHA_THRESHOLD: u8 = 128;

/// Fraction of the bitmap width text may occupy before it is scaled down.
const MAX_TEXT_WIDTH: f32 = 0.9;

/// Advance of a space in proportional layouts, in glyph cells.
const SPACE_ADVANCE: usize = 3;

/// Extra stroke width of bold text, relative to one glyph cell.
const BOLD_WIDEN: f32 = 0.35;

/// How glyphs advance horizontally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FontFamily {
    /// Every glyph takes the full cell width.
    #[default]
    Monospace,
    /// Glyphs are trimmed to their lit columns.
    Proportional,
}

impl FontFamily {
    /// Interpret a CSS-like family list, e.g. `"monospace"` or
    /// `"Arial, Roboto, 'sans-serif'"`. Only the first entry matters.
    pub fn parse(family: &str) -> Self {
        let first = family
            .split(',')
            .next()
            .unwrap_or_default()
            .trim()
            .trim_matches(|c| c == '\'' || c == '"');
        if first.eq_ignore_ascii_case("monospace") {
            FontFamily::Monospace
        } else {
            FontFamily::Proportional
        }
    }
}

/// Font descriptor: family, pixel size (glyph height) and weight.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FontSpec {
    pub family: FontFamily,
    pub size: f32,
    pub bold: bool,
}

impl FontSpec {
    pub fn new(family: FontFamily, size: f32) -> Self {
        Self {
            family,
            size,
            bold: false,
        }
    }

    pub fn bold(self) -> Self {
        Self { bold: true, ..self }
    }
}

/// 8-bit alpha bitmap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Bitmap {
    width: usize,
    height: usize,
    alpha: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            alpha: vec![0; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Opacity at `(x, y)`; zero outside the bitmap.
    pub fn alpha(&self, x: usize, y: usize) -> u8 {
        if x >= self.width || y >= self.height {
            return 0;
        }
        self.alpha[y * self.width + x]
    }

    /// Set every pixel whose center lies inside the rectangle.
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32) {
        let span = |start: f32, len: f32, limit: usize| {
            let first = ((start - 0.5).ceil().max(0.0) as usize).min(limit);
            let end = ((start + len - 0.5).ceil().max(0.0) as usize).min(limit);
            first..end
        };
        let xs = span(x, w, self.width);
        for py in span(y, h, self.height) {
            let row = py * self.width;
            self.alpha[row + xs.start..row + xs.end.max(xs.start)].fill(255);
        }
    }
}

/// A sampled pixel coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

/// A glyph positioned on the text line, in glyph cells.
struct Placed {
    glyph: &'static Glyph,
    /// Pen position of the first drawn column.
    pen: usize,
    /// First glyph column drawn.
    first_col: usize,
}

/// Lay the text out left to right; returns placed glyphs and the line width.
fn layout(text: &str, family: FontFamily) -> (Vec<Placed>, usize) {
    let mut placed = Vec::new();
    let mut pen = 0;

    for ch in text.chars() {
        let Some(g) = glyph(ch) else {
            pen += match (family, ch) {
                (FontFamily::Proportional, ' ') => SPACE_ADVANCE,
                _ => GLYPH_WIDTH + 1,
            };
            continue;
        };

        let (first_col, width) = match family {
            FontFamily::Monospace => (0, GLYPH_WIDTH),
            FontFamily::Proportional => lit_columns(g)
                .map(|(first, last)| (first, last - first + 1))
                .unwrap_or((0, GLYPH_WIDTH)),
        };
        placed.push(Placed {
            glyph: g,
            pen,
            first_col,
        });
        pen += width + 1;
    }

    // Drop the gap after the last glyph.
    (placed, pen.saturating_sub(1))
}

/// First and last columns containing a lit cell.
fn lit_columns(g: &Glyph) -> Option<(usize, usize)> {
    let lit = |col: usize| g.iter().any(|row| row.chars().nth(col) == Some('█'));
    let first = (0..GLYPH_WIDTH).find(|&c| lit(c))?;
    let last = (0..GLYPH_WIDTH).rev().find(|&c| lit(c))?;
    Some((first, last))
}

/// Render `text` centered into a `width × height` alpha bitmap.
///
/// Degenerate sizes produce an empty (all transparent or zero-sized) bitmap.
pub fn rasterize(text: &str, font: &FontSpec, width: f32, height: f32) -> Bitmap {
    let w = width.max(0.0) as usize;
    let h = height.max(0.0) as usize;
    let mut bitmap = Bitmap::new(w, h);
    if w == 0 || h == 0 || font.size.is_nan() || font.size <= 0.0 {
        return bitmap;
    }

    let (placed, line_width) = layout(text, font.family);
    if placed.is_empty() || line_width == 0 {
        return bitmap;
    }

    let mut unit = font.size / GLYPH_HEIGHT as f32;
    let max_width = w as f32 * MAX_TEXT_WIDTH;
    if line_width as f32 * unit > max_width {
        unit = max_width / line_width as f32;
    }

    let x0 = (w as f32 - line_width as f32 * unit) / 2.0;
    let y0 = (h as f32 - GLYPH_HEIGHT as f32 * unit) / 2.0;
    let stroke = if font.bold { unit * (1.0 + BOLD_WIDEN) } else { unit };

    for p in &placed {
        for (row, line) in p.glyph.iter().enumerate() {
            for (col, cell) in line.chars().enumerate().skip(p.first_col) {
                if cell != '█' {
                    continue;
                }
                let x = x0 + (p.pen + col - p.first_col) as f32 * unit;
                let y = y0 + row as f32 * unit;
                bitmap.fill_rect(x, y, stroke, unit);
            }
        }
    }

    bitmap
}

/// Sample every `density`-th pixel of the rendered text and keep the opaque ones.
pub fn led_points(text: &str, font: &FontSpec, width: f32, height: f32, density: usize) -> Vec<Point> {
    let bitmap = rasterize(text, font, width, height);
    let step = density.max(1);

    let mut points = Vec::new();
    for y in (0..bitmap.height()).step_by(step) {
        for x in (0..bitmap.width()).step_by(step) {
            if bitmap.alpha(x, y) > ALPHA_THRESHOLD {
                points.push(Point {
                    x: x as f32,
                    y: y as f32,
                });
            }
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds(points: &[Point]) -> (f32, f32, f32, f32) {
        points.iter().fold(
            (f32::MAX, f32::MAX, f32::MIN, f32::MIN),
            |(x0, y0, x1, y1), p| (x0.min(p.x), y0.min(p.y), x1.max(p.x), y1.max(p.y)),
        )
    }

    #[test]
    fn test_family_parse() {
        assert_eq!(FontFamily::parse("monospace"), FontFamily::Monospace);
        assert_eq!(FontFamily::parse(" 'Monospace' "), FontFamily::Monospace);
        assert_eq!(
            FontFamily::parse("Arial, Roboto, 'sans-serif'"),
            FontFamily::Proportional
        );
    }

    #[test]
    fn test_points_are_deterministic() {
        let font = FontSpec::new(FontFamily::Proportional, 100.0).bold();
        let a = led_points("Happy birthday", &font, 1400.0, 700.0, 10);
        let b = led_points("Happy birthday", &font, 1400.0, 700.0, 10);
        assert!(!a.is_empty());
        assert_eq!(a, b);
    }

    #[test]
    fn test_points_are_centered() {
        let font = FontSpec::new(FontFamily::Monospace, 70.0);
        let points = led_points("A", &font, 200.0, 100.0, 1);
        let (x0, y0, x1, y1) = bounds(&points);
        assert!(((x0 + x1) / 2.0 - 100.0).abs() <= 10.0);
        assert!(((y0 + y1) / 2.0 - 50.0).abs() <= 10.0);
    }

    #[test]
    fn test_points_lie_on_density_grid() {
        let font = FontSpec::new(FontFamily::Proportional, 60.0);
        let points = led_points("3", &font, 300.0, 200.0, 8);
        assert!(!points.is_empty());
        for p in points {
            assert_eq!(p.x as usize % 8, 0);
            assert_eq!(p.y as usize % 8, 0);
        }
    }

    #[test]
    fn test_wide_text_is_scaled_to_fit() {
        let font = FontSpec::new(FontFamily::Proportional, 100.0);
        let points = led_points("Chúc em sinh nhật vui vẻ", &font, 400.0, 200.0, 2);
        let (x0, _, x1, _) = bounds(&points);
        assert!(x0 >= 0.0);
        assert!(x1 < 400.0);
        assert!(x1 - x0 <= 400.0 * MAX_TEXT_WIDTH);
    }

    #[test]
    fn test_blank_and_degenerate_inputs() {
        let font = FontSpec::new(FontFamily::Monospace, 50.0);
        assert!(led_points("   ", &font, 200.0, 100.0, 4).is_empty());
        assert!(led_points("", &font, 200.0, 100.0, 4).is_empty());
        assert!(led_points("A", &font, 0.0, 100.0, 4).is_empty());
        assert!(led_points("A", &font, -5.0, -5.0, 4).is_empty());
        let no_size = FontSpec::new(FontFamily::Monospace, 0.0);
        assert!(led_points("A", &no_size, 200.0, 100.0, 4).is_empty());
        // A zero density behaves like one.
        assert!(!led_points("A", &font, 200.0, 100.0, 0).is_empty());
    }

    #[test]
    fn test_bold_lights_more_pixels() {
        let regular = FontSpec::new(FontFamily::Proportional, 70.0);
        let lit = |font: &FontSpec| {
            let bm = rasterize("HI", font, 300.0, 120.0);
            (0..bm.height())
                .flat_map(|y| (0..bm.width()).map(move |x| (x, y)))
                .filter(|&(x, y)| bm.alpha(x, y) > 0)
                .count()
        };
        assert!(lit(&regular.bold()) > lit(&regular));
    }

    #[test]
    fn test_proportional_is_narrower_than_monospace() {
        let mono = rasterize("I.I", &FontSpec::new(FontFamily::Monospace, 70.0), 400.0, 100.0);
        let prop = rasterize("I.I", &FontSpec::new(FontFamily::Proportional, 70.0), 400.0, 100.0);
        let extent = |bm: &Bitmap| {
            let cols: Vec<usize> = (0..bm.width())
                .filter(|&x| (0..bm.height()).any(|y| bm.alpha(x, y) > 0))
                .collect();
            cols.last().unwrap() - cols.first().unwrap()
        };
        assert!(extent(&prop) < extent(&mono));
    }
}
