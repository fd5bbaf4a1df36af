//! Digital rain (stateful).

use glyphfall_core::{Rgba, Surface};
use rand::Rng;
use rand::seq::SliceRandom;

/// Chance per frame that a column past the bottom edge restarts at the top.
pub const RESET_CHANCE: f64 = 0.025;

/// Drop value every column gets on reset; far below any screen, so columns
/// re-enter one by one through the random restart.
pub const RESET_DROP: u32 = 255;

/// How rain glyphs are colored.
#[derive(Debug, Clone, PartialEq)]
pub enum RainPaint {
    Solid(Rgba),
    /// Horizontal gradient from the left edge to the right edge.
    Gradient(Rgba, Rgba),
}

impl RainPaint {
    /// Color at horizontal position `x` of a surface `width` wide.
    pub fn at(&self, x: f32, width: f32) -> Rgba {
        match self {
            RainPaint::Solid(color) => *color,
            RainPaint::Gradient(from, to) => {
                let t = if width > 0.0 { x / width } else { 0.0 };
                from.lerp(*to, t)
            }
        }
    }
}

/// Number of rain columns for a surface width.
pub fn column_count(width: f32, font_size: f32) -> usize {
    if width.is_nan() || font_size.is_nan() || width <= 0.0 || font_size <= 0.0 {
        return 0;
    }
    (width / font_size).round() as usize
}

/// Per-column drop positions, in rows.
#[derive(Debug, Clone)]
pub struct Rain {
    font_size: f32,
    columns: usize,
    drops: Vec<u32>,
}

impl Rain {
    pub fn new(font_size: f32) -> Self {
        Self {
            font_size,
            columns: 0,
            drops: Vec::new(),
        }
    }

    /// Recompute the column count. Drops follow on the next [`Rain::reset`].
    pub fn set_width(&mut self, width: f32) {
        self.columns = column_count(width, self.font_size);
    }

    /// Put every column back at [`RESET_DROP`].
    pub fn reset(&mut self) {
        self.drops = vec![RESET_DROP; self.columns];
    }

    pub fn columns(&self) -> usize {
        self.columns
    }

    pub fn drops(&self) -> &[u32] {
        &self.drops
    }

    /// Draw one glyph per column and advance every drop by a row.
    pub fn update<S: Surface, R: Rng>(
        &mut self,
        surface: &mut S,
        chars: &[char],
        paint: &RainPaint,
        rng: &mut R,
    ) {
        let width = surface.width();
        let height = surface.height();

        for (col, drop) in self.drops.iter_mut().enumerate() {
            let x = col as f32 * self.font_size;
            let y = *drop as f32 * self.font_size;
            if let Some(&ch) = chars.choose(rng) {
                surface.fill_glyph(ch, x, y, paint.at(x, width));
            }
            if y > height && rng.gen_bool(RESET_CHANCE) {
                *drop = 0;
            }
            *drop = drop.saturating_add(1);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphfall_core::Canvas;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn green() -> RainPaint {
        RainPaint::Solid(Rgba::rgb(0, 255, 0))
    }

    #[test]
    fn test_column_count() {
        assert_eq!(column_count(1400.0, 14.0), 100);
        assert_eq!(column_count(20.0, 14.0), 1);
        assert_eq!(column_count(6.0, 14.0), 0);
        assert_eq!(column_count(-100.0, 14.0), 0);
        assert_eq!(column_count(100.0, 0.0), 0);
    }

    #[test]
    fn test_reset_fills_every_column() {
        let mut rain = Rain::new(14.0);
        rain.set_width(140.0);
        assert!(rain.drops().is_empty());
        rain.reset();
        assert_eq!(rain.drops(), &[RESET_DROP; 10]);
    }

    #[test]
    fn test_drops_only_grow_or_reset_below_screen() {
        let mut canvas = Canvas::for_cells(40, 10, 7.0);
        let mut rng = StdRng::seed_from_u64(7);
        let mut rain = Rain::new(14.0);
        rain.set_width(canvas.width());
        rain.reset();
        let chars = crate::chars::default_chars();

        let mut resets = 0;
        for _ in 0..400 {
            let before = rain.drops().to_vec();
            rain.update(&mut canvas, &chars, &green(), &mut rng);
            for (old, new) in before.iter().zip(rain.drops()) {
                if *new == old + 1 {
                    continue;
                }
                // A restart lands on row 1 and needs the old row below the canvas.
                assert_eq!(*new, 1);
                assert!(*old as f32 * 14.0 > canvas.height());
                resets += 1;
            }
        }
        assert!(resets > 0);
    }

    #[test]
    fn test_update_draws_visible_glyphs() {
        let mut canvas = Canvas::for_cells(4, 2, 7.0);
        let mut rng = StdRng::seed_from_u64(1);
        let mut rain = Rain::new(14.0);
        rain.set_width(canvas.width());
        rain.reset();
        // Pull the first column back to the top by hand.
        rain.drops[0] = 1;
        rain.update(&mut canvas, &['x'], &green(), &mut rng);
        assert_eq!(canvas.glyph_at(0, 0), Some('x'));
        assert_eq!(rain.drops()[0], 2);
    }

    #[test]
    fn test_empty_char_set_draws_nothing() {
        let mut canvas = Canvas::for_cells(4, 2, 7.0);
        let mut rng = StdRng::seed_from_u64(1);
        let mut rain = Rain::new(14.0);
        rain.set_width(canvas.width());
        rain.reset();
        rain.drops[0] = 1;
        rain.update(&mut canvas, &[], &green(), &mut rng);
        assert!(canvas.is_blank());
    }

    #[test]
    fn test_gradient_paint() {
        let paint = RainPaint::Gradient(Rgba::rgb(0, 0, 0), Rgba::rgb(200, 0, 100));
        assert_eq!(paint.at(0.0, 100.0), Rgba::rgb(0, 0, 0));
        assert_eq!(paint.at(50.0, 100.0), Rgba::rgb(100, 0, 50));
        assert_eq!(paint.at(10.0, 0.0), Rgba::rgb(0, 0, 0));
    }
}
