//! Terminal-backed canvas.
//!
//! The canvas keeps two layers: a `tiny_skia` pixmap where each terminal cell
//! shows two stacked pixels through the upper half block, and a glyph layer
//! holding one character per cell. One pixmap pixel covers `scale` logical
//! units in both axes, so a cell spans `scale × 2·scale`.

use ratatui::{buffer::Buffer, layout::Rect, style::Color, widgets::Widget};
use tiny_skia::{
    Color as SkiaColor, FillRule, FilterQuality, GradientStop, Paint, PathBuilder, Pattern,
    Pixmap, PixmapPaint, Point, RadialGradient, Rect as SkiaRect, SpreadMode, Transform,
};

use crate::color::Rgba;
use crate::surface::{RunFlag, Sprite, Surface};

/// Glyphs fainter than this are dropped from the glyph layer.
const GLYPH_CUTOFF: f32 = 0.02;

/// Character showing the top pixel as foreground and the bottom one as background.
const HALF_BLOCK: char = '▀';

type Pixel = [f32; 3];

/// A character occupying one cell of the glyph layer.
#[derive(Debug, Clone, Copy, PartialEq)]
struct GlyphCell {
    ch: char,
    color: Pixel,
    /// Remaining opacity, faded by every background fill.
    strength: f32,
}

/// Pixmap plus glyph grid implementing [`Surface`].
#[derive(Debug)]
pub struct Canvas {
    /// Logical units per pixmap pixel.
    scale: f32,
    /// Logical width.
    width: f32,
    /// Logical height.
    height: f32,
    /// Pixmap width in pixels (also the cell column count).
    px_width: usize,
    /// Pixmap height in pixels (two per cell row).
    px_height: usize,
    /// Opaque framebuffer; `None` while either dimension is zero.
    pixmap: Option<Pixmap>,
    glyphs: Vec<Option<GlyphCell>>,
    /// Running flag of the animation currently drawing here.
    owner: Option<RunFlag>,
}

impl Canvas {
    /// Create an empty canvas. Non-positive scales fall back to `1.0`.
    pub fn new(scale: f32) -> Self {
        let scale = if scale.is_finite() && scale > 0.0 {
            scale
        } else {
            1.0
        };
        Self {
            scale,
            width: 0.0,
            height: 0.0,
            px_width: 0,
            px_height: 0,
            pixmap: None,
            glyphs: Vec::new(),
            owner: None,
        }
    }

    /// Create a canvas sized to cover `cols × rows` terminal cells.
    pub fn for_cells(cols: u16, rows: u16, scale: f32) -> Self {
        let mut canvas = Self::new(scale);
        let (width, height) = canvas.logical_size_for(cols, rows);
        canvas.set_width(width);
        canvas.set_height(height);
        canvas
    }

    /// Logical size that exactly covers `cols × rows` terminal cells.
    pub fn logical_size_for(&self, cols: u16, rows: u16) -> (f32, f32) {
        (
            cols as f32 * self.scale,
            rows as f32 * 2.0 * self.scale,
        )
    }

    pub fn scale(&self) -> f32 {
        self.scale
    }

    /// Framebuffer dimensions in pixels.
    pub fn pixel_size(&self) -> (usize, usize) {
        (self.px_width, self.px_height)
    }

    /// Number of cell rows.
    pub fn rows(&self) -> usize {
        self.px_height.div_ceil(2)
    }

    /// Color of the framebuffer pixel at `(x, y)`.
    pub fn pixel_at(&self, x: usize, y: usize) -> Option<[u8; 3]> {
        let px = self.pixmap.as_ref()?.pixel(x as u32, y as u32)?;
        Some([px.red(), px.green(), px.blue()])
    }

    /// Character in the glyph layer at cell `(col, row)`.
    pub fn glyph_at(&self, col: usize, row: usize) -> Option<char> {
        self.glyph(col, row).map(|g| g.ch)
    }

    /// Whether any pixel or glyph differs from black.
    pub fn is_blank(&self) -> bool {
        let pixels_black = self.pixmap.as_ref().is_none_or(|pixmap| {
            pixmap
                .pixels()
                .iter()
                .all(|p| p.red() == 0 && p.green() == 0 && p.blue() == 0)
        });
        pixels_black && self.glyphs.iter().all(Option::is_none)
    }

    fn glyph(&self, col: usize, row: usize) -> Option<GlyphCell> {
        if col >= self.px_width || row >= self.rows() {
            return None;
        }
        self.glyphs[row * self.px_width + col]
    }

    fn pixel(&self, x: usize, y: usize) -> Pixel {
        self.pixel_at(x, y)
            .map(|[r, g, b]| [r as f32, g as f32, b as f32])
            .unwrap_or([0.0; 3])
    }

    fn to_pixels(&self, logical: f32) -> usize {
        if logical.is_finite() && logical > 0.0 {
            (logical / self.scale).ceil() as usize
        } else {
            0
        }
    }

    /// Logical to pixmap coordinates.
    fn transform(&self) -> Transform {
        Transform::from_scale(1.0 / self.scale, 1.0 / self.scale)
    }

    /// Reallocate both layers, keeping the overlapping region.
    fn reshape(&mut self, px_width: usize, px_height: usize) {
        let mut pixmap = Pixmap::new(px_width as u32, px_height as u32);
        if let Some(pixmap) = &mut pixmap {
            pixmap.fill(SkiaColor::BLACK);
            if let Some(old) = &self.pixmap {
                pixmap.draw_pixmap(
                    0,
                    0,
                    old.as_ref(),
                    &PixmapPaint::default(),
                    Transform::identity(),
                    None,
                );
            }
        }

        let rows = px_height.div_ceil(2);
        let mut glyphs = vec![None; px_width * rows];
        for row in 0..rows.min(self.rows()) {
            for col in 0..px_width.min(self.px_width) {
                glyphs[row * px_width + col] = self.glyphs[row * self.px_width + col];
            }
        }

        self.px_width = px_width;
        self.px_height = px_height;
        self.pixmap = pixmap;
        self.glyphs = glyphs;
    }

    /// Circles narrower than a pixel are widened to one pixel.
    fn visible_radius(&self, radius: f32) -> f32 {
        radius.max(self.scale / 2.0)
    }
}

fn skia_color(color: Rgba) -> SkiaColor {
    let [r, g, b] = color.channels();
    SkiaColor::from_rgba(r / 255.0, g / 255.0, b / 255.0, color.a.clamp(0.0, 1.0))
        .unwrap_or(SkiaColor::TRANSPARENT)
}

/// Glyph-layer color mixing; pixels are composited by the pixmap.
fn mix(dst: &mut Pixel, src: Pixel, alpha: f32) {
    for (d, s) in dst.iter_mut().zip(src) {
        *d += (s - *d) * alpha;
    }
}

fn luma(p: Pixel) -> f32 {
    0.2126 * p[0] + 0.7152 * p[1] + 0.0722 * p[2]
}

fn to_color(p: Pixel) -> Color {
    Color::Rgb(p[0].round() as u8, p[1].round() as u8, p[2].round() as u8)
}

impl Surface for Canvas {
    fn width(&self) -> f32 {
        self.width
    }

    fn height(&self) -> f32 {
        self.height
    }

    fn set_width(&mut self, width: f32) {
        self.width = width;
        let px_width = self.to_pixels(width);
        self.reshape(px_width, self.px_height);
    }

    fn set_height(&mut self, height: f32) {
        self.height = height;
        let px_height = self.to_pixels(height);
        self.reshape(self.px_width, px_height);
    }

    fn fill_background(&mut self, color: Rgba) {
        let alpha = color.a;
        if alpha <= 0.0 {
            return;
        }
        if let Some(pixmap) = &mut self.pixmap {
            let mut paint = Paint::default();
            paint.set_color(skia_color(color));
            if let Some(rect) =
                SkiaRect::from_xywh(0.0, 0.0, pixmap.width() as f32, pixmap.height() as f32)
            {
                pixmap.fill_rect(rect, &paint, Transform::identity(), None);
            }
        }

        let bg = color.channels();
        for slot in &mut self.glyphs {
            if let Some(glyph) = slot {
                mix(&mut glyph.color, bg, alpha);
                glyph.strength *= 1.0 - alpha;
                if glyph.strength < GLYPH_CUTOFF {
                    *slot = None;
                }
            }
        }
    }

    fn fill_glyph(&mut self, ch: char, x: f32, y: f32, color: Rgba) {
        let cell_h = self.scale * 2.0;
        let col = (x / self.scale).floor();
        // The baseline sits on the bottom edge of the cell.
        let row = (y / cell_h).ceil() - 1.0;
        if col.is_nan() || row.is_nan() || col < 0.0 || row < 0.0 {
            return;
        }
        let (col, row) = (col as usize, row as usize);
        if col >= self.px_width || row >= self.rows() {
            return;
        }

        let mut glyph_color = self.pixel(col, row * 2);
        mix(&mut glyph_color, self.pixel(col, row * 2 + 1), 0.5);
        mix(&mut glyph_color, color.channels(), color.a);

        self.glyphs[row * self.px_width + col] = Some(GlyphCell {
            ch,
            color: glyph_color,
            strength: color.a,
        });
    }

    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba) {
        let radius = self.visible_radius(radius);
        let transform = self.transform();
        let Some(pixmap) = &mut self.pixmap else {
            return;
        };
        let Some(path) = PathBuilder::from_circle(cx, cy, radius) else {
            return;
        };

        let mut paint = Paint::default();
        paint.set_color(skia_color(color));
        paint.anti_alias = true;
        pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
    }

    fn fill_soft_circle(&mut self, cx: f32, cy: f32, radius: f32, blur: f32, color: Rgba) {
        if blur.is_nan() || blur <= 0.0 {
            self.fill_circle(cx, cy, radius, color);
            return;
        }
        let radius = self.visible_radius(radius);
        let outer = radius + blur;
        let transform = self.transform();
        let Some(pixmap) = &mut self.pixmap else {
            return;
        };
        let Some(path) = PathBuilder::from_circle(cx, cy, outer) else {
            return;
        };

        let center = Point::from_xy(cx, cy);
        let core = skia_color(color);
        let stops = vec![
            GradientStop::new(0.0, core),
            GradientStop::new(radius / outer, core),
            GradientStop::new(1.0, skia_color(color.with_alpha(0.0))),
        ];
        let Some(shader) = RadialGradient::new(
            center,
            center,
            outer,
            stops,
            SpreadMode::Pad,
            Transform::identity(),
        ) else {
            return;
        };

        let paint = Paint {
            shader,
            anti_alias: true,
            ..Paint::default()
        };
        pixmap.fill_path(&path, &paint, FillRule::Winding, transform, None);
    }

    fn draw_sprite(&mut self, sprite: &Sprite, x: f32, y: f32, w: f32, h: f32, alpha: f32) {
        if alpha.is_nan() || alpha <= 0.0 {
            return;
        }
        let transform = self.transform();
        let Some(pixmap) = &mut self.pixmap else {
            return;
        };
        let Some(rect) = SkiaRect::from_xywh(x, y, w, h) else {
            return;
        };

        let texels = sprite.pixmap();
        let placement = Transform::from_row(
            w / texels.width() as f32,
            0.0,
            0.0,
            h / texels.height() as f32,
            x,
            y,
        );
        let paint = Paint {
            shader: Pattern::new(
                texels,
                SpreadMode::Pad,
                FilterQuality::Bilinear,
                alpha.min(1.0),
                placement,
            ),
            anti_alias: true,
            ..Paint::default()
        };
        pixmap.fill_rect(rect, &paint, transform, None);
    }

    fn attach(&mut self, owner: RunFlag) -> Option<RunFlag> {
        self.owner.replace(owner)
    }

    fn wipe(&mut self) {
        if let Some(pixmap) = &mut self.pixmap {
            pixmap.fill(SkiaColor::BLACK);
        }
        self.glyphs.fill(None);
    }
}

impl Widget for &Canvas {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let cols = (area.width as usize).min(self.px_width);
        let rows = (area.height as usize).min(self.rows());

        for row in 0..rows {
            for col in 0..cols {
                let top = self.pixel(col, row * 2);
                let bottom = self.pixel(col, row * 2 + 1);
                let position = (area.x + col as u16, area.y + row as u16);
                let Some(cell) = buf.cell_mut(position) else {
                    continue;
                };

                match self.glyph(col, row) {
                    Some(glyph) if luma(glyph.color) >= luma(top).max(luma(bottom)) => {
                        let mut under = top;
                        mix(&mut under, bottom, 0.5);
                        cell.set_char(glyph.ch)
                            .set_fg(to_color(glyph.color))
                            .set_bg(to_color(under));
                    }
                    _ => {
                        cell.set_char(HALF_BLOCK)
                            .set_fg(to_color(top))
                            .set_bg(to_color(bottom));
                    }
                }
            }
        }
    }
}
