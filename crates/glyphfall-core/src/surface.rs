//! Drawing surface abstraction shared by the animations and the terminal canvas.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tiny_skia::{ColorU8, IntSize, Pixmap, PixmapRef};

use crate::color::Rgba;

/// A 2D drawing target addressed in logical pixels.
///
/// Coordinates may fall outside `0..width` / `0..height`; implementations clip.
pub trait Surface {
    /// Logical width.
    fn width(&self) -> f32;

    /// Logical height.
    fn height(&self) -> f32;

    /// Change the logical width. Non-positive widths leave an empty surface.
    fn set_width(&mut self, width: f32);

    /// Change the logical height. Non-positive heights leave an empty surface.
    fn set_height(&mut self, height: f32);

    /// Blend `color` over the whole surface using its alpha.
    fn fill_background(&mut self, color: Rgba);

    /// Draw a single character with its baseline at `y`.
    fn fill_glyph(&mut self, ch: char, x: f32, y: f32, color: Rgba);

    /// Draw an anti-aliased filled circle, blended with the color's alpha.
    fn fill_circle(&mut self, cx: f32, cy: f32, radius: f32, color: Rgba);

    /// Draw a circle whose edge fades out over `blur` units past `radius`.
    fn fill_soft_circle(&mut self, cx: f32, cy: f32, radius: f32, blur: f32, color: Rgba);

    /// Draw `sprite` stretched into the rectangle at `(x, y)` sized `w × h`.
    fn draw_sprite(&mut self, sprite: &Sprite, x: f32, y: f32, w: f32, h: f32, alpha: f32);

    /// Hand the surface to a new owner, returning the previous owner's flag.
    fn attach(&mut self, owner: RunFlag) -> Option<RunFlag>;

    /// Erase everything drawn so far.
    fn wipe(&mut self);
}

/// An RGBA texture drawn with [`Surface::draw_sprite`].
///
/// Texels are stored premultiplied in a `tiny_skia` pixmap.
#[derive(Debug, Clone, PartialEq)]
pub struct Sprite {
    pixmap: Pixmap,
}

impl Sprite {
    pub fn from_pixmap(pixmap: Pixmap) -> Self {
        Self { pixmap }
    }

    /// Build a sprite from tightly packed, straight-alpha RGBA bytes.
    ///
    /// Returns `None` if the buffer length does not match the dimensions or
    /// either dimension is zero.
    pub fn from_rgba(width: u32, height: u32, bytes: &[u8]) -> Option<Self> {
        if bytes.len() != width as usize * height as usize * 4 {
            return None;
        }
        let data = bytes
            .chunks_exact(4)
            .flat_map(|px| {
                let p = ColorU8::from_rgba(px[0], px[1], px[2], px[3]).premultiply();
                [p.red(), p.green(), p.blue(), p.alpha()]
            })
            .collect();
        let pixmap = Pixmap::from_vec(data, IntSize::from_wh(width, height)?)?;
        Some(Self { pixmap })
    }

    /// Build a single-color sprite from a coverage mask (one byte per texel).
    ///
    /// Texels missing from a short mask are transparent; extra bytes are ignored.
    pub fn from_mask(width: u32, height: u32, mask: &[u8], color: Rgba) -> Option<Self> {
        let bytes: Vec<u8> = (0..width as usize * height as usize)
            .flat_map(|i| [color.r, color.g, color.b, mask.get(i).copied().unwrap_or(0)])
            .collect();
        Self::from_rgba(width, height, &bytes)
    }

    pub fn width(&self) -> u32 {
        self.pixmap.width()
    }

    pub fn height(&self) -> u32 {
        self.pixmap.height()
    }

    pub fn pixmap(&self) -> PixmapRef<'_> {
        self.pixmap.as_ref()
    }

    /// Straight-alpha texel at `(x, y)`; out-of-range lookups are fully transparent.
    pub fn texel(&self, x: u32, y: u32) -> [u8; 4] {
        match self.pixmap.pixel(x, y) {
            Some(p) => {
                let c = p.demultiply();
                [c.red(), c.green(), c.blue(), c.alpha()]
            }
            None => [0; 4],
        }
    }
}

/// Shared running flag polled by an animation once per tick.
#[derive(Debug, Clone, Default)]
pub struct RunFlag(Arc<AtomicBool>);

impl RunFlag {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.0.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// Whether two flags control the same owner.
    pub fn same_owner(&self, other: &RunFlag) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sprite_buffer_lengths() {
        assert!(Sprite::from_rgba(2, 2, &[0; 15]).is_none());
        assert!(Sprite::from_rgba(2, 2, &[0; 16]).is_some());
        assert!(Sprite::from_rgba(0, 2, &[]).is_none());
        let short = Sprite::from_mask(3, 1, &[255; 2], Rgba::WHITE).unwrap();
        assert_eq!(short.texel(1, 0), [255; 4]);
        assert_eq!(short.texel(2, 0)[3], 0);
    }

    #[test]
    fn test_sprite_texels_are_straight_alpha() {
        let mask = [0, 255, 128, 0];
        let sprite = Sprite::from_mask(2, 2, &mask, Rgba::WHITE).unwrap();
        assert_eq!((sprite.width(), sprite.height()), (2, 2));
        assert_eq!(sprite.texel(1, 0), [255; 4]);
        assert_eq!(sprite.texel(0, 1), [255, 255, 255, 128]);
        assert_eq!(sprite.texel(0, 0)[3], 0);
        assert_eq!(sprite.texel(5, 0), [0; 4]);
        // Stored premultiplied.
        let stored = sprite.pixmap().pixel(0, 1).unwrap();
        assert_eq!((stored.red(), stored.alpha()), (128, 128));
    }

    #[test]
    fn test_run_flag_is_shared_between_clones() {
        let flag = RunFlag::new();
        let clone = flag.clone();
        assert!(!clone.is_running());
        flag.start();
        assert!(clone.is_running());
        clone.stop();
        assert!(!flag.is_running());
        assert!(flag.same_owner(&clone));
        assert!(!flag.same_owner(&RunFlag::new()));
    }
}
