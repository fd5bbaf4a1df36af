//! Decoration images falling down both sides during the heart phase.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use glyphfall_core::{Sprite, Surface};
use image::ImageReader;
use image::error::{ImageError, ParameterError, ParameterErrorKind};
use rand::Rng;
use tracing::{debug, warn};

/// Decode an image file into a sprite. The format is sniffed from the content.
pub fn load_sprite(path: &Path) -> Result<Sprite, ImageError> {
    let rgba = ImageReader::open(path)?
        .with_guessed_format()?
        .decode()?
        .to_rgba8();
    let (width, height) = rgba.dimensions();
    Sprite::from_rgba(width, height, rgba.as_raw()).ok_or_else(|| {
        ImageError::Parameter(ParameterError::from_kind(
            ParameterErrorKind::DimensionMismatch,
        ))
    })
}

#[derive(Debug, Clone, Default)]
enum SlotState {
    #[default]
    Pending,
    Ready(Arc<Sprite>),
    Failed,
}

/// An image decoded on a background thread and polled by the renderer.
#[derive(Debug, Clone, Default)]
pub struct ImageSlot(Arc<Mutex<SlotState>>);

impl ImageSlot {
    /// Start loading `path` in the background.
    pub fn load(path: impl Into<PathBuf>) -> Self {
        let slot = Self::default();
        let path = path.into();
        let target = slot.clone();
        let spawned = thread::Builder::new()
            .name("glyphfall-image".into())
            .spawn(move || {
                let state = match load_sprite(&path) {
                    Ok(sprite) => {
                        debug!(path = %path.display(), "image loaded");
                        SlotState::Ready(Arc::new(sprite))
                    }
                    Err(err) => {
                        warn!(path = %path.display(), %err, "image failed to load");
                        SlotState::Failed
                    }
                };
                target.set(state);
            });
        if let Err(err) = spawned {
            warn!(%err, "could not start image loader");
            slot.set(SlotState::Failed);
        }
        slot
    }

    fn set(&self, state: SlotState) {
        if let Ok(mut guard) = self.0.lock() {
            *guard = state;
        }
    }

    /// The decoded sprite, once available.
    pub fn ready(&self) -> Option<Arc<Sprite>> {
        match &*self.0.lock().ok()? {
            SlotState::Ready(sprite) => Some(Arc::clone(sprite)),
            _ => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.0
            .lock()
            .map(|state| matches!(*state, SlotState::Pending))
            .unwrap_or(false)
    }

    pub fn is_failed(&self) -> bool {
        self.0
            .lock()
            .map(|state| matches!(*state, SlotState::Failed))
            .unwrap_or(true)
    }
}

/// Position and speed of one falling image.
#[derive(Debug, Clone, PartialEq)]
pub struct FallingImage {
    /// Horizontal center.
    pub x: f32,
    /// Top edge.
    pub y: f32,
    /// Logical pixels per second.
    pub speed: f32,
    /// Time of the last drawn frame.
    last_time: Option<Duration>,
}

impl FallingImage {
    /// Start above the surface: the first image on the left, the rest on the right.
    pub fn new<R: Rng>(index: usize, width: f32, height: f32, rng: &mut R) -> Self {
        let height = height.max(0.0);
        let x = if index == 0 {
            width * 0.125
        } else {
            width * 0.875
        };
        Self {
            x,
            y: -rng.gen_range(0.0..1.0f32) * height,
            speed: height / 2.0 + rng.gen_range(0.0..1.0f32) * height / 2.0,
            last_time: None,
        }
    }

    /// Seconds since the previous drawn frame; zero the first time.
    pub fn elapsed(&mut self, now: Duration) -> f32 {
        let dt = self
            .last_time
            .map(|last| now.saturating_sub(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_time = Some(now);
        dt
    }

    /// Move down by `speed × dt`, wrapping back above the top once past `height`.
    pub fn advance(&mut self, dt: f32, height: f32, image_height: f32) {
        self.y += self.speed * dt;
        if self.y > height {
            self.y = -image_height;
        }
    }
}

/// The set of falling images, created when the heart phase first renders.
#[derive(Debug)]
pub struct FallingOverlay {
    slots: Vec<ImageSlot>,
    images: Vec<FallingImage>,
}

impl FallingOverlay {
    /// Start loading every path and place one falling image per path.
    pub fn new<R: Rng>(paths: &[PathBuf], width: f32, height: f32, rng: &mut R) -> Self {
        let slots = paths
            .iter()
            .map(|path| ImageSlot::load(path.as_path()))
            .collect();
        Self::with_slots(slots, width, height, rng)
    }

    pub fn with_slots<R: Rng>(slots: Vec<ImageSlot>, width: f32, height: f32, rng: &mut R) -> Self {
        let images = (0..slots.len())
            .map(|i| FallingImage::new(i, width, height, rng))
            .collect();
        Self { slots, images }
    }

    pub fn images(&self) -> &[FallingImage] {
        &self.images
    }

    /// Draw every loaded image a quarter of the surface wide, keeping its aspect.
    pub fn draw<S: Surface>(&mut self, surface: &mut S, now: Duration) {
        let width = surface.width();
        let height = surface.height();
        let image_width = width / 4.0;

        for (slot, image) in self.slots.iter().zip(&mut self.images) {
            let Some(sprite) = slot.ready() else {
                continue;
            };
            if sprite.width() == 0 {
                continue;
            }
            let image_height = sprite.height() as f32 * image_width / sprite.width() as f32;
            let dt = image.elapsed(now);
            image.advance(dt, height, image_height);
            surface.draw_sprite(
                &sprite,
                image.x - image_width / 2.0,
                image.y,
                image_width,
                image_height,
                1.0,
            );
        }
    }
}
