//! The animation driver tying rain, messages and the heart finale together.

use std::path::PathBuf;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use glyphfall_core::{DEFAULT_MESSAGES, HeartSettings, Rgba, RunFlag, Sprite, Surface};
use glyphfall_fonts::{FontFamily, FontSpec, rasterize};
use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::{debug, info};

use crate::chars::default_chars;
use crate::falling::FallingOverlay;
use crate::heart::{HEART_COLOR, HeartField};
use crate::morph::{DEFAULT_DWELL, DEFAULT_MORPH_STEP, MessageMorph, Phase};
use crate::rain::{Rain, RainPaint};

/// Caption height as a fraction of the surface height.
const CAPTION_DIVISOR: f32 = 12.0;

/// How far the caption glow spreads, relative to the caption font size.
const CAPTION_GLOW: f32 = 0.12;

/// Everything an [`Animator`] needs to know up front.
#[derive(Debug, Clone, PartialEq)]
pub struct AnimatorSettings {
    /// Rain glyph pool.
    pub chars: Vec<char>,
    /// Rain row height and column width in logical pixels.
    pub font_size: f32,
    /// Face used for messages and the caption, always bold.
    pub message_font: FontFamily,
    pub paint: RainPaint,
    /// Translucent fill applied every frame to fade old content.
    pub background: Rgba,
    pub messages: Vec<String>,
    pub dwell: Duration,
    pub morph_step: f32,
    pub heart: HeartSettings,
    pub caption: Option<String>,
    pub images: Vec<PathBuf>,
}

impl Default for AnimatorSettings {
    fn default() -> Self {
        Self {
            chars: default_chars(),
            font_size: 14.0,
            message_font: FontFamily::Proportional,
            paint: RainPaint::Solid(Rgba::rgb(0, 255, 0)),
            background: Rgba::BLACK.with_alpha(0.05),
            messages: DEFAULT_MESSAGES.iter().map(|m| m.to_string()).collect(),
            dwell: DEFAULT_DWELL,
            morph_step: DEFAULT_MORPH_STEP,
            heart: HeartSettings::default(),
            caption: Some("Bảo Hân".to_string()),
            images: vec![PathBuf::from("a1.jfif"), PathBuf::from("a2.jfif")],
        }
    }
}

/// Caption text rendered once per surface size.
#[derive(Debug)]
struct Caption {
    text: String,
    /// Surface size the sprites were built for.
    size: (f32, f32),
    /// Glow and fill sprites with their band height, if anything is lit.
    sprites: Option<(Sprite, Sprite, f32)>,
}

impl Caption {
    fn new(text: String) -> Self {
        Self {
            text,
            size: (f32::NAN, f32::NAN),
            sprites: None,
        }
    }

    fn draw<S: Surface>(&mut self, surface: &mut S, family: FontFamily) {
        let (width, height) = (surface.width(), surface.height());
        if self.size != (width, height) {
            self.size = (width, height);
            self.sprites = self.build(width, height, family);
        }
        let Some((glow, fill, band)) = &self.sprites else {
            return;
        };

        let top = height / 2.0 - band / 2.0;
        let spread = band / 2.0 * CAPTION_GLOW;
        surface.draw_sprite(
            glow,
            -spread,
            top - spread,
            width + 2.0 * spread,
            band + 2.0 * spread,
            0.6,
        );
        surface.draw_sprite(fill, 0.0, top, width, *band, 1.0);
    }

    fn build(&self, width: f32, height: f32, family: FontFamily) -> Option<(Sprite, Sprite, f32)> {
        let size = (height / CAPTION_DIVISOR).floor();
        if width <= 0.0 || size <= 0.0 {
            return None;
        }
        let band = size * 2.0;
        let bitmap = rasterize(&self.text, &FontSpec::new(family, size).bold(), width, band);
        let mask: Vec<u8> = (0..bitmap.height())
            .flat_map(|y| (0..bitmap.width()).map(move |x| (x, y)))
            .map(|(x, y)| bitmap.alpha(x, y))
            .collect();
        if mask.iter().all(|&a| a == 0) {
            return None;
        }
        let (w, h) = (bitmap.width() as u32, bitmap.height() as u32);
        Some((
            Sprite::from_mask(w, h, &mask, HEART_COLOR)?,
            Sprite::from_mask(w, h, &mask, Rgba::WHITE)?,
            band,
        ))
    }
}

/// Seed captured from the wall clock.
fn init_seed() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_nanos() as u64)
        .unwrap_or(0)
}

/// One running animation bound to a surface.
#[derive(Debug)]
pub struct Animator {
    settings: AnimatorSettings,
    flag: RunFlag,
    rng: StdRng,
    rain: Rain,
    morph: MessageMorph,
    heart: HeartField,
    caption: Option<Caption>,
    overlay: Option<FallingOverlay>,
    /// Height waiting to be applied on the next tick.
    pending_height: Option<f32>,
    frames: u64,
}

impl Animator {
    /// Bind a new animation to `surface`, replacing whatever animation drew there.
    pub fn new<S: Surface>(surface: &mut S, settings: AnimatorSettings, width: f32, height: f32) -> Self {
        Self::with_seed(surface, settings, width, height, init_seed())
    }

    pub fn with_seed<S: Surface>(
        surface: &mut S,
        settings: AnimatorSettings,
        width: f32,
        height: f32,
        seed: u64,
    ) -> Self {
        let flag = RunFlag::new();
        if let Some(previous) = surface.attach(flag.clone()) {
            previous.stop();
            surface.wipe();
            info!("replaced running animation");
        }

        let morph = MessageMorph::new(settings.messages.clone(), settings.message_font)
            .with_dwell(settings.dwell)
            .with_step(settings.morph_step);
        let mut animator = Self {
            flag,
            rng: StdRng::seed_from_u64(seed),
            rain: Rain::new(settings.font_size),
            morph,
            heart: HeartField::new(settings.heart),
            caption: settings.caption.clone().map(Caption::new),
            overlay: None,
            pending_height: None,
            frames: 0,
            settings,
        };
        animator.resize(surface, width, height);
        info!(width, height, "animator attached");
        animator
    }

    pub fn start(&self) {
        self.flag.start();
    }

    pub fn stop(&self) {
        self.flag.stop();
    }

    pub fn is_running(&self) -> bool {
        self.flag.is_running()
    }

    /// The flag controlling this animator.
    pub fn run_flag(&self) -> &RunFlag {
        &self.flag
    }

    pub fn settings(&self) -> &AnimatorSettings {
        &self.settings
    }

    pub fn rain(&self) -> &Rain {
        &self.rain
    }

    pub fn morph(&self) -> &MessageMorph {
        &self.morph
    }

    pub fn heart(&self) -> &HeartField {
        &self.heart
    }

    pub fn overlay(&self) -> Option<&FallingOverlay> {
        self.overlay.as_ref()
    }

    /// Frames rendered so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Apply the new width now; height and the rain reset follow on the next tick.
    pub fn resize<S: Surface>(&mut self, surface: &mut S, width: f32, height: f32) {
        surface.set_width(width);
        self.rain.set_width(width);
        self.pending_height = Some(height);
        debug!(width, height, columns = self.rain.columns(), "resized");
    }

    /// Render one frame at `now`. Returns `false` once the animator is stopped.
    pub fn tick<S: Surface>(&mut self, surface: &mut S, now: Duration) -> bool {
        if !self.flag.is_running() {
            return false;
        }

        if let Some(height) = self.pending_height.take() {
            surface.set_height(height);
            self.rain.reset();
        }

        surface.fill_background(self.settings.background);
        self.rain
            .update(surface, &self.settings.chars, &self.settings.paint, &mut self.rng);

        if self.morph.phase() == Phase::Heart {
            self.render_heart(surface, now);
        } else {
            self.morph.update(surface, now, &mut self.rng);
        }

        self.frames += 1;
        true
    }

    fn render_heart<S: Surface>(&mut self, surface: &mut S, now: Duration) {
        let (width, height) = (surface.width(), surface.height());
        self.heart.update(width, height, now, &mut self.rng);
        self.heart.draw(surface);

        if let Some(caption) = &mut self.caption {
            caption.draw(surface, self.settings.message_font);
        }

        let images = &self.settings.images;
        let rng = &mut self.rng;
        let overlay = self.overlay.get_or_insert_with(|| {
            info!(images = images.len(), "heart finale started");
            FallingOverlay::new(images, width, height, rng)
        });
        overlay.draw(surface, now);
    }
}
