//! Animations for glyphfall.
//!
//! The [`Animator`] drives three layers over a [`glyphfall_core::Surface`]:
//! the digital rain, the message morph that turns each greeting into a cloud
//! of LED points, and once the greetings run out, the particle heart with a
//! caption and falling decoration images.

mod animator;
pub mod chars;
mod falling;
mod heart;
mod morph;
mod pool;
mod rain;

pub use animator::{Animator, AnimatorSettings};
pub use falling::{FallingImage, FallingOverlay, ImageSlot, load_sprite};
pub use glyphfall_fonts::FontFamily;
pub use heart::{HEART_COLOR, HeartField, HeartParticle, Vec2, heart_sprite, point_on_heart};
pub use morph::{
    DEFAULT_DWELL, DEFAULT_MORPH_STEP, LedParticle, MessageMorph, Phase, shimmer, zip_particles,
};
pub use pool::ParticlePool;
pub use rain::{Rain, RainPaint, column_count};
