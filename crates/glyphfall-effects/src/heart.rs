//! Heart particle finale (stateful).

use std::f32::consts::PI;
use std::time::Duration;

use glyphfall_core::{HeartSettings, Rgba, Sprite, Surface};
use rand::Rng;
use tiny_skia::{FillRule, Paint, PathBuilder, Pixmap, Transform};

use crate::pool::ParticlePool;

/// Fill color of the heart sprite.
pub const HEART_COLOR: Rgba = Rgba::rgb(0xff, 0x5c, 0xa4);

/// Texels per side of the heart sprite.
const SPRITE_RESOLUTION: u32 = 32;

/// Parameter step when tracing the outline.
const OUTLINE_STEP: f32 = 0.01;

/// Outline units that span the sprite's side.
const OUTLINE_EXTENT: f32 = 350.0;

/// Point on the heart curve for `t` in `[-π, π]`, y pointing up.
pub fn point_on_heart(t: f32) -> (f32, f32) {
    let x = 160.0 * t.sin().powi(3);
    let y = 130.0 * t.cos() - 50.0 * (2.0 * t).cos() - 20.0 * (3.0 * t).cos()
        - 10.0 * (4.0 * t).cos()
        + 25.0;
    (x, y)
}

/// Fill the heart outline into a square sprite, anti-aliased.
pub fn heart_sprite(resolution: u32) -> Option<Sprite> {
    let res = resolution.max(1);
    let side = res as f32;
    let to_texels = |t: f32| {
        let (x, y) = point_on_heart(t);
        (
            side / 2.0 + x * side / OUTLINE_EXTENT,
            side / 2.0 - y * side / OUTLINE_EXTENT,
        )
    };

    let mut pb = PathBuilder::new();
    let (x, y) = to_texels(-PI);
    pb.move_to(x, y);
    let mut t = -PI;
    while t < PI {
        t += OUTLINE_STEP;
        let (x, y) = to_texels(t);
        pb.line_to(x, y);
    }
    pb.close();
    let path = pb.finish()?;

    let mut pixmap = Pixmap::new(res, res)?;
    let mut paint = Paint::default();
    paint.set_color_rgba8(HEART_COLOR.r, HEART_COLOR.g, HEART_COLOR.b, 255);
    paint.anti_alias = true;
    pixmap.fill_path(&path, &paint, FillRule::Winding, Transform::identity(), None);

    Some(Sprite::from_pixmap(pixmap))
}

fn ease_out_cubic(t: f32) -> f32 {
    let t = t - 1.0;
    t * t * t + 1.0
}

/// Two-component vector in logical pixels.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// A pooled heart particle.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HeartParticle {
    pub position: Vec2,
    pub velocity: Vec2,
    pub acceleration: Vec2,
    /// Seconds since spawn.
    pub age: f32,
}

impl HeartParticle {
    fn integrate(&mut self, dt: f32) {
        self.position.x += self.velocity.x * dt;
        self.position.y += self.velocity.y * dt;
        self.velocity.x += self.acceleration.x * dt;
        self.velocity.y += self.acceleration.y * dt;
        self.age += dt;
    }
}

/// Particles streaming off the heart outline.
#[derive(Debug)]
pub struct HeartField {
    settings: HeartSettings,
    pool: ParticlePool<HeartParticle>,
    sprite: Option<Sprite>,
    /// Time of the previous update.
    last_time: Option<Duration>,
}

impl HeartField {
    pub fn new(settings: HeartSettings) -> Self {
        Self {
            settings,
            pool: ParticlePool::new(settings.length),
            sprite: heart_sprite(SPRITE_RESOLUTION),
            last_time: None,
        }
    }

    pub fn pool(&self) -> &ParticlePool<HeartParticle> {
        &self.pool
    }

    pub fn settings(&self) -> &HeartSettings {
        &self.settings
    }

    /// Advance the simulation to `now` around the center of a `width × height`
    /// surface. Returns the elapsed seconds (zero on the first call).
    pub fn update<R: Rng>(&mut self, width: f32, height: f32, now: Duration, rng: &mut R) -> f32 {
        let dt = self
            .last_time
            .map(|last| now.saturating_sub(last).as_secs_f32())
            .unwrap_or(0.0);
        self.last_time = Some(now);

        // More than a pool's worth would only overwrite itself.
        let amount = (self.settings.spawn_rate() * dt).ceil() as usize;
        let amount = amount.min(self.pool.capacity());
        self.spawn(amount, width / 2.0, height / 2.0, rng);

        for particle in self.pool.iter_mut() {
            particle.integrate(dt);
        }

        let duration = self.settings.duration;
        self.pool.retire_while(|p| p.age >= duration);

        dt
    }

    /// Emit `count` particles from random outline points around `(cx, cy)`.
    pub fn spawn<R: Rng>(&mut self, count: usize, cx: f32, cy: f32, rng: &mut R) {
        let HeartSettings {
            velocity, effect, ..
        } = self.settings;

        for _ in 0..count {
            let (x, y) = point_on_heart(PI - 2.0 * PI * rng.gen_range(0.0..1.0f32));
            let len = (x * x + y * y).sqrt();
            let (dx, dy) = if len > 0.0 {
                (x / len * velocity, y / len * velocity)
            } else {
                (0.0, 0.0)
            };

            *self.pool.spawn() = HeartParticle {
                position: Vec2 {
                    x: cx + x,
                    y: cy - y,
                },
                velocity: Vec2 { x: dx, y: -dy },
                acceleration: Vec2 {
                    x: dx * effect,
                    y: -dy * effect,
                },
                age: 0.0,
            };
        }
    }

    /// Draw every live particle, growing and fading with age.
    pub fn draw<S: Surface>(&self, surface: &mut S) {
        let HeartSettings { duration, size, .. } = self.settings;
        let Some(sprite) = &self.sprite else {
            return;
        };
        if duration <= 0.0 {
            return;
        }
        for p in self.pool.iter() {
            let life = p.age / duration;
            let side = size * ease_out_cubic(life);
            surface.draw_sprite(
                sprite,
                p.position.x - side / 2.0,
                p.position.y - side / 2.0,
                side,
                side,
                1.0 - life,
            );
        }
    }
}
