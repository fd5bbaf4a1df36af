//! Message morph: LED point clouds interpolating between successive messages.

use std::f32::consts::TAU;
use std::time::Duration;

use glyphfall_core::{Rgba, Surface};
use glyphfall_fonts::{FontFamily, FontSpec, Point, led_points};
use rand::Rng;
use tracing::{debug, info};

/// Minimum time a message is shown before the next transition.
pub const DEFAULT_DWELL: Duration = Duration::from_millis(2000);

/// Morph progress added per frame.
pub const DEFAULT_MORPH_STEP: f32 = 0.04;

/// Glow around each LED in logical pixels.
const LED_GLOW: f32 = 4.0;

/// Shimmer speed: the sine argument advances by one every this many milliseconds.
const SHIMMER_PERIOD_MS: f32 = 500.0;

/// Where the message sequence is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    /// Showing the current message.
    Static,
    /// Interpolating from the current message to the next.
    Morphing,
    /// Messages are done for good.
    Heart,
}

/// One lit LED travelling from a source to a target point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LedParticle {
    pub x: f32,
    pub y: f32,
    pub tx: f32,
    pub ty: f32,
    pub alpha: f32,
    /// Shimmer phase offset in radians.
    pub phase: f32,
}

impl LedParticle {
    /// Position at morph fraction `t` in `0.0..=1.0`.
    pub fn position(&self, t: f32) -> (f32, f32) {
        (
            self.x + (self.tx - self.x) * t,
            self.y + (self.ty - self.y) * t,
        )
    }
}

/// Shimmer alpha in `0.4..=1.0` for a particle phase at `now_ms`.
pub fn shimmer(now_ms: f32, phase: f32) -> f32 {
    0.7 + 0.3 * (now_ms / SHIMMER_PERIOD_MS + phase).sin()
}

/// Pair up two point clouds into `max(S, T)` particles, cycling the shorter one.
///
/// An empty side mirrors the other so every particle stays in place.
pub fn zip_particles<R: Rng>(from: &[Point], to: &[Point], rng: &mut R) -> Vec<LedParticle> {
    let (from, to) = match (from.is_empty(), to.is_empty()) {
        (true, true) => return Vec::new(),
        (true, false) => (to, to),
        (false, true) => (from, from),
        (false, false) => (from, to),
    };

    let len = from.len().max(to.len());
    (0..len)
        .map(|i| {
            let source = from[i % from.len()];
            let target = to[i % to.len()];
            LedParticle {
                x: source.x,
                y: source.y,
                tx: target.x,
                ty: target.y,
                alpha: 1.0,
                phase: rng.gen_range(0.0..TAU),
            }
        })
        .collect()
}

/// Text layout derived from the surface size.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Geometry {
    width: f32,
    height: f32,
    font: FontSpec,
    density: usize,
}

impl Geometry {
    fn new(width: f32, height: f32, family: FontFamily) -> Self {
        let min = width.min(height);
        let size = (min / 7.0).floor();
        let density = (min / 70.0).floor().max(3.0) as usize;
        Self {
            width,
            height,
            font: FontSpec::new(family, size).bold(),
            density,
        }
    }

    fn radius(&self) -> f32 {
        self.density as f32 / 2.5
    }
}

/// The message sequence state machine.
#[derive(Debug)]
pub struct MessageMorph {
    messages: Vec<String>,
    family: FontFamily,
    dwell: Duration,
    step: f32,
    current: usize,
    next: usize,
    phase: Phase,
    progress: f32,
    /// When the current message started showing.
    last_switch: Duration,
    particles: Vec<LedParticle>,
    /// Point clouds per message, valid for `geometry`.
    clouds: Vec<Option<Vec<Point>>>,
    geometry: Option<Geometry>,
    rasterizations: usize,
}

impl MessageMorph {
    pub fn new(messages: Vec<String>, family: FontFamily) -> Self {
        let next = if messages.is_empty() { 0 } else { 1 % messages.len() };
        let clouds = vec![None; messages.len()];
        Self {
            messages,
            family,
            dwell: DEFAULT_DWELL,
            step: DEFAULT_MORPH_STEP,
            current: 0,
            next,
            phase: Phase::Static,
            progress: 0.0,
            last_switch: Duration::ZERO,
            particles: Vec::new(),
            clouds,
            geometry: None,
            rasterizations: 0,
        }
    }

    pub fn with_dwell(mut self, dwell: Duration) -> Self {
        self.dwell = dwell;
        self
    }

    pub fn with_step(mut self, step: f32) -> Self {
        self.step = step;
        self
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn progress(&self) -> f32 {
        self.progress
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn next_index(&self) -> usize {
        self.next
    }

    pub fn current_message(&self) -> Option<&str> {
        self.messages.get(self.current).map(String::as_str)
    }

    pub fn particles(&self) -> &[LedParticle] {
        &self.particles
    }

    /// How many times a message has been turned into a point cloud.
    pub fn rasterizations(&self) -> usize {
        self.rasterizations
    }

    /// Run one frame: draw the LEDs and advance the state machine.
    pub fn update<S: Surface, R: Rng>(&mut self, surface: &mut S, now: Duration, rng: &mut R) {
        if self.phase == Phase::Heart {
            return;
        }
        if self.messages.is_empty() {
            self.enter_heart();
            return;
        }

        let geometry = Geometry::new(surface.width(), surface.height(), self.family);
        if self.geometry != Some(geometry) {
            self.geometry = Some(geometry);
            self.clouds.iter_mut().for_each(|c| *c = None);
            if self.phase == Phase::Static {
                self.particles.clear();
            }
        }

        let now_ms = now.as_secs_f32() * 1000.0;
        match self.phase {
            Phase::Static => self.update_static(surface, &geometry, now, now_ms, rng),
            Phase::Morphing => self.update_morphing(surface, &geometry, now, now_ms),
            Phase::Heart => {}
        }
    }

    fn update_static<S: Surface, R: Rng>(
        &mut self,
        surface: &mut S,
        geometry: &Geometry,
        now: Duration,
        now_ms: f32,
        rng: &mut R,
    ) {
        self.ensure_cloud(self.current, geometry);
        if self.particles.is_empty() {
            let cloud = self.clouds[self.current].as_deref().unwrap_or_default();
            self.particles = zip_particles(cloud, cloud, rng);
        }

        let radius = geometry.radius();
        for p in &self.particles {
            let alpha = p.alpha * shimmer(now_ms, p.phase);
            surface.fill_soft_circle(p.x, p.y, radius, LED_GLOW, Rgba::WHITE.with_alpha(alpha));
        }

        if now.saturating_sub(self.last_switch) < self.dwell {
            return;
        }
        if self.current == self.messages.len() - 1 {
            self.enter_heart();
            return;
        }

        self.ensure_cloud(self.next, geometry);
        let from = self.clouds[self.current].as_deref().unwrap_or_default();
        let to = self.clouds[self.next].as_deref().unwrap_or_default();
        self.particles = zip_particles(from, to, rng);
        self.phase = Phase::Morphing;
        self.progress = 0.0;
        debug!(
            from = self.current,
            to = self.next,
            particles = self.particles.len(),
            "morph started"
        );
    }

    fn update_morphing<S: Surface>(
        &mut self,
        surface: &mut S,
        geometry: &Geometry,
        now: Duration,
        now_ms: f32,
    ) {
        self.progress += self.step;
        let t = self.progress.min(1.0);

        let radius = geometry.radius();
        for p in &self.particles {
            let (x, y) = p.position(t);
            let alpha = shimmer(now_ms, p.phase) * (1.0 - t) + t;
            let color = Rgba::WHITE.with_alpha(p.alpha * alpha);
            surface.fill_soft_circle(x, y, radius, LED_GLOW, color);
        }

        if t < 1.0 {
            return;
        }

        self.current = self.next;
        self.next = (self.next + 1) % self.messages.len();
        self.phase = Phase::Static;
        self.last_switch = now;
        self.particles.clear();
        debug!(current = self.current, "morph finished");
    }

    fn ensure_cloud(&mut self, index: usize, geometry: &Geometry) {
        if self.clouds[index].is_some() {
            return;
        }
        let points = led_points(
            &self.messages[index],
            &geometry.font,
            geometry.width,
            geometry.height,
            geometry.density,
        );
        self.rasterizations += 1;
        self.clouds[index] = Some(points);
    }

    fn enter_heart(&mut self) {
        info!("message sequence finished");
        self.phase = Phase::Heart;
        self.particles.clear();
        self.clouds.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glyphfall_core::Canvas;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn pts(coords: &[(f32, f32)]) -> Vec<Point> {
        coords.iter().map(|&(x, y)| Point { x, y }).collect()
    }

    fn morph(messages: &[&str]) -> MessageMorph {
        MessageMorph::new(
            messages.iter().map(|m| m.to_string()).collect(),
            FontFamily::Proportional,
        )
    }

    fn ms(ms: u64) -> Duration {
        Duration::from_millis(ms)
    }

    #[test]
    fn test_zip_uses_longer_length_and_cycles() {
        let mut rng = StdRng::seed_from_u64(1);
        let from = pts(&[(0.0, 0.0), (1.0, 1.0)]);
        let to = pts(&[(10.0, 0.0), (11.0, 0.0), (12.0, 0.0), (13.0, 0.0), (14.0, 0.0)]);
        let particles = zip_particles(&from, &to, &mut rng);
        assert_eq!(particles.len(), 5);
        for (i, p) in particles.iter().enumerate() {
            assert_eq!((p.x, p.y), (from[i % 2].x, from[i % 2].y));
            assert_eq!((p.tx, p.ty), (to[i].x, to[i].y));
            assert!((0.0..TAU).contains(&p.phase));
        }

        let reversed = zip_particles(&to, &from, &mut rng);
        assert_eq!(reversed.len(), 5);
        assert_eq!((reversed[4].tx, reversed[4].ty), (0.0, 0.0));
    }

    #[test]
    fn test_zip_with_empty_side() {
        let mut rng = StdRng::seed_from_u64(1);
        let cloud = pts(&[(3.0, 4.0)]);
        assert!(zip_particles(&[], &[], &mut rng).is_empty());
        let appear = zip_particles(&[], &cloud, &mut rng);
        assert_eq!(appear.len(), 1);
        assert_eq!(appear[0].position(0.0), (3.0, 4.0));
        let stay = zip_particles(&cloud, &[], &mut rng);
        assert_eq!(stay[0].position(1.0), (3.0, 4.0));
    }

    #[test]
    fn test_shimmer_range() {
        for i in 0..100 {
            let a = shimmer(i as f32 * 37.0, i as f32 * 0.1);
            assert!((0.4..=1.0).contains(&a));
        }
    }

    #[test]
    fn test_particle_interpolation() {
        let p = LedParticle {
            x: 0.0,
            y: 10.0,
            tx: 100.0,
            ty: 20.0,
            alpha: 1.0,
            phase: 0.0,
        };
        assert_eq!(p.position(0.0), (0.0, 10.0));
        assert_eq!(p.position(0.5), (50.0, 15.0));
        assert_eq!(p.position(1.0), (100.0, 20.0));
    }

    #[test]
    fn test_a_to_b_sequence() {
        let mut canvas = Canvas::for_cells(100, 25, 7.0);
        let mut rng = StdRng::seed_from_u64(42);
        let mut m = morph(&["A", "B"]);

        // Dwell on "A".
        let mut now = 0;
        while now < 2000 {
            m.update(&mut canvas, ms(now), &mut rng);
            assert_eq!(m.phase(), Phase::Static);
            now += 100;
        }
        m.update(&mut canvas, ms(now), &mut rng);
        assert_eq!(m.phase(), Phase::Morphing);
        assert_eq!(m.progress(), 0.0);

        let geometry = m.geometry.unwrap();
        let a = led_points("A", &geometry.font, geometry.width, geometry.height, geometry.density);
        let b = led_points("B", &geometry.font, geometry.width, geometry.height, geometry.density);
        assert!(!a.is_empty() && !b.is_empty());
        assert_eq!(m.particles().len(), a.len().max(b.len()));

        // Progress only grows during the morph, which takes about 25 frames.
        let mut frames = 0;
        let mut last = m.progress();
        while m.phase() == Phase::Morphing {
            now += 33;
            m.update(&mut canvas, ms(now), &mut rng);
            frames += 1;
            if m.phase() == Phase::Morphing {
                assert!(m.progress() > last);
                last = m.progress();
            }
        }
        assert!((25..=26).contains(&frames));
        assert_eq!(m.phase(), Phase::Static);
        assert_eq!(m.current_message(), Some("B"));
        assert_eq!(m.next_index(), 0);
    }

    #[test]
    fn test_last_message_enters_heart_for_good() {
        let mut canvas = Canvas::for_cells(60, 20, 7.0);
        let mut rng = StdRng::seed_from_u64(8);
        let mut m = morph(&["1"]);

        m.update(&mut canvas, ms(0), &mut rng);
        m.update(&mut canvas, ms(1999), &mut rng);
        assert_eq!(m.phase(), Phase::Static);
        m.update(&mut canvas, ms(2000), &mut rng);
        assert_eq!(m.phase(), Phase::Heart);

        let count = m.rasterizations();
        for t in 0..50 {
            m.update(&mut canvas, ms(2100 + t * 33), &mut rng);
        }
        assert_eq!(m.phase(), Phase::Heart);
        assert_eq!(m.rasterizations(), count);
        assert!(m.particles().is_empty());
    }

    #[test]
    fn test_empty_sequence_goes_straight_to_heart() {
        let mut canvas = Canvas::for_cells(10, 5, 7.0);
        let mut rng = StdRng::seed_from_u64(0);
        let mut m = morph(&[]);
        m.update(&mut canvas, ms(0), &mut rng);
        assert_eq!(m.phase(), Phase::Heart);
    }

    #[test]
    fn test_static_cloud_is_cached() {
        let mut canvas = Canvas::for_cells(60, 20, 7.0);
        let mut rng = StdRng::seed_from_u64(8);
        let mut m = morph(&["Hi", "there"]);
        for t in 0..20 {
            m.update(&mut canvas, ms(t * 50), &mut rng);
        }
        assert_eq!(m.rasterizations(), 1);

        // A new size invalidates the cache.
        canvas.set_width(300.0);
        m.update(&mut canvas, ms(1000), &mut rng);
        assert_eq!(m.rasterizations(), 2);
    }

    #[test]
    fn test_degenerate_surface_still_advances() {
        let mut canvas = Canvas::new(7.0);
        canvas.set_width(-10.0);
        canvas.set_height(-10.0);
        let mut rng = StdRng::seed_from_u64(8);
        let mut m = morph(&["A", "B"]);
        m.update(&mut canvas, ms(0), &mut rng);
        m.update(&mut canvas, ms(2000), &mut rng);
        assert_eq!(m.phase(), Phase::Morphing);
        assert!(m.particles().is_empty());
    }
}
