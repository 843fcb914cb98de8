//! # Falling Particles
//!
//! One particle is one visual token on the overlay. Each tick it takes a
//! fixed Euler step (frame-rate coupled, no delta time), optionally spins,
//! and loops back above the viewport once it has fallen far enough below it.
//!
//! ```text
//!   y = -50  ──●── spawn / respawn (x redrawn from the spawn range)
//!              │  vy ∈ [fall, 1.5 × fall]
//!              ▼  vx ∈ [-0.3, 0.3] + wind
//!   y = H    ───────── viewport bottom
//!   y = H+100 ──────── respawn threshold (strictly greater)
//! ```

use rand::seq::SliceRandom;
use rand::Rng;
use shower_shared::constants::{DRIFT_JITTER, FALL_SPEED_JITTER, RESPAWN_MARGIN, SPAWN_Y};
use shower_shared::{Transform2D, Vec2};
use shower_ui::{Rect, RenderSurface, Visual, VisualId};

use crate::config::ShowerConfig;
use crate::content::Content;

/// Horizontal interval particle x-positions are drawn from.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnRange {
    /// Left bound (inclusive).
    pub start: f32,
    /// Right bound (exclusive).
    pub end: f32,
}

impl SpawnRange {
    /// Creates a range.
    #[must_use]
    pub const fn new(start: f32, end: f32) -> Self {
        Self { start, end }
    }

    /// The full width of a viewport.
    #[must_use]
    pub fn across(viewport: Rect) -> Self {
        Self::new(viewport.x, viewport.right())
    }

    /// Draws an x-position uniformly from the range.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> f32 {
        self.start + rng.gen::<f32>() * (self.end - self.start)
    }
}

/// Randomized starting state of a particle.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleSpawn {
    /// What the particle shows.
    pub content: Content,
    /// Starting position.
    pub position: Vec2,
    /// Per-tick velocity.
    pub velocity: Vec2,
    /// Where the particle re-enters after leaving the viewport.
    pub range: SpawnRange,
}

impl ParticleSpawn {
    /// Rolls content, x-position and velocity for one particle.
    ///
    /// Returns `None` only if the config has no content.
    pub fn roll<R: Rng + ?Sized>(
        config: &ShowerConfig,
        range: SpawnRange,
        rng: &mut R,
    ) -> Option<Self> {
        let descriptor = config.emojis.choose(rng)?;
        let x = range.sample(rng);
        let vx = -DRIFT_JITTER + rng.gen::<f32>() * DRIFT_JITTER * 2.0 + config.wind;
        let vy = config.fall_speed + rng.gen::<f32>() * config.fall_speed * FALL_SPEED_JITTER;

        Some(Self {
            content: Content::new(descriptor.as_str()),
            position: Vec2::new(x, SPAWN_Y),
            velocity: Vec2::new(vx, vy),
            range,
        })
    }
}

/// A single falling visual token.
#[derive(Debug, Clone)]
pub struct Particle {
    /// Current position.
    position: Vec2,
    /// Per-tick velocity.
    velocity: Vec2,
    /// Rotation in degrees; stays 0 unless spinning.
    rotation: f32,
    /// Degrees per tick, `None` when spinning is disabled.
    spin: Option<f32>,
    /// What the particle shows.
    content: Content,
    /// Rendered size in px (image box or glyph font size).
    size: f32,
    /// Respawn interval.
    range: SpawnRange,
    /// Opacity (0-1).
    opacity: f32,
    /// Visual on the overlay.
    visual: VisualId,
}

impl Particle {
    /// Creates a particle and mounts its visual on the surface.
    ///
    /// Images render at the configured image size; glyphs get a size drawn
    /// once from `[min_size, max_size]`. The visual starts at the spawn
    /// position; the first kinematic step happens on the first tick.
    pub fn spawn<R: Rng + ?Sized>(
        spawn: ParticleSpawn,
        config: &ShowerConfig,
        rng: &mut R,
        surface: &mut RenderSurface,
    ) -> Self {
        let size = if spawn.content.is_image() {
            config.image_size
        } else {
            config.min_size + rng.gen::<f32>() * (config.max_size - config.min_size)
        };

        let mut particle = Self {
            position: spawn.position,
            velocity: spawn.velocity,
            rotation: 0.0,
            spin: config.enable_spin.then_some(config.spin_speed),
            content: spawn.content,
            size,
            range: spawn.range,
            opacity: config.opacity,
            visual: VisualId::new(0),
        };

        let visual = if particle.content.is_image() {
            Visual::image(particle.content.descriptor(), size, particle.opacity)
        } else {
            Visual::glyph(particle.content.descriptor(), size, particle.opacity)
        };
        particle.visual = surface.mount(visual.with_transform(particle.transform()));
        particle
    }

    /// Advances one tick and returns the transform to push to the visual.
    pub fn update<R: Rng + ?Sized>(&mut self, viewport_height: f32, rng: &mut R) -> Transform2D {
        self.position += self.velocity;

        if let Some(speed) = self.spin {
            self.rotation = (self.rotation + speed) % 360.0;
        }

        if self.position.y > viewport_height + RESPAWN_MARGIN {
            self.position.y = SPAWN_Y;
            self.position.x = self.range.sample(rng);
        }

        self.transform()
    }

    /// Current placement: translation, plus rotation when spinning.
    #[must_use]
    pub fn transform(&self) -> Transform2D {
        let transform = Transform2D::translation(self.position);
        if self.spin.is_some() {
            transform.rotated(self.rotation)
        } else {
            transform
        }
    }

    /// Detaches the visual. Returns false if it was already detached.
    pub fn dispose(&self, surface: &mut RenderSurface) -> bool {
        surface.unmount(self.visual)
    }

    /// Current position.
    #[must_use]
    pub const fn position(&self) -> Vec2 {
        self.position
    }

    /// Per-tick velocity.
    #[must_use]
    pub const fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// Rotation in degrees.
    #[must_use]
    pub const fn rotation(&self) -> f32 {
        self.rotation
    }

    /// Content shown.
    #[must_use]
    pub const fn content(&self) -> &Content {
        &self.content
    }

    /// Rendered size in px.
    #[must_use]
    pub const fn size(&self) -> f32 {
        self.size
    }

    /// Opacity.
    #[must_use]
    pub const fn opacity(&self) -> f32 {
        self.opacity
    }

    /// Respawn interval.
    #[must_use]
    pub const fn spawn_range(&self) -> SpawnRange {
        self.range
    }

    /// Visual on the overlay.
    #[must_use]
    pub const fn visual(&self) -> VisualId {
        self.visual
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    const WIDTH: f32 = 800.0;
    const HEIGHT: f32 = 600.0;

    fn setup() -> (RenderSurface, ChaCha8Rng) {
        (
            RenderSurface::new(Rect::viewport(WIDTH, HEIGHT), 9999),
            ChaCha8Rng::seed_from_u64(7),
        )
    }

    fn config(emoji: &str) -> ShowerConfig {
        ShowerConfig {
            emojis: vec![emoji.to_string()],
            ..ShowerConfig::default()
        }
    }

    fn spawn_at(content: &str, velocity: Vec2, config: &ShowerConfig) -> (Particle, RenderSurface, ChaCha8Rng) {
        let (mut surface, mut rng) = setup();
        let spawn = ParticleSpawn {
            content: Content::new(content),
            position: Vec2::new(100.0, SPAWN_Y),
            velocity,
            range: SpawnRange::across(surface.viewport()),
        };
        let particle = Particle::spawn(spawn, config, &mut rng, &mut surface);
        (particle, surface, rng)
    }

    #[test]
    fn test_falls_then_respawns() {
        let config = config("🎉");
        let (mut particle, _surface, mut rng) = spawn_at("🎉", Vec2::new(0.1, 10.0), &config);

        let mut last_y = particle.position().y;
        let mut respawned = false;
        for _ in 0..200 {
            particle.update(HEIGHT, &mut rng);
            let y = particle.position().y;
            if y < last_y {
                // Only a respawn may move a particle up
                assert_eq!(y, SPAWN_Y);
                assert!(last_y + 10.0 > HEIGHT + RESPAWN_MARGIN);
                let x = particle.position().x;
                assert!((0.0..WIDTH).contains(&x), "respawn x {x}");
                respawned = true;
                break;
            }
            last_y = y;
        }
        assert!(respawned);
    }

    #[test]
    fn test_respawn_threshold_is_strict() {
        let config = config("🎉");
        // Lands exactly on H + 100 after one step: no respawn yet
        let step = HEIGHT + RESPAWN_MARGIN - SPAWN_Y;
        let (mut particle, _surface, mut rng) = spawn_at("🎉", Vec2::new(0.0, step), &config);

        particle.update(HEIGHT, &mut rng);
        assert_eq!(particle.position().y, HEIGHT + RESPAWN_MARGIN);

        particle.update(HEIGHT, &mut rng);
        assert_eq!(particle.position().y, SPAWN_Y);
    }

    #[test]
    fn test_no_spin_keeps_rotation_zero() {
        let config = config("🎉");
        let (mut particle, _surface, mut rng) = spawn_at("🎉", Vec2::new(0.0, 1.0), &config);

        for _ in 0..500 {
            let t = particle.update(HEIGHT, &mut rng);
            assert_eq!(t.rotation, None);
        }
        assert_eq!(particle.rotation(), 0.0);
    }

    #[test]
    fn test_spin_accumulates_modulo_360() {
        let config = ShowerConfig {
            enable_spin: true,
            spin_speed: 7.0,
            ..config("🎉")
        };
        let (mut particle, _surface, mut rng) = spawn_at("🎉", Vec2::new(0.0, 1.0), &config);

        for n in 1..=200u32 {
            let t = particle.update(HEIGHT, &mut rng);
            let expected = (n as f32 * 7.0) % 360.0;
            assert!((particle.rotation() - expected).abs() < 1e-3, "tick {n}");
            assert_eq!(t.rotation, Some(particle.rotation()));
        }
    }

    #[test]
    fn test_image_uses_fixed_size() {
        let config = ShowerConfig {
            image_size: 48.0,
            ..config("https://x/y.png")
        };
        let (particle, surface, _rng) = spawn_at("https://x/y.png", Vec2::ZERO, &config);

        assert_eq!(particle.size(), 48.0);
        let visual = surface.get(particle.visual()).unwrap();
        assert!(matches!(visual.kind, shower_ui::VisualKind::Image { size, .. } if size == 48.0));
    }

    #[test]
    fn test_glyph_size_within_range() {
        let config = config("🎉");
        let (mut surface, mut rng) = setup();
        let range = SpawnRange::across(surface.viewport());

        for _ in 0..100 {
            let spawn = ParticleSpawn::roll(&config, range, &mut rng).unwrap();
            let particle = Particle::spawn(spawn, &config, &mut rng, &mut surface);
            assert!((20.0..=35.0).contains(&particle.size()));
        }
    }

    #[test]
    fn test_mounted_at_spawn_position() {
        let config = config("🎉");
        let (particle, surface, _rng) = spawn_at("🎉", Vec2::new(1.0, 1.0), &config);

        let visual = surface.get(particle.visual()).unwrap();
        assert_eq!(visual.transform.translate, Vec2::new(100.0, SPAWN_Y));
        assert_eq!(visual.opacity, 1.0);
    }

    #[test]
    fn test_dispose_is_idempotent() {
        let config = config("🎉");
        let (particle, mut surface, _rng) = spawn_at("🎉", Vec2::ZERO, &config);

        assert!(particle.dispose(&mut surface));
        assert!(!particle.dispose(&mut surface));
        assert!(surface.is_empty());
    }

    #[test]
    fn test_roll_ranges() {
        let config = ShowerConfig {
            fall_speed: 2.0,
            wind: 1.0,
            ..config("🎉")
        };
        let mut rng = ChaCha8Rng::seed_from_u64(99);
        let range = SpawnRange::new(0.0, WIDTH);

        for _ in 0..1000 {
            let spawn = ParticleSpawn::roll(&config, range, &mut rng).unwrap();
            assert!((0.7..=1.3).contains(&spawn.velocity.x));
            assert!((2.0..=3.0).contains(&spawn.velocity.y));
            assert!((0.0..WIDTH).contains(&spawn.position.x));
            assert_eq!(spawn.position.y, SPAWN_Y);
            assert_eq!(spawn.content.descriptor(), "🎉");
        }
    }

    #[test]
    fn test_roll_without_content() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let spawn = ParticleSpawn::roll(&ShowerConfig::default(), SpawnRange::new(0.0, 1.0), &mut rng);
        assert!(spawn.is_none());
    }
}
