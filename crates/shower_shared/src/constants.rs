//! # Shower Constants
//!
//! Built-in defaults and the fixed numbers of the fall simulation.
//!
//! **NOTE:** The `DEFAULT_*` values are the base layer of every config merge.
//! Changing one changes every session that does not override it.

// =============================================================================
// SESSION DEFAULTS
// =============================================================================

/// Session lifetime in milliseconds.
pub const DEFAULT_DURATION_MS: u64 = 6000;

/// Base vertical speed (units per tick).
pub const DEFAULT_FALL_SPEED: f32 = 1.5;

/// Degrees per tick when spinning is enabled.
pub const DEFAULT_SPIN_SPEED: f32 = 3.0;

/// Particles spawned by one burst.
pub const DEFAULT_PARTICLE_COUNT: u32 = 15;

/// Bursts per session.
pub const DEFAULT_BURST_COUNT: u32 = 8;

/// Edge length in px for image content.
pub const DEFAULT_IMAGE_SIZE: f32 = 32.0;

/// Overlay stacking order.
pub const DEFAULT_Z_INDEX: i32 = 9999;

/// Particle opacity (0-1).
pub const DEFAULT_OPACITY: f32 = 1.0;

/// Smallest text glyph size in px.
pub const DEFAULT_MIN_SIZE: f32 = 20.0;

/// Largest text glyph size in px.
pub const DEFAULT_MAX_SIZE: f32 = 35.0;

/// Horizontal velocity bias.
pub const DEFAULT_WIND: f32 = 0.0;

/// Trigger mode that starts a session as soon as the host is ready.
pub const AUTO_TRIGGER: &str = "app_load";

// =============================================================================
// SIMULATION
// =============================================================================

/// Delay between consecutive bursts (burst `i` fires at `i * BURST_INTERVAL_MS`).
pub const BURST_INTERVAL_MS: u64 = 200;

/// Vertical position of a freshly spawned particle, and the one it is moved
/// back to once it leaves the viewport.
pub const SPAWN_Y: f32 = -50.0;

/// Distance below the viewport bottom a particle may travel before respawning.
pub const RESPAWN_MARGIN: f32 = 100.0;

/// Half-width of the random horizontal drift, before wind.
pub const DRIFT_JITTER: f32 = 0.3;

/// Extra fraction of the fall speed added at random (vy in `[fall, fall * 1.5]`).
pub const FALL_SPEED_JITTER: f32 = 0.5;

// =============================================================================
// FRAME CLOCK
// =============================================================================

/// Frames per second of the reference tick source.
pub const TICK_RATE: u32 = 60;

/// Milliseconds between two frames of the reference tick source.
pub const FRAME_INTERVAL_MS: u64 = 1000 / TICK_RATE as u64;

// =============================================================================
// CONTENT CLASSIFICATION
// =============================================================================

/// File extensions (lowercase, no dot) treated as image references.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["jpg", "jpeg", "png", "gif", "webp", "svg"];

/// URL schemes (lowercase) treated as image references.
pub const IMAGE_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Data URI prefix (lowercase) treated as an image reference.
pub const IMAGE_DATA_URI_PREFIX: &str = "data:image/";
