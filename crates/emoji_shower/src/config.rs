//! # Configuration Resolution
//!
//! Three layers, later wins, merged field by field:
//!
//! ```text
//! built-in defaults → global override → call-time override
//! ```
//!
//! The global override is process-wide and read at every trigger. The
//! call-time override only applies to the trigger it is passed to. The
//! merged result must carry at least one content descriptor, otherwise no
//! session starts.
//!
//! Overrides use the camelCase keys hosts already know:
//!
//! ```toml
//! emojis = ["🎉", "https://example.com/party.png"]
//! duration = 4000
//! enableSpin = true
//! zIndex = 10000
//! ```

use std::fmt;
use std::path::Path;

use serde::Deserialize;
use shower_shared::constants::{
    AUTO_TRIGGER, DEFAULT_BURST_COUNT, DEFAULT_DURATION_MS, DEFAULT_FALL_SPEED,
    DEFAULT_IMAGE_SIZE, DEFAULT_MAX_SIZE, DEFAULT_MIN_SIZE, DEFAULT_OPACITY,
    DEFAULT_PARTICLE_COUNT, DEFAULT_SPIN_SPEED, DEFAULT_WIND, DEFAULT_Z_INDEX,
};

use crate::error::{ShowerError, ShowerResult};

/// When a session starts without an explicit trigger call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
#[serde(from = "String")]
pub enum TriggerMode {
    /// Start as soon as the host is ready.
    #[default]
    AppLoad,
    /// Only start on explicit trigger calls. Keeps the original string.
    Manual(String),
}

impl TriggerMode {
    /// Returns the mode as configured.
    #[must_use]
    pub fn as_str(&self) -> &str {
        match self {
            Self::AppLoad => AUTO_TRIGGER,
            Self::Manual(mode) => mode,
        }
    }

    /// Returns true if the host-ready hook starts a session.
    #[must_use]
    pub fn is_auto(&self) -> bool {
        matches!(self, Self::AppLoad)
    }
}

impl From<String> for TriggerMode {
    fn from(mode: String) -> Self {
        if mode == AUTO_TRIGGER {
            Self::AppLoad
        } else {
            Self::Manual(mode)
        }
    }
}

impl From<&str> for TriggerMode {
    fn from(mode: &str) -> Self {
        Self::from(mode.to_owned())
    }
}

impl fmt::Display for TriggerMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Effective configuration of one session.
///
/// Built by [`ConfigResolver::resolve`] and owned by the session afterwards;
/// nothing mutates it once the session has started.
#[derive(Debug, Clone, PartialEq)]
pub struct ShowerConfig {
    /// Content descriptors: text glyphs or image references.
    pub emojis: Vec<String>,
    /// Session lifetime in milliseconds.
    pub duration_ms: u64,
    /// Base vertical speed per tick.
    pub fall_speed: f32,
    /// Rotate particles while they fall.
    pub enable_spin: bool,
    /// Degrees per tick when spinning.
    pub spin_speed: f32,
    /// Particles per burst.
    pub particle_count: u32,
    /// Number of bursts.
    pub burst_count: u32,
    /// Edge length in px for image content.
    pub image_size: f32,
    /// Auto-start mode.
    pub trigger: TriggerMode,
    /// Overlay stacking order.
    pub z_index: i32,
    /// Particle opacity (0-1).
    pub opacity: f32,
    /// Smallest text glyph size in px.
    pub min_size: f32,
    /// Largest text glyph size in px.
    pub max_size: f32,
    /// Horizontal velocity bias.
    pub wind: f32,
}

impl Default for ShowerConfig {
    fn default() -> Self {
        Self {
            emojis: Vec::new(),
            duration_ms: DEFAULT_DURATION_MS,
            fall_speed: DEFAULT_FALL_SPEED,
            enable_spin: false,
            spin_speed: DEFAULT_SPIN_SPEED,
            particle_count: DEFAULT_PARTICLE_COUNT,
            burst_count: DEFAULT_BURST_COUNT,
            image_size: DEFAULT_IMAGE_SIZE,
            trigger: TriggerMode::AppLoad,
            z_index: DEFAULT_Z_INDEX,
            opacity: DEFAULT_OPACITY,
            min_size: DEFAULT_MIN_SIZE,
            max_size: DEFAULT_MAX_SIZE,
            wind: DEFAULT_WIND,
        }
    }
}

impl ShowerConfig {
    /// Applies every field the override sets.
    #[must_use]
    pub fn merged(mut self, layer: &ConfigOverride) -> Self {
        if let Some(emojis) = &layer.emojis {
            self.emojis.clone_from(emojis);
        }
        if let Some(duration) = layer.duration {
            self.duration_ms = duration;
        }
        if let Some(fall_speed) = layer.fall_speed {
            self.fall_speed = fall_speed;
        }
        if let Some(enable_spin) = layer.enable_spin {
            self.enable_spin = enable_spin;
        }
        if let Some(spin_speed) = layer.spin_speed {
            self.spin_speed = spin_speed;
        }
        if let Some(particle_count) = layer.particle_count {
            self.particle_count = particle_count;
        }
        if let Some(burst_count) = layer.burst_count {
            self.burst_count = burst_count;
        }
        if let Some(image_size) = layer.image_size {
            self.image_size = image_size;
        }
        if let Some(trigger) = &layer.trigger {
            self.trigger = trigger.clone();
        }
        if let Some(z_index) = layer.z_index {
            self.z_index = z_index;
        }
        if let Some(opacity) = layer.opacity {
            self.opacity = opacity;
        }
        if let Some(min_size) = layer.min_size {
            self.min_size = min_size;
        }
        if let Some(max_size) = layer.max_size {
            self.max_size = max_size;
        }
        if let Some(wind) = layer.wind {
            self.wind = wind;
        }
        self
    }

    /// Checks the only hard requirement: at least one content descriptor.
    ///
    /// # Errors
    ///
    /// Returns [`ShowerError::EmptyContent`] if the content list is empty.
    pub fn validate(&self) -> ShowerResult<()> {
        if self.emojis.is_empty() {
            return Err(ShowerError::EmptyContent);
        }
        Ok(())
    }

    /// Total particles the session spawns, respawns not counted.
    #[must_use]
    pub fn planned_particles(&self) -> u64 {
        u64::from(self.burst_count) * u64::from(self.particle_count)
    }
}

/// One configuration layer. Unset fields fall through to the layer below.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConfigOverride {
    /// Content descriptors.
    pub emojis: Option<Vec<String>>,
    /// Session lifetime in milliseconds.
    pub duration: Option<u64>,
    /// Base vertical speed per tick.
    pub fall_speed: Option<f32>,
    /// Rotate particles.
    pub enable_spin: Option<bool>,
    /// Degrees per tick when spinning.
    pub spin_speed: Option<f32>,
    /// Particles per burst.
    pub particle_count: Option<u32>,
    /// Number of bursts.
    pub burst_count: Option<u32>,
    /// Edge length in px for image content.
    pub image_size: Option<f32>,
    /// Auto-start mode.
    pub trigger: Option<TriggerMode>,
    /// Overlay stacking order.
    pub z_index: Option<i32>,
    /// Particle opacity.
    pub opacity: Option<f32>,
    /// Smallest glyph size in px.
    pub min_size: Option<f32>,
    /// Largest glyph size in px.
    pub max_size: Option<f32>,
    /// Horizontal velocity bias.
    pub wind: Option<f32>,
}

impl ConfigOverride {
    /// Creates an override that only sets the content list.
    #[must_use]
    pub fn with_emojis<I, S>(emojis: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            emojis: Some(emojis.into_iter().map(Into::into).collect()),
            ..Self::default()
        }
    }

    /// Parses an override from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`ShowerError::InvalidConfig`] if the text does not deserialize.
    pub fn from_toml_str(text: &str) -> ShowerResult<Self> {
        toml::from_str(text).map_err(|e| ShowerError::InvalidConfig(e.to_string()))
    }

    /// Loads an override from a TOML file.
    ///
    /// # Errors
    ///
    /// Returns [`ShowerError::ConfigIo`] if the file cannot be read and
    /// [`ShowerError::InvalidConfig`] if its content does not deserialize.
    pub fn from_toml_file(path: impl AsRef<Path>) -> ShowerResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| ShowerError::ConfigIo {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::from_toml_str(&text)
    }
}

/// Merges defaults, the global override and a call-time override.
#[derive(Debug, Clone, Default)]
pub struct ConfigResolver {
    /// Process-wide override, read at every resolution.
    global: Option<ConfigOverride>,
}

impl ConfigResolver {
    /// Creates a resolver without a global override.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a resolver with a global override installed.
    #[must_use]
    pub fn with_global(global: ConfigOverride) -> Self {
        Self {
            global: Some(global),
        }
    }

    /// Installs or removes the global override.
    pub fn set_global(&mut self, global: Option<ConfigOverride>) {
        self.global = global;
    }

    /// Returns the global override, if any.
    #[must_use]
    pub fn global(&self) -> Option<&ConfigOverride> {
        self.global.as_ref()
    }

    /// Produces the effective configuration for one trigger.
    ///
    /// # Errors
    ///
    /// Returns [`ShowerError::EmptyContent`] if no layer provides content.
    pub fn resolve(&self, call: Option<&ConfigOverride>) -> ShowerResult<ShowerConfig> {
        let mut config = ShowerConfig::default();
        if let Some(global) = &self.global {
            config = config.merged(global);
        }
        if let Some(call) = call {
            config = config.merged(call);
        }
        config.validate()?;
        Ok(config)
    }

    /// Returns true if the host-ready hook should start a session.
    ///
    /// Requires an installed global override that sets `trigger` to
    /// `app_load` itself. The built-in default mode does not count.
    #[must_use]
    pub fn auto_starts(&self) -> bool {
        self.global
            .as_ref()
            .and_then(|global| global.trigger.as_ref())
            .is_some_and(TriggerMode::is_auto)
    }
}
