//! # EMOJI SHOWER
//!
//! Celebratory particle overlay: emoji glyphs or small images fall down the
//! viewport for a fixed duration, then everything is cleaned up.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        ShowerController                          │
//! │                                                                  │
//! │  ConfigResolver ──> ShowerConfig ──> bursts ──> Particle × N     │
//! │  (default+global+call)               (timers)    │ update/tick   │
//! │                                                  ▼               │
//! │                                            RenderSurface         │
//! │                                            (shower_ui overlay)   │
//! └──────────────────────────┬───────────────────────────────────────┘
//!                            │ set_timeout / request_frame
//!                            ▼
//!                  Host (ManualHost, FrameDriver)
//! ```
//!
//! ## Modules
//!
//! - `config`: Config layers, merge and validation
//! - `content`: Image vs glyph classification
//! - `particle`: Spawn roll and per-tick kinematics
//! - `host`: Timer/frame/viewport seams and the deterministic host
//! - `controller`: Session lifecycle
//! - `driver`: Wall-clock pacing

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod content;
pub mod controller;
pub mod driver;
pub mod error;
pub mod host;
pub mod particle;

pub use shower_shared as shared;
pub use shower_ui as ui;

pub use config::{ConfigOverride, ConfigResolver, ShowerConfig, TriggerMode};
pub use content::{classify, Content, ContentKind};
pub use controller::{BurstRecord, SessionStats, ShowerController, ShowerState};
pub use driver::{DriverStats, FrameDriver};
pub use error::{ShowerError, ShowerResult};
pub use host::{
    EventPump, FrameHandle, Host, HostEvent, ManualHost, SessionId, TickSource, TimerHandle,
    TimerQueue, TimerTask,
};
pub use particle::{Particle, ParticleSpawn, SpawnRange};
