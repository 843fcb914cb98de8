//! # Shower Shared
//!
//! Common types used by the particle simulation and the overlay renderer.
//!
//! ## CRITICAL RULE
//!
//! This crate must NEVER depend on:
//! - a scheduler or timer implementation
//! - the overlay surface
//! - any host or display crate
//!
//! If you need surface types, put them in `shower_ui`.

#![deny(missing_docs)]
#![deny(unsafe_code)]

pub mod constants;
pub mod math;

pub use constants::{
    AUTO_TRIGGER, BURST_INTERVAL_MS, FRAME_INTERVAL_MS, IMAGE_EXTENSIONS, RESPAWN_MARGIN,
    SPAWN_Y, TICK_RATE,
};
pub use math::{Transform2D, Vec2};
