//! # Shower UI
//!
//! The overlay layer that hosts falling particle visuals.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     OVERLAY PIPELINE                      │
//! ├──────────────────────────────────────────────────────────┤
//! │  mount(Visual) → set_transform(id) → render() → batches  │
//! │       ↓                ↓                 ↓          ↓    │
//! │   VisualId       per-tick update    RenderCommand  host  │
//! └──────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Contract
//!
//! - Spans the whole viewport and never intercepts input.
//! - Stacking order is reassigned at every trigger.
//! - Has no behavior beyond mounting and unmounting children.

#![deny(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::pedantic)]

pub mod layout;
pub mod render;
pub mod surface;

pub use layout::Rect;
pub use render::{OverlayBatch, OverlayRenderer, ParticleInstance, RenderCommand};
pub use surface::{RenderSurface, Visual, VisualId, VisualKind};
