//! Overlay rendering.
//!
//! Turns mounted visuals into batched render commands a host can draw with
//! whatever technology it has (DOM, canvas, GPU quads, terminal cells).

use bytemuck::{Pod, Zeroable};
use shower_shared::{Transform2D, Vec2};

use crate::layout::Rect;
use crate::surface::{Visual, VisualKind};

/// A render command for the overlay.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Text glyph.
    Glyph {
        /// Text content.
        text: String,
        /// Font size in px.
        font_size: f32,
        /// Placement.
        transform: Transform2D,
        /// Opacity (0-1).
        opacity: f32,
    },
    /// Image in a fixed square box.
    Image {
        /// Image source.
        source: String,
        /// Edge length in px.
        size: f32,
        /// Placement.
        transform: Transform2D,
        /// Opacity (0-1).
        opacity: f32,
    },
}

impl RenderCommand {
    /// Returns the placement shared by both command kinds.
    #[must_use]
    pub const fn transform(&self) -> &Transform2D {
        match self {
            Self::Glyph { transform, .. } | Self::Image { transform, .. } => transform,
        }
    }
}

/// A batch of render commands drawn at one stacking order.
#[derive(Debug, Clone)]
pub struct OverlayBatch {
    /// Commands in this batch.
    pub commands: Vec<RenderCommand>,
    /// Clip rect (the overlay's viewport).
    pub clip: Rect,
    /// Z-index for sorting against host content.
    pub z_index: i32,
}

impl OverlayBatch {
    /// Wraps the commands of one frame.
    #[must_use]
    pub fn new(z_index: i32, clip: Rect, commands: Vec<RenderCommand>) -> Self {
        Self {
            commands,
            clip,
            z_index,
        }
    }
}

/// Overlay renderer that collects and batches commands.
pub struct OverlayRenderer {
    /// All commands from the frame.
    commands: Vec<RenderCommand>,
    /// Stacking order of the frame being built.
    z_index: i32,
    /// Clip of the frame being built.
    clip: Rect,
    /// Final batches for rendering.
    batches: Vec<OverlayBatch>,
}

impl OverlayRenderer {
    /// Creates a new overlay renderer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            commands: Vec::with_capacity(256),
            z_index: 0,
            clip: Rect::ZERO,
            batches: Vec::with_capacity(1),
        }
    }

    /// Begins a new frame.
    pub fn begin_frame(&mut self, z_index: i32, clip: Rect) {
        self.commands.clear();
        self.batches.clear();
        self.z_index = z_index;
        self.clip = clip;
    }

    /// Adds multiple render commands.
    pub fn extend(&mut self, commands: impl IntoIterator<Item = RenderCommand>) {
        self.commands.extend(commands);
    }

    /// Ends the frame and returns batches for rendering.
    pub fn end_frame(&mut self) -> &[OverlayBatch] {
        // The overlay is a single layer, so a frame is a single batch
        let batch = OverlayBatch::new(self.z_index, self.clip, std::mem::take(&mut self.commands));

        self.batches.clear();
        self.batches.push(batch);

        &self.batches
    }
}

impl Default for OverlayRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Per-particle instance record for instanced quad rendering.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Pod, Zeroable)]
pub struct ParticleInstance {
    /// Translation in px.
    pub translate: Vec2,
    /// Rotation in degrees.
    pub rotation: f32,
    /// Glyph font size or image edge length in px.
    pub size: f32,
    /// Opacity (0-1).
    pub opacity: f32,
    /// 0 = glyph, 1 = image.
    pub kind: u32,
    /// Padding to 16-byte alignment.
    pub _pad: [u32; 2],
}

impl ParticleInstance {
    /// Instance kind tag for text glyphs.
    pub const KIND_GLYPH: u32 = 0;
    /// Instance kind tag for images.
    pub const KIND_IMAGE: u32 = 1;

    /// Builds the instance record of a visual.
    #[must_use]
    pub fn from_visual(visual: &Visual) -> Self {
        let (size, kind) = match &visual.kind {
            VisualKind::Glyph { font_size, .. } => (*font_size, Self::KIND_GLYPH),
            VisualKind::Image { size, .. } => (*size, Self::KIND_IMAGE),
        };
        Self {
            translate: visual.transform.translate,
            rotation: visual.transform.rotation_degrees(),
            size,
            opacity: visual.opacity,
            kind,
            _pad: [0; 2],
        }
    }

    /// Views an instance slice as raw bytes for a vertex buffer upload.
    #[must_use]
    pub fn as_bytes(instances: &[Self]) -> &[u8] {
        bytemuck::cast_slice(instances)
    }
}
