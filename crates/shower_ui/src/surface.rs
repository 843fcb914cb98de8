//! The overlay surface that hosts particle visuals.
//!
//! One surface spans the full viewport. It is created on first use and
//! reused by every later session; only its stacking order and size change.

use std::collections::BTreeMap;

use shower_shared::Transform2D;

use crate::layout::Rect;
use crate::render::{OverlayBatch, OverlayRenderer, ParticleInstance, RenderCommand};

/// Unique identifier for a mounted visual.
///
/// Identifiers increase with mount order and are never reused by a surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VisualId(pub u64);

impl VisualId {
    /// Creates a new visual ID.
    #[must_use]
    pub const fn new(id: u64) -> Self {
        Self(id)
    }
}

/// What a visual draws.
#[derive(Debug, Clone, PartialEq)]
pub enum VisualKind {
    /// A text glyph (usually an emoji) drawn at a font size.
    Glyph {
        /// Text content.
        text: String,
        /// Font size in px.
        font_size: f32,
    },
    /// An image drawn into a fixed square box, aspect preserved.
    Image {
        /// Image source (URL, data URI or file name).
        source: String,
        /// Edge length of the box in px.
        size: f32,
    },
}

/// A positioned visual on the overlay.
#[derive(Debug, Clone, PartialEq)]
pub struct Visual {
    /// Content to draw.
    pub kind: VisualKind,
    /// Opacity (0-1).
    pub opacity: f32,
    /// Current placement.
    pub transform: Transform2D,
}

impl Visual {
    /// Creates a text glyph visual.
    #[must_use]
    pub fn glyph(text: impl Into<String>, font_size: f32, opacity: f32) -> Self {
        Self {
            kind: VisualKind::Glyph {
                text: text.into(),
                font_size,
            },
            opacity,
            transform: Transform2D::IDENTITY,
        }
    }

    /// Creates an image visual.
    #[must_use]
    pub fn image(source: impl Into<String>, size: f32, opacity: f32) -> Self {
        Self {
            kind: VisualKind::Image {
                source: source.into(),
                size,
            },
            opacity,
            transform: Transform2D::IDENTITY,
        }
    }

    /// Sets the initial transform.
    #[must_use]
    pub fn with_transform(mut self, transform: Transform2D) -> Self {
        self.transform = transform;
        self
    }

    /// Converts the visual into its render command.
    #[must_use]
    pub fn to_command(&self) -> RenderCommand {
        match &self.kind {
            VisualKind::Glyph { text, font_size } => RenderCommand::Glyph {
                text: text.clone(),
                font_size: *font_size,
                transform: self.transform,
                opacity: self.opacity,
            },
            VisualKind::Image { source, size } => RenderCommand::Image {
                source: source.clone(),
                size: *size,
                transform: self.transform,
                opacity: self.opacity,
            },
        }
    }
}

/// Full-viewport, non-interactive overlay layer.
pub struct RenderSurface {
    /// Area covered by the overlay.
    viewport: Rect,
    /// Stacking order relative to the host content.
    z_index: i32,
    /// Mounted visuals, iterated in mount order.
    children: BTreeMap<VisualId, Visual>,
    /// ID counter for generating unique IDs.
    next_id: u64,
}

impl RenderSurface {
    /// Creates a new empty overlay covering `viewport`.
    #[must_use]
    pub fn new(viewport: Rect, z_index: i32) -> Self {
        tracing::debug!(
            width = viewport.width,
            height = viewport.height,
            z_index,
            "overlay surface created"
        );
        Self {
            viewport,
            z_index,
            children: BTreeMap::new(),
            next_id: 1,
        }
    }

    /// Returns the stacking order.
    #[must_use]
    pub const fn z_index(&self) -> i32 {
        self.z_index
    }

    /// Sets the stacking order.
    pub fn set_z_index(&mut self, z_index: i32) {
        self.z_index = z_index;
    }

    /// Returns the covered area.
    #[must_use]
    pub const fn viewport(&self) -> Rect {
        self.viewport
    }

    /// Follows a host resize. The overlay always spans the full viewport.
    pub fn resize(&mut self, viewport: Rect) {
        self.viewport = viewport;
    }

    /// The overlay never intercepts input, whatever is mounted on it.
    #[must_use]
    pub const fn intercepts_input(&self, _x: f32, _y: f32) -> bool {
        false
    }

    /// Mounts a visual as a child and returns its ID.
    pub fn mount(&mut self, visual: Visual) -> VisualId {
        let id = VisualId::new(self.next_id);
        self.next_id += 1;
        self.children.insert(id, visual);
        id
    }

    /// Detaches a visual.
    ///
    /// Returns false if it was already detached; detaching twice is harmless.
    pub fn unmount(&mut self, id: VisualId) -> bool {
        self.children.remove(&id).is_some()
    }

    /// Pushes a new transform to a mounted visual.
    ///
    /// Returns false if the visual is not mounted.
    pub fn set_transform(&mut self, id: VisualId, transform: Transform2D) -> bool {
        match self.children.get_mut(&id) {
            Some(visual) => {
                visual.transform = transform;
                true
            }
            None => false,
        }
    }

    /// Gets a mounted visual by ID.
    #[must_use]
    pub fn get(&self, id: VisualId) -> Option<&Visual> {
        self.children.get(&id)
    }

    /// Returns true if the visual is mounted.
    #[must_use]
    pub fn contains(&self, id: VisualId) -> bool {
        self.children.contains_key(&id)
    }

    /// Number of mounted visuals.
    #[must_use]
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// Returns true if nothing is mounted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Iterates mounted visuals in mount order.
    pub fn iter(&self) -> impl Iterator<Item = (VisualId, &Visual)> + '_ {
        self.children.iter().map(|(id, visual)| (*id, visual))
    }

    /// Renders every mounted visual into one batch at the overlay's stacking order.
    pub fn render<'a>(&self, renderer: &'a mut OverlayRenderer) -> &'a [OverlayBatch] {
        renderer.begin_frame(self.z_index, self.viewport);
        renderer.extend(self.children.values().map(Visual::to_command));
        renderer.end_frame()
    }

    /// Writes one GPU instance per mounted visual into `out` (cleared first).
    pub fn write_instances(&self, out: &mut Vec<ParticleInstance>) {
        out.clear();
        out.extend(self.children.values().map(ParticleInstance::from_visual));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shower_shared::Vec2;

    fn surface() -> RenderSurface {
        RenderSurface::new(Rect::viewport(800.0, 600.0), 9999)
    }

    #[test]
    fn test_mount_and_unmount() {
        let mut surface = surface();

        let a = surface.mount(Visual::glyph("🎉", 24.0, 1.0));
        let b = surface.mount(Visual::image("https://x/y.png", 32.0, 1.0));

        assert_ne!(a, b);
        assert_eq!(surface.len(), 2);
        assert!(surface.unmount(a));
        assert!(!surface.unmount(a)); // Idempotent
        assert_eq!(surface.len(), 1);
        assert!(surface.contains(b));
    }

    #[test]
    fn test_ids_never_reused() {
        let mut surface = surface();

        let a = surface.mount(Visual::glyph("a", 20.0, 1.0));
        surface.unmount(a);
        let b = surface.mount(Visual::glyph("b", 20.0, 1.0));

        assert!(b > a);
    }

    #[test]
    fn test_set_transform() {
        let mut surface = surface();
        let id = surface.mount(Visual::glyph("🎉", 24.0, 1.0));

        let t = Transform2D::translation(Vec2::new(5.0, 6.0)).rotated(30.0);
        assert!(surface.set_transform(id, t));
        assert_eq!(surface.get(id).map(|v| v.transform), Some(t));

        surface.unmount(id);
        assert!(!surface.set_transform(id, t));
    }

    #[test]
    fn test_never_intercepts_input() {
        let mut surface = surface();
        surface.mount(Visual::glyph("🎉", 24.0, 1.0));

        assert!(!surface.intercepts_input(0.0, 0.0));
        assert!(!surface.intercepts_input(400.0, 300.0));
    }

    #[test]
    fn test_render_batches_at_z_index() {
        let mut surface = surface();
        surface.mount(Visual::glyph("🎉", 24.0, 0.5));
        surface.mount(Visual::image("cat.gif", 32.0, 1.0));
        surface.set_z_index(42);

        let mut renderer = OverlayRenderer::new();
        let batches = surface.render(&mut renderer);

        assert_eq!(batches.len(), 1);
        assert_eq!(batches[0].z_index, 42);
        assert_eq!(batches[0].commands.len(), 2);
        assert!(matches!(batches[0].commands[0], RenderCommand::Glyph { .. }));
        assert!(matches!(batches[0].commands[1], RenderCommand::Image { size, .. } if size == 32.0));
    }
}
