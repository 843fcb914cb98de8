//! Content descriptor classification.
//!
//! A descriptor is an image reference when it is
//! - an absolute `http://` or `https://` URL,
//! - a `data:image/...` URI,
//! - or a name ending in a known image extension (`.png`, `.svg`, ...).
//!
//! Matching is case-insensitive. Everything else is drawn as text.

use shower_shared::constants::{IMAGE_DATA_URI_PREFIX, IMAGE_EXTENSIONS, IMAGE_SCHEMES};

/// How a content descriptor is rendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentKind {
    /// Image reference, drawn at the configured image size.
    Image,
    /// Text glyph, drawn at a random size in `[minSize, maxSize]`.
    Glyph,
}

/// Classifies a descriptor. Pure, no rendering side effects.
#[must_use]
pub fn classify(descriptor: &str) -> ContentKind {
    if is_image_reference(descriptor) {
        ContentKind::Image
    } else {
        ContentKind::Glyph
    }
}

/// Returns true if the descriptor refers to an image.
#[must_use]
pub fn is_image_reference(descriptor: &str) -> bool {
    IMAGE_SCHEMES
        .iter()
        .any(|scheme| starts_with_ignore_case(descriptor, scheme))
        || starts_with_ignore_case(descriptor, IMAGE_DATA_URI_PREFIX)
        || has_image_extension(descriptor)
}

fn starts_with_ignore_case(text: &str, prefix: &str) -> bool {
    text.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

fn has_image_extension(text: &str) -> bool {
    text.rsplit_once('.').is_some_and(|(_, ext)| {
        IMAGE_EXTENSIONS
            .iter()
            .any(|known| ext.eq_ignore_ascii_case(known))
    })
}

/// A content descriptor together with its classification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Content {
    /// The descriptor as configured.
    descriptor: String,
    /// Classification, computed once.
    kind: ContentKind,
}

impl Content {
    /// Classifies and wraps a descriptor.
    #[must_use]
    pub fn new(descriptor: impl Into<String>) -> Self {
        let descriptor = descriptor.into();
        let kind = classify(&descriptor);
        Self { descriptor, kind }
    }

    /// Returns the descriptor.
    #[must_use]
    pub fn descriptor(&self) -> &str {
        &self.descriptor
    }

    /// Returns the classification.
    #[must_use]
    pub const fn kind(&self) -> ContentKind {
        self.kind
    }

    /// Returns true for image references.
    #[must_use]
    pub const fn is_image(&self) -> bool {
        matches!(self.kind, ContentKind::Image)
    }
}
