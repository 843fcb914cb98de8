//! Mathematical types shared between the simulation and the overlay.
//!
//! Screen space: origin at the top-left corner, +x right, +y down, units are px.

use std::fmt;

use bytemuck::{Pod, Zeroable};

/// 2D Vector - positions and velocities in screen space
///
/// Plain old data so it can sit directly in GPU instance records.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vec2 {
    /// X component
    pub x: f32,
    /// Y component
    pub y: f32,
}

impl Vec2 {
    /// Creates a new Vec2
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Zero vector
    pub const ZERO: Self = Self::new(0.0, 0.0);
}

impl std::ops::AddAssign for Vec2 {
    fn add_assign(&mut self, rhs: Self) {
        self.x += rhs.x;
        self.y += rhs.y;
    }
}

/// 2D placement of a visual: a translation plus an optional rotation.
///
/// `rotation` is `None` when the particle does not spin, which keeps the
/// rendered transform a pure translation.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Transform2D {
    /// Translation in px.
    pub translate: Vec2,
    /// Rotation in degrees, clockwise.
    pub rotation: Option<f32>,
}

impl Transform2D {
    /// Identity transform
    pub const IDENTITY: Self = Self::translation(Vec2::ZERO);

    /// Creates a pure translation.
    #[must_use]
    pub const fn translation(translate: Vec2) -> Self {
        Self {
            translate,
            rotation: None,
        }
    }

    /// Adds a rotation in degrees.
    #[must_use]
    pub const fn rotated(self, degrees: f32) -> Self {
        Self {
            translate: self.translate,
            rotation: Some(degrees),
        }
    }

    /// Returns the rotation in degrees, 0 when not rotated.
    #[must_use]
    pub fn rotation_degrees(&self) -> f32 {
        self.rotation.unwrap_or(0.0)
    }
}

/// CSS transform syntax, e.g. `translate3d(10px, 20px, 0) rotate(45deg)`.
///
/// This is the string a DOM host assigns to a visual's `style.transform`.
impl fmt::Display for Transform2D {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "translate3d({}px, {}px, 0)", self.translate.x, self.translate.y)?;
        if let Some(deg) = self.rotation {
            write!(f, " rotate({deg}deg)")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vec2_operations() {
        let mut a = Vec2::new(1.0, 2.0);
        a += Vec2::new(0.5, -1.0);
        assert_eq!(a, Vec2::new(1.5, 1.0));
        a += Vec2::ZERO;
        assert_eq!(a, Vec2::new(1.5, 1.0));
    }

    #[test]
    fn test_vec2_bytemuck() {
        let v = Vec2::new(1.0, 2.0);
        let bytes: &[u8] = bytemuck::bytes_of(&v);
        assert_eq!(bytes.len(), 8); // 2 * 4 bytes
    }

    #[test]
    fn test_transform_css_output() {
        let plain = Transform2D::translation(Vec2::new(10.0, 20.5));
        assert_eq!(plain.to_string(), "translate3d(10px, 20.5px, 0)");

        let spun = plain.rotated(45.0);
        assert_eq!(spun.to_string(), "translate3d(10px, 20.5px, 0) rotate(45deg)");
        assert_eq!(spun.rotation_degrees(), 45.0);
        assert_eq!(Transform2D::IDENTITY.rotation_degrees(), 0.0);
    }
}
