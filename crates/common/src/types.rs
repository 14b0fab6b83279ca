use glam::Vec3;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A 2D grid coordinate drawn from a sampling domain.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub u: f64,
    pub v: f64,
}

impl Sample {
    pub fn new(u: f64, v: f64) -> Self {
        Self { u, v }
    }
}

/// A sample lifted into 3D by a scalar field: `x = u`, `z = v`, `height = field(u, v)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldPoint {
    pub x: f64,
    pub height: f64,
    pub z: f64,
}

impl FieldPoint {
    pub fn new(x: f64, height: f64, z: f64) -> Self {
        Self { x, height, z }
    }

    /// Single-precision position for the GPU. Height maps to the vertical (Y) axis.
    pub fn to_vec3(self) -> Vec3 {
        Vec3::new(self.x as f32, self.height as f32, self.z as f32)
    }
}

/// 8-bit RGBA colour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const WHITE: Self = Self::rgb(255, 255, 255);
    pub const BLACK: Self = Self::rgb(0, 0, 0);

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    /// Normalized `[r, g, b, a]` in `0.0..=1.0`.
    pub fn to_f32_array(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            self.a as f32 / 255.0,
        ]
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::WHITE
    }
}

/// Identifier of one appended primitive group in a render batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub Uuid);

impl GroupId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GroupId {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn group_id_uniqueness() {
        let a = GroupId::new();
        let b = GroupId::new();
        assert_ne!(a, b);
    }

    #[test]
    fn field_point_height_is_vertical_axis() {
        let p = FieldPoint::new(1.0, 2.5, -3.0);
        assert_eq!(p.to_vec3(), Vec3::new(1.0, 2.5, -3.0));
    }

    #[test]
    fn color_normalization() {
        assert_eq!(Color::WHITE.to_f32_array(), [1.0, 1.0, 1.0, 1.0]);
        assert_eq!(Color::rgba(0, 0, 0, 0).to_f32_array(), [0.0; 4]);
        assert_eq!(Color::default(), Color::WHITE);
    }
}
