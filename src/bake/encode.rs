use glam::{Vec3, Vec4};

use super::VertexNormal;
use crate::mesh::{Corner, MeshData};

/// Projected normals shorter than this (squared) have no usable direction.
pub const DEGENERATE_FRAME_EPSILON: f32 = 1e-12;

/// Packed per-corner color: RGB = tangent-space direction, A = length.
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CornerColor {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl CornerColor {
    /// Color of a zero tangent-space normal.
    pub const NEUTRAL: Self = Self::new(0.5, 0.5, 0.5, 0.0);

    pub const fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Maps a unit tangent-space direction from `[-1, 1]` into `[0, 1]`.
    pub fn pack(local: Vec3, length: f32) -> Self {
        let rgb = (local * 0.5 + 0.5).clamp(Vec3::ZERO, Vec3::ONE);
        Self::new(rgb.x, rgb.y, rgb.z, length)
    }

    /// Inverse of [`CornerColor::pack`]: tangent-space direction and length.
    pub fn unpack(&self) -> (Vec3, f32) {
        (Vec3::new(self.r, self.g, self.b) * 2.0 - 1.0, self.a)
    }

    pub fn to_vec4(self) -> Vec4 {
        Vec4::new(self.r, self.g, self.b, self.a)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct EncodedColors {
    pub colors: Vec<CornerColor>,
    /// Corners whose frame flattened the vertex normal to nothing.
    pub degenerate_corners: Vec<usize>,
}

/// Re-expresses `normal` in the corner's tangent frame.
///
/// Returns `None` when the projection has no length.
pub fn tangent_space_direction(corner: &Corner, normal: &VertexNormal) -> Option<Vec3> {
    let direction = normal.direction;
    let local = Vec3::new(
        direction.dot(corner.tangent),
        direction.dot(corner.bitangent),
        direction.dot(corner.normal),
    );
    // NaN frames count as degenerate too
    if !(local.length_squared() >= DEGENERATE_FRAME_EPSILON) {
        return None;
    }
    Some(local.normalize())
}

/// Encodes one color per corner from the finalized vertex normals.
pub fn encode(mesh: &MeshData, normals: &[VertexNormal]) -> EncodedColors {
    let mut encoded = EncodedColors {
        colors: Vec::with_capacity(mesh.corner_count()),
        degenerate_corners: Vec::new(),
    };

    for (corner_index, corner) in mesh.corners.iter().enumerate() {
        let normal = &normals[corner.vertex_index];
        let color = match tangent_space_direction(corner, normal) {
            Some(local) => CornerColor::pack(local, normal.length),
            None => {
                log::warn!(
                    "Degenerate tangent frame at corner {} (vertex {}) of {:?}",
                    corner_index,
                    corner.vertex_index,
                    mesh.name
                );
                encoded.degenerate_corners.push(corner_index);
                CornerColor {
                    a: normal.length,
                    ..CornerColor::NEUTRAL
                }
            }
        };
        encoded.colors.push(color);
    }

    encoded
}
