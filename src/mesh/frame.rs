use glam::{Vec2, Vec3, Vec4};

use crate::math;

/// Per-corner attributes as they come out of a model file, before the
/// shading frame is resolved.
#[derive(Copy, Clone, Debug, Default, PartialEq)]
pub struct PolygonCorner {
    pub vertex: usize,
    pub normal: Option<Vec3>,
    pub tex_coords: Option<Vec2>,
    // xyz = tangent direction, w = handedness for bitangent
    pub tangent: Option<Vec4>,
}

impl PolygonCorner {
    pub fn new(vertex: usize) -> Self {
        Self {
            vertex,
            ..Default::default()
        }
    }
}

/// Resolved tangent frame of one corner.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct CornerFrame {
    pub normal: Vec3,
    pub tangent: Vec3,
    pub bitangent: Vec3,
}

// Shading normal of a corner: its own if it has one, else the face's.
fn corner_normal(corner: &PolygonCorner, face_normal: Vec3) -> Vec3 {
    corner
        .normal
        .map(Vec3::normalize_or_zero)
        .filter(|normal| *normal != Vec3::ZERO)
        .unwrap_or(face_normal)
}

/// Polygons handed to MikkTSpace, with the tangents it writes back.
struct TangentSoup<'a> {
    positions: &'a [Vec3],
    polygons: &'a [Vec<PolygonCorner>],
    face_normals: &'a [Vec3],
    // index into `polygons` of each MikkTSpace face
    faces: Vec<usize>,
    tangents: Vec<Vec<Option<Vec4>>>,
}

impl TangentSoup<'_> {
    fn corner(&self, face: usize, vert: usize) -> &PolygonCorner {
        &self.polygons[self.faces[face]][vert]
    }
}

impl mikktspace::Geometry for TangentSoup<'_> {
    fn num_faces(&self) -> usize {
        self.faces.len()
    }

    fn num_vertices_of_face(&self, face: usize) -> usize {
        self.polygons[self.faces[face]].len()
    }

    fn position(&self, face: usize, vert: usize) -> [f32; 3] {
        self.positions[self.corner(face, vert).vertex].to_array()
    }

    fn normal(&self, face: usize, vert: usize) -> [f32; 3] {
        let face_normal = self.face_normals[self.faces[face]];
        corner_normal(self.corner(face, vert), face_normal).to_array()
    }

    fn tex_coord(&self, face: usize, vert: usize) -> [f32; 2] {
        self.corner(face, vert)
            .tex_coords
            .unwrap_or_default()
            .to_array()
    }

    fn set_tangent_encoded(&mut self, tangent: [f32; 4], face: usize, vert: usize) {
        let polygon = self.faces[face];
        self.tangents[polygon][vert] = Some(Vec4::from_array(tangent));
    }
}

/// Fills in MikkTSpace tangents for corners that came without one.
///
/// Only triangles and quads with texture coordinates on every corner take
/// part. Corners sharing a vertex, normal and texture coordinate get the same
/// tangent no matter which face they belong to. Everything else is returned
/// unchanged and resolved per corner by [`corner_frame`].
pub fn generate_tangents(
    positions: &[Vec3],
    polygons: &[Vec<PolygonCorner>],
    face_normals: &[Vec3],
) -> Vec<Vec<PolygonCorner>> {
    let faces: Vec<usize> = polygons
        .iter()
        .enumerate()
        .filter(|(_, polygon)| {
            (3..=4).contains(&polygon.len())
                && polygon.iter().all(|corner| corner.tex_coords.is_some())
        })
        .map(|(index, _)| index)
        .collect();

    let mut polygons = polygons.to_vec();
    if faces.is_empty() {
        return polygons;
    }

    let mut soup = TangentSoup {
        positions,
        polygons: &polygons,
        face_normals,
        faces,
        tangents: polygons.iter().map(|polygon| vec![None; polygon.len()]).collect(),
    };
    if !mikktspace::generate_tangents(&mut soup) {
        log::warn!("MikkTSpace tangent generation failed, using per-corner tangents");
        return polygons;
    }

    let tangents = soup.tangents;
    for (polygon, tangents) in polygons.iter_mut().zip(tangents) {
        for (corner, tangent) in polygon.iter_mut().zip(tangents) {
            if corner.tangent.is_none() {
                corner.tangent = tangent;
            }
        }
    }
    polygons
}

/// Builds the frame for corner `i` of `polygon`.
///
/// Tangent sources in order of preference: the corner's own tangent (from the
/// file or [`generate_tangents`]), a tangent derived from the texture
/// coordinates of the corner and its neighbours, and finally an arbitrary pair
/// perpendicular to the normal.
pub fn corner_frame(
    positions: &[Vec3],
    polygon: &[PolygonCorner],
    i: usize,
    face_normal: Vec3,
) -> CornerFrame {
    let n = polygon.len();
    let prev = &polygon[(i + n - 1) % n];
    let curr = &polygon[i];
    let next = &polygon[(i + 1) % n];

    let normal = corner_normal(curr, face_normal);

    if let Some(tangent) = curr.tangent {
        if let Some(frame) = orthogonalize(normal, tangent.truncate(), tangent.w) {
            return frame;
        }
    }

    if let (Some(uv_prev), Some(uv_curr), Some(uv_next)) =
        (prev.tex_coords, curr.tex_coords, next.tex_coords)
    {
        let edge1 = positions[next.vertex] - positions[curr.vertex];
        let edge2 = positions[prev.vertex] - positions[curr.vertex];
        let delta_uv1 = uv_next - uv_curr;
        let delta_uv2 = uv_prev - uv_curr;

        let r = delta_uv1.x * delta_uv2.y - delta_uv2.x * delta_uv1.y;
        if r.abs() > f32::EPSILON {
            let tangent = (edge1 * delta_uv2.y - edge2 * delta_uv1.y) / r;
            let bitangent = (edge2 * delta_uv1.x - edge1 * delta_uv2.x) / r;
            let handedness = if normal.cross(tangent).dot(bitangent) < 0.0 {
                -1.0
            } else {
                1.0
            };
            if let Some(frame) = orthogonalize(normal, tangent, handedness) {
                return frame;
            }
        }
    }

    let (tangent, bitangent) = normal.any_orthonormal_pair();
    CornerFrame {
        normal,
        tangent,
        bitangent,
    }
}

// Gram-Schmidt the tangent against the normal; None if they are parallel.
fn orthogonalize(normal: Vec3, tangent: Vec3, handedness: f32) -> Option<CornerFrame> {
    let tangent = (tangent - normal * normal.dot(tangent)).normalize_or_zero();
    if tangent == Vec3::ZERO {
        return None;
    }
    let sign = if handedness < 0.0 { -1.0 } else { 1.0 };
    Some(CornerFrame {
        normal,
        tangent,
        bitangent: normal.cross(tangent) * sign,
    })
}

/// Smooth per-vertex normals: incident face normals weighted by the
/// interior angle each face subtends at the vertex.
pub fn smooth_vertex_normals(
    positions: &[Vec3],
    polygons: &[Vec<PolygonCorner>],
    face_normals: &[Vec3],
) -> Vec<Vec3> {
    let mut sums = vec![Vec3::ZERO; positions.len()];

    for (polygon, face_normal) in polygons.iter().zip(face_normals) {
        let n = polygon.len();
        for i in 0..n {
            let prev = positions[polygon[(i + n - 1) % n].vertex];
            let curr = polygon[i].vertex;
            let next = positions[polygon[(i + 1) % n].vertex];
            let angle = math::corner_angle(prev, positions[curr], next);
            if angle.is_finite() {
                sums[curr] += *face_normal * angle;
            }
        }
    }

    sums.into_iter().map(Vec3::normalize_or_zero).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_square() -> (Vec<Vec3>, Vec<PolygonCorner>) {
        let positions = vec![
            Vec3::new(0.0, 0.0, 0.0),
            Vec3::new(1.0, 0.0, 0.0),
            Vec3::new(1.0, 1.0, 0.0),
            Vec3::new(0.0, 1.0, 0.0),
        ];
        let uvs = [
            Vec2::new(0.0, 0.0),
            Vec2::new(1.0, 0.0),
            Vec2::new(1.0, 1.0),
            Vec2::new(0.0, 1.0),
        ];
        let polygon = uvs
            .iter()
            .enumerate()
            .map(|(vertex, uv)| PolygonCorner {
                vertex,
                tex_coords: Some(*uv),
                ..Default::default()
            })
            .collect();
        (positions, polygon)
    }

    #[test]
    fn test_frame_from_tex_coords() {
        let (positions, polygon) = unit_square();
        for i in 0..4 {
            let frame = corner_frame(&positions, &polygon, i, Vec3::Z);
            assert!(frame.normal.abs_diff_eq(Vec3::Z, 1e-6));
            assert!(frame.tangent.abs_diff_eq(Vec3::X, 1e-6), "corner {}: {:?}", i, frame.tangent);
            assert!(frame.bitangent.abs_diff_eq(Vec3::Y, 1e-6));
        }
    }

    #[test]
    fn test_frame_mirrored_tex_coords_flips_bitangent() {
        let (positions, mut polygon) = unit_square();
        for corner in &mut polygon {
            let uv = corner.tex_coords.unwrap();
            corner.tex_coords = Some(Vec2::new(uv.x, 1.0 - uv.y));
        }
        let frame = corner_frame(&positions, &polygon, 0, Vec3::Z);
        assert!(frame.tangent.abs_diff_eq(Vec3::X, 1e-6));
        assert!(frame.bitangent.abs_diff_eq(-Vec3::Y, 1e-6));
    }

    #[test]
    fn test_frame_prefers_file_tangent() {
        let (positions, mut polygon) = unit_square();
        polygon[0].tangent = Some(Vec4::new(0.0, 1.0, 0.0, -1.0));
        let frame = corner_frame(&positions, &polygon, 0, Vec3::Z);
        assert!(frame.tangent.abs_diff_eq(Vec3::Y, 1e-6));
        assert!(frame.bitangent.abs_diff_eq(Vec3::X, 1e-6));
    }

    #[test]
    fn test_frame_fallback_is_orthonormal() {
        let (positions, mut polygon) = unit_square();
        for corner in &mut polygon {
            corner.tex_coords = None;
        }
        let frame = corner_frame(&positions, &polygon, 2, Vec3::Z);
        assert!(frame.tangent.dot(frame.normal).abs() < 1e-6);
        assert!(frame.bitangent.dot(frame.normal).abs() < 1e-6);
        assert!(frame.tangent.dot(frame.bitangent).abs() < 1e-6);
        assert!((frame.tangent.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_generated_tangents_agree_across_shared_edge() {
        let (positions, mut square) = unit_square();
        // shear the texture so each triangle has its own UV gradient
        square[1].tex_coords = Some(Vec2::new(1.0, 0.3));
        let polygons = vec![
            vec![square[0], square[1], square[2]],
            vec![square[0], square[2], square[3]],
        ];

        let polygons = generate_tangents(&positions, &polygons, &[Vec3::Z, Vec3::Z]);
        assert!(polygons.iter().flatten().all(|corner| corner.tangent.is_some()));

        let first = corner_frame(&positions, &polygons[0], 0, Vec3::Z);
        let second = corner_frame(&positions, &polygons[1], 0, Vec3::Z);
        let angle = first.tangent.angle_between(second.tangent).to_degrees();
        assert!(angle < 1e-2, "tangents at vertex 0 differ by {} degrees", angle);
        assert!(first.bitangent.abs_diff_eq(second.bitangent, 1e-4));
        assert!(first.tangent.dot(Vec3::Z).abs() < 1e-6);
    }

    #[test]
    fn test_generated_tangents_keep_file_tangent() {
        let (positions, mut square) = unit_square();
        square[0].tangent = Some(Vec4::new(0.0, 1.0, 0.0, -1.0));
        let polygons = generate_tangents(&positions, &[square], &[Vec3::Z]);
        assert_eq!(polygons[0][0].tangent, Some(Vec4::new(0.0, 1.0, 0.0, -1.0)));
        for corner in &polygons[0][1..] {
            let tangent = corner.tangent.unwrap();
            assert!(tangent.truncate().abs_diff_eq(Vec3::X, 1e-5), "{:?}", tangent);
            assert_eq!(tangent.w, 1.0);
        }
    }

    #[test]
    fn test_generated_tangents_skip_untextured() {
        let (positions, mut square) = unit_square();
        square[3].tex_coords = None;
        let polygons = generate_tangents(&positions, &[square.clone()], &[Vec3::Z]);
        assert_eq!(polygons, vec![square]);
    }

    #[test]
    fn test_smooth_normals_flat_square() {
        let (positions, polygon) = unit_square();
        let normals = smooth_vertex_normals(&positions, &[polygon], &[Vec3::Z]);
        assert_eq!(normals.len(), 4);
        for normal in normals {
            assert!(normal.abs_diff_eq(Vec3::Z, 1e-6));
        }
    }
}
