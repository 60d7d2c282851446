use glam::Vec3;

use super::normalize;
use super::{BakeError, Strategy};
use crate::math;
use crate::mesh::MeshData;

/// Floor on `|cos θ|` so faces nearly perpendicular to the vertex normal
/// cannot blow up the angle-weighted length.
pub const MIN_FACE_COSINE: f32 = 1e-8;

/// One normal per vertex. `length` carries the sharpness information that
/// ends up in the alpha channel.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct VertexNormal {
    pub direction: Vec3,
    pub length: f32,
}

impl VertexNormal {
    pub fn new(direction: Vec3, length: f32) -> Self {
        Self { direction, length }
    }

    pub fn unit(direction: Vec3) -> Self {
        Self::new(direction, 1.0)
    }

    /// Splits an unnormalized vector into direction and magnitude.
    pub fn from_scaled(v: Vec3) -> Self {
        Self::new(v.normalize_or_zero(), v.length())
    }
}

/// Reduces the per-corner normals of `mesh` to one normal per vertex.
///
/// The mesh must already be validated.
pub fn aggregate(mesh: &MeshData, strategy: Strategy) -> Result<Vec<VertexNormal>, BakeError> {
    log::debug!(
        "Aggregating {} corners onto {} vertices ({})",
        mesh.corner_count(),
        mesh.vertex_count(),
        strategy
    );

    match strategy {
        Strategy::Average => average(mesh),
        Strategy::VertexNormals => Ok(vertex_normals(mesh)),
        Strategy::Cross { normalize_distance } => cross(mesh, normalize_distance),
        Strategy::AngleWeight => angle_weight(mesh),
    }
}

fn average(mesh: &MeshData) -> Result<Vec<VertexNormal>, BakeError> {
    let mut sums = vec![Vec3::ZERO; mesh.vertex_count()];
    let mut counts = vec![0usize; mesh.vertex_count()];

    for corner in &mesh.corners {
        sums[corner.vertex_index] += corner.normal;
        counts[corner.vertex_index] += 1;
    }

    sums.into_iter()
        .zip(counts)
        .enumerate()
        .map(|(vertex, (sum, count))| {
            if count == 0 {
                return Err(BakeError::no_corners(vertex));
            }
            // Opposing corner normals cancel out to the zero vector
            Ok(VertexNormal::unit((sum / count as f32).normalize_or_zero()))
        })
        .collect()
}

fn vertex_normals(mesh: &MeshData) -> Vec<VertexNormal> {
    mesh.vertex_normals
        .iter()
        .map(|normal| VertexNormal::unit(*normal))
        .collect()
}

fn cross(mesh: &MeshData, normalize_distance: bool) -> Result<Vec<VertexNormal>, BakeError> {
    let mut fused: Vec<Option<Vec3>> = vec![None; mesh.vertex_count()];

    // Corners are folded in ascending index order; the fold is not associative
    for corner in &mesh.corners {
        let slot = &mut fused[corner.vertex_index];
        *slot = Some(match *slot {
            None => corner.normal,
            Some(acc) => math::intersect_normal_planes(acc, corner.normal),
        });
    }

    let mut normals = fused
        .into_iter()
        .enumerate()
        .map(|(vertex, acc)| {
            acc.map(VertexNormal::from_scaled)
                .ok_or_else(|| BakeError::no_corners(vertex))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if normalize_distance {
        normalize::force_unit(&mut normals);
    } else {
        normalize::rescale_to_max(&mut normals);
        normalize::clamp_lengths(&mut normals, 1.0);
    }

    Ok(normals)
}

fn angle_weight(mesh: &MeshData) -> Result<Vec<VertexNormal>, BakeError> {
    let mut angle_sums = vec![0.0f32; mesh.vertex_count()];
    let mut secant_sums = vec![0.0f32; mesh.vertex_count()];

    for face in &mesh.faces {
        for (prev, curr, next) in face.corner_triples() {
            let vertex = mesh.corners[curr].vertex_index;
            let angle = math::corner_angle(
                mesh.vertex_positions[mesh.corners[prev].vertex_index],
                mesh.vertex_positions[vertex],
                mesh.vertex_positions[mesh.corners[next].vertex_index],
            );
            // zero-length edges have no angle
            if !angle.is_finite() {
                continue;
            }
            let cosine = mesh.vertex_normals[vertex].dot(face.normal).abs();

            angle_sums[vertex] += angle;
            secant_sums[vertex] += angle / cosine.max(MIN_FACE_COSINE);
        }
    }

    mesh.vertex_normals
        .iter()
        .zip(angle_sums.iter().zip(&secant_sums))
        .enumerate()
        .map(|(vertex, (normal, (&angle_sum, &secant_sum)))| {
            if !(angle_sum > 0.0) {
                return Err(BakeError::no_angle_weight(vertex));
            }
            Ok(VertexNormal::new(*normal, secant_sum / angle_sum))
        })
        .collect()
}
