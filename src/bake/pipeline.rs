use super::aggregate::{aggregate, VertexNormal};
use super::encode::{encode, CornerColor};
use super::normalize::{max_length, normalize_lengths};
use super::{BakeConfig, BakeError};
use crate::mesh::MeshData;

/// Everything one bake produces for a mesh.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct BakeResult {
    /// Final per-vertex normals after the length policy.
    pub vertex_normals: Vec<VertexNormal>,
    /// One color per corner, in corner order.
    pub colors: Vec<CornerColor>,
    pub degenerate_corners: Vec<usize>,
}

impl BakeResult {
    pub fn max_length(&self) -> f32 {
        max_length(&self.vertex_normals)
    }
}

/// Runs aggregation, the length policy and tangent-space encoding on one mesh.
pub fn bake(mesh: &MeshData, config: &BakeConfig) -> Result<BakeResult, BakeError> {
    config.validate()?;

    if mesh.is_empty() {
        log::debug!("Mesh {:?} is empty, nothing to bake", mesh.name);
        return Ok(BakeResult::default());
    }
    mesh.validate()?;

    let mut vertex_normals = aggregate(mesh, config.strategy)?;
    normalize_lengths(&mut vertex_normals, config);
    let encoded = encode(mesh, &vertex_normals);

    Ok(BakeResult {
        vertex_normals,
        colors: encoded.colors,
        degenerate_corners: encoded.degenerate_corners,
    })
}
