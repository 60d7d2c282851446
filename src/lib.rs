use std::io::Write;

pub mod bake;
pub mod math;
pub mod mesh;

pub use bake::{BakeConfig, BakeError, BakeResult, CornerColor, Strategy, VertexNormal};
pub use mesh::{load_meshes, MeshData};

/// Bakes one mesh and logs a one-line summary of the outcome.
pub fn bake_mesh(mesh: &MeshData, config: &BakeConfig) -> Result<BakeResult, BakeError> {
    let result = bake::bake(mesh, config)?;
    log::info!(
        "Baked {:?}: {} vertices, {} corners, max length {:.4}, {} degenerate corners",
        mesh.name,
        mesh.vertex_count(),
        result.colors.len(),
        result.max_length(),
        result.degenerate_corners.len()
    );
    Ok(result)
}

/// Bakes each mesh on its own. A failing mesh does not stop the others.
pub fn bake_meshes(meshes: &[MeshData], config: &BakeConfig) -> Vec<Result<BakeResult, BakeError>> {
    meshes
        .iter()
        .map(|mesh| {
            bake_mesh(mesh, config).map_err(|e| {
                log::warn!("Failed to bake {:?}: {}", mesh.name, e);
                e
            })
        })
        .collect()
}

/// Writes colors as tightly packed little-endian `f32` RGBA.
pub fn write_corner_colors<W: Write>(writer: &mut W, colors: &[CornerColor]) -> std::io::Result<()> {
    if cfg!(target_endian = "little") {
        writer.write_all(bytemuck::cast_slice(colors))
    } else {
        for color in colors {
            for channel in color.to_vec4().to_array() {
                writer.write_all(&channel.to_le_bytes())?;
            }
        }
        Ok(())
    }
}
