use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use anyhow::{Context, Result};
use glam::{Vec2, Vec3, Vec4};

use super::{MeshData, PolygonCorner};

/// Polygons of one object, with vertices welded by exact position.
#[derive(Debug, Default)]
struct PolygonSoup {
    name: String,
    positions: Vec<Vec3>,
    welded: HashMap<[u32; 3], usize>,
    polygons: Vec<Vec<PolygonCorner>>,
}

impl PolygonSoup {
    fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    fn weld(&mut self, position: Vec3) -> usize {
        // adding zero turns -0.0 into 0.0
        let key = (position + Vec3::ZERO).to_array().map(f32::to_bits);
        *self.welded.entry(key).or_insert_with(|| {
            self.positions.push(position);
            self.positions.len() - 1
        })
    }

    fn into_mesh(self) -> Result<MeshData> {
        Ok(MeshData::from_polygons(self.name, self.positions, &self.polygons)?)
    }
}

#[derive(Debug, Default)]
struct ObjData {
    positions: Vec<Vec3>,
    tex_coords: Vec<Vec2>,
    normals: Vec<Vec3>,
    objects: Vec<PolygonSoup>,
}

impl ObjData {
    fn current(&mut self) -> &mut PolygonSoup {
        if self.objects.is_empty() {
            self.objects.push(PolygonSoup::new("default"));
        }
        let last = self.objects.len() - 1;
        &mut self.objects[last]
    }

    fn process_face(&mut self, face_tokens: &[&str]) -> Result<()> {
        let mut polygon = Vec::with_capacity(face_tokens.len());

        for vertex_str in face_tokens {
            let indices: Vec<&str> = vertex_str.split('/').collect();

            let position = indices
                .first()
                .and_then(|s| resolve_index(s, self.positions.len()))
                .and_then(|i| self.positions.get(i).copied())
                .ok_or_else(|| anyhow::anyhow!("Invalid position index in face: {}", vertex_str))?;

            let tex_coords = match indices.get(1).filter(|s| !s.is_empty()) {
                Some(s) => Some(
                    resolve_index(s, self.tex_coords.len())
                        .and_then(|i| self.tex_coords.get(i).copied())
                        .ok_or_else(|| anyhow::anyhow!("Invalid texture coordinate index: {}", s))?,
                ),
                None => None,
            };

            let normal = match indices.get(2).filter(|s| !s.is_empty()) {
                Some(s) => Some(
                    resolve_index(s, self.normals.len())
                        .and_then(|i| self.normals.get(i).copied())
                        .ok_or_else(|| anyhow::anyhow!("Invalid normal index: {}", s))?,
                ),
                None => None,
            };

            let vertex = self.current().weld(position);
            polygon.push(PolygonCorner {
                vertex,
                normal,
                tex_coords,
                tangent: None,
            });
        }

        self.current().polygons.push(polygon);
        Ok(())
    }
}

// OBJ indices are 1-based, negative ones count back from the end
fn resolve_index(token: &str, len: usize) -> Option<usize> {
    let i = token.parse::<i64>().ok()?;
    match i {
        0 => None,
        i if i < 0 => usize::try_from(len as i64 + i).ok(),
        i => usize::try_from(i - 1).ok(),
    }
}

/// Loads every mesh in a model file as a bakeable snapshot.
///
/// Objects without faces are skipped.
pub fn load_meshes<P: AsRef<Path>>(path: P) -> Result<Vec<MeshData>> {
    let path = path.as_ref();
    let extension = path
        .extension()
        .and_then(std::ffi::OsStr::to_str)
        .unwrap_or("");

    let meshes = match extension.to_lowercase().as_str() {
        "glb" | "gltf" => load_gltf(path)?,
        "obj" => load_obj(path)?,
        _ => return Err(anyhow::anyhow!("Unsupported model format: {}", extension)),
    };

    Ok(meshes
        .into_iter()
        .filter(|mesh| {
            if mesh.faces.is_empty() {
                log::warn!("Skipping {:?}: no faces", mesh.name);
                return false;
            }
            true
        })
        .collect())
}

fn load_obj(path: &Path) -> Result<Vec<MeshData>> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let reader = BufReader::new(file);
    let mut obj_data = ObjData::default();

    for (line_number, line) in reader.lines().enumerate() {
        let line = line?;
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.is_empty() {
            continue;
        }

        let parse_floats = |count: usize| -> Result<Vec<f32>> {
            if tokens.len() <= count {
                return Err(anyhow::anyhow!(
                    "Line {}: expected {} values after {:?}",
                    line_number + 1,
                    count,
                    tokens[0]
                ));
            }
            tokens[1..=count]
                .iter()
                .map(|t| t.parse::<f32>().with_context(|| format!("Line {}", line_number + 1)))
                .collect()
        };

        match tokens[0] {
            "v" => {
                let v = parse_floats(3)?;
                obj_data.positions.push(Vec3::new(v[0], v[1], v[2]));
            }
            "vt" => {
                let vt = parse_floats(2)?;
                obj_data.tex_coords.push(Vec2::new(vt[0], vt[1]));
            }
            "vn" => {
                let vn = parse_floats(3)?;
                obj_data.normals.push(Vec3::new(vn[0], vn[1], vn[2]));
            }
            "f" => {
                if tokens.len() < 4 {
                    return Err(anyhow::anyhow!("Line {}: face needs at least 3 vertices", line_number + 1));
                }
                obj_data
                    .process_face(&tokens[1..])
                    .with_context(|| format!("Line {}", line_number + 1))?;
            }
            "o" => {
                let name = tokens.get(1).copied().unwrap_or("object");
                obj_data.objects.push(PolygonSoup::new(name));
            }
            _ => {}
        }
    }

    log::debug!(
        "Parsed {} positions, {} objects from {}",
        obj_data.positions.len(),
        obj_data.objects.len(),
        path.display()
    );

    obj_data
        .objects
        .into_iter()
        .map(PolygonSoup::into_mesh)
        .collect()
}

fn load_gltf(path: &Path) -> Result<Vec<MeshData>> {
    let (document, buffers, _images) = gltf::import(path)?;
    let mut meshes = Vec::new();

    for mesh in document.meshes() {
        let mesh_name = mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh_{}", mesh.index()));
        let primitive_count = mesh.primitives().len();

        for primitive in mesh.primitives() {
            let name = if primitive_count > 1 {
                format!("{}.{}", mesh_name, primitive.index())
            } else {
                mesh_name.clone()
            };

            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::warn!("Skipping {:?}: {:?} primitives are not supported", name, primitive.mode());
                continue;
            }

            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .ok_or_else(|| anyhow::anyhow!("No position data in {}", name))?
                .collect();
            let normals: Option<Vec<[f32; 3]>> = reader.read_normals().map(|iter| iter.collect());
            let tex_coords: Option<Vec<[f32; 2]>> = reader
                .read_tex_coords(0)
                .map(|iter| iter.into_f32().collect());
            let tangents: Option<Vec<[f32; 4]>> = reader.read_tangents().map(|iter| iter.collect());
            let indices: Vec<u32> = reader
                .read_indices()
                .map(|iter| iter.into_u32().collect())
                .unwrap_or_else(|| (0..positions.len() as u32).collect());

            let mut soup = PolygonSoup::new(name);
            for triangle in indices.chunks_exact(3) {
                let mut polygon = Vec::with_capacity(3);
                for &index in triangle {
                    let index = index as usize;
                    let position = positions
                        .get(index)
                        .copied()
                        .ok_or_else(|| anyhow::anyhow!("Index {} out of range in {}", index, soup.name))?;
                    polygon.push(PolygonCorner {
                        vertex: soup.weld(Vec3::from_array(position)),
                        normal: normals
                            .as_ref()
                            .and_then(|n| n.get(index))
                            .map(|n| Vec3::from_array(*n)),
                        tex_coords: tex_coords
                            .as_ref()
                            .and_then(|t| t.get(index))
                            .map(|t| Vec2::from_array(*t)),
                        tangent: tangents
                            .as_ref()
                            .and_then(|t| t.get(index))
                            .map(|t| Vec4::from_array(*t)),
                    });
                }
                soup.polygons.push(polygon);
            }
            meshes.push(soup.into_mesh()?);
        }
    }

    Ok(meshes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_index() {
        assert_eq!(resolve_index("1", 4), Some(0));
        assert_eq!(resolve_index("4", 4), Some(3));
        assert_eq!(resolve_index("-1", 4), Some(3));
        assert_eq!(resolve_index("-4", 4), Some(0));
        assert_eq!(resolve_index("-5", 4), None);
        assert_eq!(resolve_index("0", 4), None);
        assert_eq!(resolve_index("x", 4), None);
    }

    #[test]
    fn test_weld_shares_identical_positions() {
        let mut soup = PolygonSoup::new("weld");
        let a = soup.weld(Vec3::new(1.0, 2.0, 3.0));
        let b = soup.weld(Vec3::new(1.0, 2.0, 3.5));
        let c = soup.weld(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_eq!(soup.positions.len(), 2);
    }

    #[test]
    fn test_weld_ignores_sign_of_zero() {
        let mut soup = PolygonSoup::new("weld");
        let a = soup.weld(Vec3::new(0.0, 1.0, 0.0));
        let b = soup.weld(Vec3::new(-0.0, 1.0, -0.0));
        assert_eq!(a, b);
        assert_eq!(soup.positions.len(), 1);
    }
}
