use glam::Vec3;

use super::frame::{self, PolygonCorner};
use super::{Corner, Face};
use crate::bake::BakeError;
use crate::math;

/// Read-only snapshot of one mesh as handed over by a mesh adapter.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub name: String,
    pub vertex_positions: Vec<Vec3>,
    /// Smoothed per-vertex normals supplied alongside the mesh.
    pub vertex_normals: Vec<Vec3>,
    pub corners: Vec<Corner>,
    pub faces: Vec<Face>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.vertex_positions.len()
    }

    pub fn corner_count(&self) -> usize {
        self.corners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vertex_positions.is_empty() || self.corners.is_empty()
    }

    /// Builds a snapshot from polygons over shared vertex positions.
    ///
    /// Corners are numbered in polygon order. Face normals, smoothed vertex
    /// normals and per-corner tangent frames are derived from the geometry
    /// wherever the polygon corners do not carry them. Tangents of textured
    /// triangles and quads come from MikkTSpace so they agree across faces.
    pub fn from_polygons(
        name: impl Into<String>,
        vertex_positions: Vec<Vec3>,
        polygons: &[Vec<PolygonCorner>],
    ) -> Result<Self, BakeError> {
        let vertex_count = vertex_positions.len();
        if let Some((corner, vertex)) = polygons
            .iter()
            .flatten()
            .map(|corner| corner.vertex)
            .enumerate()
            .find(|&(_, vertex)| vertex >= vertex_count)
        {
            return Err(BakeError::CornerVertexOutOfRange {
                corner,
                vertex,
                vertex_count,
            });
        }

        let face_normals: Vec<Vec3> = polygons
            .iter()
            .map(|polygon| {
                let points: Vec<Vec3> = polygon
                    .iter()
                    .map(|corner| vertex_positions[corner.vertex])
                    .collect();
                math::polygon_normal(&points)
            })
            .collect();

        let vertex_normals =
            frame::smooth_vertex_normals(&vertex_positions, polygons, &face_normals);
        let polygons = frame::generate_tangents(&vertex_positions, polygons, &face_normals);

        let mut corners = Vec::with_capacity(polygons.iter().map(Vec::len).sum());
        let mut faces = Vec::with_capacity(polygons.len());
        for (polygon, face_normal) in polygons.iter().zip(&face_normals) {
            let first = corners.len();
            for i in 0..polygon.len() {
                let frame = frame::corner_frame(&vertex_positions, polygon, i, *face_normal);
                corners.push(Corner::new(
                    polygon[i].vertex,
                    frame.normal,
                    frame.tangent,
                    frame.bitangent,
                ));
            }
            faces.push(Face::new((first..corners.len()).collect(), *face_normal));
        }

        Ok(Self {
            name: name.into(),
            vertex_positions,
            vertex_normals,
            corners,
            faces,
        })
    }

    /// Checks every cross reference so the bake stages can index freely.
    pub fn validate(&self) -> Result<(), BakeError> {
        let vertex_count = self.vertex_count();
        if self.vertex_normals.len() != vertex_count {
            return Err(BakeError::VertexNormalCountMismatch {
                expected: vertex_count,
                found: self.vertex_normals.len(),
            });
        }

        for (corner_index, corner) in self.corners.iter().enumerate() {
            if corner.vertex_index >= vertex_count {
                return Err(BakeError::CornerVertexOutOfRange {
                    corner: corner_index,
                    vertex: corner.vertex_index,
                    vertex_count,
                });
            }
        }

        for (face_index, face) in self.faces.iter().enumerate() {
            if face.corner_indices.len() < 3 {
                return Err(BakeError::FaceTooSmall {
                    face: face_index,
                    len: face.corner_indices.len(),
                });
            }
            if let Some(&corner) = face
                .corner_indices
                .iter()
                .find(|&&corner| corner >= self.corners.len())
            {
                return Err(BakeError::FaceCornerOutOfRange {
                    face: face_index,
                    corner,
                    corner_count: self.corners.len(),
                });
            }
        }

        Ok(())
    }
}
