/// Reasons a mesh cannot be baked. Every variant names the element at fault.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum BakeError {
    #[error("vertex {vertex} is degenerate: {reason}")]
    DegenerateVertex { vertex: usize, reason: &'static str },

    #[error("unsupported strategy: {0:?}")]
    UnsupportedStrategy(String),

    #[error("length limit must be a non-negative number, got {0}")]
    InvalidLengthLimit(f32),

    #[error("corner {corner} references vertex {vertex} but the mesh has {vertex_count} vertices")]
    CornerVertexOutOfRange {
        corner: usize,
        vertex: usize,
        vertex_count: usize,
    },

    #[error("face {face} references corner {corner} but the mesh has {corner_count} corners")]
    FaceCornerOutOfRange {
        face: usize,
        corner: usize,
        corner_count: usize,
    },

    #[error("face {face} has {len} corners, at least 3 are required")]
    FaceTooSmall { face: usize, len: usize },

    #[error("expected {expected} vertex normals, found {found}")]
    VertexNormalCountMismatch { expected: usize, found: usize },
}

impl BakeError {
    pub(crate) fn no_corners(vertex: usize) -> Self {
        Self::DegenerateVertex {
            vertex,
            reason: "no incident corners",
        }
    }

    pub(crate) fn no_angle_weight(vertex: usize) -> Self {
        Self::DegenerateVertex {
            vertex,
            reason: "zero accumulated angle weight",
        }
    }
}
