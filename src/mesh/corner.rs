use glam::Vec3;

/// One face's use of a vertex, carrying its own shading frame.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Corner {
    pub vertex_index: usize,
    pub normal: Vec3,
    pub tangent: Vec3,
    pub bitangent: Vec3,
}

impl Corner {
    pub fn new(vertex_index: usize, normal: Vec3, tangent: Vec3, bitangent: Vec3) -> Self {
        Self {
            vertex_index,
            normal,
            tangent,
            bitangent,
        }
    }
}

/// A polygon as a cyclic list of corner indices.
#[derive(Clone, Debug, PartialEq)]
pub struct Face {
    pub corner_indices: Vec<usize>,
    pub normal: Vec3,
}

impl Face {
    pub fn new(corner_indices: Vec<usize>, normal: Vec3) -> Self {
        Self {
            corner_indices,
            normal,
        }
    }

    /// Walks `(prev, curr, next)` corner triples in winding order.
    pub fn corner_triples(&self) -> impl Iterator<Item = (usize, usize, usize)> + '_ {
        let n = self.corner_indices.len();
        (0..n).map(move |i| {
            (
                self.corner_indices[(i + n - 1) % n],
                self.corner_indices[i],
                self.corner_indices[(i + 1) % n],
            )
        })
    }
}
