use glam::Vec3;

/// Below this squared length two plane normals are treated as parallel.
pub const PARALLEL_EPSILON: f32 = 1e-12;

/// Interior angle at `curr` between the edges to its neighbours in a polygon.
pub fn corner_angle(prev: Vec3, curr: Vec3, next: Vec3) -> f32 {
    let to_prev = prev - curr;
    let to_next = next - curr;
    to_prev.angle_between(to_next)
}

/// Fuses two normals by intersecting the planes that touch their tips.
///
/// Each normal `n` defines the plane `n·p = |n|²`. Their intersection line is
/// cut by the plane through the origin spanned by both normals, which gives
/// the point where the two offset planes meet closest to the origin. For
/// perpendicular unit normals this is their sum, the tip of a box corner.
///
/// Parallel normals have no such line and fall back to their midpoint.
pub fn intersect_normal_planes(n1: Vec3, n2: Vec3) -> Vec3 {
    let c = n1.cross(n2);
    let det = c.length_squared();
    if det < PARALLEL_EPSILON {
        return (n1 + n2) * 0.5;
    }

    let d1 = n1.length_squared();
    let d2 = n2.length_squared();

    // Cramer's rule for n1·p = d1, n2·p = d2, c·p = 0
    (n2.cross(c) * d1 + c.cross(n1) * d2) / det
}

/// Newell normal of a polygon, robust for non-planar and concave loops.
pub fn polygon_normal(points: &[Vec3]) -> Vec3 {
    let mut normal = Vec3::ZERO;
    for (i, curr) in points.iter().enumerate() {
        let next = points[(i + 1) % points.len()];
        normal.x += (curr.y - next.y) * (curr.z + next.z);
        normal.y += (curr.z - next.z) * (curr.x + next.x);
        normal.z += (curr.x - next.x) * (curr.y + next.y);
    }
    normal.normalize_or_zero()
}
