use std::cmp::Ordering;

use crate::triangulation::TriangulationError;
use crate::types::{Float, Triangle, Vertex, Vertex2d};

#[cfg(feature = "more_profile_traces")]
use tracing::{span, Level};

/// Default tolerance of [is_vertex_in_triangle_circumcircle]. A determinant must be strictly greater for the vertex to be inside.
pub const DEFAULT_CIRCUMCIRCLE_EPSILON: Float = 1e-9;
/// Default tolerance of [are_vertices_collinear], relative to the extent of the vertices
pub const DEFAULT_COLLINEARITY_EPSILON: Float = 1e-10;

/// Signed area of the triangle (a, b, c): positive if counter-clockwise, negative if clockwise, zero if degenerate.
#[inline]
pub fn triangle_signed_area(a: Vertex, b: Vertex, c: Vertex) -> Float {
    0.5 * ((b.x - a.x) * (c.y - a.y) - (c.x - a.x) * (b.y - a.y))
}

/// Raw in-circle determinant of `p` against the triangle, with the vertices taken in the given order.
///
/// The triangle is translated so that `p` is the origin, then
///
/// ```text
/// | ax  ay  ax²+ay² |
/// | bx  by  bx²+by² |
/// | cx  cy  cx²+cy² |
/// ```
///
/// is expanded along its third column. For a counter-clockwise triangle, the result is positive when `p` is inside the circumcircle.
#[inline(always)]
pub fn circumcircle_determinant(triangle: &[Vertex; 3], p: Vertex) -> Float {
    let ax = triangle[0].x - p.x;
    let ay = triangle[0].y - p.y;
    let bx = triangle[1].x - p.x;
    let by = triangle[1].y - p.y;
    let cx = triangle[2].x - p.x;
    let cy = triangle[2].y - p.y;

    (ax * ax + ay * ay) * (bx * cy - cx * by) - (bx * bx + by * by) * (ax * cy - cx * ay)
        + (cx * cx + cy * cy) * (ax * by - bx * ay)
}

/// Checks if vertex `p` is strictly inside the circumcircle of `triangle`
/// - `triangle` can be in any winding order, it is evaluated in a counter-clockwise order
/// - `epsilon` is the margin the determinant must exceed, see [DEFAULT_CIRCUMCIRCLE_EPSILON]
///
/// Uses a plain floating point determinant: vertices extremely close to the circle can be misclassified.
#[inline(always)]
pub fn is_vertex_in_triangle_circumcircle(
    triangle: &[Vertex; 3],
    p: Vertex,
    epsilon: Float,
) -> bool {
    #[cfg(feature = "more_profile_traces")]
    let _span = span!(Level::TRACE, "is_vertex_in_triangle_circumcircle").entered();

    let triangle = Triangle { verts: *triangle }.to_counter_clockwise();
    circumcircle_determinant(&triangle.verts, p) > epsilon
}

/// Total order on vertices, lexicographic on x then y.
///
/// Only meant to sort or deduplicate vertices, it carries no geometric meaning.
#[inline]
pub fn lexicographic_cmp(a: Vertex, b: Vertex) -> Ordering {
    a.x.partial_cmp(&b.x)
        .unwrap_or(Ordering::Equal)
        .then(a.y.partial_cmp(&b.y).unwrap_or(Ordering::Equal))
}

/// Hashable key of a vertex, equal for two vertices if and only if their coordinates are exactly equal.
///
/// `-0.` and `0.` compare equal as floats, they are mapped to the same key.
#[inline]
pub(crate) fn exact_vertex_key(vertex: Vertex) -> [u64; 2] {
    [(vertex.x + 0.).to_bits(), (vertex.y + 0.).to_bits()]
}

/// Checks that all the coordinates of the vertices are finite (no NaN nor infinity)
pub fn validate_vertices<T: Vertex2d>(vertices: &[T]) -> Result<(), TriangulationError> {
    match vertices
        .iter()
        .position(|v| !v.x().is_finite() || !v.y().is_finite())
    {
        Some(index) => Err(TriangulationError::InvalidVertex { index }),
        None => Ok(()),
    }
}

/// Returns `true` if all the vertices lie on the same line, up to `epsilon`. Identical vertices are considered collinear.
///
/// Coordinates are scaled by the largest distance (per axis) from the first vertex to the others, and the vertices are compared
/// to the line from the first vertex to the farthest one. `epsilon` is a distance to that line, in this scaled space.
///
/// Returns `false` when the distances between the vertices overflow, the input is then rejected by the super-triangle construction.
pub fn are_vertices_collinear(vertices: &[Vertex], epsilon: Float) -> bool {
    let Some(&first) = vertices.first() else {
        return true;
    };
    let mut scale = 0.;
    let mut farthest = first;
    for &vertex in vertices.iter() {
        let distance = (vertex - first).abs().max_element();
        if distance > scale {
            scale = distance;
            farthest = vertex;
        }
    }
    if scale == 0. {
        return true;
    }
    if !scale.is_finite() {
        return false;
    }

    let direction = ((farthest - first) / scale).normalize();
    vertices
        .iter()
        .all(|&v| direction.perp_dot((v - first) / scale).abs() <= epsilon)
}

/// Returns `true` if the super-triangle can be used by the circumcircle predicate without overflowing
pub(crate) fn is_super_triangle_in_range(super_vertices: &[Vertex; 3]) -> bool {
    if !super_vertices.iter().all(|v| v.is_finite()) {
        return false;
    }
    let centroid = (super_vertices[0] + super_vertices[1] + super_vertices[2]) / 3.;
    circumcircle_determinant(super_vertices, centroid).is_finite()
}

///////////////////////////////////////////////////////////
///                                                     ///
///                        Tests                        ///
///                                                     ///
///////////////////////////////////////////////////////////
