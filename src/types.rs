use std::cmp::Ordering;

use arrayvec::ArrayVec;
use glam::DVec2;

use crate::utils::{lexicographic_cmp, triangle_signed_area};

pub mod vertex;
pub use vertex::Vertex2d;

/// The float type used in the algorithm's computations
pub type Float = f64;
/// The vertex type used in the algorithm's computations
pub type Vertex = DVec2;

#[cfg(not(feature = "u64_indexes"))]
pub type IndexType = u32;
#[cfg(feature = "u64_indexes")]
pub type IndexType = u64;

pub type VertexId = IndexType;

pub type TriangleVertexIndex = u8;
pub const VERT_1: TriangleVertexIndex = 0;
pub const VERT_2: TriangleVertexIndex = 1;
pub const VERT_3: TriangleVertexIndex = 2;

pub type TriangleVertices = (Vertex, Vertex, Vertex);

/// Oriented edge between two vertices of the working buffer.
///
/// Equality through `==` is directed. Cavity boundaries compare edges with [Edge::undirected_equals]
/// or through their [Edge::undirected_key].
#[derive(Debug, Copy, Clone, Eq, Hash, PartialEq)]
pub struct Edge {
    pub from: VertexId,
    pub to: VertexId,
}
impl Edge {
    #[inline]
    pub fn new(from: VertexId, to: VertexId) -> Self {
        Self { from, to }
    }

    #[inline]
    pub fn undirected_equals(&self, other: &Edge) -> bool {
        self == other || (self.from == other.to && self.to == other.from)
    }

    /// Key shared by both orientations of the edge
    #[inline]
    pub fn undirected_key(&self) -> (VertexId, VertexId) {
        if self.from <= self.to {
            (self.from, self.to)
        } else {
            (self.to, self.from)
        }
    }

    #[inline]
    pub fn contains(&self, vert: VertexId) -> bool {
        self.from == vert || self.to == vert
    }
}

/// Triangle of the working triangulation, as indexes into the vertex buffer.
///
/// The order of the vertices is kept as created. It is not normalized to a winding order.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct TriangleData {
    /// Triangle vertices indexes
    pub verts: [VertexId; 3],
}

impl TriangleData {
    #[inline]
    pub fn new(verts: [VertexId; 3]) -> Self {
        Self { verts }
    }

    pub(crate) fn new_container_triangle(first_index: VertexId) -> Self {
        TriangleData {
            verts: [first_index, first_index + 1, first_index + 2],
        }
    }

    #[inline]
    pub fn v1(&self) -> VertexId {
        self.verts[VERT_1 as usize]
    }
    #[inline]
    pub fn v2(&self) -> VertexId {
        self.verts[VERT_2 as usize]
    }
    #[inline]
    pub fn v3(&self) -> VertexId {
        self.verts[VERT_3 as usize]
    }

    #[inline]
    pub fn edge12(&self) -> Edge {
        Edge::new(self.verts[VERT_1 as usize], self.verts[VERT_2 as usize])
    }
    #[inline]
    pub fn edge23(&self) -> Edge {
        Edge::new(self.verts[VERT_2 as usize], self.verts[VERT_3 as usize])
    }
    #[inline]
    pub fn edge31(&self) -> Edge {
        Edge::new(self.verts[VERT_3 as usize], self.verts[VERT_1 as usize])
    }

    #[inline]
    pub fn edges(&self) -> [Edge; 3] {
        [self.edge12(), self.edge23(), self.edge31()]
    }

    #[inline]
    pub fn to_vertices(&self, vertices: &[Vertex]) -> TriangleVertices {
        (
            vertices[self.verts[VERT_1 as usize] as usize],
            vertices[self.verts[VERT_2 as usize] as usize],
            vertices[self.verts[VERT_3 as usize] as usize],
        )
    }

    #[inline]
    pub fn to_vertices_array(&self, vertices: &[Vertex]) -> [Vertex; 3] {
        [
            vertices[self.verts[VERT_1 as usize] as usize],
            vertices[self.verts[VERT_2 as usize] as usize],
            vertices[self.verts[VERT_3 as usize] as usize],
        ]
    }

    #[inline]
    pub fn contains_vertex(&self, vertex_id: VertexId) -> bool {
        self.verts.contains(&vertex_id)
    }

    /// Returns `true` if one of the vertices has an id greater or equal to `min_vertex_id`.
    ///
    /// Used with the id of the first super-triangle vertex, which are the last vertices of the buffer.
    #[inline]
    pub fn has_vertex_from(&self, min_vertex_id: VertexId) -> bool {
        self.verts.iter().any(|&v| v >= min_vertex_id)
    }

    /// Vertices shared with `other`, in the order of `self`
    pub fn shared_vertices(&self, other: &TriangleData) -> ArrayVec<VertexId, 3> {
        self.verts
            .iter()
            .filter(|v| other.contains_vertex(**v))
            .copied()
            .collect()
    }

    /// Returns the edge shared with `other`, oriented as in `self`, if both triangles share exactly two vertices
    pub fn shared_edge(&self, other: &TriangleData) -> Option<Edge> {
        let shared = self.shared_vertices(other);
        if shared.len() != 2 {
            return None;
        }
        self.edges()
            .into_iter()
            .find(|e| e.contains(shared[0]) && e.contains(shared[1]))
    }
}

#[derive(Clone, Debug, Default)]
pub struct Triangles {
    pub buffer: Vec<TriangleData>,
}
impl Triangles {
    pub fn new() -> Self {
        Self { buffer: Vec::new() }
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            buffer: Vec::with_capacity(capacity),
        }
    }

    #[inline]
    pub fn buffer(&self) -> &Vec<TriangleData> {
        &self.buffer
    }
    #[inline]
    pub fn buffer_mut(&mut self) -> &mut Vec<TriangleData> {
        &mut self.buffer
    }

    #[inline]
    pub fn count(&self) -> usize {
        self.buffer.len()
    }

    #[inline]
    pub fn create(&mut self, verts: [VertexId; 3]) {
        self.buffer.push(TriangleData { verts })
    }
    #[inline]
    pub fn push(&mut self, triangle: TriangleData) {
        self.buffer.push(triangle)
    }
}

/// A triangle given by the coordinates of its vertices `(a, b, c)`.
///
/// `==` is an exact, ordered comparison of the three vertices. Use [Triangle::same_vertex_set] to ignore the order.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Triangle {
    pub verts: [Vertex; 3],
}

impl Triangle {
    #[inline]
    pub fn new(a: Vertex, b: Vertex, c: Vertex) -> Self {
        Self { verts: [a, b, c] }
    }

    #[inline]
    pub fn a(&self) -> Vertex {
        self.verts[VERT_1 as usize]
    }
    #[inline]
    pub fn b(&self) -> Vertex {
        self.verts[VERT_2 as usize]
    }
    #[inline]
    pub fn c(&self) -> Vertex {
        self.verts[VERT_3 as usize]
    }

    #[inline]
    pub fn contains_vertex(&self, vertex: Vertex) -> bool {
        self.verts.contains(&vertex)
    }

    /// Positive for a counter-clockwise triangle, negative for a clockwise one
    #[inline]
    pub fn signed_area(&self) -> Float {
        triangle_signed_area(self.a(), self.b(), self.c())
    }

    #[inline]
    pub fn area(&self) -> Float {
        self.signed_area().abs()
    }

    /// Same triangle, with its vertices in a counter-clockwise order
    #[inline]
    pub fn to_counter_clockwise(&self) -> Triangle {
        if self.signed_area() < 0. {
            Triangle::new(self.a(), self.c(), self.b())
        } else {
            *self
        }
    }

    /// Same triangle with its vertices sorted by [lexicographic_cmp]
    pub fn canonical(&self) -> Triangle {
        let mut verts = self.verts;
        verts.sort_by(|a, b| lexicographic_cmp(*a, *b));
        Triangle { verts }
    }

    pub fn same_vertex_set(&self, other: &Triangle) -> bool {
        self.canonical() == other.canonical()
    }

    /// Lexicographic order on the canonical forms of both triangles
    pub fn canonical_cmp(&self, other: &Triangle) -> Ordering {
        let (lhs, rhs) = (self.canonical(), other.canonical());
        lhs.verts
            .iter()
            .zip(rhs.verts.iter())
            .map(|(a, b)| lexicographic_cmp(*a, *b))
            .find(|ordering| *ordering != Ordering::Equal)
            .unwrap_or(Ordering::Equal)
    }
}

impl From<TriangleVertices> for Triangle {
    fn from(vertices: TriangleVertices) -> Self {
        Triangle::new(vertices.0, vertices.1, vertices.2)
    }
}

///////////////////////////////////////////////////////////
///                                                     ///
///                        Tests                        ///
///                                                     ///
///////////////////////////////////////////////////////////
