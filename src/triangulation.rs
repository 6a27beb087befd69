use hashbrown::{HashMap, HashSet};
use thiserror::Error;
use tracing::{debug, warn};

use crate::types::{
    Edge, Float, Triangle, TriangleData, Triangles, Vertex, Vertex2d, VertexId,
};
use crate::utils::{
    are_vertices_collinear, exact_vertex_key, is_super_triangle_in_range,
    is_vertex_in_triangle_circumcircle, validate_vertices, DEFAULT_CIRCUMCIRCLE_EPSILON,
    DEFAULT_COLLINEARITY_EPSILON,
};

#[cfg(feature = "progress_log")]
use tracing::info;

#[cfg(feature = "debug_context")]
use crate::debug::{DebugConfiguration, DebugContext, Phase};

#[cfg(feature = "profile_traces")]
use tracing::{span, Level};

#[cfg(feature = "parallel_filtering")]
use rayon::iter::{IndexedParallelIterator, IntoParallelRefIterator, ParallelIterator};

/// The super-triangle vertices are placed at this many times the largest extent of the input bounding box
pub const DEFAULT_SUPER_TRIANGLE_MARGIN: Float = 20.;

pub const DEFAULT_FILTER_PARALLEL_TRI_COUNT_THRESHOLD: usize = 100_000;
pub const DEFAULT_FILTER_PARALLEL_MIN_BATCH_LEN: usize = 1000;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriangulationError {
    #[error("at least 3 vertices are needed to triangulate, got {count}")]
    NotEnoughVertices { count: usize },
    #[error("{count} vertices exceed the capacity of the vertex index type")]
    TooManyVertices { count: usize },
    #[error("vertex {index} has a NaN or infinite coordinate")]
    InvalidVertex { index: usize },
    #[error("all the vertices are collinear, they cannot form a triangle")]
    CollinearVertices,
    #[error("vertex {index} has the same coordinates as vertex {first_index}")]
    DuplicateVertex { index: usize, first_index: usize },
    #[error("coordinates are too large to build a super-triangle enclosing the vertices")]
    CoordinatesOutOfRange,
    /// Every triangle touched the super-triangle, or no vertex passed the circumcircle tolerance
    #[error("no triangle could be built from the {count} vertices at the working precision")]
    EmptyTriangulation { count: usize },
}

#[derive(Clone, Debug)]
pub struct TriangulationConfiguration {
    /// The super-triangle vertices are placed at `super_triangle_margin` times the largest extent of the input bounding box, away from its center.
    ///
    /// This is a heuristic margin: a value too small can lose triangles along the convex hull.
    pub super_triangle_margin: Float,
    /// Margin used by the circumcircle test, see [DEFAULT_CIRCUMCIRCLE_EPSILON]
    pub circumcircle_epsilon: Float,
    /// Vertices closer than this to a common line, relative to their extent, are rejected as collinear. See [are_vertices_collinear]
    pub collinearity_epsilon: Float,
    /// When `true`, vertices with the exact same coordinates as a previous vertex make the triangulation fail with [TriangulationError::DuplicateVertex].
    ///
    /// When `false` (default), such vertices are inserted anyway and do not change the triangulation.
    pub reject_duplicate_vertices: bool,
    /// Only used with the `parallel_filtering` feature: minimum count of triangles for the final filtering to run in parallel
    pub filter_parallel_tri_count_threshold: usize,
    /// Only used with the `parallel_filtering` feature: minimum count of triangles filtered by each parallel task
    pub filter_parallel_min_batch_len: usize,
    #[cfg(feature = "debug_context")]
    pub debug_config: DebugConfiguration,
}
impl Default for TriangulationConfiguration {
    fn default() -> Self {
        Self {
            super_triangle_margin: DEFAULT_SUPER_TRIANGLE_MARGIN,
            circumcircle_epsilon: DEFAULT_CIRCUMCIRCLE_EPSILON,
            collinearity_epsilon: DEFAULT_COLLINEARITY_EPSILON,
            reject_duplicate_vertices: false,
            filter_parallel_tri_count_threshold: DEFAULT_FILTER_PARALLEL_TRI_COUNT_THRESHOLD,
            filter_parallel_min_batch_len: DEFAULT_FILTER_PARALLEL_MIN_BATCH_LEN,
            #[cfg(feature = "debug_context")]
            debug_config: DebugConfiguration::default(),
        }
    }
}

pub struct Triangulation {
    /// Input vertices, in their input order
    pub vertices: Vec<Vertex>,
    /// Indices of the input vertices by groups of 3 to form triangles.
    pub triangles: Vec<[VertexId; 3]>,

    #[cfg(feature = "debug_context")]
    pub debug_context: DebugContext,
}

impl Triangulation {
    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    /// Triangles with the coordinates of their vertices, in the same order as [Triangulation::triangles]
    pub fn to_triangles(&self) -> Vec<Triangle> {
        self.triangles
            .iter()
            .map(|t| Triangle::from(TriangleData::new(*t).to_vertices(&self.vertices)))
            .collect()
    }

    /// Unique undirected edges of the triangulation, in order of first encounter
    pub fn edges(&self) -> Vec<Edge> {
        let mut visited = HashSet::with_capacity(self.triangles.len() * 2);
        let mut edges = Vec::with_capacity(self.triangles.len() * 2);
        for triangle in self.triangles.iter() {
            for edge in TriangleData::new(*triangle).edges() {
                if visited.insert(edge.undirected_key()) {
                    edges.push(edge);
                }
            }
        }
        edges
    }

    /// Triangles in a canonical form (see [Triangle::canonical]), sorted.
    ///
    /// Two triangulations with the same set of triangles have the same canonical triangles.
    pub fn canonical_triangles(&self) -> Vec<Triangle> {
        let mut triangles: Vec<Triangle> =
            self.to_triangles().iter().map(|t| t.canonical()).collect();
        triangles.sort_by(|a, b| a.canonical_cmp(b));
        triangles
    }
}

/// Creates a Delaunay triangulation of the input vertices, with the Bowyer-Watson algorithm.
///
/// Vertices are inserted one by one, in their input order. The output depends on this order when several triangulations are valid (cocircular vertices).
///
/// Vertices requirements:
/// - At least 3 vertices, not all collinear (up to [TriangulationConfiguration::collinearity_epsilon])
/// - Finite coordinates (no NaN nor infinity), small enough for the super-triangle determinants not to overflow
/// - Vertices with the same coordinates are ignored, unless [TriangulationConfiguration::reject_duplicate_vertices] is set
///
/// Fails with [TriangulationError::EmptyTriangulation] rather than returning an empty triangulation, which happens when the
/// input is too small for the absolute circumcircle tolerance or too thin for the super-triangle margin.
pub fn triangulation_from_2d_vertices<T: Vertex2d>(
    vertices: &[T],
    config: TriangulationConfiguration,
) -> Result<Triangulation, TriangulationError> {
    #[cfg(feature = "profile_traces")]
    let _span = span!(Level::TRACE, "triangulation_from_2d_vertices").entered();

    let mut vertices = prepare_vertices(vertices, &config)?;
    debug!("Triangulating {} vertices", vertices.len());

    let (container_triangle, min_container_vertex_id) =
        add_container_triangle_vertices(&mut vertices, config.super_triangle_margin)?;

    #[cfg(feature = "debug_context")]
    let mut debug_context = DebugContext::new(
        config.debug_config.clone(),
        container_triangle.to_vertices_array(&vertices),
    );

    let triangles = triangulate_vertices(
        &vertices,
        container_triangle,
        min_container_vertex_id,
        &config,
        #[cfg(feature = "debug_context")]
        &mut debug_context,
    );

    let vert_indices = remove_wrapping(
        &triangles,
        min_container_vertex_id,
        &config,
        #[cfg(feature = "debug_context")]
        &mut debug_context,
    );

    // Drop the super-triangle vertices, no remaining triangle uses them
    vertices.truncate(min_container_vertex_id as usize);
    if vert_indices.is_empty() {
        warn!(
            "No triangle left from {} vertices after removing the super-triangle",
            vertices.len()
        );
        return Err(TriangulationError::EmptyTriangulation {
            count: vertices.len(),
        });
    }
    debug!(
        "Triangulation of {} vertices produced {} triangles",
        vertices.len(),
        vert_indices.len()
    );

    Ok(Triangulation {
        vertices,
        triangles: vert_indices,
        #[cfg(feature = "debug_context")]
        debug_context,
    })
}

/// Validates the input and converts it to the vertex type used in computations
pub(crate) fn prepare_vertices<T: Vertex2d>(
    vertices: &[T],
    config: &TriangulationConfiguration,
) -> Result<Vec<Vertex>, TriangulationError> {
    if vertices.len() < 3 {
        return Err(TriangulationError::NotEnoughVertices {
            count: vertices.len(),
        });
    }
    // The 3 super-triangle vertices are added after the input vertices
    if VertexId::try_from(vertices.len() + 3).is_err() {
        return Err(TriangulationError::TooManyVertices {
            count: vertices.len(),
        });
    }
    validate_vertices(vertices)?;

    let converted: Vec<Vertex> = vertices
        .iter()
        .map(|v| Vertex::new(v.x(), v.y()))
        .collect();

    if are_vertices_collinear(&converted, config.collinearity_epsilon) {
        return Err(TriangulationError::CollinearVertices);
    }
    if config.reject_duplicate_vertices {
        if let Some((index, first_index)) = find_duplicate_vertex(&converted) {
            return Err(TriangulationError::DuplicateVertex { index, first_index });
        }
    }
    Ok(converted)
}

/// Returns the index of the first vertex with the same coordinates as a previous one, along with the index of that previous vertex
pub(crate) fn find_duplicate_vertex(vertices: &[Vertex]) -> Option<(usize, usize)> {
    let mut first_occurrences = HashMap::with_capacity(vertices.len());
    for (index, vertex) in vertices.iter().enumerate() {
        if let Some(&first_index) = first_occurrences.get(&exact_vertex_key(*vertex)) {
            return Some((index, first_index));
        }
        first_occurrences.insert(exact_vertex_key(*vertex), index);
    }
    None
}

/// Computes the three vertices of a super-triangle enclosing all the `vertices`.
///
/// From the bounding box of the vertices, with `delta_max` its largest extent and `(mid_x, mid_y)` its center:
///
/// ```text
///                 (mid_x, mid_y + margin * delta_max)
///                              /\
///                             /  \
///                            / bb \
///                           /______\
/// (mid_x - margin * delta_max,      (mid_x + margin * delta_max,
///  mid_y - delta_max)                mid_y - delta_max)
/// ```
pub fn super_triangle_vertices(vertices: &[Vertex], margin: Float) -> [Vertex; 3] {
    let (mut x_min, mut y_min, mut x_max, mut y_max) =
        (Float::MAX, Float::MAX, Float::MIN, Float::MIN);

    for vertex in vertices.iter() {
        if vertex.x < x_min {
            x_min = vertex.x;
        }
        if vertex.x > x_max {
            x_max = vertex.x;
        }
        if vertex.y < y_min {
            y_min = vertex.y;
        }
        if vertex.y > y_max {
            y_max = vertex.y;
        }
    }

    let delta_max = (x_max - x_min).max(y_max - y_min);
    let mid_x = (x_min + x_max) / 2.;
    let mid_y = (y_min + y_max) / 2.;

    [
        Vertex::new(mid_x - margin * delta_max, mid_y - delta_max),
        Vertex::new(mid_x + margin * delta_max, mid_y - delta_max),
        Vertex::new(mid_x, mid_y + margin * delta_max),
    ]
}

/// Select three dummy points to form a supertriangle that completely encompasses all of the points to be triangulated.
///  This supertriangle initially defines a Delaunay triangulation which is comprised of a single triangle.
///  Its vertices are appended after the input vertices, the returned id is the id of the first one.
pub(crate) fn add_container_triangle_vertices(
    vertices: &mut Vec<Vertex>,
    margin: Float,
) -> Result<(TriangleData, VertexId), TriangulationError> {
    let container_vertices = super_triangle_vertices(vertices, margin);
    if !is_super_triangle_in_range(&container_vertices) {
        return Err(TriangulationError::CoordinatesOutOfRange);
    }
    let min_container_triangle_vertex_id = vertices.len() as VertexId;
    let container_triangle = TriangleData::new_container_triangle(min_container_triangle_vertex_id);
    vertices.extend(container_vertices);
    Ok((container_triangle, min_container_triangle_vertex_id))
}

/// Working buffers of a vertex insertion.
///
/// Their size only depends on the cavity of the vertex being inserted. They are cleared and re-used by each insertion.
#[derive(Default)]
pub(crate) struct CavityBuffers {
    /// Triangles whose circumcircle contains the inserted vertex
    pub(crate) bad_triangles: Vec<TriangleData>,
    /// Edges of all the bad triangles, shared edges appear twice
    pub(crate) polygon: Vec<Edge>,
    edge_counts: HashMap<(VertexId, VertexId), u32>,
}
impl CavityBuffers {
    fn clear(&mut self) {
        self.bad_triangles.clear();
        self.polygon.clear();
        self.edge_counts.clear();
    }
}

/// Inserts every input vertex (ids below `min_container_vertex_id`) in the triangulation, starting from the container triangle
pub(crate) fn triangulate_vertices(
    vertices: &[Vertex],
    container_triangle: TriangleData,
    min_container_vertex_id: VertexId,
    config: &TriangulationConfiguration,
    #[cfg(feature = "debug_context")] debug_context: &mut DebugContext,
) -> Triangles {
    #[cfg(feature = "profile_traces")]
    let _span = span!(Level::TRACE, "triangulate_vertices").entered();

    let mut triangles = Triangles::with_capacity(vertices.len() * 2 + 1);
    triangles.push(container_triangle);

    #[cfg(feature = "debug_context")]
    debug_context.push_snapshot(
        Phase::SuperTriangleInsertion,
        None,
        &triangles,
        &[container_triangle],
    );

    let mut buffers = CavityBuffers::default();

    for vertex_id in 0..min_container_vertex_id {
        #[cfg(feature = "debug_context")]
        {
            let force_end = debug_context.set_step(vertex_id as usize);
            if force_end {
                break;
            }
        }

        extract_cavity(
            &mut triangles,
            vertices,
            vertex_id,
            config.circumcircle_epsilon,
            &mut buffers,
        );
        if buffers.bad_triangles.is_empty() {
            warn!(
                "Vertex {} {:?} was not inserted, no circumcircle contains it (duplicate or numerical tolerance)",
                vertex_id, vertices[vertex_id as usize]
            );
            continue;
        }

        #[cfg(feature = "debug_context")]
        debug_context.push_snapshot(
            Phase::CavityRemoval,
            Some(vertex_id),
            &triangles,
            &buffers.bad_triangles,
        );

        let _created = fill_cavity(&mut triangles, vertex_id, &mut buffers);

        #[cfg(feature = "debug_context")]
        debug_context.push_snapshot(
            Phase::Retriangulation,
            Some(vertex_id),
            &triangles,
            &triangles.buffer()[triangles.count() - _created..],
        );

        #[cfg(feature = "progress_log")]
        {
            let vertices_count = min_container_vertex_id as usize;
            let index = vertex_id as usize;
            if index % ((vertices_count / 50) + 1) == 0 {
                let progress = 100. * index as f32 / vertices_count as f32;
                info!(
                    "Triangulation progress, {}%: {}/{}, {} triangles",
                    progress,
                    index,
                    vertices_count,
                    triangles.count()
                );
            }
        }
    }

    triangles
}

/// Finds every triangle whose circumcircle contains the vertex `vertex_id`, removes them from `triangles`,
/// and collects them with their edges into `buffers`.
pub(crate) fn extract_cavity(
    triangles: &mut Triangles,
    vertices: &[Vertex],
    vertex_id: VertexId,
    epsilon: Float,
    buffers: &mut CavityBuffers,
) {
    #[cfg(feature = "profile_traces")]
    let _span = span!(Level::TRACE, "extract_cavity").entered();

    buffers.clear();
    let vertex = vertices[vertex_id as usize];
    let CavityBuffers {
        bad_triangles,
        polygon,
        ..
    } = buffers;

    triangles.buffer_mut().retain(|triangle| {
        let triangle_vertices = triangle.to_vertices_array(vertices);
        if is_vertex_in_triangle_circumcircle(&triangle_vertices, vertex, epsilon) {
            bad_triangles.push(*triangle);
            polygon.extend(triangle.edges());
            false
        } else {
            true
        }
    });
}

/// Connects `vertex_id` to each boundary edge of the cavity collected in `buffers`.
///
/// Boundary edges are the edges present only once in the polygon: an edge shared by two bad triangles lies inside the cavity.
/// New triangles are `(from, to, vertex_id)` for each boundary edge, in the order of the polygon.
///
/// Returns the count of created triangles, which are the last ones of `triangles`.
pub(crate) fn fill_cavity(
    triangles: &mut Triangles,
    vertex_id: VertexId,
    buffers: &mut CavityBuffers,
) -> usize {
    #[cfg(feature = "profile_traces")]
    let _span = span!(Level::TRACE, "fill_cavity").entered();

    for edge in buffers.polygon.iter() {
        *buffers.edge_counts.entry(edge.undirected_key()).or_insert(0) += 1;
    }

    let created_from = triangles.count();
    for edge in buffers.polygon.iter() {
        if buffers.edge_counts.get(&edge.undirected_key()) == Some(&1) {
            triangles.create([edge.from, edge.to, vertex_id]);
        }
    }
    triangles.count() - created_from
}

/// Removes every triangle with a vertex of the container triangle, and returns the vertex indices of the remaining ones
pub(crate) fn remove_wrapping(
    triangles: &Triangles,
    min_container_vertex_id: VertexId,
    _config: &TriangulationConfiguration,
    #[cfg(feature = "debug_context")] debug_context: &mut DebugContext,
) -> Vec<[VertexId; 3]> {
    #[cfg(feature = "profile_traces")]
    let _span = span!(Level::TRACE, "remove_wrapping").entered();

    let indices = filter_wrapping(triangles, min_container_vertex_id, _config);

    #[cfg(feature = "debug_context")]
    {
        let mut filtered_debug_triangles = Triangles::with_capacity(indices.len());
        for verts in indices.iter() {
            filtered_debug_triangles.create(*verts);
        }
        debug_context.push_snapshot(Phase::RemoveWrapping, None, &filtered_debug_triangles, &[]);
    }

    indices
}

fn filter_wrapping_sequential(
    triangles: &Triangles,
    min_container_vertex_id: VertexId,
) -> Vec<[VertexId; 3]> {
    triangles
        .buffer()
        .iter()
        .filter(|t| !t.has_vertex_from(min_container_vertex_id))
        .map(|t| t.verts)
        .collect()
}

#[cfg(not(feature = "parallel_filtering"))]
#[inline]
fn filter_wrapping(
    triangles: &Triangles,
    min_container_vertex_id: VertexId,
    _config: &TriangulationConfiguration,
) -> Vec<[VertexId; 3]> {
    filter_wrapping_sequential(triangles, min_container_vertex_id)
}

#[cfg(feature = "parallel_filtering")]
fn filter_wrapping(
    triangles: &Triangles,
    min_container_vertex_id: VertexId,
    config: &TriangulationConfiguration,
) -> Vec<[VertexId; 3]> {
    if triangles.count() <= config.filter_parallel_tri_count_threshold {
        return filter_wrapping_sequential(triangles, min_container_vertex_id);
    }
    // Order preserving, like the sequential filtering
    triangles
        .buffer()
        .par_iter()
        .with_min_len(config.filter_parallel_min_batch_len)
        .filter_map(|t| match t.has_vertex_from(min_container_vertex_id) {
            true => None,
            false => Some(t.verts),
        })
        .collect()
}

///////////////////////////////////////////////////////////
///                                                     ///
///                        Tests                        ///
///                                                     ///
///////////////////////////////////////////////////////////
