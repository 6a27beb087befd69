pub mod triangulation;
pub mod types;
pub mod utils;
pub mod vtk;

#[cfg(feature = "debug_context")]
pub mod debug;

pub use glam;
pub use hashbrown;

pub use triangulation::{
    triangulation_from_2d_vertices, Triangulation, TriangulationConfiguration, TriangulationError,
};
pub use vtk::{export_to_vtk, VtkConfiguration, VtkExportError, VtkMesh};

///////////////////////////////////////////////////////////
///                                                     ///
///                        Tests                        ///
///                                                     ///
///////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use glam::Vec2;
    use hashbrown::HashSet;
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use crate::{
        triangulation::{super_triangle_vertices, TriangulationConfiguration},
        triangulation_from_2d_vertices,
        types::{Edge, Float, Triangle, TriangleData, Vertex, VertexId},
        utils::{is_vertex_in_triangle_circumcircle, DEFAULT_CIRCUMCIRCLE_EPSILON},
        vtk::{VtkMesh, VTK_TRIANGLE},
        Triangulation, VtkConfiguration,
    };

    /// Profile of a symmetric airfoil, sampled on its upper side, lower side and chord line
    #[rustfmt::skip]
    const AIRFOIL: [[Float; 2]; 56] = [
        [0.0, 0.0], [0.7, 1.4], [2.7, 2.7], [6.0, 3.8],
        [10.5, 4.8], [16.1, 5.5], [22.7, 5.9], [29.9, 6.0],
        [37.7, 5.9], [45.9, 5.5], [54.1, 5.0], [62.3, 4.4],
        [70.1, 3.6], [77.3, 2.9], [83.9, 2.1], [89.5, 1.4],
        [94.0, 0.8], [97.3, 0.4], [99.3, 0.1], [0.7, -1.4],
        [2.7, -2.7], [6.0, -3.8], [10.5, -4.8], [16.1, -5.5],
        [22.7, -5.9], [29.9, -6.0], [37.7, -5.9], [45.9, -5.5],
        [54.1, -5.0], [62.3, -4.4], [70.1, -3.6], [77.3, -2.9],
        [83.9, -2.1], [89.5, -1.4], [94.0, -0.8], [97.3, -0.4],
        [99.3, -0.1], [0.7, 0.0], [2.7, 0.0], [6.0, 0.0],
        [10.5, 0.0], [16.1, 0.0], [22.7, 0.0], [29.9, 0.0],
        [37.7, 0.0], [45.9, 0.0], [54.1, 0.0], [62.3, 0.0],
        [70.1, 0.0], [77.3, 0.0], [83.9, 0.0], [89.5, 0.0],
        [94.0, 0.0], [97.3, 0.0], [99.3, 0.0], [100.0, 0.0],
    ];

    /// Area of the convex hull of [AIRFOIL], with 32 vertices on its boundary
    const AIRFOIL_HULL_AREA: Float = 814.63;
    const AIRFOIL_HULL_VERTICES: usize = 32;

    /// The 4 corners of the unit square, then `count` random vertices strictly inside it
    fn square_with_random_interior(count: usize, seed: u64) -> Vec<Vertex> {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut vertices = vec![
            Vertex::new(0., 0.),
            Vertex::new(1., 0.),
            Vertex::new(1., 1.),
            Vertex::new(0., 1.),
        ];
        for _ in 0..count {
            vertices.push(Vertex::new(rng.gen_range(0.1..0.9), rng.gen_range(0.1..0.9)));
        }
        vertices
    }

    fn assert_empty_circumcircles(triangulation: &Triangulation) {
        for triangle in triangulation.triangles.iter() {
            let triangle_vertices =
                TriangleData::new(*triangle).to_vertices_array(&triangulation.vertices);
            for (vertex_id, vertex) in triangulation.vertices.iter().enumerate() {
                if triangle.contains(&(vertex_id as VertexId)) {
                    continue;
                }
                assert!(
                    !is_vertex_in_triangle_circumcircle(
                        &triangle_vertices,
                        *vertex,
                        DEFAULT_CIRCUMCIRCLE_EPSILON
                    ),
                    "Vertex {} should not be inside the circumcircle of {:?}",
                    vertex_id,
                    triangle
                );
            }
        }
    }

    fn total_area(triangles: &[Triangle]) -> Float {
        triangles.iter().map(|t| t.area()).sum()
    }

    #[test]
    fn delaunay_unit_square() {
        // 3-------------2
        // |          /  |
        // |       /     |
        // |    /        |
        // | /           |
        // 0-------------1
        let vertices = vec![
            Vertex::new(0., 0.),
            Vertex::new(1., 0.),
            Vertex::new(1., 1.),
            Vertex::new(0., 1.),
        ];

        let triangulation =
            triangulation_from_2d_vertices(&vertices, TriangulationConfiguration::default())
                .expect("Triangulation should succeed");

        assert_eq!(vec![[0, 1, 2], [0, 2, 3]], triangulation.triangles);

        let t1 = TriangleData::new(triangulation.triangles[0]);
        let t2 = TriangleData::new(triangulation.triangles[1]);
        let diagonal = t1.shared_edge(&t2).expect("Triangles should share an edge");
        assert!(diagonal.undirected_equals(&Edge::new(0, 2)));

        assert_eq!(1., total_area(&triangulation.to_triangles()));
        assert_empty_circumcircles(&triangulation);
    }

    #[test]
    fn delaunay_single_triangle() {
        let vertices = vec![
            Vertex::new(0., 0.),
            Vertex::new(2., 0.),
            Vertex::new(1., 2.),
        ];

        let triangulation =
            triangulation_from_2d_vertices(&vertices, TriangulationConfiguration::default())
                .expect("Triangulation should succeed");
        let triangles = triangulation.to_triangles();

        assert_eq!(1, triangles.len());
        assert!(triangles[0].same_vertex_set(&Triangle::new(vertices[0], vertices[1], vertices[2])));
    }

    #[test]
    fn delaunay_f32_input() {
        let vertices = vec![
            Vec2::new(0., 0.),
            Vec2::new(0., 5.),
            Vec2::new(5., 5.),
            Vec2::new(5., 0.),
            Vec2::new(2., 2.5),
        ];

        let triangulation =
            triangulation_from_2d_vertices(&vertices, TriangulationConfiguration::default())
                .expect("Triangulation should succeed");

        // 2n - h - 2
        assert_eq!(4, triangulation.triangle_count());
        assert_eq!(25., total_area(&triangulation.to_triangles()));
    }

    #[test]
    fn delaunay_random_vertices_properties() {
        for seed in 0..5 {
            let vertices = square_with_random_interior(40, seed);

            let triangulation =
                triangulation_from_2d_vertices(&vertices, TriangulationConfiguration::default())
                    .expect("Triangulation should succeed");

            // Euler: 2n - h - 2 triangles, with the 4 corners as the only hull vertices
            assert_eq!(2 * vertices.len() - 4 - 2, triangulation.triangle_count());
            // Covers the unit square, without overlaps
            assert!((total_area(&triangulation.to_triangles()) - 1.).abs() < 1e-9);
            assert_empty_circumcircles(&triangulation);

            let used_vertices: HashSet<VertexId> =
                triangulation.triangles.iter().flatten().copied().collect();
            assert_eq!(vertices.len(), used_vertices.len());
        }
    }

    #[test]
    fn delaunay_lattice_with_collinear_hull() {
        let mut vertices = Vec::new();
        for x in 0..6 {
            for y in 0..6 {
                vertices.push(Vertex::new(x as Float, y as Float));
            }
        }

        let triangulation =
            triangulation_from_2d_vertices(&vertices, TriangulationConfiguration::default())
                .expect("Triangulation should succeed");

        // 20 vertices on the hull boundary, 16 of them in the middle of a hull edge
        assert_eq!(2 * 36 - 20 - 2, triangulation.triangle_count());
        assert_eq!(25., total_area(&triangulation.to_triangles()));
        assert!(triangulation
            .to_triangles()
            .iter()
            .all(|t| t.area() == 0.5));
        assert_empty_circumcircles(&triangulation);

        let used_vertices: HashSet<VertexId> =
            triangulation.triangles.iter().flatten().copied().collect();
        assert_eq!(vertices.len(), used_vertices.len());
    }

    #[test]
    fn airfoil_hull_with_default_margin() {
        let triangulation = triangulation_from_2d_vertices(&AIRFOIL, Default::default())
            .expect("Triangulation should succeed");

        // The super-triangle vertex is inside the circumcircle of one thin hull triangle, which is lost
        assert_eq!(
            2 * AIRFOIL.len() - AIRFOIL_HULL_VERTICES - 2 - 1,
            triangulation.triangle_count()
        );
        assert!(total_area(&triangulation.to_triangles()) < AIRFOIL_HULL_AREA - 0.1);
    }

    #[test]
    fn airfoil_hull_with_larger_margin() {
        let triangulation = triangulation_from_2d_vertices(
            &AIRFOIL,
            TriangulationConfiguration {
                super_triangle_margin: 100.,
                ..Default::default()
            },
        )
        .expect("Triangulation should succeed");

        assert_eq!(
            2 * AIRFOIL.len() - AIRFOIL_HULL_VERTICES - 2,
            triangulation.triangle_count()
        );
        assert!((total_area(&triangulation.to_triangles()) - AIRFOIL_HULL_AREA).abs() < 1e-9);

        let used_vertices: HashSet<VertexId> =
            triangulation.triangles.iter().flatten().copied().collect();
        assert_eq!(AIRFOIL.len(), used_vertices.len());
    }

    #[test]
    fn delaunay_is_deterministic() {
        let vertices = square_with_random_interior(100, 7);

        let first = triangulation_from_2d_vertices(&vertices, Default::default())
            .expect("Triangulation should succeed");
        let second = triangulation_from_2d_vertices(&vertices, Default::default())
            .expect("Triangulation should succeed");

        assert_eq!(first.triangles, second.triangles);
        assert_eq!(first.canonical_triangles(), second.canonical_triangles());
    }

    #[test]
    fn airfoil_has_no_super_triangle_leakage() {
        let triangulation = triangulation_from_2d_vertices(&AIRFOIL, Default::default())
            .expect("Triangulation should succeed");
        let super_vertices = super_triangle_vertices(&triangulation.vertices, 20.);

        assert!(triangulation.triangle_count() > 0);
        assert_eq!(AIRFOIL.len(), triangulation.vertices.len());
        for triangle in triangulation.to_triangles() {
            for super_vertex in super_vertices.iter() {
                assert!(!triangle.contains_vertex(*super_vertex));
            }
            for vertex in triangle.verts {
                assert!(AIRFOIL.contains(&[vertex.x, vertex.y]));
            }
            assert!(triangle.area() > 0.);
        }
    }

    #[test]
    fn airfoil_vtk_export_round_trip() {
        let triangulation = triangulation_from_2d_vertices(&AIRFOIL, Default::default())
            .expect("Triangulation should succeed");
        let triangles = triangulation.to_triangles();

        let mesh = VtkMesh::from_triangles(&triangles);
        let distinct_vertices: HashSet<VertexId> =
            triangulation.triangles.iter().flatten().copied().collect();
        assert_eq!(distinct_vertices.len(), mesh.points.len());
        assert_eq!(triangles.len(), mesh.cells.len());
        for (cell, triangle) in mesh.cells.iter().zip(triangles.iter()) {
            assert!(cell.iter().all(|&i| i < mesh.points.len()));
            assert!(cell[0] != cell[1] && cell[1] != cell[2] && cell[2] != cell[0]);
            assert_eq!(triangle.verts, cell.map(|i| mesh.points[i]));
        }

        let mut output = Vec::new();
        mesh.write(&mut output, &VtkConfiguration::default())
            .expect("Writing to a Vec should succeed");
        let output = String::from_utf8_lossy(&output);
        let lines: Vec<&str> = output.lines().collect();

        let cell_types_line = 4 + 1 + mesh.points.len() + 1 + mesh.cells.len();
        assert_eq!(
            format!("CELL_TYPES {}", triangles.len()),
            lines[cell_types_line]
        );
        assert!(lines[cell_types_line + 1..]
            .iter()
            .all(|l| *l == VTK_TRIANGLE.to_string()));
        assert_eq!(cell_types_line + 1 + triangles.len(), lines.len());
    }
}
