use spade::{DelaunayTriangulation, InsertionError, Point2, Triangulation};

#[derive(Default)]
pub struct SpadeCrate {
    vertices: Vec<Point2<f64>>,
}

impl crate::DelaunayCrate for SpadeCrate {
    type ResultType = Result<DelaunayTriangulation<Point2<f64>>, InsertionError>;

    fn init(&mut self, vertices: impl Iterator<Item = [f64; 2]>) {
        self.vertices = vertices
            .map(|vertex| Point2::new(vertex[0], vertex[1]))
            .collect();
    }

    fn run_creation(&self) -> Self::ResultType {
        DelaunayTriangulation::bulk_load(self.vertices.clone())
    }
}
