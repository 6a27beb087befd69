use bowyer_watson::{types::Vertex, Triangulation, TriangulationError};

#[derive(Default)]
pub struct BowyerWatsonCrate {
    vertices: Vec<Vertex>,
}

impl crate::DelaunayCrate for BowyerWatsonCrate {
    type ResultType = Result<Triangulation, TriangulationError>;

    fn init(&mut self, vertices: impl Iterator<Item = [f64; 2]>) {
        self.vertices = vertices
            .map(|vertex| Vertex::new(vertex[0], vertex[1]))
            .collect();
    }

    fn run_creation(&self) -> Self::ResultType {
        bowyer_watson::triangulation_from_2d_vertices(&self.vertices, Default::default())
    }
}
