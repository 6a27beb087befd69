use bowyer_watson::{
    triangulation::TriangulationConfiguration, triangulation_from_2d_vertices, types::Vertex,
};
use rand::distributions::{Distribution, Uniform};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, Registry};
use tracing_tracy::TracyLayer;

const SEED: u64 = 0x00c1_0573_4ed5;

const CLUSTERS_COUNT: usize = 40;
const CLUSTER_RADIUS: f64 = 25.;
const FIELD_SIZE: f64 = 1000.;
// Every insertion scans all the triangles
const VERTICES_COUNT: usize = 20_000;

/// Vertices spread in discs around random centers. Dense clusters produce many small cavities next to large empty areas.
fn clustered_vertices(count: usize, seed: u64) -> Vec<Vertex> {
    let mut rng = StdRng::seed_from_u64(seed);
    let field = Uniform::new(0., FIELD_SIZE);
    let disc = Uniform::new_inclusive(-CLUSTER_RADIUS, CLUSTER_RADIUS);

    let centers: Vec<Vertex> = (0..CLUSTERS_COUNT)
        .map(|_| Vertex::new(field.sample(&mut rng), field.sample(&mut rng)))
        .collect();

    let mut vertices = Vec::with_capacity(count);
    while vertices.len() < count {
        let offset = Vertex::new(disc.sample(&mut rng), disc.sample(&mut rng));
        if offset.length_squared() > CLUSTER_RADIUS * CLUSTER_RADIUS {
            continue;
        }
        let center = centers[vertices.len() % CLUSTERS_COUNT];
        vertices.push(center + offset);
    }
    vertices
}

fn main() {
    let subscriber = Registry::default().with(TracyLayer::default());
    tracing::subscriber::set_global_default(subscriber).expect("Failed to set subscriber");

    let vertices = clustered_vertices(VERTICES_COUNT, SEED);

    match triangulation_from_2d_vertices(
        &vertices,
        TriangulationConfiguration {
            filter_parallel_tri_count_threshold: 10_000,
            filter_parallel_min_batch_len: 1000,
            ..Default::default()
        },
    ) {
        Ok(triangulation) => info!("{} triangles", triangulation.triangle_count()),
        Err(err) => error!("Triangulation failed: {}", err),
    }
}
