use std::time::Instant;

use bowyer_watson::{
    export_to_vtk, triangulation_from_2d_vertices, types::Float, TriangulationConfiguration,
    VtkConfiguration,
};
use tracing::info;

const OUTPUT_FILE: &str = "triangulation.vtk";

#[rustfmt::skip]
const AIRFOIL: [[Float; 2]; 56] = [
    // Upper side
    [0.0, 0.0], [0.7, 1.4], [2.7, 2.7], [6.0, 3.8],
    [10.5, 4.8], [16.1, 5.5], [22.7, 5.9], [29.9, 6.0],
    [37.7, 5.9], [45.9, 5.5], [54.1, 5.0], [62.3, 4.4],
    [70.1, 3.6], [77.3, 2.9], [83.9, 2.1], [89.5, 1.4],
    [94.0, 0.8], [97.3, 0.4], [99.3, 0.1],
    // Lower side
    [0.7, -1.4], [2.7, -2.7], [6.0, -3.8], [10.5, -4.8],
    [16.1, -5.5], [22.7, -5.9], [29.9, -6.0], [37.7, -5.9],
    [45.9, -5.5], [54.1, -5.0], [62.3, -4.4], [70.1, -3.6],
    [77.3, -2.9], [83.9, -2.1], [89.5, -1.4], [94.0, -0.8],
    [97.3, -0.4], [99.3, -0.1],
    // Chord
    [0.7, 0.0], [2.7, 0.0], [6.0, 0.0], [10.5, 0.0],
    [16.1, 0.0], [22.7, 0.0], [29.9, 0.0], [37.7, 0.0],
    [45.9, 0.0], [54.1, 0.0], [62.3, 0.0], [70.1, 0.0],
    [77.3, 0.0], [83.9, 0.0], [89.5, 0.0], [94.0, 0.0],
    [97.3, 0.0], [99.3, 0.0], [100.0, 0.0],
];

fn main() {
    tracing_subscriber::fmt::init();

    let now = Instant::now();
    let triangulation =
        match triangulation_from_2d_vertices(&AIRFOIL, TriangulationConfiguration::default()) {
            Ok(triangulation) => triangulation,
            Err(err) => {
                tracing::error!("Triangulation failed: {}", err);
                return;
            }
        };
    info!(
        "Time taken for triangulation: {} seconds",
        now.elapsed().as_secs_f64()
    );
    info!("Generated {} triangles", triangulation.triangle_count());

    // Failures are already logged by the export
    let _ = export_to_vtk(
        OUTPUT_FILE,
        &triangulation.to_triangles(),
        &VtkConfiguration::default(),
    );
}
