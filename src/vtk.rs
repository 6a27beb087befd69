//! Export of triangles to the legacy VTK file format (ASCII, unstructured grid).
//!
//! ```text
//! # vtk DataFile Version 3.0
//! Delaunay Triangulation
//! ASCII
//! DATASET UNSTRUCTURED_GRID
//! POINTS 4 float
//! 0 0 0.0
//! ...
//! CELLS 2 8
//! 3 0 1 2
//! ...
//! CELL_TYPES 2
//! 5
//! 5
//! ```

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use hashbrown::HashMap;
use thiserror::Error;
use tracing::{error, info};

use crate::types::{Triangle, Vertex};
use crate::utils::exact_vertex_key;

#[cfg(feature = "profile_traces")]
use tracing::{span, Level};

pub const VTK_HEADER: &str = "# vtk DataFile Version 3.0";
pub const DEFAULT_VTK_TITLE: &str = "Delaunay Triangulation";
/// VTK cell type of a triangle
pub const VTK_TRIANGLE: u8 = 5;

#[derive(Debug, Error)]
pub enum VtkExportError {
    #[error("could not open file {path:?} for writing: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("could not write the mesh: {0}")]
    Io(#[from] io::Error),
}

#[derive(Clone, Debug)]
pub struct VtkConfiguration {
    /// Description line of the file. Line breaks are written as spaces
    pub title: String,
}
impl Default for VtkConfiguration {
    fn default() -> Self {
        Self {
            title: DEFAULT_VTK_TITLE.to_string(),
        }
    }
}

/// Triangle mesh with deduplicated points, ready to be written
#[derive(Clone, Debug, Default, PartialEq)]
pub struct VtkMesh {
    /// Distinct vertices, in order of first encounter
    pub points: Vec<Vertex>,
    /// Indices into `points`, one entry per triangle
    pub cells: Vec<[usize; 3]>,
}

impl VtkMesh {
    /// Deduplicates the vertices of `triangles` by exact coordinates.
    ///
    /// Indices are assigned in order of first encounter: triangles in order, then vertices `a`, `b`, `c`.
    pub fn from_triangles(triangles: &[Triangle]) -> Self {
        let mut indexes = HashMap::with_capacity(triangles.len());
        let mut mesh = VtkMesh {
            points: Vec::with_capacity(triangles.len()),
            cells: Vec::with_capacity(triangles.len()),
        };
        for triangle in triangles {
            let cell = triangle.verts.map(|vertex| {
                *indexes.entry(exact_vertex_key(vertex)).or_insert_with(|| {
                    mesh.points.push(vertex);
                    mesh.points.len() - 1
                })
            });
            mesh.cells.push(cell);
        }
        mesh
    }

    pub fn write<W: Write>(&self, writer: &mut W, config: &VtkConfiguration) -> io::Result<()> {
        writeln!(writer, "{}", VTK_HEADER)?;
        // The legacy header is line based
        let title = config.title.replace(|c: char| c == '\n' || c == '\r', " ");
        writeln!(writer, "{}", title)?;
        writeln!(writer, "ASCII")?;
        writeln!(writer, "DATASET UNSTRUCTURED_GRID")?;

        // Planar mesh, z is always 0
        writeln!(writer, "POINTS {} float", self.points.len())?;
        for p in self.points.iter() {
            writeln!(writer, "{} {} 0.0", p.x, p.y)?;
        }

        writeln!(writer, "CELLS {} {}", self.cells.len(), self.cells.len() * 4)?;
        for [i0, i1, i2] in self.cells.iter() {
            writeln!(writer, "3 {} {} {}", i0, i1, i2)?;
        }

        writeln!(writer, "CELL_TYPES {}", self.cells.len())?;
        for _ in 0..self.cells.len() {
            writeln!(writer, "{}", VTK_TRIANGLE)?;
        }
        Ok(())
    }
}

/// Writes `triangles` to a new VTK file at `path`.
///
/// If the file cannot be created, the error is logged and returned, and nothing is written.
pub fn export_to_vtk<P: AsRef<Path>>(
    path: P,
    triangles: &[Triangle],
    config: &VtkConfiguration,
) -> Result<(), VtkExportError> {
    #[cfg(feature = "profile_traces")]
    let _span = span!(Level::TRACE, "export_to_vtk").entered();

    let path = path.as_ref();
    let file = match File::create(path) {
        Ok(file) => file,
        Err(source) => {
            error!("Could not open file {:?}: {}", path, source);
            return Err(VtkExportError::Create {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut writer = BufWriter::new(file);
    let mesh = VtkMesh::from_triangles(triangles);
    mesh.write(&mut writer, config)?;
    writer.flush()?;

    info!(
        "Exported {} points and {} triangles to {:?}",
        mesh.points.len(),
        mesh.cells.len(),
        path
    );
    Ok(())
}

///////////////////////////////////////////////////////////
///                                                     ///
///                        Tests                        ///
///                                                     ///
///////////////////////////////////////////////////////////
