use hashbrown::HashSet;

use crate::types::{TriangleData, Triangles, Vertex, VertexId};

/// Defines which phases of the Triangulation are recorded
#[derive(Debug, Clone)]
pub enum PhaseRecord {
    /// Records all the phases
    All,
    /// Records the steps during the specified phase
    In(Phase),
    /// Records the steps during the specified phases
    InAny(HashSet<Phase>),
}

/// Defines which steps of the Triangulation are recorded. A step is the insertion of one vertex.
#[derive(Debug, Clone)]
pub enum StepsRecord {
    /// Records all the steps
    All,
    /// Records all the steps after the specified one (inclusive)
    From(usize),
    /// Records all the steps until the specified one (inclusive)
    Until(usize),
    /// Records all the steps between the specified ones (inclusive)
    Between(usize, usize),
}

#[derive(Debug, Clone)]
pub struct DebugConfiguration {
    pub phase_record: PhaseRecord,
    pub steps_record: StepsRecord,
    /// [None] means that it won't force an early exit
    pub force_end_at_step: Option<usize>,
}
impl Default for DebugConfiguration {
    fn default() -> Self {
        Self {
            phase_record: PhaseRecord::All,
            steps_record: StepsRecord::All,
            force_end_at_step: Default::default(),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Phase {
    SuperTriangleInsertion,
    /// Triangles whose circumcircle contains the inserted vertex were removed
    CavityRemoval,
    /// The cavity was filled with triangles connected to the inserted vertex
    Retriangulation,
    RemoveWrapping,
}

pub struct DebugSnapshot {
    pub step: usize,
    pub phase: Phase,
    /// Vertex being inserted, if any
    pub vertex: Option<VertexId>,
    /// State of the triangulation
    pub triangles: Triangles,
    /// Triangles affected by the step: removed ones for [Phase::CavityRemoval], created ones for [Phase::Retriangulation]
    pub highlighted: Vec<TriangleData>,
}

pub struct DebugContext {
    pub config: DebugConfiguration,

    /// Vertices of the super-triangle, their ids follow the ids of the input vertices
    pub container_vertices: [Vertex; 3],

    pub snapshots: Vec<DebugSnapshot>,
    pub current_step: usize,
}

impl DebugContext {
    pub(crate) fn new(config: DebugConfiguration, container_vertices: [Vertex; 3]) -> Self {
        Self {
            config,
            container_vertices,
            snapshots: Vec::new(),
            current_step: 0,
        }
    }

    pub(crate) fn push_snapshot(
        &mut self,
        phase: Phase,
        vertex: Option<VertexId>,
        triangles: &Triangles,
        highlighted: &[TriangleData],
    ) {
        let record = match &self.config.phase_record {
            PhaseRecord::All => true,
            PhaseRecord::InAny(phases) => phases.contains(&phase),
            PhaseRecord::In(rec_phase) => phase == *rec_phase,
        };
        if !record {
            return;
        }
        if match self.config.steps_record {
            StepsRecord::All => true,
            StepsRecord::From(from) => self.current_step >= from,
            StepsRecord::Until(to) => self.current_step <= to,
            StepsRecord::Between(from, to) => self.current_step >= from && self.current_step <= to,
        } {
            self.snapshots.push(DebugSnapshot {
                step: self.current_step,
                phase,
                vertex,
                triangles: triangles.clone(),
                highlighted: highlighted.to_vec(),
            });
        }
    }

    /// Returns true if the algorithm should stop
    pub(crate) fn set_step(&mut self, step: usize) -> bool {
        self.current_step = step;
        match self.config.force_end_at_step {
            Some(end_step) => step >= end_step,
            None => false,
        }
    }
}

///////////////////////////////////////////////////////////
///                                                     ///
///                        Tests                        ///
///                                                     ///
///////////////////////////////////////////////////////////

#[cfg(test)]
mod tests {
    use crate::{
        debug::{DebugConfiguration, Phase, PhaseRecord, StepsRecord},
        triangulation::{triangulation_from_2d_vertices, TriangulationConfiguration},
        types::Float,
    };

    const SQUARE: [[Float; 2]; 4] = [[0., 0.], [1., 0.], [1., 1.], [0., 1.]];

    #[test]
    fn records_all_phases() {
        let triangulation = triangulation_from_2d_vertices(&SQUARE, Default::default())
            .expect("Triangulation should succeed");
        let snapshots = &triangulation.debug_context.snapshots;

        // Super-triangle, 2 phases per inserted vertex, wrapping removal
        assert_eq!(1 + 2 * 4 + 1, snapshots.len());
        assert_eq!(Phase::SuperTriangleInsertion, snapshots[0].phase);
        assert_eq!(Phase::CavityRemoval, snapshots[1].phase);
        assert_eq!(Some(0), snapshots[1].vertex);
        // The first vertex splits the super-triangle in 3
        assert_eq!(1, snapshots[1].highlighted.len());
        assert_eq!(Phase::Retriangulation, snapshots[2].phase);
        assert_eq!(3, snapshots[2].highlighted.len());
        assert_eq!(3, snapshots[2].triangles.count());

        let last = snapshots.last().expect("Snapshots should not be empty");
        assert_eq!(Phase::RemoveWrapping, last.phase);
        assert_eq!(2, last.triangles.count());
    }

    #[test]
    fn records_selected_steps() {
        let triangulation = triangulation_from_2d_vertices(
            &SQUARE,
            TriangulationConfiguration {
                debug_config: DebugConfiguration {
                    phase_record: PhaseRecord::In(Phase::Retriangulation),
                    steps_record: StepsRecord::From(2),
                    force_end_at_step: None,
                },
                ..Default::default()
            },
        )
        .expect("Triangulation should succeed");
        let snapshots = &triangulation.debug_context.snapshots;

        assert_eq!(2, snapshots.len());
        assert_eq!(vec![2, 3], snapshots.iter().map(|s| s.step).collect::<Vec<_>>());
    }

    #[test]
    fn forced_end() {
        let triangulation = triangulation_from_2d_vertices(
            &SQUARE,
            TriangulationConfiguration {
                debug_config: DebugConfiguration {
                    force_end_at_step: Some(3),
                    ..Default::default()
                },
                ..Default::default()
            },
        )
        .expect("Triangulation should succeed");

        // Only the first 3 vertices were inserted
        assert_eq!(1, triangulation.triangles.len());
    }
}
