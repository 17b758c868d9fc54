use crate::graph::NoteGraph;
use crate::sim::{Inbound, NodePosition, SimParams, Simulation};

/// Runs the simulation synchronously for `ticks` steps and returns the final
/// positions in node order.
pub fn settle(
    graph: &NoteGraph,
    params: SimParams,
    ticks: usize,
    seed: Option<u64>,
) -> Vec<NodePosition> {
    let Inbound::Init {
        nodes,
        edges,
        params,
    } = Inbound::from_graph(graph, params)
    else {
        return Vec::new();
    };

    let mut simulation = Simulation::from_seed(seed);
    simulation.init(&nodes, &edges, params);
    for _ in 0..ticks {
        simulation.step();
    }
    simulation.positions()
}

/// Axis-aligned bounds of a layout as `(min, max)` corners.
pub fn bounds(positions: &[NodePosition]) -> Option<([f32; 2], [f32; 2])> {
    let first = positions.first()?;
    let mut min = [first.x, first.y];
    let mut max = min;
    for position in positions {
        min[0] = min[0].min(position.x);
        min[1] = min[1].min(position.y);
        max[0] = max[0].max(position.x);
        max[1] = max[1].max(position.y);
    }
    Some((min, max))
}
