//! Force-directed layout.
//!
//! [`Simulation`] holds the physics state and advances it one fixed logical
//! step per [`Simulation::step`]. [`SimulationWorker`] runs it on its own
//! thread behind the message protocol in [`protocol`].

mod forces;
pub mod protocol;
mod worker;

use std::collections::HashMap;
use std::f32::consts::TAU;

use eframe::egui::{Vec2, vec2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::graph::Classification;
use forces::{apply_attraction, apply_centering, apply_repulsion, integrate};

pub use protocol::{Inbound, Outbound, ProtocolError, decode_inbound};
pub use worker::{DEFAULT_TICK_INTERVAL, SimulationWorker, WorkerOptions};

const SEED_RADIUS_MIN: f32 = 200.0;
const SEED_RADIUS_MAX: f32 = 300.0;

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimParams {
    /// Spring constant for linked pairs.
    pub attraction: f32,
    /// Coulomb-like constant applied to every pair.
    pub repulsion: f32,
    /// Velocity kept per tick, in `[0, 1]`.
    pub damping: f32,
    pub max_speed: f32,
    /// Linear pull toward the origin.
    pub center_force: f32,
    /// Spring rest length.
    pub link_distance: f32,
}

impl Default for SimParams {
    fn default() -> Self {
        Self {
            attraction: 0.015,
            repulsion: 400.0,
            damping: 0.85,
            max_speed: 10.0,
            center_force: 0.015,
            link_distance: 50.0,
        }
    }
}

impl SimParams {
    /// Overlays the fields present in `patch`. Non-finite values are ignored.
    pub fn merge(&mut self, patch: &SimParamsPatch) {
        fn take(target: &mut f32, value: Option<f32>) {
            if let Some(value) = value.filter(|value| value.is_finite()) {
                *target = value;
            }
        }

        take(&mut self.attraction, patch.attraction);
        take(&mut self.repulsion, patch.repulsion);
        take(&mut self.damping, patch.damping);
        take(&mut self.max_speed, patch.max_speed);
        take(&mut self.center_force, patch.center_force);
        take(&mut self.link_distance, patch.link_distance);
        *self = self.sanitized();
    }

    pub fn sanitized(self) -> Self {
        let defaults = Self::default();
        let finite_or = |value: f32, fallback: f32| if value.is_finite() { value } else { fallback };

        Self {
            attraction: finite_or(self.attraction, defaults.attraction),
            repulsion: finite_or(self.repulsion, defaults.repulsion),
            damping: finite_or(self.damping, defaults.damping).clamp(0.0, 1.0),
            max_speed: finite_or(self.max_speed, defaults.max_speed).max(0.0),
            center_force: finite_or(self.center_force, defaults.center_force),
            link_distance: finite_or(self.link_distance, defaults.link_distance).max(0.0),
        }
    }
}

/// Partial parameter update; absent fields keep their current value.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SimParamsPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attraction: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub repulsion: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub damping: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_speed: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub center_force: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_distance: Option<f32>,
}

impl From<SimParams> for SimParamsPatch {
    fn from(params: SimParams) -> Self {
        Self {
            attraction: Some(params.attraction),
            repulsion: Some(params.repulsion),
            damping: Some(params.damping),
            max_speed: Some(params.max_speed),
            center_force: Some(params.center_force),
            link_distance: Some(params.link_distance),
        }
    }
}

/// A node as handed to the simulation. Also used for in-place
/// classification updates.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NodeSpec {
    pub id: String,
    #[serde(default, alias = "type")]
    pub classification: Classification,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeSpec {
    pub from: String,
    pub to: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct NodePosition {
    pub id: String,
    pub x: f32,
    pub y: f32,
}

pub fn mass_for(classification: Classification) -> f32 {
    match classification {
        Classification::Main => 2.0,
        Classification::Secondary => 1.5,
        Classification::Isolated => 1.0,
    }
}

struct SimNode {
    id: String,
    position: Vec2,
    velocity: Vec2,
    mass: f32,
}

pub struct Simulation {
    nodes: Vec<SimNode>,
    edges: Vec<(usize, usize)>,
    index_by_id: HashMap<String, usize>,
    params: SimParams,
    rng: StdRng,
    ticks: u64,
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulation {
    /// Simulation seeded from OS entropy.
    pub fn new() -> Self {
        Self::with_rng(StdRng::from_os_rng())
    }

    /// Simulation with a reproducible initial layout.
    pub fn seeded(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    pub fn from_seed(seed: Option<u64>) -> Self {
        seed.map_or_else(Self::new, Self::seeded)
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            nodes: Vec::new(),
            edges: Vec::new(),
            index_by_id: HashMap::new(),
            params: SimParams::default(),
            rng,
            ticks: 0,
        }
    }

    /// Replaces all simulation state. Nodes are scattered on a ring around
    /// the origin with zero velocity; edges naming unknown nodes or looping
    /// back on themselves are dropped.
    pub fn init(&mut self, nodes: &[NodeSpec], edges: &[EdgeSpec], params: SimParams) {
        self.nodes.clear();
        self.edges.clear();
        self.index_by_id.clear();
        self.params = params.sanitized();
        self.ticks = 0;

        for spec in nodes {
            if self.index_by_id.contains_key(&spec.id) {
                continue;
            }

            let angle = self.rng.random_range(0.0..TAU);
            let radius = self.rng.random_range(SEED_RADIUS_MIN..SEED_RADIUS_MAX);
            self.index_by_id.insert(spec.id.clone(), self.nodes.len());
            self.nodes.push(SimNode {
                id: spec.id.clone(),
                position: vec2(angle.cos(), angle.sin()) * radius,
                velocity: Vec2::ZERO,
                mass: mass_for(spec.classification),
            });
        }

        for edge in edges {
            match (self.index_by_id.get(&edge.from), self.index_by_id.get(&edge.to)) {
                (Some(&from), Some(&to)) if from != to => self.edges.push((from, to)),
                _ => debug!(from = %edge.from, to = %edge.to, "dropping edge outside the node set"),
            }
        }
    }

    pub fn update_params(&mut self, patch: &SimParamsPatch) {
        self.params.merge(patch);
    }

    /// Updates mass for known nodes without touching their positions.
    /// Returns how many nodes were updated.
    pub fn update_nodes(&mut self, updates: &[NodeSpec]) -> usize {
        let mut updated = 0;
        for update in updates {
            if let Some(&index) = self.index_by_id.get(&update.id) {
                self.nodes[index].mass = mass_for(update.classification);
                updated += 1;
            }
        }
        updated
    }

    /// Advances one fixed step: repulsion, springs, centering, then
    /// damped integration.
    pub fn step(&mut self) {
        let params = self.params;
        apply_repulsion(&mut self.nodes, params.repulsion);
        apply_attraction(
            &mut self.nodes,
            &self.edges,
            params.attraction,
            params.link_distance,
        );
        apply_centering(&mut self.nodes, params.center_force);
        integrate(&mut self.nodes, params.damping, params.max_speed);
        self.ticks += 1;
    }

    pub fn positions(&self) -> Vec<NodePosition> {
        self.nodes
            .iter()
            .map(|node| NodePosition {
                id: node.id.clone(),
                x: node.position.x,
                y: node.position.y,
            })
            .collect()
    }

    pub fn position_of(&self, id: &str) -> Option<Vec2> {
        self.index_by_id
            .get(id)
            .map(|&index| self.nodes[index].position)
    }

    /// Mean velocity magnitude over all nodes.
    pub fn mean_speed(&self) -> f32 {
        if self.nodes.is_empty() {
            return 0.0;
        }
        let total = self.nodes.iter().map(|node| node.velocity.length()).sum::<f32>();
        total / self.nodes.len() as f32
    }

    pub fn params(&self) -> &SimParams {
        &self.params
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }
}
