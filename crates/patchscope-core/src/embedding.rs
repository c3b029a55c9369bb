//! Deterministic force-directed embedding used to seed vertical order

use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::graph::Graph;
use crate::model::NodeId;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// Produces 2-D coordinates for every node in a graph.
///
/// Implementations must be deterministic: the same graph (same nodes and
/// edges in the same order) always yields the same coordinates.
pub trait Embedding {
    fn embed(&self, graph: &Graph) -> HashMap<NodeId, [f64; 2]>;
}

/// Fruchterman-Reingold spring embedding with a seeded initial placement.
///
/// Edges attract regardless of direction. Output is centred on the origin
/// and scaled so the largest coordinate magnitude is 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpringEmbedding {
    pub seed: u64,
    pub iterations: usize,
}

impl SpringEmbedding {
    pub fn new(seed: u64) -> Self {
        SpringEmbedding {
            seed,
            iterations: 50,
        }
    }
}

impl Default for SpringEmbedding {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl Embedding for SpringEmbedding {
    fn embed(&self, graph: &Graph) -> HashMap<NodeId, [f64; 2]> {
        let ids: Vec<NodeId> = graph.all_nodes().map(|n| n.id).collect();
        let n = ids.len();
        match n {
            0 => return HashMap::new(),
            1 => return ids.into_iter().map(|id| (id, [0.0, 0.0])).collect(),
            _ => {}
        }

        let slot: HashMap<NodeId, usize> =
            ids.iter().enumerate().map(|(i, id)| (*id, i)).collect();
        let mut adjacent = vec![vec![false; n]; n];
        for edge in graph.all_edges() {
            if let (Some(&a), Some(&b)) = (slot.get(&edge.from), slot.get(&edge.to)) {
                adjacent[a][b] = true;
                adjacent[b][a] = true;
            }
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut pos: Vec<[f64; 2]> = (0..n)
            .map(|_| [rng.gen_range(0.0..1.0), rng.gen_range(0.0..1.0)])
            .collect();

        let k = (1.0 / n as f64).sqrt();
        let mut temperature = 0.1 * spread(&pos);
        let cooling = temperature / (self.iterations as f64 + 1.0);

        for _ in 0..self.iterations {
            let mut displacement = vec![[0.0f64; 2]; n];
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let dx = pos[i][0] - pos[j][0];
                    let dy = pos[i][1] - pos[j][1];
                    let distance = (dx * dx + dy * dy).sqrt().max(0.01);
                    let attraction = if adjacent[i][j] { distance / k } else { 0.0 };
                    let force = k * k / (distance * distance) - attraction;
                    displacement[i][0] += dx * force;
                    displacement[i][1] += dy * force;
                }
            }

            for (p, d) in pos.iter_mut().zip(&displacement) {
                let length = (d[0] * d[0] + d[1] * d[1]).sqrt();
                let length = if length < 0.01 { 0.1 } else { length };
                p[0] += d[0] * temperature / length;
                p[1] += d[1] * temperature / length;
            }
            temperature -= cooling;
        }

        rescale(&mut pos);
        ids.into_iter().zip(pos).collect()
    }
}

/// Largest extent of the point cloud along either axis.
fn spread(pos: &[[f64; 2]]) -> f64 {
    (0..2)
        .map(|axis| {
            let (lo, hi) = pos.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), p| {
                (lo.min(p[axis]), hi.max(p[axis]))
            });
            hi - lo
        })
        .fold(0.0, f64::max)
}

/// Centre on the origin and scale into [-1, 1].
fn rescale(pos: &mut [[f64; 2]]) {
    let n = pos.len() as f64;
    for axis in 0..2 {
        let mean = pos.iter().map(|p| p[axis]).sum::<f64>() / n;
        for p in pos.iter_mut() {
            p[axis] -= mean;
        }
    }
    let limit = pos
        .iter()
        .flat_map(|p| p.iter().map(|v| v.abs()))
        .fold(0.0, f64::max);
    if limit > 0.0 {
        for p in pos.iter_mut() {
            p[0] /= limit;
            p[1] /= limit;
        }
    }
}
