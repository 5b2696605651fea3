use crate::{DistanceMatrix, Error, Result};
use rand::{rngs::SmallRng, Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
pub struct Node {
    pub x: f64,
    pub y: f64,
}

impl Node {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_to(&self, other: &Node) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// Draws `count` distinct nodes uniformly from `[-bounds, bounds]` on both axes.
///
/// Fails once more than `16 * count + 64` draws have collided with earlier
/// nodes, which only happens when `bounds` leaves too few representable points.
pub fn generate_nodes<R: Rng + ?Sized>(
    rng: &mut R,
    count: usize,
    bounds: f64,
) -> Result<Vec<Node>> {
    let max_duplicates = count.saturating_mul(16).saturating_add(64);
    let mut duplicates = 0;
    let mut nodes: Vec<Node> = Vec::with_capacity(count);
    let mut seen: HashSet<(u64, u64)> = HashSet::with_capacity(count);
    while nodes.len() < count {
        let x = rng.gen::<f64>() * bounds * 2.0 - bounds;
        let y = rng.gen::<f64>() * bounds * 2.0 - bounds;
        if !seen.insert((x.to_bits(), y.to_bits())) {
            duplicates += 1;
            if duplicates > max_duplicates {
                return Err(Error::InvalidConfig(format!(
                    "could only place {} of {} distinct nodes within bounds {}",
                    nodes.len(),
                    count,
                    bounds
                )));
            }
            continue;
        }
        nodes.push(Node::new(x, y));
    }
    Ok(nodes)
}

/// Euclidean distance matrix over `nodes`. Symmetric with a zero diagonal.
pub fn build_distance_matrix(nodes: &[Node]) -> Result<DistanceMatrix> {
    let rows = nodes
        .iter()
        .enumerate()
        .map(|(i, from)| {
            nodes
                .iter()
                .enumerate()
                .map(|(j, to)| if i == j { 0.0 } else { from.distance_to(to) })
                .collect()
        })
        .collect();
    DistanceMatrix::new(rows)
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Instance {
    pub seed: [u8; 32],
    pub bounds: f64,
    pub nodes: Vec<Node>,
    pub matrix: DistanceMatrix,
}

impl Instance {
    pub fn generate(seed: &[u8; 32], num_nodes: usize, bounds: f64) -> Result<Self> {
        if num_nodes < 2 {
            return Err(Error::InvalidMatrixDimension {
                rows: num_nodes,
                cols: num_nodes,
            });
        }
        if !bounds.is_normal() || bounds < 0.0 {
            return Err(Error::InvalidConfig(format!(
                "bounds must be a positive normal number, got {}",
                bounds
            )));
        }
        let mut rng = SmallRng::from_seed(*seed);
        let nodes = generate_nodes(&mut rng, num_nodes, bounds)?;
        let matrix = build_distance_matrix(&nodes)?;
        Ok(Self {
            seed: *seed,
            bounds,
            nodes,
            matrix,
        })
    }

    pub fn num_nodes(&self) -> usize {
        self.nodes.len()
    }

    pub fn verify_tour(&self, tour: &[usize], start: usize) -> Result<f64> {
        verify_tour(&self.matrix, tour, start)
    }
}

/// Sum of consecutive edges along `tour`, accumulated left to right.
pub fn tour_cost(matrix: &DistanceMatrix, tour: &[usize]) -> f64 {
    tour.windows(2).fold(0.0, |cost, w| cost + matrix.get(w[0], w[1]))
}

/// Checks that `tour` is a closed tour through `start` visiting every other
/// node exactly once, and returns its cost.
pub fn verify_tour(matrix: &DistanceMatrix, tour: &[usize], start: usize) -> Result<f64> {
    let num_nodes = matrix.num_nodes();
    if start >= num_nodes {
        return Err(Error::StartOutOfRange {
            start,
            nodes: num_nodes,
        });
    }
    if tour.len() != num_nodes + 1 {
        return Err(Error::InvalidTour(format!(
            "Tour length ({}) does not match number of nodes + 1 ({})",
            tour.len(),
            num_nodes + 1
        )));
    }
    if tour[0] != start || tour[num_nodes] != start {
        return Err(Error::InvalidTour(format!(
            "Tour must start and end at node {}",
            start
        )));
    }
    if let Some(&node) = tour.iter().find(|&&node| node >= num_nodes) {
        return Err(Error::InvalidTour(format!(
            "Tour contains invalid node {}",
            node
        )));
    }
    let mut visited = vec![false; num_nodes];
    for &node in &tour[..num_nodes] {
        if visited[node] {
            return Err(Error::InvalidTour(format!(
                "Tour visits node {} more than once",
                node
            )));
        }
        visited[node] = true;
    }
    Ok(tour_cost(matrix, tour))
}
